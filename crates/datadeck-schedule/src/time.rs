//! Time-of-day conversion between UTC and local wall-clock time.
//!
//! Pure minute arithmetic over a fixed offset; no day concept beyond the
//! day delta reported to the shifter.

use chrono::{FixedOffset, Local, Offset};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ScheduleError, ScheduleResult};

/// Strict `HH:MM` shape: one or two hour digits, exactly two minute digits.
static HH_MM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").unwrap());

const MINUTES_PER_DAY: i32 = 24 * 60;

/// The machine's UTC offset at the current instant.
pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Convert a UTC time of day to local wall-clock parts.
///
/// Returns `(hour, minute, day_shift)` where `day_shift` is -1, 0, or +1
/// depending on whether the conversion crossed a local midnight boundary.
pub fn utc_to_local_parts_at(
    offset: FixedOffset,
    hour: u8,
    minute: u8,
) -> ScheduleResult<(u8, u8, i8)> {
    if hour > 23 || minute > 59 {
        return Err(ScheduleError::InvalidFormat(format!(
            "utc time out of range: {hour}:{minute:02}"
        )));
    }
    let total = i32::from(hour) * 60 + i32::from(minute) + offset.local_minus_utc() / 60;
    let day_shift = total.div_euclid(MINUTES_PER_DAY);
    let local = total.rem_euclid(MINUTES_PER_DAY);
    Ok(((local / 60) as u8, (local % 60) as u8, day_shift as i8))
}

/// Convert a UTC `(hour, minute)` pair to a local `"HH:MM"` string.
pub fn utc_to_local_at(offset: FixedOffset, hour: u8, minute: u8) -> ScheduleResult<String> {
    let (h, m, _) = utc_to_local_parts_at(offset, hour, minute)?;
    Ok(format!("{h:02}:{m:02}"))
}

/// [`utc_to_local_at`] against the runtime's local offset.
pub fn utc_to_local(hour: u8, minute: u8) -> ScheduleResult<String> {
    utc_to_local_at(local_offset(), hour, minute)
}

/// Parse a local `"HH:MM"` string and convert it to a UTC `(hour, minute)`.
///
/// Rejects anything that is not a well-formed in-range wall-clock time.
pub fn local_to_utc_at(offset: FixedOffset, local: &str) -> ScheduleResult<(u8, u8)> {
    let captures = HH_MM
        .captures(local)
        .ok_or_else(|| ScheduleError::InvalidFormat(local.to_string()))?;
    let hour: i32 = captures[1].parse().expect("regex guarantees digits");
    let minute: i32 = captures[2].parse().expect("regex guarantees digits");
    if hour > 23 || minute > 59 {
        return Err(ScheduleError::InvalidFormat(local.to_string()));
    }
    let total =
        (hour * 60 + minute - offset.local_minus_utc() / 60).rem_euclid(MINUTES_PER_DAY);
    Ok(((total / 60) as u8, (total % 60) as u8))
}

/// [`local_to_utc_at`] against the runtime's local offset.
pub fn local_to_utc(local: &str) -> ScheduleResult<(u8, u8)> {
    local_to_utc_at(local_offset(), local)
}
