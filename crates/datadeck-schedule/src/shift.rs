//! Shifting a UTC cron into its local-time equivalent.
//!
//! Converting the hour/minute fields to local time can move the schedule
//! across a local midnight, in which case every day-of-week token has to
//! move with it, wrapping around the week in either direction.

use chrono::FixedOffset;

use crate::time::{local_offset, utc_to_local_parts_at};

/// Convert a UTC cron string to its local-time equivalent.
///
/// Only wildcard `dom`/`month` crons are shifted; anything else is returned
/// unchanged, since this system never writes non-wildcard values there.
/// Malformed input (wrong field count, unparseable time) yields an empty
/// string rather than an error.
pub fn to_local_cron_at(offset: FixedOffset, cron: &str) -> String {
    let fields: Vec<&str> = cron.split_whitespace().collect();
    let fields: &[&str] = match fields.len() {
        5 => &fields,
        6 => &fields[1..],
        _ => return String::new(),
    };
    let (minute, hour, dom, month, dow) = (fields[0], fields[1], fields[2], fields[3], fields[4]);

    if dom != "*" || month != "*" {
        return cron.to_string();
    }

    let (Ok(hour), Ok(minute)) = (hour.parse::<u8>(), minute.parse::<u8>()) else {
        return String::new();
    };
    let Ok((local_hour, local_minute, day_shift)) = utc_to_local_parts_at(offset, hour, minute)
    else {
        return String::new();
    };

    format!(
        "{} {} * * {}",
        local_minute,
        local_hour,
        shift_dow_field(dow, i32::from(day_shift))
    )
}

/// [`to_local_cron_at`] against the runtime's local offset.
pub fn to_local_cron(cron: &str) -> String {
    to_local_cron_at(local_offset(), cron)
}

/// Apply a day shift to a whole dow field. The wildcard is left alone
/// unconditionally; list members and range endpoints shift independently.
fn shift_dow_field(dow: &str, day_shift: i32) -> String {
    if dow == "*" {
        return dow.to_string();
    }
    dow.split(',')
        .map(|token| shift_token(token, day_shift))
        .collect::<Vec<_>>()
        .join(",")
}

fn shift_token(token: &str, day_shift: i32) -> String {
    if let Some((start, end)) = token.split_once('-') {
        match (start.parse::<i32>(), end.parse::<i32>()) {
            (Ok(start), Ok(end)) => {
                format!("{}-{}", wrap_day(start + day_shift), wrap_day(end + day_shift))
            }
            // Symbolic tokens are never written by this system; leave them be.
            _ => token.to_string(),
        }
    } else {
        match token.parse::<i32>() {
            Ok(day) => wrap_day(day + day_shift).to_string(),
            _ => token.to_string(),
        }
    }
}

/// Fold a shifted day back into 0..=6, both directions.
fn wrap_day(day: i32) -> i32 {
    day.rem_euclid(7)
}
