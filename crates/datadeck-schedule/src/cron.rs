//! Parsing and encoding of persisted cron strings.
//!
//! The platform only ever stores daily or weekly schedules, so `dom` and
//! `month` are wildcards in every cron this codec produces. Parsing never
//! fails: anything unrecognizable degrades to [`Schedule::Manual`] so a bad
//! value in the database cannot take the pipeline list down.

use std::collections::BTreeSet;

use datadeck_core::schedule::{Schedule, TimeOfDay};

/// Parse a 5-field cron string (a 6-field form with a leading seconds field
/// is accepted and the seconds field discarded) into a [`Schedule`].
///
/// Times in the result are in whatever zone the cron was written in; stored
/// crons are UTC.
pub fn parse(cron: &str) -> Schedule {
    let fields: Vec<&str> = cron.split_whitespace().collect();
    let fields: &[&str] = match fields.len() {
        5 => &fields,
        6 => &fields[1..],
        _ => return Schedule::Manual,
    };
    let (minute, hour, dow) = (fields[0], fields[1], fields[4]);

    let time = match (hour.parse::<u8>(), minute.parse::<u8>()) {
        (Ok(h), Ok(m)) => match TimeOfDay::new(h, m) {
            Ok(time) => time,
            Err(_) => return Schedule::Manual,
        },
        _ => return Schedule::Manual,
    };

    if dow == "*" {
        return Schedule::Daily { time };
    }

    match parse_days(dow) {
        Some(days) if !days.is_empty() => Schedule::Weekly { time, days },
        _ => Schedule::Manual,
    }
}

/// Parse a dow field: comma-separated 0-6 values, optionally with `a-b`
/// ranges. `None` on anything else.
fn parse_days(dow: &str) -> Option<BTreeSet<u8>> {
    let mut days = BTreeSet::new();
    for token in dow.split(',') {
        if let Some((start, end)) = token.split_once('-') {
            let (start, end) = (start.parse::<u8>().ok()?, end.parse::<u8>().ok()?);
            if start > 6 || end > 6 || start > end {
                return None;
            }
            days.extend(start..=end);
        } else {
            let day = token.parse::<u8>().ok()?;
            if day > 6 {
                return None;
            }
            days.insert(day);
        }
    }
    Some(days)
}

/// Encode a [`Schedule`] back into the persisted cron form.
///
/// Manual encodes as the empty string; weekly days come out ascending and
/// comma-joined.
pub fn encode(schedule: &Schedule) -> String {
    match schedule {
        Schedule::Manual => String::new(),
        Schedule::Daily { time } => format!("{} {} * * *", time.minute, time.hour),
        Schedule::Weekly { time, days } => {
            let days: Vec<String> = days.iter().map(u8::to_string).collect();
            format!("{} {} * * {}", time.minute, time.hour, days.join(","))
        }
    }
}
