//! Human-readable schedule descriptions.

use chrono::FixedOffset;

use datadeck_core::schedule::{Schedule, TimeOfDay};

use crate::cron::parse;
use crate::shift::to_local_cron_at;
use crate::time::local_offset;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Describe a stored UTC cron in local terms, e.g. "Daily at 9:30 AM" or
/// "Mon, Wed at 2:30 PM". Missing or unparseable crons read as "Manual".
pub fn describe_at(offset: FixedOffset, cron: Option<&str>) -> String {
    let Some(cron) = cron.filter(|c| !c.trim().is_empty()) else {
        return "Manual".to_string();
    };
    match parse(&to_local_cron_at(offset, cron)) {
        Schedule::Manual => "Manual".to_string(),
        Schedule::Daily { time } => format!("Daily at {}", format_time(time)),
        Schedule::Weekly { time, days } => {
            let names: Vec<&str> = days.iter().map(|d| WEEKDAYS[usize::from(*d)]).collect();
            format!("{} at {}", names.join(", "), format_time(time))
        }
    }
}

/// [`describe_at`] against the runtime's local offset.
pub fn describe(cron: Option<&str>) -> String {
    describe_at(local_offset(), cron)
}

/// 12-hour clock rendering; midnight is 12 AM, noon is 12 PM.
fn format_time(time: TimeOfDay) -> String {
    let suffix = if time.hour < 12 { "AM" } else { "PM" };
    let hour = match time.hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour, time.minute, suffix)
}
