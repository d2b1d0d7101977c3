//! Cron codec and local-time schedule rendering.
//!
//! Pipelines persist their schedule as a UTC 5-field cron string. This crate
//! converts between that stored form and what the console shows: a local
//! wall-clock time plus local weekdays, shifting day-of-week tokens when the
//! UTC-to-local conversion crosses a midnight boundary.
//!
//! Every function that depends on the machine's timezone has an `_at`
//! variant taking an explicit [`chrono::FixedOffset`], so the conversion
//! logic is testable against literal offsets.

pub mod cron;
pub mod error;
pub mod format;
pub mod shift;
pub mod time;

pub use cron::{encode, parse};
pub use error::{ScheduleError, ScheduleResult};
pub use format::{describe, describe_at};
pub use shift::{to_local_cron, to_local_cron_at};
pub use time::{local_to_utc, utc_to_local};
