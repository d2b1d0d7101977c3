//! Schedule value objects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{Error, Result};

/// A wall-clock time of day, stored in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    /// Create a validated time of day.
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(Error::InvalidInput(format!(
                "time of day out of range: {hour}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }
}

/// How a pipeline is scheduled.
///
/// Manual carries no time, Daily carries a time but no days, Weekly carries
/// both and a non-empty day set. Other combinations are unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schedule {
    /// Only ever triggered by hand.
    Manual,
    /// Every day at a fixed UTC time.
    Daily { time: TimeOfDay },
    /// On specific weekdays (0 = Sunday .. 6 = Saturday) at a fixed UTC time.
    Weekly { time: TimeOfDay, days: BTreeSet<u8> },
}

impl Schedule {
    /// Build a weekly schedule, rejecting an empty or out-of-range day set.
    pub fn weekly(time: TimeOfDay, days: impl IntoIterator<Item = u8>) -> Result<Self> {
        let days: BTreeSet<u8> = days.into_iter().collect();
        if days.is_empty() {
            return Err(Error::InvalidInput(
                "weekly schedule needs at least one day".to_string(),
            ));
        }
        if let Some(bad) = days.iter().find(|d| **d > 6) {
            return Err(Error::InvalidInput(format!("day of week out of range: {bad}")));
        }
        Ok(Schedule::Weekly { time, days })
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Schedule::Manual)
    }
}
