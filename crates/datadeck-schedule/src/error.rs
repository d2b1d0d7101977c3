//! Schedule conversion errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid time format: {0}")]
    InvalidFormat(String),
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;
