// Status reporter trait and the messages emitted at cycle transitions
use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Refreshing,
    Updated(DateTime<Local>),
    Failed,
    AutoRefreshEnabled(Duration),
    AutoRefreshDisabled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Refreshing => f.write_str("Refreshing data..."),
            Status::Updated(at) => write!(f, "Last updated: {}", at.format("%H:%M:%S")),
            Status::Failed => f.write_str("Error fetching data. Try again."),
            Status::AutoRefreshEnabled(interval) => {
                write!(f, "Auto-refresh enabled (every {} seconds)", interval.as_secs())
            }
            Status::AutoRefreshDisabled => f.write_str("Auto-refresh disabled"),
        }
    }
}

pub trait StatusReporter: Send + Sync {
    fn report(&self, status: Status);
}
