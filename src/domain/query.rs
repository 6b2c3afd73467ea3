// Refresh query - the user-selected feed parameters
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Hour,
    Day,
    Week,
    Month,
}

impl TimeWindow {
    /// Parse a selector value; anything unrecognized falls back to `Day`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "hour" => TimeWindow::Hour,
            "week" => TimeWindow::Week,
            "month" => TimeWindow::Month,
            _ => TimeWindow::Day,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::Hour => "hour",
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of the controls, taken at the start of every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshQuery {
    pub time_window: TimeWindow,
    /// Feed magnitude bucket as selected, e.g. "2.5", "4.5" or "significant".
    pub min_magnitude: String,
}

impl RefreshQuery {
    pub fn new(time_window: TimeWindow, min_magnitude: impl Into<String>) -> Self {
        Self {
            time_window,
            min_magnitude: min_magnitude.into().trim().to_string(),
        }
    }

    /// Feed name for this query. The hour feed ignores the magnitude filter.
    pub fn feed_name(&self) -> String {
        match self.time_window {
            TimeWindow::Hour => "all_hour".to_string(),
            window => format!("{}_{}", urlencoding::encode(&self.min_magnitude), window),
        }
    }
}
