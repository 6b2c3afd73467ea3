// Severity tier derived from magnitude, shared by the chart, map and table
use serde::Serialize;

pub const HIGH_MAGNITUDE: f64 = 6.0;
pub const MEDIUM_MAGNITUDE: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    High,
    Medium,
    Low,
}

/// Visual weight of a tier. Strong renders bold in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Strong,
    Normal,
}

impl SeverityTier {
    /// Unknown and non-finite magnitudes fall into the lowest tier.
    pub fn classify(magnitude: Option<f64>) -> Self {
        match magnitude {
            Some(mag) if mag >= HIGH_MAGNITUDE => SeverityTier::High,
            Some(mag) if mag >= MEDIUM_MAGNITUDE => SeverityTier::Medium,
            _ => SeverityTier::Low,
        }
    }

    /// Fill color used for map markers.
    pub fn color(self) -> &'static str {
        match self {
            SeverityTier::High => "#ff0000",
            SeverityTier::Medium => "#ffa500",
            SeverityTier::Low => "#007bff",
        }
    }

    /// Same hue as `color`, translucent for chart bars.
    pub fn chart_fill(self) -> &'static str {
        match self {
            SeverityTier::High => "rgba(255, 0, 0, 0.7)",
            SeverityTier::Medium => "rgba(255, 165, 0, 0.7)",
            SeverityTier::Low => "rgba(0, 123, 255, 0.7)",
        }
    }

    /// Text color for table cells; low severity keeps the default color.
    pub fn text_color(self) -> Option<&'static str> {
        match self {
            SeverityTier::High => Some("red"),
            SeverityTier::Medium => Some("orange"),
            SeverityTier::Low => None,
        }
    }

    pub fn emphasis(self) -> Emphasis {
        match self {
            SeverityTier::High => Emphasis::Strong,
            SeverityTier::Medium | SeverityTier::Low => Emphasis::Normal,
        }
    }
}
