// Per-view projections produced once per successful refresh cycle
use serde::Serialize;

use super::severity::{Emphasis, SeverityTier};

/// Everything the three views need from one transformed event list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectionSet {
    pub chart: ChartSeries,
    pub markers: Vec<MarkerDescriptor>,
    pub rows: Vec<TableRow>,
}

/// Chronological (oldest first) chart data; all arrays run parallel to `labels`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub magnitudes: Vec<Option<f64>>,
    pub depths: Vec<f64>,
    pub colors: Vec<&'static str>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// True when every parallel array has the same length as `labels`.
    pub fn is_aligned(&self) -> bool {
        let n = self.labels.len();
        self.magnitudes.len() == n && self.depths.len() == n && self.colors.len() == n
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDescriptor {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub fill_color: &'static str,
    pub tier: SeverityTier,
    pub popup: Popup,
}

impl MarkerDescriptor {
    pub fn has_valid_geometry(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && self.radius.is_finite()
            && self.radius > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub location: String,
    pub magnitude: String,
    pub depth: String,
    pub time: String,
}

impl Popup {
    pub fn lines(&self) -> [String; 4] {
        [
            format!("Location: {}", self.location),
            format!("Magnitude: {}", self.magnitude),
            format!("Depth: {}", self.depth),
            format!("Time: {}", self.time),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub place: String,
    pub magnitude: String,
    pub depth: String,
    pub time: String,
    pub style: CellStyle,
}

/// Style hint for the magnitude cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellStyle {
    pub color: Option<&'static str>,
    pub emphasis: Emphasis,
}

impl From<SeverityTier> for CellStyle {
    fn from(tier: SeverityTier) -> Self {
        Self {
            color: tier.text_color(),
            emphasis: tier.emphasis(),
        }
    }
}
