// Seismic event domain model
use chrono::{DateTime, Utc};

use super::severity::SeverityTier;

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub place: String,
    /// `None` when the feed reports a null magnitude.
    pub magnitude: Option<f64>,
    pub depth_km: f64,
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Event {
    pub fn new(
        id: String,
        place: String,
        magnitude: Option<f64>,
        depth_km: f64,
        time: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id,
            place,
            magnitude,
            depth_km,
            time,
            latitude,
            longitude,
        }
    }

    pub fn tier(&self) -> SeverityTier {
        SeverityTier::classify(self.magnitude)
    }

    /// Magnitude as shown to users; unknown magnitudes render as "N/A".
    pub fn magnitude_label(&self) -> String {
        match self.magnitude {
            Some(mag) if mag.is_finite() => format!("{}", mag),
            _ => "N/A".to_string(),
        }
    }

    pub fn depth_label(&self) -> String {
        format!("{} km", self.depth_km)
    }
}
