// Domain layer - Seismic events and the per-view projections derived from them
pub mod event;
pub mod projection;
pub mod query;
pub mod severity;
