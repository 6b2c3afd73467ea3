// Presentation layer - HTTP controls and read-only views
pub mod app_state;
pub mod error;
pub mod handlers;
