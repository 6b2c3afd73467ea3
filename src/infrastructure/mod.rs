// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod headless_widgets;
pub mod status_board;
pub mod usgs_client;
