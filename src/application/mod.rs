// Application layer - The refresh pipeline: fetch, transform, render, schedule
pub mod feed_client;
pub mod pipeline;
pub mod scheduler;
pub mod sinks;
pub mod status;
pub mod transformer;
