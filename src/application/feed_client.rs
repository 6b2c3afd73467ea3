// Feed client trait for seismic event retrieval
use crate::domain::event::Event;
use crate::domain::query::RefreshQuery;
use async_trait::async_trait;
use thiserror::Error;

/// Failures of a single fetch. Neither is fatal; the next trigger simply tries again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// Transport, DNS, timeout or non-2xx status.
    #[error("network failure: {0}")]
    NetworkFailure(String),
    /// The body was not a valid event collection.
    #[error("parse failure: {0}")]
    ParseFailure(String),
}

#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Perform exactly one request for the feed selected by `query`. No internal retries.
    async fn fetch(&self, query: &RefreshQuery) -> Result<Vec<Event>, FeedError>;
}
