// Status board - latest status message plus a broadcast feed for live subscribers
use crate::application::status::{Status, StatusReporter};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// How long a new message stays highlighted.
pub const PULSE_DURATION: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct Latest {
    message: String,
    posted_at: Option<Instant>,
}

#[derive(Debug)]
pub struct StatusBoard {
    latest: RwLock<Latest>,
    tx: broadcast::Sender<String>,
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(64);
        Self {
            latest: RwLock::new(Latest {
                message: String::new(),
                posted_at: None,
            }),
            tx,
        }
    }

    pub fn message(&self) -> String {
        self.latest.read().unwrap_or_else(PoisonError::into_inner).message.clone()
    }

    /// True during the short highlight after each new message.
    pub fn is_pulsing(&self) -> bool {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .posted_at
            .is_some_and(|at| at.elapsed() < PULSE_DURATION)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for StatusBoard {
    fn report(&self, status: Status) {
        let message = status.to_string();
        tracing::debug!("Status: {}", message);
        {
            let mut latest = self.latest.write().unwrap_or_else(PoisonError::into_inner);
            latest.message = message.clone();
            latest.posted_at = Some(Instant::now());
        }
        // No subscribers is fine
        let _ = self.tx.send(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_updates_latest_and_pulses() {
        let board = StatusBoard::new();
        assert_eq!(board.message(), "");
        assert!(!board.is_pulsing());

        board.report(Status::Refreshing);
        assert_eq!(board.message(), "Refreshing data...");
        assert!(board.is_pulsing());
    }

    #[tokio::test]
    async fn test_subscribers_receive_messages() {
        let board = StatusBoard::new();
        let mut rx = board.subscribe();

        board.report(Status::Failed);
        assert_eq!(rx.recv().await.unwrap(), "Error fetching data. Try again.");
    }
}
