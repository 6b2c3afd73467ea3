// Refresh scheduler - single-flight refresh cycles driven by manual triggers and a periodic timer
//
// One task owns the pipeline and serialises every input (user triggers, timer
// ticks, fetch completion) through a single `select!`. The fetch is the only
// suspension point; transform and render run inside the handler to completion.
use crate::application::feed_client::{FeedClient, FeedError};
use crate::application::pipeline::PipelineState;
use crate::application::status::{Status, StatusReporter};
use crate::domain::event::Event;
use crate::domain::query::RefreshQuery;
use futures::future::OptionFuture;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Default auto-refresh period.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    Fetching,
    AutoIdle,
    AutoFetching,
}

impl Phase {
    fn of(auto_refresh: bool, in_flight: bool) -> Self {
        match (auto_refresh, in_flight) {
            (false, false) => Phase::Idle,
            (false, true) => Phase::Fetching,
            (true, false) => Phase::AutoIdle,
            (true, true) => Phase::AutoFetching,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerSnapshot {
    pub phase: Phase,
    pub auto_refresh: bool,
    /// Cycles that finished, successfully or not.
    pub completed_cycles: u64,
    pub failed_cycles: u64,
}

#[derive(Debug, Error)]
#[error("refresh scheduler has stopped")]
pub struct SchedulerClosed;

#[derive(Debug)]
enum Command {
    Refresh,
    SetAutoRefresh(bool),
    ToggleAutoRefresh(oneshot::Sender<bool>),
    Tick { generation: u64 },
    Shutdown,
}

/// Cloneable control surface for the scheduler task.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<Command>,
    state: watch::Receiver<SchedulerSnapshot>,
}

impl RefreshHandle {
    /// Manual trigger. While a fetch is in flight this queues one follow-up cycle.
    pub async fn refresh(&self) -> Result<(), SchedulerClosed> {
        self.send(Command::Refresh).await
    }

    pub async fn set_auto_refresh(&self, enabled: bool) -> Result<(), SchedulerClosed> {
        self.send(Command::SetAutoRefresh(enabled)).await
    }

    /// Flip auto-refresh and return the flag the scheduler ended up with.
    pub async fn toggle_auto_refresh(&self) -> Result<bool, SchedulerClosed> {
        let (reply, enabled) = oneshot::channel();
        self.send(Command::ToggleAutoRefresh(reply)).await?;
        enabled.await.map_err(|_| SchedulerClosed)
    }

    pub async fn shutdown(&self) -> Result<(), SchedulerClosed> {
        self.send(Command::Shutdown).await
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerSnapshot> {
        self.state.clone()
    }

    async fn send(&self, command: Command) -> Result<(), SchedulerClosed> {
        self.tx.send(command).await.map_err(|_| SchedulerClosed)
    }
}

/// Periodic trigger. Dropping it stops the ticks.
struct RefreshTimer {
    generation: u64,
    task: JoinHandle<()>,
}

impl RefreshTimer {
    fn start(period: Duration, generation: u64, commands: mpsc::WeakSender<Command>) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(tx) = commands.upgrade() else {
                    break;
                };
                // A full queue drops the tick rather than stacking it
                if let Err(TrySendError::Closed(_)) = tx.try_send(Command::Tick { generation }) {
                    break;
                }
            }
        });

        Self { generation, task }
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Default)]
struct RefreshSession {
    timer: Option<RefreshTimer>,
    /// Bumped on every enable so ticks from a cancelled timer are recognisable.
    generation: u64,
    follow_up: bool,
    completed_cycles: u64,
    failed_cycles: u64,
}

type FetchFuture = Pin<Box<dyn Future<Output = Result<Vec<Event>, FeedError>> + Send>>;

pub struct RefreshScheduler {
    feed: Arc<dyn FeedClient>,
    status: Arc<dyn StatusReporter>,
    query: watch::Receiver<RefreshQuery>,
    interval: Duration,
    pipeline: PipelineState,
    session: RefreshSession,
    commands: mpsc::Receiver<Command>,
    timer_tx: mpsc::WeakSender<Command>,
    state_tx: watch::Sender<SchedulerSnapshot>,
}

impl RefreshScheduler {
    /// Start the scheduler task with auto-refresh disabled.
    ///
    /// The task ends on `shutdown` or once every handle is dropped, and hands
    /// the pipeline back so its views can be torn down.
    pub fn spawn(
        feed: Arc<dyn FeedClient>,
        status: Arc<dyn StatusReporter>,
        query: watch::Receiver<RefreshQuery>,
        interval: Duration,
        pipeline: PipelineState,
    ) -> (RefreshHandle, JoinHandle<PipelineState>) {
        let (tx, commands) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(SchedulerSnapshot::default());

        let scheduler = Self {
            feed,
            status,
            query,
            interval,
            pipeline,
            session: RefreshSession::default(),
            commands,
            timer_tx: tx.downgrade(),
            state_tx,
        };
        let task = tokio::spawn(scheduler.run());

        (RefreshHandle { tx, state: state_rx }, task)
    }

    async fn run(mut self) -> PipelineState {
        let mut in_flight: Option<FetchFuture> = None;

        loop {
            tokio::select! {
                Some(outcome) = OptionFuture::from(in_flight.as_mut()), if in_flight.is_some() => {
                    in_flight = None;
                    self.finish_cycle(outcome);
                    if std::mem::take(&mut self.session.follow_up) {
                        in_flight = Some(self.start_cycle());
                    }
                }
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command, &mut in_flight),
                },
            }
            self.publish(in_flight.is_some());
        }

        // Cancels the periodic timer; an unfinished fetch is dropped with the task
        self.session.timer = None;
        tracing::info!("Refresh scheduler stopped");
        self.pipeline
    }

    fn handle(&mut self, command: Command, in_flight: &mut Option<FetchFuture>) {
        match command {
            Command::Refresh => {
                if in_flight.is_some() {
                    if self.session.follow_up {
                        tracing::debug!("Refresh coalesced into pending follow-up");
                    } else {
                        tracing::debug!("Fetch in flight, queueing one follow-up cycle");
                    }
                    self.session.follow_up = true;
                } else {
                    *in_flight = Some(self.start_cycle());
                }
            }
            Command::Tick { generation } => {
                let current = self.session.timer.as_ref().map(|t| t.generation);
                if current != Some(generation) {
                    tracing::debug!("Ignoring tick from cancelled timer {}", generation);
                } else if in_flight.is_some() {
                    tracing::debug!("Fetch in flight, dropping periodic tick");
                } else {
                    *in_flight = Some(self.start_cycle());
                }
            }
            Command::SetAutoRefresh(enabled) => self.set_auto_refresh(enabled),
            Command::ToggleAutoRefresh(reply) => {
                let enabled = self.session.timer.is_none();
                self.set_auto_refresh(enabled);
                // The caller may have gone away; the toggle still applies
                let _ = reply.send(enabled);
            }
            Command::Shutdown => {}
        }
    }

    fn set_auto_refresh(&mut self, enabled: bool) {
        if enabled == self.session.timer.is_some() {
            return;
        }

        if enabled {
            self.session.generation += 1;
            self.session.timer = Some(RefreshTimer::start(
                self.interval,
                self.session.generation,
                self.timer_tx.clone(),
            ));
            tracing::info!("Auto-refresh enabled every {:?}", self.interval);
            self.status.report(Status::AutoRefreshEnabled(self.interval));
        } else {
            self.session.timer = None;
            tracing::info!("Auto-refresh disabled");
            self.status.report(Status::AutoRefreshDisabled);
        }
    }

    fn start_cycle(&mut self) -> FetchFuture {
        // Controls are read fresh for every cycle
        let query = self.query.borrow().clone();
        tracing::info!("Refreshing {} feed", query.feed_name());
        self.status.report(Status::Refreshing);

        let feed = Arc::clone(&self.feed);
        Box::pin(async move { feed.fetch(&query).await })
    }

    fn finish_cycle(&mut self, outcome: Result<Vec<Event>, FeedError>) {
        self.session.completed_cycles += 1;
        match self.pipeline.complete_cycle(outcome, self.status.as_ref()) {
            Ok(count) => tracing::info!("Rendered {} events", count),
            Err(e) => {
                self.session.failed_cycles += 1;
                tracing::warn!("Refresh failed: {}", e);
            }
        }
    }

    fn publish(&self, in_flight: bool) {
        let auto_refresh = self.session.timer.is_some();
        let next = SchedulerSnapshot {
            phase: Phase::of(auto_refresh, in_flight),
            auto_refresh,
            completed_cycles: self.session.completed_cycles,
            failed_cycles: self.session.failed_cycles,
        };
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
