// Application state for HTTP handlers
use crate::application::scheduler::RefreshHandle;
use crate::domain::query::RefreshQuery;
use crate::infrastructure::headless_widgets::{HeadlessChart, HeadlessMap, HeadlessTable};
use crate::infrastructure::status_board::StatusBoard;
use std::sync::Arc;
use tokio::sync::watch;

pub struct AppState {
    pub refresh: RefreshHandle,
    /// Current control values; the scheduler reads them at the start of each cycle.
    pub controls: watch::Sender<RefreshQuery>,
    pub status: Arc<StatusBoard>,
    pub map: HeadlessMap,
    pub chart: HeadlessChart,
    pub table: HeadlessTable,
}
