// Pipeline state - the owned set of view sinks a refresh cycle renders into
use crate::application::feed_client::FeedError;
use crate::application::sinks::{ChartSink, MapSink, TableSink, ViewSink};
use crate::application::status::{Status, StatusReporter};
use crate::application::transformer::project;
use crate::domain::event::Event;
use chrono::Local;

pub struct PipelineState {
    map: MapSink,
    chart: ChartSink,
    table: TableSink,
}

impl PipelineState {
    pub fn new(map: MapSink, chart: ChartSink, table: TableSink) -> Self {
        Self { map, chart, table }
    }

    /// Finish a cycle with the fetch outcome.
    ///
    /// On failure nothing is rendered, so the previous views stay on screen.
    pub fn complete_cycle(
        &mut self,
        outcome: Result<Vec<Event>, FeedError>,
        status: &dyn StatusReporter,
    ) -> Result<usize, FeedError> {
        match outcome {
            Ok(events) => {
                self.render(&events);
                status.report(Status::Updated(Local::now()));
                Ok(events.len())
            }
            Err(e) => {
                status.report(Status::Failed);
                Err(e)
            }
        }
    }

    /// Transform and hand the projections to every sink. Runs to completion.
    pub fn render(&mut self, events: &[Event]) {
        let projection = project(events, &Local);
        self.map.render(&projection);
        self.chart.render(&projection);
        self.table.render(&projection);
        tracing::debug!(
            "Rendered {} markers, {} chart points (chart live: {}), {} rows",
            self.map.marker_count(),
            projection.chart.len(),
            self.chart.current().is_some(),
            self.table.row_count()
        );
    }

    pub fn teardown(mut self) {
        self.map.release();
        self.chart.release();
        self.table.release();
        tracing::debug!("Pipeline torn down");
    }
}
