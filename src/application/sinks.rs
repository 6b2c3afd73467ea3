// View sinks - full replace-and-redraw of each view behind a narrow widget capability
use crate::domain::projection::{ChartSeries, MarkerDescriptor, ProjectionSet, TableRow};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChartHandle(pub u64);

/// A projection the sinks refuse to draw. Logged, never propagated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderFailure {
    #[error("chart arrays are not aligned with {labels} labels")]
    MisalignedChart { labels: usize },
    #[error("marker {index} has invalid geometry")]
    InvalidMarker { index: usize },
}

/// Map widget capability: place markers, remove them, frame them.
pub trait MapSurface: Send {
    fn place_marker(&mut self, marker: &MarkerDescriptor) -> MarkerHandle;
    fn remove_marker(&mut self, handle: MarkerHandle);
    fn fit_bounds(&mut self, handles: &[MarkerHandle]);
}

/// Chart widget capability: create and destroy whole chart instances.
pub trait ChartSurface: Send {
    fn create_chart(&mut self, chart: DualAxisChart) -> ChartHandle;
    fn destroy_chart(&mut self, handle: ChartHandle);
}

/// Table widget capability: the body is cleared and rebuilt row by row.
pub trait TableSurface: Send {
    fn clear_rows(&mut self);
    fn append_row(&mut self, row: &TableRow);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarDataset {
    pub label: &'static str,
    pub values: Vec<Option<f64>>,
    pub colors: Vec<&'static str>,
    pub axis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineDataset {
    pub label: &'static str,
    pub values: Vec<f64>,
    pub axis: Axis,
}

/// Magnitude bars on the left axis with depth overlaid as a line on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DualAxisChart {
    pub labels: Vec<String>,
    pub bars: BarDataset,
    pub line: LineDataset,
    /// Extra tooltip text shown when hovering the bar at the same index.
    pub hover_details: Vec<String>,
}

impl DualAxisChart {
    pub fn from_series(series: &ChartSeries) -> Self {
        Self {
            labels: series.labels.clone(),
            bars: BarDataset {
                label: "Magnitude",
                values: series.magnitudes.clone(),
                colors: series.colors.clone(),
                axis: Axis::Left,
            },
            line: LineDataset {
                label: "Depth (km)",
                values: series.depths.clone(),
                axis: Axis::Right,
            },
            hover_details: series
                .depths
                .iter()
                .map(|depth| format!("Depth: {} km", depth))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::from_series(&ChartSeries::default())
    }
}

pub trait ViewSink: Send {
    /// Replace everything previously rendered with `projection`.
    fn render(&mut self, projection: &ProjectionSet);
    /// Drop every artifact this sink owns.
    fn release(&mut self);
}

pub struct MapSink {
    surface: Box<dyn MapSurface>,
    markers: Vec<MarkerHandle>,
}

impl MapSink {
    pub fn new(surface: Box<dyn MapSurface>) -> Self {
        Self {
            surface,
            markers: Vec::new(),
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    fn validate(markers: &[MarkerDescriptor]) -> Result<(), RenderFailure> {
        match markers.iter().position(|m| !m.has_valid_geometry()) {
            Some(index) => Err(RenderFailure::InvalidMarker { index }),
            None => Ok(()),
        }
    }
}

impl ViewSink for MapSink {
    fn render(&mut self, projection: &ProjectionSet) {
        self.release();

        if let Err(e) = Self::validate(&projection.markers) {
            tracing::warn!("Map left empty: {}", e);
            return;
        }

        for descriptor in &projection.markers {
            let handle = self.surface.place_marker(descriptor);
            self.markers.push(handle);
        }

        // An empty map keeps its current viewport
        if !self.markers.is_empty() {
            self.surface.fit_bounds(&self.markers);
        }
    }

    fn release(&mut self) {
        for handle in self.markers.drain(..) {
            self.surface.remove_marker(handle);
        }
    }
}

pub struct ChartSink {
    surface: Box<dyn ChartSurface>,
    chart: Option<ChartHandle>,
}

impl ChartSink {
    pub fn new(surface: Box<dyn ChartSurface>) -> Self {
        Self {
            surface,
            chart: None,
        }
    }

    pub fn current(&self) -> Option<ChartHandle> {
        self.chart
    }
}

impl ViewSink for ChartSink {
    fn render(&mut self, projection: &ProjectionSet) {
        self.release();

        let chart = if projection.chart.is_aligned() {
            DualAxisChart::from_series(&projection.chart)
        } else {
            let failure = RenderFailure::MisalignedChart {
                labels: projection.chart.labels.len(),
            };
            tracing::warn!("Chart left empty: {}", failure);
            DualAxisChart::empty()
        };

        self.chart = Some(self.surface.create_chart(chart));
    }

    fn release(&mut self) {
        if let Some(handle) = self.chart.take() {
            self.surface.destroy_chart(handle);
        }
    }
}

pub struct TableSink {
    surface: Box<dyn TableSurface>,
    rows: usize,
}

impl TableSink {
    pub fn new(surface: Box<dyn TableSurface>) -> Self {
        Self { surface, rows: 0 }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }
}

impl ViewSink for TableSink {
    fn render(&mut self, projection: &ProjectionSet) {
        self.release();
        for row in &projection.rows {
            self.surface.append_row(row);
        }
        self.rows = projection.rows.len();
    }

    fn release(&mut self) {
        self.surface.clear_rows();
        self.rows = 0;
    }
}
