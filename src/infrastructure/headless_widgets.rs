// Headless widgets - in-memory map, chart and table surfaces that can be snapshotted
use crate::application::sinks::{
    ChartHandle, ChartSurface, DualAxisChart, MapSurface, MarkerHandle, TableSurface,
};
use crate::domain::projection::{MarkerDescriptor, TableRow};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

/// Geographic bounds currently framed by the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// World view centred on 20N 0E.
pub const DEFAULT_VIEWPORT: Viewport = Viewport {
    south: -40.0,
    west: -180.0,
    north: 80.0,
    east: 180.0,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedMarker {
    pub handle: MarkerHandle,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub fill_color: &'static str,
    pub popup: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub markers: Vec<PlacedMarker>,
    pub viewport: Viewport,
}

#[derive(Debug)]
struct MapInner {
    view: MapView,
    next_id: u64,
}

#[derive(Debug, Clone)]
pub struct HeadlessMap {
    inner: Arc<RwLock<MapInner>>,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MapInner {
                view: MapView {
                    markers: Vec::new(),
                    viewport: DEFAULT_VIEWPORT,
                },
                next_id: 1,
            })),
        }
    }

    pub fn snapshot(&self) -> MapView {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).view.clone()
    }
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSurface for HeadlessMap {
    fn place_marker(&mut self, marker: &MarkerDescriptor) -> MarkerHandle {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let handle = MarkerHandle(inner.next_id);
        inner.next_id += 1;
        inner.view.markers.push(PlacedMarker {
            handle,
            latitude: marker.latitude,
            longitude: marker.longitude,
            radius: marker.radius,
            fill_color: marker.fill_color,
            popup: marker.popup.lines().to_vec(),
        });
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.view.markers.retain(|m| m.handle != handle);
    }

    fn fit_bounds(&mut self, handles: &[MarkerHandle]) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut framed: Option<Viewport> = None;

        for marker in inner.view.markers.iter().filter(|m| handles.contains(&m.handle)) {
            framed = Some(match framed {
                None => Viewport {
                    south: marker.latitude,
                    west: marker.longitude,
                    north: marker.latitude,
                    east: marker.longitude,
                },
                Some(v) => Viewport {
                    south: v.south.min(marker.latitude),
                    west: v.west.min(marker.longitude),
                    north: v.north.max(marker.latitude),
                    east: v.east.max(marker.longitude),
                },
            });
        }

        if let Some(viewport) = framed {
            inner.view.viewport = viewport;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub handle: Option<ChartHandle>,
    pub current: Option<DualAxisChart>,
    /// Instances created and not yet destroyed.
    pub live_instances: usize,
}

#[derive(Debug)]
struct ChartInner {
    view: ChartView,
    next_id: u64,
}

#[derive(Debug, Clone)]
pub struct HeadlessChart {
    inner: Arc<RwLock<ChartInner>>,
}

impl HeadlessChart {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ChartInner {
                view: ChartView {
                    handle: None,
                    current: None,
                    live_instances: 0,
                },
                next_id: 1,
            })),
        }
    }

    pub fn snapshot(&self) -> ChartView {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).view.clone()
    }
}

impl Default for HeadlessChart {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartSurface for HeadlessChart {
    fn create_chart(&mut self, chart: DualAxisChart) -> ChartHandle {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let handle = ChartHandle(inner.next_id);
        inner.next_id += 1;
        inner.view.handle = Some(handle);
        inner.view.current = Some(chart);
        inner.view.live_instances += 1;
        handle
    }

    fn destroy_chart(&mut self, handle: ChartHandle) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.view.live_instances = inner.view.live_instances.saturating_sub(1);
        if inner.view.handle == Some(handle) {
            inner.view.handle = None;
            inner.view.current = None;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableView {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessTable {
    inner: Arc<RwLock<TableView>>,
}

impl HeadlessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TableView {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl TableSurface for HeadlessTable {
    fn clear_rows(&mut self) {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).rows.clear();
    }

    fn append_row(&mut self, row: &TableRow) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .rows
            .push(row.clone());
    }
}
