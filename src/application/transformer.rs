// Event transformer - raw event list to sorted events and per-view projections
use crate::domain::event::Event;
use crate::domain::projection::{CellStyle, ChartSeries, MarkerDescriptor, Popup, ProjectionSet, TableRow};
use chrono::TimeZone;
use std::fmt::Display;

/// Most recent events shown on the chart.
pub const CHART_WINDOW: usize = 20;
/// Most recent events listed in the table.
pub const TABLE_WINDOW: usize = 50;
pub const MARKER_SCALE: f64 = 3.0;
/// Radius used when the magnitude is unknown or would give a non-positive size.
pub const MIN_MARKER_RADIUS: f64 = 2.0;

const LABEL_FORMAT: &str = "%H:%M:%S";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stable sort, newest first. Events sharing a timestamp keep their input order.
pub fn sort_newest_first(events: &[Event]) -> Vec<Event> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| b.time.cmp(&a.time));
    sorted
}

pub fn marker_radius(magnitude: Option<f64>) -> f64 {
    match magnitude.map(|mag| mag * MARKER_SCALE) {
        Some(radius) if radius.is_finite() && radius >= MIN_MARKER_RADIUS => radius,
        _ => MIN_MARKER_RADIUS,
    }
}

/// Build all three projections, formatting times in `tz`.
pub fn project<Tz>(events: &[Event], tz: &Tz) -> ProjectionSet
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let sorted = sort_newest_first(events);

    ProjectionSet {
        chart: chart_series(&sorted, tz),
        markers: sorted.iter().map(|event| marker(event, tz)).collect(),
        rows: sorted.iter().take(TABLE_WINDOW).map(|event| table_row(event, tz)).collect(),
    }
}

fn chart_series<Tz>(sorted: &[Event], tz: &Tz) -> ChartSeries
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut series = ChartSeries::default();

    // Take the newest window, then flip it so time runs left to right
    for event in sorted.iter().take(CHART_WINDOW).rev() {
        series.labels.push(format_time(event, tz, LABEL_FORMAT));
        series.magnitudes.push(event.magnitude.filter(|mag| mag.is_finite()));
        series.depths.push(event.depth_km);
        series.colors.push(event.tier().chart_fill());
    }

    series
}

fn marker<Tz>(event: &Event, tz: &Tz) -> MarkerDescriptor
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tier = event.tier();
    MarkerDescriptor {
        latitude: event.latitude,
        longitude: event.longitude,
        radius: marker_radius(event.magnitude),
        fill_color: tier.color(),
        tier,
        popup: Popup {
            location: event.place.clone(),
            magnitude: event.magnitude_label(),
            depth: event.depth_label(),
            time: format_time(event, tz, TIMESTAMP_FORMAT),
        },
    }
}

fn table_row<Tz>(event: &Event, tz: &Tz) -> TableRow
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    TableRow {
        place: event.place.clone(),
        magnitude: event.magnitude_label(),
        depth: event.depth_label(),
        time: format_time(event, tz, TIMESTAMP_FORMAT),
        style: CellStyle::from(event.tier()),
    }
}

fn format_time<Tz>(event: &Event, tz: &Tz, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    event.time.with_timezone(tz).format(pattern).to_string()
}
