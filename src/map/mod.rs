use serde::Serialize;

use crate::model::{Coordinates, Employee, Field};

pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 30.1575,
    lng: 71.5249,
};
pub const DEFAULT_ZOOM: u8 = 5;
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub id: Option<String>,
    pub position: Coordinates,
    pub title: String,
    /// Pre-escaped HTML for the marker popup.
    pub popup: String,
}

impl Marker {
    pub fn for_employee(employee: &Employee) -> Option<Self> {
        let position = employee.coordinates()?;
        let title = employee.full_name();
        let popup = format!(
            "<b>{}</b><br>{}, {}",
            escape_html(&title),
            escape_html(employee.display(Field::City)),
            escape_html(employee.display(Field::Country)),
        );
        Some(Self {
            id: employee.hiring_test_id.clone(),
            position,
            title,
            popup,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub removed: usize,
    pub added: usize,
    /// Records left off the map for lack of usable coordinates.
    pub skipped: usize,
}

/// A mounted map and its marker layer.
///
/// The marker set is replaced wholesale on every refresh; markers are never
/// diffed against the previous set.
#[derive(Debug)]
pub struct MapView {
    center: Coordinates,
    zoom: u8,
    markers: Vec<Marker>,
    refreshes: u64,
}

impl MapView {
    pub fn mount(center: Coordinates, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            markers: Vec::new(),
            refreshes: 0,
        }
    }

    pub fn refresh(&mut self, records: &[Employee]) -> RefreshSummary {
        let removed = self.markers.len();
        self.markers.clear();
        self.markers
            .extend(records.iter().filter_map(Marker::for_employee));
        self.refreshes += 1;
        RefreshSummary {
            removed,
            added: self.markers.len(),
            skipped: records.len() - self.markers.len(),
        }
    }

    /// Tears the map down and hands back the markers it last held.
    pub fn unmount(mut self) -> Vec<Marker> {
        std::mem::take(&mut self.markers)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn center(&self) -> Coordinates {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::mount(DEFAULT_CENTER, DEFAULT_ZOOM)
    }
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
