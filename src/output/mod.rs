pub mod report;

use colored::Colorize;
use serde_json::json;

use crate::map::MapView;
use crate::model::{Employee, Field};
use crate::query::PageView;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
    GeoJson,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" | "table" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            "geojson" => Some(Self::GeoJson),
            _ => None,
        }
    }

    pub fn is_map_format(self) -> bool {
        matches!(self, Self::Html | Self::GeoJson)
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".geojson") {
        return Some(OutputFormat::GeoJson);
    }
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// Table columns as (header, field). The field doubles as the column's sort key.
pub const COLUMNS: [(&str, Field); 7] = [
    ("TestID", Field::HiringTestId),
    ("Name", Field::FirstName),
    ("Employee ID", Field::EmployeeId),
    ("Email", Field::Email),
    ("Phone", Field::PhoneNumber),
    ("City", Field::City),
    ("Country", Field::Country),
];

fn cell(employee: &Employee, field: Field) -> String {
    match field {
        Field::FirstName => employee.full_name(),
        other => employee.display(other).to_string(),
    }
}

/// Plain-text table with sort arrows and a pagination footer.
pub fn render_table(view: &PageView) -> String {
    let mut out = String::new();
    if view.rows.is_empty() {
        out.push_str("No employees found\n");
        return out;
    }

    let headers: Vec<String> = COLUMNS
        .iter()
        .map(|(title, field)| {
            let arrow = view.sort.indicator(*field);
            if arrow.is_empty() {
                title.to_string()
            } else {
                format!("{title} {arrow}")
            }
        })
        .collect();
    let rows: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|e| COLUMNS.iter().map(|(_, f)| cell(e, *f)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows.iter() {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.chars().count());
        }
    }

    let header_line = join_padded(&headers, &widths);
    out.push_str(&header_line.bold().to_string());
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for row in rows.iter() {
        out.push_str(&join_padded(row, &widths));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&footer(view));
    out.push('\n');
    out
}

fn join_padded(values: &[String], widths: &[usize]) -> String {
    let cells: Vec<String> = values
        .iter()
        .zip(widths.iter())
        .map(|(v, w)| {
            let pad = w.saturating_sub(v.chars().count());
            format!("{v}{}", " ".repeat(pad))
        })
        .collect();
    cells.join("  ").trim_end().to_string()
}

pub fn footer(view: &PageView) -> String {
    let prev = if view.has_previous() { "< Previous" } else { "" };
    let next = if view.has_next() { "Next >" } else { "" };
    let mut line = format!("Page {} of {}", view.page, view.total_pages);
    if view.query.trim().is_empty() {
        line.push_str(&format!(" :: {} employees", view.total));
    } else {
        line.push_str(&format!(
            " :: {} of {} employees match '{}'",
            view.matched, view.total, view.query
        ));
    }
    [prev, line.as_str(), next]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn render_json(view: &PageView) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = serde_json::to_vec_pretty(view)?;
    out.push(b'\n');
    Ok(out)
}

pub fn render_geojson(map: &MapView) -> Result<Vec<u8>, serde_json::Error> {
    let features: Vec<serde_json::Value> = map
        .markers()
        .iter()
        .map(|m| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [m.position.lng, m.position.lat],
                },
                "properties": {
                    "id": m.id,
                    "name": m.title,
                    "popup": m.popup,
                },
            })
        })
        .collect();
    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    let mut out = serde_json::to_vec_pretty(&collection)?;
    out.push(b'\n');
    Ok(out)
}

pub fn render_map(map: &MapView, format: OutputFormat) -> Result<Vec<u8>, serde_json::Error> {
    match format {
        OutputFormat::GeoJson | OutputFormat::Json => render_geojson(map),
        OutputFormat::Html | OutputFormat::Text => report::render_html(map),
    }
}
