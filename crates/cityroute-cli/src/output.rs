//! Output formatting for route and city listings.

use std::fmt::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use cityroute_lib::{City, Coordinate, RouteRenderMode, RouteSummary};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with per-leg weights.
    #[default]
    Text,
    /// Path on a single line followed by totals.
    Compact,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Render a route summary to a string in this format.
    pub fn render_route(self, summary: &RouteSummary) -> Result<String> {
        match self {
            OutputFormat::Text => Ok(summary.render(RouteRenderMode::PlainText)),
            OutputFormat::Compact => Ok(summary.render(RouteRenderMode::Compact)),
            OutputFormat::Json => to_json(summary),
        }
    }

    /// Render a city listing to a string in this format.
    pub fn render_cities<'a>(self, cities: impl IntoIterator<Item = City<'a>>) -> Result<String> {
        let listing = CityListing {
            cities: cities.into_iter().map(CityEntry::from).collect(),
        };
        match self {
            OutputFormat::Text | OutputFormat::Compact => Ok(render_city_text(&listing)),
            OutputFormat::Json => to_json(&listing),
        }
    }
}

#[derive(Debug, Serialize)]
struct CityListing {
    cities: Vec<CityEntry>,
}

#[derive(Debug, Serialize)]
struct CityEntry {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lon: Option<f64>,
}

impl From<City<'_>> for CityEntry {
    fn from(city: City<'_>) -> Self {
        Self {
            name: city.name.to_string(),
            lat: city.coordinate.map(|c| c.lat),
            lon: city.coordinate.map(|c| c.lon),
        }
    }
}

fn render_city_text(listing: &CityListing) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "Cities ({} total):", listing.cities.len());
    for (index, city) in listing.cities.iter().enumerate() {
        match (city.lat, city.lon) {
            (Some(lat), Some(lon)) => {
                let _ = writeln!(
                    buffer,
                    "{:>3}: {} ({})",
                    index,
                    city.name,
                    format_coordinate(Coordinate::new(lat, lon))
                );
            }
            _ => {
                let _ = writeln!(buffer, "{:>3}: {}", index, city.name);
            }
        }
    }
    buffer
}

fn format_coordinate(coordinate: Coordinate) -> String {
    format!("{:.4}, {:.4}", coordinate.lat, coordinate.lon)
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut json =
        serde_json::to_string_pretty(value).context("failed to serialise output as JSON")?;
    json.push('\n');
    Ok(json)
}
