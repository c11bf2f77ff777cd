//! Route table loading.
//!
//! A route table is a CSV file with one row per route. Each row names both
//! endpoints, supplies their coordinates, and carries the distance, time, and
//! cost of the route. The cost column name varies between deployments (the
//! currency differs) so it is configurable through [`TableOptions`].

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use directories::ProjectDirs;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{Coordinate, EdgeWeights, RouteGraph};

/// Default filename for the route table.
const ROUTES_FILENAME: &str = "routes.csv";

/// Cost column used when none is configured.
pub const DEFAULT_COST_COLUMN: &str = "cost_usd";

/// Environment variable consulted for the route table location.
pub const ROUTES_ENV_VAR: &str = "CITYROUTE_ROUTES";

/// Options controlling how a route table is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// Header of the column holding the monetary cost.
    pub cost_column: String,
    /// When `false`, a missing cost column or empty cost cell counts as 0.
    pub strict_cost: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            cost_column: DEFAULT_COST_COLUMN.to_string(),
            strict_cost: false,
        }
    }
}

impl TableOptions {
    pub fn with_cost_column(mut self, column: impl Into<String>) -> Self {
        self.cost_column = column.into();
        self
    }

    pub fn strict(mut self, strict_cost: bool) -> Self {
        self.strict_cost = strict_cost;
        self
    }
}

/// One parsed route table row.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub source: String,
    pub target: String,
    pub source_coordinate: Coordinate,
    pub target_coordinate: Coordinate,
    pub weights: EdgeWeights,
}

impl RouteGraph {
    /// Build a graph from parsed rows.
    ///
    /// Both endpoints are registered before the route is added, so the first
    /// row mentioning a city decides its coordinate. No graph is returned if
    /// any row is rejected; errors name `options.cost_column` for bad costs.
    pub fn from_rows<I>(rows: I, options: &TableOptions) -> Result<Self>
    where
        I: IntoIterator<Item = RouteRow>,
    {
        let numbered = rows
            .into_iter()
            .enumerate()
            .map(|(offset, row)| Ok((data_line(offset), row)));
        insert_rows(numbered, &options.cost_column)
    }

    /// Build a graph from CSV input.
    pub fn load_from_table<R: Read>(reader: R, options: &TableOptions) -> Result<Self> {
        load_route_table(reader, options)
    }
}

/// Canonical field name paired with accepted header spellings (normalized).
const COLUMN_SYNONYMS: &[(&str, &[&str])] = &[
    ("source", &["source", "from", "src"]),
    ("target", &["target", "to", "destination", "dest"]),
    ("source_lat", &["source_lat", "src_lat", "from_lat"]),
    ("source_lon", &["source_lon", "src_lon", "from_lon", "source_lng"]),
    ("target_lat", &["target_lat", "dest_lat", "to_lat"]),
    ("target_lon", &["target_lon", "dest_lon", "to_lon", "target_lng"]),
    ("distance_km", &["distance_km", "distance"]),
    ("time_hr", &["time_hr", "time", "duration_hr"]),
];

const REQUIRED_COLUMNS: &[&str] = &[
    "source",
    "target",
    "source_lat",
    "source_lon",
    "target_lat",
    "target_lon",
    "distance_km",
    "time_hr",
];

fn normalize_header(s: &str) -> String {
    s.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Load a route table from CSV input into a fresh graph.
pub fn load_route_table<R: Read>(reader: R, options: &TableOptions) -> Result<RouteGraph> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|err| Error::InvalidTable(format!("failed to read header: {err}")))?
        .clone();
    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();

    let mut columns: BTreeMap<&str, usize> = BTreeMap::new();
    for (canon, alts) in COLUMN_SYNONYMS {
        if let Some(idx) = find_column(&normalized, alts) {
            columns.insert(*canon, idx);
        }
    }
    let cost_column = find_column(&normalized, &[options.cost_column.as_str()]);

    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.contains_key(*c))
        .map(|c| c.to_string())
        .collect();
    if options.strict_cost && cost_column.is_none() {
        missing.push(options.cost_column.clone());
    }
    if !missing.is_empty() {
        return Err(Error::MissingColumns {
            missing,
            available: headers.iter().map(str::to_string).collect(),
        });
    }
    if cost_column.is_none() {
        debug!(
            cost_column = %options.cost_column,
            "cost column absent; every route costs 0"
        );
    }

    let rows = csv_reader.records().enumerate().map(|(offset, result)| {
        let line = data_line(offset);
        let record = result.map_err(|err| Error::InvalidTable(err.to_string()))?;
        parse_record(line, &record, &columns, cost_column, options).map(|row| (line, row))
    });
    let graph = insert_rows(rows, &options.cost_column)?;

    debug!(
        cities = graph.vertex_count(),
        routes = graph.edge_count(),
        "route table loaded"
    );
    Ok(graph)
}

/// CSV line of the data row at `offset`; the header occupies line 1.
fn data_line(offset: usize) -> u64 {
    offset as u64 + 2
}

fn parse_record(
    line: u64,
    record: &StringRecord,
    columns: &BTreeMap<&str, usize>,
    cost_column: Option<usize>,
    options: &TableOptions,
) -> Result<RouteRow> {
    let name = |field: &str| city_name(line, field, cell(record, columns, field));
    let number = |field: &str| parse_number(line, field, cell(record, columns, field));

    let cost = match cost_column.and_then(|i| record.get(i)) {
        Some(value) if !value.is_empty() => parse_number(line, &options.cost_column, value)?,
        _ if options.strict_cost => {
            return Err(malformed(line, &options.cost_column, "", "cost is required"));
        }
        _ => 0.0,
    };

    Ok(RouteRow {
        source: name("source")?,
        target: name("target")?,
        source_coordinate: Coordinate::new(number("source_lat")?, number("source_lon")?),
        target_coordinate: Coordinate::new(number("target_lat")?, number("target_lon")?),
        weights: EdgeWeights::new(number("distance_km")?, number("time_hr")?, cost),
    })
}

/// Validate and insert rows in order, stopping at the first failure.
fn insert_rows<I>(rows: I, cost_field: &str) -> Result<RouteGraph>
where
    I: IntoIterator<Item = Result<(u64, RouteRow)>>,
{
    let mut graph = RouteGraph::new();
    for entry in rows {
        let (line, row) = entry?;
        validate_coordinates(line, &row)?;
        validate_weights(line, &row.weights, cost_field)?;
        insert_row(&mut graph, line, row)?;
    }
    Ok(graph)
}

/// Load a route table from a file on disk.
pub fn load_routes_file(path: &Path, options: &TableOptions) -> Result<RouteGraph> {
    if !path.exists() {
        return Err(Error::RoutesFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = fs::File::open(path)?;
    let graph = load_route_table(file, options)?;
    info!(
        path = %path.display(),
        cities = graph.vertex_count(),
        routes = graph.edge_count(),
        "loaded route graph"
    );
    Ok(graph)
}

/// Resolve the default route table location using platform-specific project directories.
pub fn default_routes_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "cityroute", "cityroute")
        .ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(ROUTES_FILENAME))
}

/// Resolve which route table to load.
///
/// The resolution order is:
/// 1. Explicit `target` argument when provided.
/// 2. `CITYROUTE_ROUTES` environment variable.
/// 3. Platform-specific project data directory.
///
/// A directory resolves to the `routes.csv` file inside it.
pub fn resolve_routes_path(target: Option<&Path>) -> Result<PathBuf> {
    if let Some(explicit) = target {
        return Ok(canonical_routes_path(explicit));
    }

    if let Some(env_path) = env::var_os(ROUTES_ENV_VAR) {
        return Ok(canonical_routes_path(Path::new(&env_path)));
    }

    default_routes_path()
}

fn canonical_routes_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(ROUTES_FILENAME)
    } else {
        path.to_path_buf()
    }
}

fn find_column(normalized: &[String], alternatives: &[&str]) -> Option<usize> {
    alternatives.iter().find_map(|alt| {
        let alt = normalize_header(alt);
        normalized.iter().position(|h| *h == alt)
    })
}

fn cell<'r>(record: &'r StringRecord, columns: &BTreeMap<&str, usize>, field: &str) -> &'r str {
    columns
        .get(field)
        .and_then(|&i| record.get(i))
        .unwrap_or("")
}

fn city_name(line: u64, field: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(malformed(line, field, value, "city name is empty"));
    }
    Ok(value.to_string())
}

fn insert_row(graph: &mut RouteGraph, line: u64, row: RouteRow) -> Result<()> {
    graph.add_vertex(&row.source, Some(row.source_coordinate));
    graph.add_vertex(&row.target, Some(row.target_coordinate));
    graph
        .add_edge(&row.source, &row.target, row.weights)
        .map_err(|err| match err {
            Error::SelfLoop { name } => malformed(line, "target", &name, "route ends where it starts"),
            other => other,
        })
}

fn parse_number(line: u64, field: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|err| malformed(line, field, value, &err.to_string()))
}

fn validate_coordinates(line: u64, row: &RouteRow) -> Result<()> {
    for (field, value) in [
        ("source_lat", row.source_coordinate.lat),
        ("source_lon", row.source_coordinate.lon),
        ("target_lat", row.target_coordinate.lat),
        ("target_lon", row.target_coordinate.lon),
    ] {
        if !value.is_finite() {
            return Err(malformed(
                line,
                field,
                &value.to_string(),
                "coordinates must be finite",
            ));
        }
    }
    Ok(())
}

fn validate_weights(line: u64, weights: &EdgeWeights, cost_field: &str) -> Result<()> {
    for (field, value) in [
        ("distance_km", weights.distance),
        ("time_hr", weights.time),
        (cost_field, weights.cost),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(malformed(
                line,
                field,
                &value.to_string(),
                "weights must be finite and non-negative",
            ));
        }
    }
    Ok(())
}

fn malformed(line: u64, field: &str, value: &str, reason: &str) -> Error {
    Error::MalformedRow {
        row: line,
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str =
        "source,target,source_lat,source_lon,target_lat,target_lon,distance_km,time_hr,cost_usd\n";

    fn load(body: &str, options: &TableOptions) -> Result<RouteGraph> {
        load_route_table(Cursor::new(format!("{HEADER}{body}")), options)
    }

    #[test]
    fn rows_register_both_endpoints_then_the_route() {
        let graph = load(
            "Paris,Berlin,48.85,2.35,52.52,13.40,1054,10.5,120\n",
            &TableOptions::default(),
        )
        .expect("table loads");

        assert_eq!(graph.index_of("Paris"), Some(0));
        assert_eq!(graph.index_of("Berlin"), Some(1));
        assert_eq!(
            graph.edge_between(0, 1),
            Some(&EdgeWeights::new(1054.0, 10.5, 120.0))
        );
    }

    #[test]
    fn first_coordinate_wins() {
        let graph = load(
            "A,B,1,1,2,2,10,1,1\nB,C,99,99,3,3,10,1,1\n",
            &TableOptions::default(),
        )
        .unwrap();
        assert_eq!(graph.coordinate_of("B"), Some(Coordinate::new(2.0, 2.0)));
    }

    #[test]
    fn malformed_number_reports_row_and_field() {
        let err = load(
            "A,B,1,1,2,2,10,1,1\nB,C,1,1,2,2,ten,1,1\n",
            &TableOptions::default(),
        )
        .unwrap_err();

        match err {
            Error::MalformedRow { row, field, value, .. } => {
                assert_eq!(row, 3);
                assert_eq!(field, "distance_km");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn negative_weights_are_rejected() {
        let err = load("A,B,1,1,2,2,10,-1,1\n", &TableOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { ref field, .. } if field == "time_hr"));
    }

    #[test]
    fn missing_cost_column_defaults_to_zero() {
        let csv = "source,target,source_lat,source_lon,target_lat,target_lon,distance_km,time_hr\n\
                   A,B,1,1,2,2,10,1\n";
        let graph = load_route_table(Cursor::new(csv), &TableOptions::default()).unwrap();
        assert_eq!(graph.edge_between(0, 1).map(|w| w.cost), Some(0.0));
    }

    #[test]
    fn strict_cost_requires_the_column() {
        let csv = "source,target,source_lat,source_lon,target_lat,target_lon,distance_km,time_hr\n\
                   A,B,1,1,2,2,10,1\n";
        let err =
            load_route_table(Cursor::new(csv), &TableOptions::default().strict(true)).unwrap_err();
        assert!(matches!(err, Error::MissingColumns { ref missing, .. } if missing == &vec!["cost_usd".to_string()]));
    }

    #[test]
    fn empty_cost_cell_is_zero_unless_strict() {
        let graph = load("A,B,1,1,2,2,10,1,\n", &TableOptions::default()).unwrap();
        assert_eq!(graph.edge_between(0, 1).map(|w| w.cost), Some(0.0));

        let err = load("A,B,1,1,2,2,10,1,\n", &TableOptions::default().strict(true)).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { ref field, .. } if field == "cost_usd"));
    }

    #[test]
    fn custom_cost_column_is_honoured() {
        let csv = "source,target,source_lat,source_lon,target_lat,target_lon,distance_km,time_hr,cost_inr\n\
                   Delhi,Agra,28.61,77.21,27.18,78.01,233,3.5,1500\n";
        let options = TableOptions::default().with_cost_column("cost_inr");
        let graph = load_route_table(Cursor::new(csv), &options).unwrap();
        assert_eq!(graph.edge_between(0, 1).map(|w| w.cost), Some(1500.0));
    }

    #[test]
    fn missing_required_columns_are_listed() {
        let csv = "source,target,distance_km\nA,B,1\n";
        let err = load_route_table(Cursor::new(csv), &TableOptions::default()).unwrap_err();
        match err {
            Error::MissingColumns { missing, .. } => {
                assert!(missing.contains(&"time_hr".to_string()));
                assert!(missing.contains(&"source_lat".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn route_to_self_fails_the_load() {
        let err = load("A,A,1,1,1,1,0,0,0\n", &TableOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { row: 2, .. }));
    }

    #[test]
    fn from_rows_builds_the_same_graph() {
        let rows = vec![RouteRow {
            source: "A".to_string(),
            target: "B".to_string(),
            source_coordinate: Coordinate::new(1.0, 1.0),
            target_coordinate: Coordinate::new(2.0, 2.0),
            weights: EdgeWeights::new(3.0, 4.0, 5.0),
        }];
        let graph = RouteGraph::from_rows(rows, &TableOptions::default()).unwrap();
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(
            graph.edge_between(1, 0),
            Some(&EdgeWeights::new(3.0, 4.0, 5.0))
        );
    }

    #[test]
    fn from_rows_names_the_configured_cost_column() {
        let row = |target: &str, cost: f64| RouteRow {
            source: "Delhi".to_string(),
            target: target.to_string(),
            source_coordinate: Coordinate::new(28.61, 77.21),
            target_coordinate: Coordinate::new(27.18, 78.01),
            weights: EdgeWeights::new(233.0, 3.5, cost),
        };
        let options = TableOptions::default().with_cost_column("cost_inr");
        let rows = vec![row("Agra", 1500.0), row("Jaipur", -1.0)];
        let err = RouteGraph::from_rows(rows, &options).unwrap_err();

        match err {
            Error::MalformedRow { row, field, .. } => {
                assert_eq!(row, 3);
                assert_eq!(field, "cost_inr");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn csv_and_rows_build_identical_graphs() {
        let body = "A,B,1,1,2,2,10,1,4\nB,C,2,2,3,3,20,2,8\n";
        let from_csv = RouteGraph::load_from_table(
            Cursor::new(format!("{HEADER}{body}")),
            &TableOptions::default(),
        )
        .unwrap();
        let rows = [
            ("A", "B", 1.0, 2.0, 10.0, 1.0, 4.0),
            ("B", "C", 2.0, 3.0, 20.0, 2.0, 8.0),
        ]
        .into_iter()
        .map(|(source, target, s, t, d, h, c)| RouteRow {
            source: source.to_string(),
            target: target.to_string(),
            source_coordinate: Coordinate::new(s, s),
            target_coordinate: Coordinate::new(t, t),
            weights: EdgeWeights::new(d, h, c),
        });
        let from_rows = RouteGraph::from_rows(rows, &TableOptions::default()).unwrap();

        let listing = |g: &RouteGraph| {
            g.cities()
                .map(|c| (c.name.to_string(), c.coordinate))
                .collect::<Vec<_>>()
        };
        assert_eq!(listing(&from_csv), listing(&from_rows));
        assert_eq!(from_csv.edge_between(1, 2), from_rows.edge_between(1, 2));
        assert_eq!(from_csv.edge_count(), from_rows.edge_count());
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        for (body, field) in [
            ("A,B,NaN,1,2,2,10,1,1\n", "source_lat"),
            ("A,B,1,1,2,inf,10,1,1\n", "target_lon"),
        ] {
            let err = load(body, &TableOptions::default()).unwrap_err();
            match err {
                Error::MalformedRow { row, field: reported, .. } => {
                    assert_eq!(row, 2);
                    assert_eq!(reported, field);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn explicit_directory_resolves_to_routes_file() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_routes_path(Some(dir.path())).unwrap();
        assert_eq!(resolved, dir.path().join("routes.csv"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_routes_file(Path::new("/nonexistent/routes.csv"), &TableOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::RoutesFileNotFound { .. }));
    }
}
