//! cityroute library entry points.
//!
//! This crate loads city route tables into an undirected [`RouteGraph`],
//! keeps independently loaded graphs in a [`GraphCatalog`], and answers
//! shortest, fastest, and cheapest path queries over them. Higher-level
//! consumers (CLI, HTTP service) should only depend on the functions exported
//! here instead of reimplementing behavior.
//!

pub mod catalog;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod output;
pub mod path;
pub mod routing;

pub use catalog::{GraphCatalog, GraphScope};
pub use dataset::{
    default_routes_path, load_route_table, load_routes_file, resolve_routes_path, RouteRow,
    TableOptions, DEFAULT_COST_COLUMN, ROUTES_ENV_VAR,
};
pub use error::{Error, Result};
pub use graph::{City, CityIndex, Coordinate, EdgeWeights, RouteGraph};
pub use output::{RouteEndpoint, RouteRenderMode, RouteStep, RouteSummary};
pub use path::{find_route_dense, find_route_heap};
pub use routing::{
    aggregate_weights, find_path, plan_route, select_planner, PathResult, RouteAlgorithm,
    RouteObjective, RoutePlan, RoutePlanner, RouteRequest,
};
