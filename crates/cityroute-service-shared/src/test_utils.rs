//! Test utilities for handler testing.
//!
//! Provides a shared [`AppState`] loaded from the CSV fixtures in
//! `docs/fixtures/`: the global table under the global scope and the Indian
//! domestic table (priced in `cost_inr`) under the domestic scope.

use std::path::PathBuf;
use std::sync::OnceLock;

use cityroute_lib::{GraphCatalog, GraphScope, RouteGraph, TableOptions};

use crate::state::{AppState, GraphSourceConfig, StateConfig};

/// Directory holding the fixture route tables.
pub const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../docs/fixtures");

static TEST_STATE: OnceLock<AppState> = OnceLock::new();

/// Configuration pointing both scopes at the fixture tables.
pub fn fixture_config() -> StateConfig {
    let dir = PathBuf::from(FIXTURES_DIR);
    StateConfig {
        sources: vec![
            GraphSourceConfig {
                scope: GraphScope::Global,
                path: dir.join("global_routes.csv"),
                options: TableOptions::default(),
            },
            GraphSourceConfig {
                scope: GraphScope::Domestic,
                path: dir.join("domestic_routes.csv"),
                options: TableOptions::default().with_cost_column("cost_inr"),
            },
        ],
    }
}

/// Shared state loaded from the fixtures, cached after the first call.
///
/// # Panics
///
/// Panics if the fixtures cannot be loaded.
pub fn test_state() -> AppState {
    TEST_STATE
        .get_or_init(|| {
            AppState::load(&fixture_config())
                .unwrap_or_else(|e| panic!("failed to load test fixtures: {}", e))
        })
        .clone()
}

/// State with only the global scope loaded.
pub fn global_only_state() -> AppState {
    let catalog = test_state().catalog().clone();
    let global = catalog
        .get(GraphScope::Global)
        .unwrap_or_else(|e| panic!("global fixture missing: {}", e));
    AppState::from_global(RouteGraph::clone(&global))
}

/// State whose only graph has no cities, for readiness checks.
pub fn empty_state() -> AppState {
    AppState::from_catalog(GraphCatalog::new().with_graph(GraphScope::Global, RouteGraph::new()))
}

/// Known city names in the fixtures.
pub mod fixture_cities {
    pub const LONDON: &str = "London";
    pub const BERLIN: &str = "Berlin";
    pub const ROME: &str = "Rome";
    /// Only connected to Reykjavik.
    pub const NUUK: &str = "Nuuk";
    pub const DELHI: &str = "Delhi";
    pub const CHENNAI: &str = "Chennai";
}
