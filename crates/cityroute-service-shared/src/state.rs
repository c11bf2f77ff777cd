//! Application state for the HTTP service.
//!
//! This module provides the shared state structure that axum handlers use to
//! access the route graphs loaded at startup.

use std::path::PathBuf;
use std::sync::Arc;

use cityroute_lib::{
    load_routes_file, Error as LibError, GraphCatalog, GraphScope, RouteGraph, TableOptions,
    DEFAULT_COST_COLUMN,
};

/// Route table used for the global scope when nothing is configured.
pub const DEFAULT_GLOBAL_ROUTES: &str = "routes.csv";

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to load a route table.
    GraphLoad { scope: GraphScope, source: LibError },

    /// No route table was configured at all.
    NoSources,
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GraphLoad { scope, source } => {
                write!(f, "failed to load {} route table: {}", scope, source)
            }
            Self::NoSources => write!(f, "no route tables configured"),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::GraphLoad { source, .. } => Some(source),
            Self::NoSources => None,
        }
    }
}

/// Where one scope's route table lives and how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSourceConfig {
    pub scope: GraphScope,
    pub path: PathBuf,
    pub options: TableOptions,
}

/// Route table configuration for every scope served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateConfig {
    pub sources: Vec<GraphSourceConfig>,
}

impl StateConfig {
    /// Read configuration from environment variables.
    ///
    /// - `CITYROUTE_GLOBAL_ROUTES`: global table (default `routes.csv`)
    /// - `CITYROUTE_DOMESTIC_ROUTES`: domestic table (optional)
    /// - `CITYROUTE_GLOBAL_COST_COLUMN` / `CITYROUTE_DOMESTIC_COST_COLUMN`:
    ///   cost column names (default `cost_usd`)
    /// - `CITYROUTE_STRICT_COST`: `true` or `1` makes a missing cost an error
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let strict = non_empty("CITYROUTE_STRICT_COST")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);
        let options = |key: &str| {
            TableOptions::default()
                .with_cost_column(non_empty(key).unwrap_or_else(|| DEFAULT_COST_COLUMN.into()))
                .strict(strict)
        };

        let mut sources = vec![GraphSourceConfig {
            scope: GraphScope::Global,
            path: non_empty("CITYROUTE_GLOBAL_ROUTES")
                .unwrap_or_else(|| DEFAULT_GLOBAL_ROUTES.into())
                .into(),
            options: options("CITYROUTE_GLOBAL_COST_COLUMN"),
        }];
        if let Some(path) = non_empty("CITYROUTE_DOMESTIC_ROUTES") {
            sources.push(GraphSourceConfig {
                scope: GraphScope::Domestic,
                path: path.into(),
                options: options("CITYROUTE_DOMESTIC_COST_COLUMN"),
            });
        }

        Self { sources }
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use cityroute_service_shared::{AppState, StateConfig};
///
/// async fn handler(State(state): State<AppState>) {
///     let catalog = state.catalog();
///     // ... query a graph
/// }
///
/// let state = AppState::load(&StateConfig::from_env()).unwrap();
/// let app = Router::new()
///     .route("/cities", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: GraphCatalog,
}

impl AppState {
    /// Load every configured route table.
    ///
    /// Loading is all-or-nothing: any table failing to load aborts startup.
    pub fn load(config: &StateConfig) -> Result<Self, AppStateError> {
        if config.sources.is_empty() {
            return Err(AppStateError::NoSources);
        }

        let mut catalog = GraphCatalog::new();
        for source in &config.sources {
            tracing::info!(
                scope = %source.scope,
                path = %source.path.display(),
                cost_column = %source.options.cost_column,
                "loading route table"
            );
            let graph = load_routes_file(&source.path, &source.options).map_err(|err| {
                AppStateError::GraphLoad {
                    scope: source.scope,
                    source: err,
                }
            })?;
            tracing::info!(
                scope = %source.scope,
                city_count = graph.vertex_count(),
                route_count = graph.edge_count(),
                "route table loaded successfully"
            );
            catalog.insert(source.scope, graph);
        }

        Ok(Self::from_catalog(catalog))
    }

    /// Create application state from an already assembled catalog.
    ///
    /// This is useful for testing or when graphs are built in code.
    pub fn from_catalog(catalog: GraphCatalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner { catalog }),
        }
    }

    /// Convenience constructor for a single global graph.
    pub fn from_global(graph: RouteGraph) -> Self {
        Self::from_catalog(GraphCatalog::new().with_graph(GraphScope::Global, graph))
    }

    /// Access the loaded graphs.
    pub fn catalog(&self) -> &GraphCatalog {
        &self.inner.catalog
    }

    /// Graph for `scope`, or `ScopeNotLoaded`.
    pub fn graph(&self, scope: GraphScope) -> Result<Arc<RouteGraph>, LibError> {
        self.inner.catalog.get(scope)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("scopes", &self.inner.catalog.scopes().collect::<Vec<_>>())
            .field("city_count", &self.inner.catalog.total_cities())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn minimal_graph() -> RouteGraph {
        let mut graph = RouteGraph::new();
        graph.add_vertex("TestCity", None);
        graph
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults_to_global_routes_csv() {
        let config = StateConfig::from_lookup(lookup(&[]));
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].scope, GraphScope::Global);
        assert_eq!(config.sources[0].path, PathBuf::from("routes.csv"));
        assert_eq!(config.sources[0].options, TableOptions::default());
    }

    #[test]
    fn test_config_reads_domestic_source() {
        let config = StateConfig::from_lookup(lookup(&[
            ("CITYROUTE_GLOBAL_ROUTES", "/data/global.csv"),
            ("CITYROUTE_DOMESTIC_ROUTES", "/data/india.csv"),
            ("CITYROUTE_DOMESTIC_COST_COLUMN", "cost_inr"),
            ("CITYROUTE_STRICT_COST", "true"),
        ]));

        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].path, PathBuf::from("/data/global.csv"));
        assert_eq!(config.sources[0].options.cost_column, "cost_usd");
        let domestic = &config.sources[1];
        assert_eq!(domestic.scope, GraphScope::Domestic);
        assert_eq!(domestic.options.cost_column, "cost_inr");
        assert!(domestic.options.strict_cost);
    }

    #[test]
    fn test_config_ignores_blank_values() {
        let config = StateConfig::from_lookup(lookup(&[
            ("CITYROUTE_GLOBAL_ROUTES", "  "),
            ("CITYROUTE_DOMESTIC_ROUTES", ""),
        ]));
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].path, PathBuf::from("routes.csv"));
    }

    #[test]
    fn test_app_state_from_global() {
        let state = AppState::from_global(minimal_graph());
        assert_eq!(state.graph(GraphScope::Global).unwrap().vertex_count(), 1);
        assert!(matches!(
            state.graph(GraphScope::Domestic),
            Err(LibError::ScopeNotLoaded { .. })
        ));
    }

    #[test]
    fn test_app_state_clone_shares_graphs() {
        let state1 = AppState::from_global(minimal_graph());
        let state2 = state1.clone();
        let g1 = state1.graph(GraphScope::Global).unwrap();
        let g2 = state2.graph(GraphScope::Global).unwrap();
        assert!(Arc::ptr_eq(&g1, &g2));
    }

    #[test]
    fn test_app_state_debug() {
        let state = AppState::from_global(minimal_graph());
        let debug = format!("{:?}", state);

        assert!(debug.contains("AppState"));
        assert!(debug.contains("scopes"));
        assert!(debug.contains("city_count"));
    }

    #[test]
    fn test_app_state_load_nonexistent() {
        let config = StateConfig {
            sources: vec![GraphSourceConfig {
                scope: GraphScope::Global,
                path: PathBuf::from("/nonexistent/path/routes.csv"),
                options: TableOptions::default(),
            }],
        };

        match AppState::load(&config).unwrap_err() {
            AppStateError::GraphLoad { scope, source } => {
                assert_eq!(scope, GraphScope::Global);
                assert!(matches!(source, LibError::RoutesFileNotFound { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_app_state_requires_sources() {
        let err = AppState::load(&StateConfig { sources: vec![] }).unwrap_err();
        assert_eq!(err.to_string(), "no route tables configured");
    }
}
