use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::RouteGraph;

/// Which route network a query runs against.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GraphScope {
    /// International routes between major cities.
    #[default]
    Global,
    /// Routes within a single country.
    Domestic,
}

impl GraphScope {
    pub const ALL: [GraphScope; 2] = [GraphScope::Global, GraphScope::Domestic];

    pub fn as_str(self) -> &'static str {
        match self {
            GraphScope::Global => "global",
            GraphScope::Domestic => "domestic",
        }
    }
}

impl fmt::Display for GraphScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphScope {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(GraphScope::Global),
            "domestic" => Ok(GraphScope::Domestic),
            _ => Err(Error::UnknownScope {
                scope: value.to_string(),
            }),
        }
    }
}

/// Independently loaded graphs keyed by scope.
///
/// Graphs share no state with one another and are handed out as
/// `Arc<RouteGraph>` so request handlers can query them concurrently.
#[derive(Debug, Clone, Default)]
pub struct GraphCatalog {
    graphs: BTreeMap<GraphScope, Arc<RouteGraph>>,
}

impl GraphCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert used when assembling a catalog at startup.
    pub fn with_graph(mut self, scope: GraphScope, graph: RouteGraph) -> Self {
        self.insert(scope, graph);
        self
    }

    /// Register `graph` under `scope`, replacing any previous graph.
    pub fn insert(&mut self, scope: GraphScope, graph: RouteGraph) {
        self.graphs.insert(scope, Arc::new(graph));
    }

    /// Graph for `scope`, or [`Error::ScopeNotLoaded`].
    pub fn get(&self, scope: GraphScope) -> Result<Arc<RouteGraph>> {
        self.graphs
            .get(&scope)
            .cloned()
            .ok_or_else(|| Error::ScopeNotLoaded {
                scope: scope.to_string(),
            })
    }

    pub fn contains(&self, scope: GraphScope) -> bool {
        self.graphs.contains_key(&scope)
    }

    /// Loaded scopes in declaration order.
    pub fn scopes(&self) -> impl Iterator<Item = GraphScope> + '_ {
        self.graphs.keys().copied()
    }

    /// Total vertices across every loaded graph.
    pub fn total_cities(&self) -> usize {
        self.graphs.values().map(|graph| graph.vertex_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
