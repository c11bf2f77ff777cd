// Module exports for CLI subcommands.
//
// Each module handles one subcommand; main.rs parses arguments and dispatches.

pub mod cities;
pub mod route;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cityroute_lib::{load_routes_file, resolve_routes_path, RouteGraph, TableOptions};

/// Route table selection shared by every subcommand.
#[derive(Debug, Clone)]
pub struct TableArgs {
    pub routes: Option<PathBuf>,
    pub options: TableOptions,
}

impl TableArgs {
    /// Resolve the route table location and load it.
    pub fn load_graph(&self) -> Result<RouteGraph> {
        let path = resolve_routes_path(self.routes.as_deref())
            .context("failed to resolve the route table location")?;
        load_routes_file(&path, &self.options)
            .with_context(|| format!("failed to load route table from {}", path.display()))
    }
}
