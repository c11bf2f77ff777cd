//! Route command handler for computing paths between cities.

use anyhow::{Context, Result};

use cityroute_lib::{
    plan_route, Error as RouteError, RouteAlgorithm, RouteObjective, RouteRequest, RouteSummary,
};
use cityroute_cli::output::OutputFormat;

use super::TableArgs;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Starting city name.
    pub from: String,
    /// Destination city name.
    pub to: String,
    /// Weight dimension to minimize.
    pub objective: RouteObjective,
    /// Planner used for the search.
    pub algorithm: RouteAlgorithm,
}

impl RouteCommandArgs {
    /// Convert CLI args to a library RouteRequest.
    pub fn to_request(&self) -> RouteRequest {
        RouteRequest::new(self.from.as_str(), self.to.as_str(), self.objective)
            .with_algorithm(self.algorithm)
    }
}

/// Handle the route subcommand.
pub fn handle_route_command(
    table: &TableArgs,
    format: OutputFormat,
    args: &RouteCommandArgs,
) -> Result<()> {
    let graph = table.load_graph()?;
    let request = args.to_request();

    let plan = plan_route(&graph, &request).map_err(handle_route_failure)?;
    let summary = RouteSummary::from_plan(&graph, &plan)
        .context("failed to build route summary for display")?;

    print!("{}", format.render_route(&summary)?);
    Ok(())
}

fn handle_route_failure(err: RouteError) -> anyhow::Error {
    match err {
        RouteError::UnknownCity { name, suggestions } => {
            anyhow::anyhow!(format_unknown_city_message(&name, &suggestions))
        }
        RouteError::RouteNotFound { start, goal } => {
            anyhow::anyhow!(
                "No route found between {start} and {goal}. The cities are not connected in this route table."
            )
        }
        other => anyhow::Error::new(other),
    }
}

fn format_unknown_city_message(name: &str, suggestions: &[String]) -> String {
    let mut message = format!("Unknown city '{}'.", name);
    match suggestions {
        [] => {}
        [only] => message.push_str(&format!(" Did you mean '{only}'?")),
        many => {
            let joined = many
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ");
            message.push_str(&format!(" Did you mean one of: {}?", joined));
        }
    }
    message
}
