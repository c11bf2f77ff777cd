//! Cities command handler listing every city in the route table.

use anyhow::Result;

use cityroute_cli::output::OutputFormat;

use super::TableArgs;

/// Handle the cities subcommand.
pub fn handle_cities_command(table: &TableArgs, format: OutputFormat) -> Result<()> {
    let graph = table.load_graph()?;
    print!("{}", format.render_cities(graph.cities())?);
    Ok(())
}
