mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cityroute_cli::output::OutputFormat;
use cityroute_lib::{RouteAlgorithm, RouteObjective, TableOptions, DEFAULT_COST_COLUMN};

use commands::cities::handle_cities_command;
use commands::route::{handle_route_command, RouteCommandArgs};
use commands::TableArgs;

#[derive(Parser, Debug)]
#[command(author, version, about = "City route planning utilities")]
struct Cli {
    /// Route table file or directory containing routes.csv (else $CITYROUTE_ROUTES).
    #[arg(long, global = true)]
    routes: Option<PathBuf>,

    /// Column holding the monetary cost of each route.
    #[arg(long, global = true, default_value = DEFAULT_COST_COLUMN)]
    cost_column: String,

    /// Fail instead of treating a missing cost as 0.
    #[arg(long, global = true)]
    strict_cost: bool,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a route between two city names.
    Route {
        /// Starting city name.
        #[arg(long = "from")]
        from: String,
        /// Destination city name.
        #[arg(long = "to")]
        to: String,
        /// shortest, fastest, or cheapest; anything else means shortest.
        #[arg(long, default_value = "shortest")]
        objective: String,
        /// Planner used for the search.
        #[arg(long, value_enum, default_value_t = AlgorithmArg::Dense)]
        algorithm: AlgorithmArg,
    },
    /// List every city in the route table.
    Cities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlgorithmArg {
    Dense,
    Heap,
}

impl From<AlgorithmArg> for RouteAlgorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::Dense => RouteAlgorithm::Dense,
            AlgorithmArg::Heap => RouteAlgorithm::Heap,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let table = TableArgs {
        routes: cli.routes,
        options: TableOptions::default()
            .with_cost_column(cli.cost_column)
            .strict(cli.strict_cost),
    };

    match cli.command {
        Command::Route {
            from,
            to,
            objective,
            algorithm,
        } => {
            let args = RouteCommandArgs {
                from,
                to,
                objective: RouteObjective::from(objective),
                algorithm: algorithm.into(),
            };
            handle_route_command(&table, cli.format, &args)
        }
        Command::Cities => handle_cities_command(&table, cli.format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
