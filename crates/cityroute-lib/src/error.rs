use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the cityroute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a city name is not a vertex of the selected graph.
    #[error("unknown city name: {name}{}", format_suggestions(.suggestions))]
    UnknownCity {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when no path connects the two cities.
    #[error("no route found between {start} and {goal}")]
    RouteNotFound { start: String, goal: String },

    /// Raised when a route plan without any steps is summarised.
    #[error("route plan was empty")]
    EmptyRoutePlan,

    /// Raised when a route table row holds an unparsable or out-of-range field.
    #[error("malformed route table row {row}: field {field} has value '{value}' ({reason})")]
    MalformedRow {
        row: u64,
        field: String,
        value: String,
        reason: String,
    },

    /// Raised when the route table header lacks required columns.
    #[error("route table missing required columns: {}. Available: {}", .missing.join(", "), .available.join(", "))]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    /// Raised when the CSV reader itself fails (bad quoting, truncated record).
    #[error("invalid route table: {0}")]
    InvalidTable(String),

    /// Raised when an edge would connect a city to itself.
    #[error("route from {name} to itself is not allowed")]
    SelfLoop { name: String },

    /// Raised when a graph selector does not name a known scope.
    #[error("unknown graph scope: {scope}")]
    UnknownScope { scope: String },

    /// Raised when a known scope has no graph loaded for it.
    #[error("graph scope {scope} is not loaded")]
    ScopeNotLoaded { scope: String },

    /// Route table could not be located at the resolved path.
    #[error("route table not found at {path}")]
    RoutesFileNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the route table")]
    ProjectDirsUnavailable,

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
