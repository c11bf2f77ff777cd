//! cityroute CLI library.
//!
//! Output formatting shared by the `cityroute` subcommands.

pub mod output;
