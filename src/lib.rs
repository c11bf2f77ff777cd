//! Workspace root package.
//!
//! Carries no code of its own; it exists so `rusty-hook` can install the
//! pre-commit hooks configured in the root `Cargo.toml`.
