//! # CLI Module
//!
//! The `albrouter` command line, for checking how patterns register and how paths resolve
//! without deploying anything.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print the route table (roots, endpoints and wildcards, sorted):
//!
//! ```bash
//! albrouter routes -r /users/:user_id -r /users/:user_id/books/:book -r /static/*
//! ```
//!
//! ### `resolve`
//!
//! Resolve one path and print the node pattern, parameters and `is_last` as JSON:
//!
//! ```bash
//! albrouter resolve -r /users/:user_id /users/42
//! ```
//!
//! ### `invoke`
//!
//! Dispatch an ALB event through echo handlers registered on every pattern and print the
//! ALB response. The event comes from a file or from stdin with `-`:
//!
//! ```bash
//! albrouter invoke -r /users/:user_id --event event.json
//! cat event.json | albrouter invoke -r /users/:user_id --event -
//! ```
//!
//! Logging is configured through `ALBROUTER_LOG_*` (see [`crate::logging`]) and goes to stderr.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
