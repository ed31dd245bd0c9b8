use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};

use crate::dispatcher::Dispatcher;
use crate::echo::EchoHandler;
use crate::handlers::{Handler, RouteHandler};
use crate::router::Route;
use crate::runtime_config::RuntimeConfig;
use crate::server::AlbTargetGroupRequest;

/// Command-line interface for albrouter
///
/// Every command builds its route table from repeated `--route` patterns.
#[derive(Debug, Parser)]
#[command(name = "albrouter")]
#[command(about = "Inspect and exercise albrouter route tables", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the route table built from the given patterns
    Routes {
        /// Path pattern to register (repeatable), e.g. `/users/:id` or `/static/*`
        #[arg(short, long = "route", required = true)]
        routes: Vec<String>,
    },
    /// Resolve a request path and print the match as JSON
    Resolve {
        /// Path pattern to register (repeatable)
        #[arg(short, long = "route", required = true)]
        routes: Vec<String>,

        /// Request path to resolve
        path: String,
    },
    /// Dispatch an ALB target-group event through echo handlers and print the response
    Invoke {
        /// Path pattern to register (repeatable)
        #[arg(short, long = "route", required = true)]
        routes: Vec<String>,

        /// Event JSON file, or `-` for stdin
        #[arg(short, long)]
        event: PathBuf,
    },
}

fn build_route(patterns: &[String]) -> Route {
    let mut route = Route::new();
    for pattern in patterns {
        route.set_endpoint(pattern, Vec::new());
    }
    route
}

fn echo_dispatcher(patterns: &[String]) -> Dispatcher {
    // One echo instance serves every pattern.
    let echo: Arc<dyn Handler> = Arc::new(EchoHandler);
    let name = std::any::type_name::<EchoHandler>();
    patterns
        .iter()
        .fold(Dispatcher::builder(), |builder, pattern| {
            builder.endpoint(
                pattern,
                vec![RouteHandler::shared_plain(name, Arc::clone(&echo))],
            )
        })
        .config(RuntimeConfig::from_env())
        .build()
}

fn read_event(source: &Path) -> Result<AlbTargetGroupRequest> {
    let raw = if source == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read event from stdin")?;
        buf
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("Failed to read event file {}", source.display()))?
    };
    serde_json::from_str(&raw).context("Event is not a valid ALB target-group request")
}

/// Execute `cli`, writing command output to `out`.
pub fn run_cli<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    match cli.command {
        Commands::Routes { routes } => {
            let route = build_route(&routes);
            writeln!(out, "{route}")?;
        }
        Commands::Resolve { routes, path } => {
            let route = build_route(&routes);
            let report = match route.route_node(&path) {
                Some(found) => json!({
                    "path": path,
                    "matched": true,
                    "pattern": route.path_of(found.node.id()),
                    "node_type": found.node.node_type(),
                    "params": found.params,
                    "is_last": found.is_last,
                }),
                None => json!({
                    "path": path,
                    "matched": false,
                }),
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        Commands::Invoke { routes, event } => {
            let event = read_event(&event)?;
            let dispatcher = echo_dispatcher(&routes);
            info!(
                method = %event.http_method,
                path = %event.path,
                routes = routes.len(),
                "Invoking dispatcher"
            );
            let outcome = dispatcher
                .serve(event)
                .context("Request lifecycle failed")?;
            if let Some(err) = &outcome.error {
                warn!(error = %err, "Request finished with an unrecovered error");
            }
            serde_json::to_writer_pretty(&mut *out, &outcome.response)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
