//! # Dispatcher Module
//!
//! Ties route resolution to handler-chain execution.
//!
//! ## Overview
//!
//! A [`Dispatcher`] owns the [`Route`](crate::router::Route) table, the not-found and
//! server-error fallbacks, the optional Begin/Finish lifecycle hooks and the injected
//! process-wide values. It is assembled once with a [`DispatcherBuilder`] and then only
//! read, so one instance serves any number of requests (including concurrently).
//!
//! ## Chain semantics
//!
//! - Plain handlers run `run`; verb-aware handlers run `before`, the verb entry point, then
//!   `after`.
//! - A handler that sets a status code claims the response and ends the chain.
//! - [`ErrorResponse`](crate::error::ErrorResponse) failures are written into the response.
//! - Opaque failures are rendered by the server-error handler while the response is still
//!   unclaimed. Once it is claimed they are returned as [`Outcome::error`] instead.
//! - A panic in a verb-aware handler is caught, reported to its `error_caught`, and
//!   written as a `500 server_error_panic` response.
//!
//! ## Example
//!
//! ```rust
//! use albrouter::dispatcher::{Context, Dispatcher};
//! use albrouter::error::HandlerResult;
//! use albrouter::handlers::{Handler, RouteHandler};
//! use albrouter::server::{Request, Response};
//!
//! struct Hello;
//!
//! impl Handler for Hello {
//!     fn run(&self, ctx: &mut Context<'_>, _req: &Request, resp: &mut Response) -> HandlerResult {
//!         let name = ctx.path_param("name").unwrap_or("world").to_string();
//!         resp.set_body(format!("hello {name}"));
//!         Ok(())
//!     }
//! }
//!
//! let dispatcher = Dispatcher::builder()
//!     .endpoint("/hello/:name", vec![RouteHandler::plain(Hello)])
//!     .build();
//!
//! let outcome = dispatcher.dispatch(&Request::new("GET", "/hello/ferris")).unwrap();
//! assert_eq!(outcome.response.body(), b"hello ferris");
//! assert!(outcome.error.is_none());
//! ```

mod context;
mod core;

pub use context::{Context, Injected};
pub use core::{Dispatcher, DispatcherBuilder, Outcome, REQUEST_ID_HEADER};
