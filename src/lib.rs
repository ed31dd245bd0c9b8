//! # albrouter
//!
//! **albrouter** routes load-balancer triggered requests (one request in, one response out)
//! to ordered handler chains, and runs those chains with well-defined error, panic and
//! short-circuit semantics.
//!
//! ## Architecture
//!
//! - **[`router`]** - Segment trie: registration (`/users/:id`, `/static/*`) and resolution
//!   of a request path to a node, captured parameters and an `is_last` flag
//! - **[`handlers`]** - Plain [`Handler`](handlers::Handler) and verb-aware
//!   [`HttpHandler`](handlers::HttpHandler) capabilities, plus default handlers
//! - **[`dispatcher`]** - Request lifecycle (Begin → Resolve → Dispatch → Finalize), chain
//!   execution, panic containment and error-to-response mapping
//! - **[`error`]** - Handler failure taxonomy
//! - **[`server`]** - ALB target-group event types and the request/response surfaces
//! - **[`cors`]** - CORS echo helper
//! - **[`logging`]**, **[`runtime_config`]** - Environment-driven setup
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant ALB
//!     participant Dispatcher
//!     participant Route
//!     participant Chain as Handler chain
//!
//!     ALB->>Dispatcher: serve(AlbTargetGroupRequest)
//!     Dispatcher->>Dispatcher: Begin hook
//!     Dispatcher->>Route: route_node(path)
//!     alt no match
//!         Dispatcher->>Dispatcher: NotFound handler
//!     else match
//!         Route-->>Dispatcher: node, params, is_last
//!         loop each handler until stop
//!             Dispatcher->>Chain: run / before + verb + after
//!         end
//!     end
//!     Dispatcher->>Dispatcher: Finish hook
//!     Dispatcher-->>ALB: AlbTargetGroupResponse (+ request-level error)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use albrouter::dispatcher::{Context, Dispatcher};
//! use albrouter::error::{ErrorResponse, HandlerResult};
//! use albrouter::handlers::{HttpHandler, RouteHandler};
//! use albrouter::server::{AlbTargetGroupRequest, Request, Response};
//!
//! struct Books;
//!
//! impl HttpHandler for Books {
//!     fn index(&self, _ctx: &mut Context<'_>, _req: &Request, resp: &mut Response) -> HandlerResult {
//!         resp.json_response(br#"["dune"]"#.to_vec());
//!         Ok(())
//!     }
//!
//!     fn get(&self, ctx: &mut Context<'_>, _req: &Request, resp: &mut Response) -> HandlerResult {
//!         match ctx.path_param("book") {
//!             Some("dune") => {
//!                 resp.json_response(br#"{"title":"dune"}"#.to_vec());
//!                 Ok(())
//!             }
//!             _ => Err(ErrorResponse::not_found().into()),
//!         }
//!     }
//! }
//!
//! let dispatcher = Dispatcher::builder()
//!     .endpoint("/books/:book", vec![RouteHandler::http(Books)])
//!     .build();
//!
//! let outcome = dispatcher
//!     .serve(AlbTargetGroupRequest {
//!         http_method: "GET".into(),
//!         path: "/books/solaris".into(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//! assert_eq!(outcome.response.status_code, 404);
//! ```
//!
//! ## Logging
//!
//! All components log through `tracing`. Binaries install a subscriber with
//! [`logging::init_logging`]; every dispatched request runs inside a `request` span carrying
//! the request id, method, path and load balancer trace id.

pub mod cli;
pub mod cors;
pub mod dispatcher;
pub mod echo;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod logging;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use dispatcher::{Context, Dispatcher, DispatcherBuilder, Outcome};
pub use error::{ErrorResponse, HandlerError, HandlerResult, LifecycleError};
pub use handlers::{Handler, HttpHandler, RouteHandler};
pub use router::{Node, NodeType, Route};
pub use server::{AlbTargetGroupRequest, AlbTargetGroupResponse, Request, Response};
