//! # Router Module
//!
//! Path registration and resolution for albrouter.
//!
//! ## Overview
//!
//! The router is a segment trie:
//!
//! - [`Route::set_endpoint`] registers an ordered handler list at a path pattern
//!   (`/users/:id`, `/static/*`, `/health`)
//! - [`Route::route_node`] resolves a request path to the registered [`Node`], the captured
//!   [`PathParams`] and an `is_last` flag
//!
//! Registration happens once at startup; the finished `Route` is then only read, so a single
//! instance can serve any number of concurrent lookups.
//!
//! ## Example
//!
//! ```rust
//! use albrouter::router::{NodeType, Route};
//!
//! let mut route = Route::new();
//! route
//!     .set_endpoint("/users/:id", vec![])
//!     .set_endpoint("/static/*", vec![]);
//!
//! let m = route.route_node("/users/42").expect("match");
//! assert_eq!(m.params.get("id"), Some("42"));
//! assert!(!m.is_last);
//!
//! let m = route.route_node("/static/css/site.css").expect("match");
//! assert_eq!(m.node.node_type(), NodeType::Recursive);
//! assert_eq!(m.params.get("static"), Some("css/site.css"));
//! ```

mod core;
mod node;

pub use core::{ParamVec, PathParams, RouteMatch, MAX_INLINE_PARAMS};
pub use node::{Node, NodeId, NodeType, Route};
