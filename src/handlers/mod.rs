//! # Handlers Module
//!
//! The units of work attached to trie nodes.
//!
//! Two independent capabilities exist:
//!
//! - [`Handler`] - a single `run` entry point. Used for middleware-like steps (auth checks,
//!   header stamping) and for the not-found / server-error / lifecycle slots.
//! - [`HttpHandler`] - REST-style verb entry points plus `before`/`after` hooks and an
//!   `error_caught` observer. Every method has a default, so implementors only override the
//!   verbs they serve.
//!
//! A node stores [`RouteHandler`] values, which record which capability a handler was
//! registered with. The dispatcher matches on that at request time.
//!
//! ## Verb dispatch
//!
//! | method  | `is_last` | entry point                                  |
//! |---------|-----------|----------------------------------------------|
//! | GET     | true      | `index`, then `get` if `index` is not implemented |
//! | GET     | false     | `get`                                        |
//! | POST    | true      | `create`, then `post` if `create` is not implemented |
//! | POST    | false     | `post`                                       |
//! | PUT, DELETE, OPTIONS, PATCH, TRACE, CONNECT | any | matching method |
//! | other   | any       | 405 method not allowed                       |
//!
//! ## Example
//!
//! ```rust
//! use albrouter::dispatcher::Context;
//! use albrouter::error::HandlerResult;
//! use albrouter::handlers::{HttpHandler, RouteHandler};
//! use albrouter::server::{Request, Response};
//!
//! struct Users;
//!
//! impl HttpHandler for Users {
//!     fn index(&self, _ctx: &mut Context<'_>, _req: &Request, resp: &mut Response) -> HandlerResult {
//!         resp.json_response(br#"[]"#.to_vec());
//!         Ok(())
//!     }
//!
//!     fn get(&self, ctx: &mut Context<'_>, _req: &Request, resp: &mut Response) -> HandlerResult {
//!         let id = ctx.path_param("user_id").unwrap_or_default().to_string();
//!         resp.json_response(serde_json::to_vec(&serde_json::json!({ "id": id })).unwrap_or_default());
//!         Ok(())
//!     }
//! }
//!
//! let handler = RouteHandler::http(Users);
//! assert!(handler.name().ends_with("Users"));
//! assert!(handler.is_http());
//! ```

mod defaults;

use std::fmt;
use std::sync::Arc;

use tracing::error;

use crate::cors::cors_helper;
use crate::dispatcher::Context;
use crate::error::{ErrorResponse, HandlerError, HandlerResult};
use crate::server::{Request, Response};

pub use defaults::{
    DefaultCorsHandler, DefaultHandler, DefaultNotFoundHandler, DefaultServerErrorHandler,
};

/// Plain handler: one entry point.
pub trait Handler: Send + Sync {
    fn run(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult;
}

/// Verb-aware handler.
///
/// Defaults: `index` and `create` report [`HandlerError::NotImplemented`] so GET/POST fall
/// back to `get`/`post`; `options` applies the CORS helper; every other entry point succeeds
/// without touching the response.
#[allow(unused_variables)]
pub trait HttpHandler: Send + Sync {
    fn before(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        Ok(())
    }

    /// GET addressed at the node itself (`is_last`).
    fn index(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        Err(HandlerError::NotImplemented)
    }

    fn get(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        Ok(())
    }

    /// POST addressed at the node itself (`is_last`).
    fn create(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        Err(HandlerError::NotImplemented)
    }

    fn post(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        Ok(())
    }

    fn put(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        Ok(())
    }

    fn delete(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        Ok(())
    }

    fn options(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        cors_helper(req, resp);
        Ok(())
    }

    fn patch(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        Ok(())
    }

    fn trace(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        Ok(())
    }

    fn connect(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        Ok(())
    }

    fn after(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        Ok(())
    }

    /// Observe a panic recovered while this handler was running.
    ///
    /// Called before the server-error response is written.
    fn error_caught(
        &self,
        ctx: &mut Context<'_>,
        req: &Request,
        resp: &mut Response,
        err: &ErrorResponse,
    ) {
        error!(
            request_id = %ctx.request_id(),
            handler = ctx.handler_name().unwrap_or_default(),
            error = %err,
            "Handler error caught"
        );
    }
}

/// Capability a handler was registered with.
#[derive(Clone)]
pub enum HandlerKind {
    Plain(Arc<dyn Handler>),
    Http(Arc<dyn HttpHandler>),
}

/// Handler entry stored on a trie node.
#[derive(Clone)]
pub struct RouteHandler {
    name: &'static str,
    kind: HandlerKind,
}

impl RouteHandler {
    /// Register a plain handler.
    pub fn plain<H>(handler: H) -> Self
    where
        H: Handler + 'static,
    {
        Self {
            name: std::any::type_name::<H>(),
            kind: HandlerKind::Plain(Arc::new(handler)),
        }
    }

    /// Register a verb-aware handler.
    pub fn http<H>(handler: H) -> Self
    where
        H: HttpHandler + 'static,
    {
        Self {
            name: std::any::type_name::<H>(),
            kind: HandlerKind::Http(Arc::new(handler)),
        }
    }

    /// Register an already shared plain handler.
    #[must_use]
    pub fn shared_plain(name: &'static str, handler: Arc<dyn Handler>) -> Self {
        Self {
            name,
            kind: HandlerKind::Plain(handler),
        }
    }

    /// Register an already shared verb-aware handler.
    #[must_use]
    pub fn shared_http(name: &'static str, handler: Arc<dyn HttpHandler>) -> Self {
        Self {
            name,
            kind: HandlerKind::Http(handler),
        }
    }

    /// Type name of the handler, used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn kind(&self) -> &HandlerKind {
        &self.kind
    }

    #[must_use]
    pub fn is_http(&self) -> bool {
        matches!(self.kind, HandlerKind::Http(_))
    }
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            HandlerKind::Plain(_) => "plain",
            HandlerKind::Http(_) => "http",
        };
        f.debug_struct("RouteHandler")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_handlers_keep_name_and_kind() {
        let plain: Arc<dyn Handler> = Arc::new(DefaultHandler);
        let a = RouteHandler::shared_plain("default", Arc::clone(&plain));
        let b = RouteHandler::shared_plain("default", Arc::clone(&plain));
        assert_eq!(a.name(), "default");
        assert!(!a.is_http());
        assert!(!b.is_http());
        assert_eq!(Arc::strong_count(&plain), 3);

        struct Noop;
        impl HttpHandler for Noop {}
        let http = RouteHandler::shared_http("noop", Arc::new(Noop));
        assert!(http.is_http());
        assert!(matches!(http.kind(), HandlerKind::Http(_)));
        assert_eq!(format!("{http:?}"), r#"RouteHandler { name: "noop", kind: "http" }"#);
    }
}
