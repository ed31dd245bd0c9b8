//! Dispatcher core module - request lifecycle and handler-chain execution.
//!
//! Every request goes `Begin → Resolve → Dispatch → Finalize`, strictly in that order:
//!
//! 1. **Begin** builds the [`Context`] and runs the Begin hook. A hook failure aborts the
//!    request with [`LifecycleError::Begin`].
//! 2. **Resolve** matches the path. A miss runs the not-found handler and skips to Finalize.
//! 3. **Dispatch** runs the node's handlers in order. The chain stops on the first failure
//!    that ends it, or as soon as a handler sets a status code.
//! 4. **Finalize** runs the Finish hook and hands the response back with any request-level
//!    error that was not absorbed into the response.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, info_span, warn};

use super::context::{Context, Injected};
use crate::error::{Caught, ErrorResponse, HandlerError, HandlerResult, LifecycleError};
use crate::handlers::{
    DefaultNotFoundHandler, DefaultServerErrorHandler, Handler, HandlerKind, HttpHandler,
    RouteHandler,
};
use crate::ids::RequestId;
pub use crate::ids::REQUEST_ID_HEADER;
use crate::router::Route;
use crate::runtime_config::RuntimeConfig;
use crate::server::{AlbTargetGroupRequest, AlbTargetGroupResponse, Request, Response};

/// Finished request: the response plus any error that was not absorbed into it.
#[derive(Debug)]
pub struct Outcome<R> {
    pub response: R,
    /// Request-level error; `None` when every failure was rendered into the response
    pub error: Option<HandlerError>,
}

impl<R> Outcome<R> {
    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> Outcome<T> {
        Outcome {
            response: f(self.response),
            error: self.error,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// What the chain does after one handler step.
#[derive(Debug)]
enum Step {
    Continue,
    /// Entry point reported NotImplemented; only `index`/`create` act on it
    NotImplemented,
    /// End the chain, optionally surfacing an error
    Stop(Option<HandlerError>),
}

/// Verbs with a dedicated entry point. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Options,
    Patch,
    Trace,
    Connect,
}

impl Verb {
    fn parse(method: &str) -> Option<Self> {
        let verb = match method {
            "GET" => Verb::Get,
            "POST" => Verb::Post,
            "PUT" => Verb::Put,
            "DELETE" => Verb::Delete,
            "OPTIONS" => Verb::Options,
            "PATCH" => Verb::Patch,
            "TRACE" => Verb::Trace,
            "CONNECT" => Verb::Connect,
            _ => return None,
        };
        Some(verb)
    }
}

/// Routes requests through the trie and runs handler chains.
///
/// Built once with [`DispatcherBuilder`]; afterwards it is read-only and can be shared
/// between threads.
pub struct Dispatcher {
    route: Route,
    not_found: Arc<dyn Handler>,
    server_error: Arc<dyn Handler>,
    begin: Option<Arc<dyn Handler>>,
    finish: Option<Arc<dyn Handler>>,
    injected: Injected,
    config: RuntimeConfig,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("nodes", &self.route.len())
            .field("begin", &self.begin.is_some())
            .field("finish", &self.finish.is_some())
            .field("injected", &self.injected)
            .field("config", &self.config)
            .finish()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    #[must_use]
    pub fn injected(&self) -> &Injected {
        &self.injected
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Serve a load balancer event end to end.
    pub fn serve(
        &self,
        event: AlbTargetGroupRequest,
    ) -> Result<Outcome<AlbTargetGroupResponse>, LifecycleError> {
        let req = Request::from_event(event);
        Ok(self.dispatch(&req)?.map(Response::build))
    }

    /// Run the request lifecycle for an already built request.
    pub fn dispatch(&self, req: &Request) -> Result<Outcome<Response>, LifecycleError> {
        let request_id = RequestId::for_request(req);
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %req.method(),
            path = %req.path(),
            trace_id = req.trace_id().unwrap_or_default(),
        );
        let _enter = span.enter();

        let mut ctx = Context::new(request_id, self);
        let mut resp = Response::new();

        if let Some(begin) = &self.begin {
            begin
                .run(&mut ctx, req, &mut resp)
                .map_err(LifecycleError::Begin)?;
        }

        let error = match self.route.route_node(req.path()) {
            Some(found) => {
                let (node, params, is_last) = found.into_parts();
                debug!(
                    node = %self.route.path_of(node.id()),
                    params = %params,
                    is_last,
                    "Route matched"
                );
                ctx.set_route(node, params, is_last);
                self.run_chain(&mut ctx, req, &mut resp, node.handlers())
            }
            None => {
                debug!("No route matched");
                self.not_found.run(&mut ctx, req, &mut resp).err()
            }
        };

        if let Some(finish) = &self.finish {
            finish
                .run(&mut ctx, req, &mut resp)
                .map_err(LifecycleError::Finish)?;
        }

        debug!(
            status = resp.status_code(),
            surfaced = error.is_some(),
            "Request finished"
        );
        Ok(Outcome {
            response: resp,
            error,
        })
    }

    fn run_chain<'a>(
        &'a self,
        ctx: &mut Context<'a>,
        req: &Request,
        resp: &mut Response,
        handlers: &'a [RouteHandler],
    ) -> Option<HandlerError> {
        for handler in handlers {
            ctx.set_handler(handler);
            let step = match handler.kind() {
                HandlerKind::Plain(h) => {
                    let result = h.run(ctx, req, resp);
                    self.classify(result, ctx, req, resp)
                }
                HandlerKind::Http(h) => self.run_http_guarded(h.as_ref(), ctx, req, resp),
            };

            if let Step::Stop(err) = step {
                return err;
            }
            if resp.status_code() != 0 {
                debug!(
                    handler = handler.name(),
                    status = resp.status_code(),
                    "Response claimed; chain stopped"
                );
                return None;
            }
        }
        None
    }

    /// Panic boundary around one verb-aware handler.
    fn run_http_guarded<'a>(
        &'a self,
        handler: &dyn HttpHandler,
        ctx: &mut Context<'a>,
        req: &Request,
        resp: &mut Response,
    ) -> Step {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_http(handler, &mut *ctx, req, &mut *resp)
        }));

        match result {
            Ok(step) => step,
            Err(payload) => {
                let er = self.panic_response(ctx, payload.as_ref());
                handler.error_caught(ctx, req, resp, &er);
                write_error_response(resp, &er);
                let err = HandlerError::Response(er);
                ctx.set_last_error(err.clone());
                Step::Stop(Some(err))
            }
        }
    }

    fn panic_response(&self, ctx: &Context<'_>, payload: &(dyn Any + Send)) -> ErrorResponse {
        let caught = Caught::from_payload(payload, self.config.capture_backtrace);
        error!(
            handler = ctx.handler_name().unwrap_or_default(),
            panic_message = %caught.message,
            backtrace = caught.backtrace.as_deref().unwrap_or_default(),
            "Handler panicked"
        );
        ErrorResponse::server_error_panic().with_caught(caught)
    }

    fn run_http<'a>(
        &'a self,
        handler: &dyn HttpHandler,
        ctx: &mut Context<'a>,
        req: &Request,
        resp: &mut Response,
    ) -> Step {
        let result = handler.before(ctx, req, resp);
        if let Step::Stop(err) = self.classify(result, ctx, req, resp) {
            return Step::Stop(err);
        }
        if resp.status_code() != 0 {
            return Step::Stop(None);
        }

        let step = match Verb::parse(req.method()) {
            Some(Verb::Get) if ctx.is_last() => {
                let result = handler.index(ctx, req, resp);
                match self.classify(result, ctx, req, resp) {
                    Step::NotImplemented => {
                        let result = handler.get(ctx, req, resp);
                        self.classify(result, ctx, req, resp)
                    }
                    step => step,
                }
            }
            Some(Verb::Post) if ctx.is_last() => {
                let result = handler.create(ctx, req, resp);
                match self.classify(result, ctx, req, resp) {
                    Step::NotImplemented => {
                        let result = handler.post(ctx, req, resp);
                        self.classify(result, ctx, req, resp)
                    }
                    step => step,
                }
            }
            Some(verb) => {
                let result = match verb {
                    Verb::Get => handler.get(ctx, req, resp),
                    Verb::Post => handler.post(ctx, req, resp),
                    Verb::Put => handler.put(ctx, req, resp),
                    Verb::Delete => handler.delete(ctx, req, resp),
                    Verb::Options => handler.options(ctx, req, resp),
                    Verb::Patch => handler.patch(ctx, req, resp),
                    Verb::Trace => handler.trace(ctx, req, resp),
                    Verb::Connect => handler.connect(ctx, req, resp),
                };
                self.classify(result, ctx, req, resp)
            }
            None => {
                debug!(method = %req.method(), "Method not allowed");
                self.classify(
                    Err(ErrorResponse::method_not_allowed().into()),
                    ctx,
                    req,
                    resp,
                )
            }
        };
        if let Step::Stop(err) = step {
            return Step::Stop(err);
        }

        let result = handler.after(ctx, req, resp);
        self.classify(result, ctx, req, resp)
    }

    /// Map one entry point's result onto the chain.
    fn classify(
        &self,
        result: HandlerResult,
        ctx: &mut Context<'_>,
        req: &Request,
        resp: &mut Response,
    ) -> Step {
        match result {
            Ok(()) => Step::Continue,
            Err(HandlerError::NotImplemented) => Step::NotImplemented,
            Err(HandlerError::Response(er)) => {
                debug!(
                    handler = ctx.handler_name().unwrap_or_default(),
                    status = er.status_code(),
                    error = er.error(),
                    "Handler returned error response"
                );
                write_error_response(resp, &er);
                ctx.set_last_error(HandlerError::Response(er));
                Step::Stop(None)
            }
            Err(err @ HandlerError::Opaque(_)) => {
                ctx.set_last_error(err.clone());
                if resp.status_code() != 0 {
                    warn!(
                        handler = ctx.handler_name().unwrap_or_default(),
                        status = resp.status_code(),
                        error = %err,
                        "Handler failed after claiming the response"
                    );
                    return Step::Stop(Some(err));
                }

                warn!(
                    handler = ctx.handler_name().unwrap_or_default(),
                    error = %err,
                    "Handler failed; rendering server error"
                );
                Step::Stop(self.server_error.run(ctx, req, resp).err())
            }
        }
    }
}

fn write_error_response(resp: &mut Response, er: &ErrorResponse) {
    resp.set_status_code(er.status_code())
        .json_response(er.to_body());
}

/// Collects routes, fallbacks, hooks and injected values for a [`Dispatcher`].
pub struct DispatcherBuilder {
    route: Route,
    not_found: Arc<dyn Handler>,
    server_error: Arc<dyn Handler>,
    begin: Option<Arc<dyn Handler>>,
    finish: Option<Arc<dyn Handler>>,
    injected: Injected,
    config: RuntimeConfig,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherBuilder {
    /// Empty route table with the default not-found and server-error handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            route: Route::new(),
            not_found: Arc::new(DefaultNotFoundHandler),
            server_error: Arc::new(DefaultServerErrorHandler),
            begin: None,
            finish: None,
            injected: Injected::default(),
            config: RuntimeConfig::default(),
        }
    }

    /// Register `handlers` at `pattern`.
    #[must_use]
    pub fn endpoint(mut self, pattern: &str, handlers: Vec<RouteHandler>) -> Self {
        self.route.set_endpoint(pattern, handlers);
        self
    }

    #[must_use]
    pub fn root_handlers(mut self, handlers: Vec<RouteHandler>) -> Self {
        self.route.set_root_handlers(handlers);
        self
    }

    /// Direct access to the route table being built.
    pub fn route_mut(&mut self) -> &mut Route {
        &mut self.route
    }

    #[must_use]
    pub fn not_found_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.not_found = Arc::new(handler);
        self
    }

    #[must_use]
    pub fn server_error_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.server_error = Arc::new(handler);
        self
    }

    /// Hook run before routing. Its failure aborts the request.
    #[must_use]
    pub fn begin_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.begin = Some(Arc::new(handler));
        self
    }

    /// Hook run after the chain. Its failure aborts the request.
    #[must_use]
    pub fn finish_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.finish = Some(Arc::new(handler));
        self
    }

    /// Make `value` visible to every request under `key`. Later values replace earlier ones.
    #[must_use]
    pub fn inject<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.injected.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn build(self) -> Dispatcher {
        debug!(
            nodes = self.route.len(),
            injected = self.injected.len(),
            "Dispatcher built"
        );
        Dispatcher {
            route: self.route,
            not_found: self.not_found,
            server_error: self.server_error,
            begin: self.begin,
            finish: self.finish,
            injected: self.injected,
            config: self.config,
        }
    }
}
