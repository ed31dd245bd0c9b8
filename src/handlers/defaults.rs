use super::Handler;
use crate::cors::cors_helper;
use crate::dispatcher::Context;
use crate::error::{ErrorResponse, HandlerResult};
use crate::server::{Request, Response};

/// Applies CORS headers and marks the body as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHandler;

impl Handler for DefaultHandler {
    fn run(&self, _ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        cors_helper(req, resp);
        resp.set_content_type("text/plain");
        Ok(())
    }
}

/// Fallback for unmatched paths: CORS headers plus a 404 JSON body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNotFoundHandler;

impl Handler for DefaultNotFoundHandler {
    fn run(&self, _ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        let er = ErrorResponse::not_found();
        cors_helper(req, resp);
        resp.set_status_code(er.status_code())
            .json_response(er.to_body());
        Ok(())
    }
}

/// Fallback for opaque handler errors: CORS headers plus a 500 JSON body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultServerErrorHandler;

impl Handler for DefaultServerErrorHandler {
    fn run(&self, _ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        let er = ErrorResponse::server_error();
        cors_helper(req, resp);
        resp.set_status_code(er.status_code())
            .json_response(er.to_body());
        Ok(())
    }
}

/// Only applies CORS headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCorsHandler;

impl Handler for DefaultCorsHandler {
    fn run(&self, _ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        cors_helper(req, resp);
        Ok(())
    }
}
