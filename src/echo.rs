use std::collections::BTreeMap;

use serde_json::json;

use crate::dispatcher::Context;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::Handler;
use crate::server::{Request, Response};

/// Echoes what the dispatcher saw back as a JSON body.
///
/// Used by the `invoke` command to show how a request was routed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

impl Handler for EchoHandler {
    fn run(&self, ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        let route = ctx.dispatcher().route();
        let pattern = ctx.node().map(|node| route.path_of(node.id()));
        let query: BTreeMap<&str, Vec<&str>> = req
            .event()
            .multi_value_query_string_parameters
            .keys()
            .chain(req.event().query_string_parameters.keys())
            .map(|name| (name.as_str(), req.query_values(name)))
            .collect();

        let body = json!({
            "request_id": ctx.request_id(),
            "method": req.method(),
            "path": req.path(),
            "pattern": pattern,
            "params": ctx.params(),
            "is_last": ctx.is_last(),
            "query": query,
        });
        let body = serde_json::to_vec(&body).map_err(HandlerError::opaque)?;
        resp.set_status_code(200).json_response(body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::handlers::RouteHandler;

    #[test]
    fn test_echo_reports_route() {
        let dispatcher = Dispatcher::builder()
            .endpoint("/pets/:pet_id", vec![RouteHandler::plain(EchoHandler)])
            .build();
        let req = Request::new("GET", "/pets/7").with_query("verbose", "1");
        let outcome = dispatcher.dispatch(&req).unwrap();

        let v: serde_json::Value = serde_json::from_slice(outcome.response.body()).unwrap();
        assert_eq!(v["pattern"], "/pets/:pet_id");
        assert_eq!(v["params"]["pet_id"], "7");
        assert_eq!(v["is_last"], false);
        assert_eq!(v["query"]["verbose"][0], "1");
    }
}
