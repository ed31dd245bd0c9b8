use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::core::Dispatcher;
use crate::error::HandlerError;
use crate::handlers::RouteHandler;
use crate::ids::RequestId;
use crate::router::{Node, PathParams};

/// Process-wide values visible to every request.
///
/// Filled through [`DispatcherBuilder::inject`](super::DispatcherBuilder::inject) and frozen
/// when the dispatcher is built.
#[derive(Clone, Default)]
pub struct Injected {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Injected {
    pub(crate) fn insert<T>(&mut self, key: String, value: T)
    where
        T: Any + Send + Sync,
    {
        self.values.insert(key, Arc::new(value));
    }

    /// Typed lookup. `None` when the key is missing or holds another type.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| (**v).downcast_ref::<T>())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Injected").field("keys", &keys).finish()
    }
}

/// Per-request dispatch state handed to every handler.
///
/// Created fresh for each request. Handlers may rewrite path parameters to pass values down
/// the chain; everything else is maintained by the dispatcher.
pub struct Context<'a> {
    request_id: RequestId,
    dispatcher: &'a Dispatcher,
    node: Option<&'a Node>,
    is_last: bool,
    params: PathParams,
    handler: Option<&'a RouteHandler>,
    last_error: Option<HandlerError>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(request_id: RequestId, dispatcher: &'a Dispatcher) -> Self {
        Self {
            request_id,
            dispatcher,
            node: None,
            is_last: false,
            params: PathParams::new(),
            handler: None,
            last_error: None,
        }
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Dispatcher serving this request.
    #[must_use]
    pub fn dispatcher(&self) -> &'a Dispatcher {
        self.dispatcher
    }

    #[must_use]
    pub fn injected(&self) -> &'a Injected {
        self.dispatcher.injected()
    }

    /// Shorthand for `injected().get(key)`.
    #[must_use]
    pub fn value<T: Any>(&self, key: &str) -> Option<&'a T> {
        self.dispatcher.injected().get(key)
    }

    /// Matched node; `None` during the Begin hook and on routing misses.
    #[must_use]
    pub fn node(&self) -> Option<&'a Node> {
        self.node
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.is_last
    }

    #[must_use]
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut PathParams {
        &mut self.params
    }

    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Handler currently executing.
    #[must_use]
    pub fn handler(&self) -> Option<&'a RouteHandler> {
        self.handler
    }

    #[must_use]
    pub fn handler_name(&self) -> Option<&'static str> {
        self.handler.map(RouteHandler::name)
    }

    /// Most recent failure reported by a handler in this request.
    #[must_use]
    pub fn last_error(&self) -> Option<&HandlerError> {
        self.last_error.as_ref()
    }

    pub(crate) fn set_route(&mut self, node: &'a Node, params: PathParams, is_last: bool) {
        self.node = Some(node);
        self.params = params;
        self.is_last = is_last;
    }

    pub(crate) fn set_handler(&mut self, handler: &'a RouteHandler) {
        self.handler = Some(handler);
    }

    pub(crate) fn set_last_error(&mut self, err: HandlerError) {
        self.last_error = Some(err);
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("node", &self.node.map(Node::name))
            .field("is_last", &self.is_last)
            .field("params", &self.params)
            .field("handler", &self.handler_name())
            .field("last_error", &self.last_error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_typed_lookup() {
        let mut injected = Injected::default();
        injected.insert("region".to_string(), "eu-west-1".to_string());
        injected.insert("max_items".to_string(), 25_u32);

        assert_eq!(
            injected.get::<String>("region").map(String::as_str),
            Some("eu-west-1")
        );
        assert_eq!(injected.get::<u32>("max_items"), Some(&25));
        assert!(injected.get::<u64>("max_items").is_none());
        assert!(injected.get::<u32>("missing").is_none());
        assert_eq!(injected.len(), 2);
    }
}
