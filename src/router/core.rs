//! Router core module - request path resolution.
//!
//! Matching walks the trie once from the root, one request segment per step, and never
//! backtracks. Each step looks the segment up among the current node's literal children and
//! then branches on the current node's [`NodeType`]:
//!
//! | current              | literal child found      | no literal child                                  |
//! |----------------------|--------------------------|---------------------------------------------------|
//! | Root / EndPoint      | advance (or return child, `is_last = true`, on the final segment) | final segment: capture into current's parameter, `is_last = false`; otherwise capture only if the *next* segment is a literal child |
//! | Namespace            | advance                  | no match                                          |
//! | Recursive            | n/a (leaf)               | capture the joined remaining suffix               |
//!
//! `is_last` tells handlers whether the request addressed the node itself ("collection")
//! or an item one level below it captured as a parameter.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;

use super::node::{Node, NodeType, Route};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Inline parameter storage.
///
/// Param names are `Arc<str>` shared with the trie node that declared them; values are
/// per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Path parameters captured while matching.
///
/// Handlers may add or overwrite entries to pass request-scoped values down the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    inner: ParamVec,
}

impl PathParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter by name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or overwrite a parameter, returning the previous value.
    pub fn insert(&mut self, name: impl Into<Arc<str>>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.inner.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.inner.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.inner.iter().position(|(k, _)| k.as_ref() == name)?;
        Some(self.inner.remove(pos).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Copy into a `HashMap`. Allocates; prefer [`PathParams::get`].
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl Serialize for PathParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl fmt::Display for PathParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

/// Result of successfully resolving a request path.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    /// Matched trie node
    pub node: &'a Node,
    /// Parameters captured on the way down
    pub params: PathParams,
    /// The walk ended exactly on `node` rather than capturing one level below it
    pub is_last: bool,
}

impl<'a> RouteMatch<'a> {
    fn new(node: &'a Node, params: PathParams, is_last: bool) -> Self {
        Self {
            node,
            params,
            is_last,
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (&'a Node, PathParams, bool) {
        (self.node, self.params, self.is_last)
    }
}

impl Route {
    /// Resolve a request path to a node.
    ///
    /// Returns `None` when the path does not match; callers should treat that as
    /// "not found".
    #[must_use]
    pub fn route_node(&self, path: &str) -> Option<RouteMatch<'_>> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Some(RouteMatch::new(self.root(), PathParams::new(), true));
        }

        let parts: SmallVec<[&str; 16]> = trimmed.split('/').collect();
        let last = parts.len() - 1;
        let mut params = PathParams::new();
        let mut current = self.root();

        for (idx, part) in parts.iter().enumerate() {
            let next = self.child(current, part);

            match current.node_type() {
                NodeType::Root | NodeType::EndPoint => {
                    if idx == last {
                        return match next {
                            Some(child) => Some(RouteMatch::new(child, params, true)),
                            None if current.is_root() && !part.is_empty() => None,
                            None => {
                                params.insert(current.parameter_key(), *part);
                                Some(RouteMatch::new(current, params, false))
                            }
                        };
                    }

                    match next {
                        Some(child) => current = child,
                        None if self.child(current, parts[idx + 1]).is_some() => {
                            params.insert(current.parameter_key(), *part);
                        }
                        None => return None,
                    }
                }
                NodeType::Recursive => {
                    params.insert(current.parameter_key(), parts[idx..].join("/"));
                    return Some(RouteMatch::new(current, params, false));
                }
                NodeType::Namespace => current = next?,
            }
        }

        // Only a Namespace step can fall through the loop, and it always advanced onto
        // `current`.
        Some(RouteMatch::new(current, params, true))
    }

    /// Resolve a request path, discarding parameters.
    #[must_use]
    pub fn find_node(&self, path: &str) -> Option<&Node> {
        self.route_node(path).map(|m| m.node)
    }
}
