//! Path registration trie.
//!
//! The trie is an arena: every [`Node`] lives in `Route::nodes` and refers to its parent and
//! children by [`NodeId`]. The parent link is a plain index, so the tree has a single owner
//! (the [`Route`]) and nodes can still walk upwards when rendering their pattern.
//!
//! ## Pattern syntax
//!
//! - `/`-separated segments, leading and trailing separators ignored
//! - `:name` turns the node the walk is currently on into an [`NodeType::EndPoint`] that
//!   captures the following request segment under `name`
//! - a lone `*` turns the current node into a [`NodeType::Recursive`] node that captures the
//!   whole remaining suffix; nothing may follow it. `/*` makes the root itself a catch-all
//! - anything else is a literal segment
//!
//! ```text
//! /auth/group/user/:user_id            root ─ auth ─ group ─ user(:user_id)
//! /auth/group/user/:user_id/book/:book                          └─ book(:book)
//! /wild/*                              root ─ wild(*)
//! /*                                   root(*)
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::handlers::RouteHandler;

/// Index of a node inside its [`Route`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);
}

/// Kind of trie vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeType {
    /// The single root of the tree, until `/*` turns it into a catch-all
    Root,
    /// Fixed literal segment
    Namespace,
    /// Node whose following request segment may be captured as a parameter
    EndPoint,
    /// Greedy suffix capture; always a leaf
    Recursive,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeType::Root => "Root",
            NodeType::Namespace => "Namespace",
            NodeType::EndPoint => "EndPoint",
            NodeType::Recursive => "Recursive",
        };
        f.write_str(s)
    }
}

/// One vertex of the registration trie.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    name: String,
    /// Shared with every `PathParams` that captures under this node
    parameter_name: Arc<str>,
    /// Parameter name came from an explicit `:name` segment
    declared: bool,
    handlers: Vec<RouteHandler>,
    children: HashMap<String, NodeId>,
    node_type: NodeType,
}

impl Node {
    fn new(id: NodeId, parent: Option<NodeId>, name: &str, node_type: NodeType) -> Self {
        Self {
            id,
            parent,
            name: name.to_string(),
            parameter_name: Arc::from(""),
            declared: false,
            handlers: Vec::new(),
            children: HashMap::new(),
            node_type,
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Parent back-reference; `None` only for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Literal segment; empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    pub(crate) fn parameter_key(&self) -> Arc<str> {
        Arc::clone(&self.parameter_name)
    }

    /// Handlers in execution order.
    #[must_use]
    pub fn handlers(&self) -> &[RouteHandler] {
        &self.handlers
    }

    #[must_use]
    pub fn children(&self) -> &HashMap<String, NodeId> {
        &self.children
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.id == NodeId::ROOT
    }
}

/// Owner of the registration trie.
///
/// Registration (`set_endpoint`, `set_root_handlers`) takes `&mut self` and must finish
/// before the route is shared for matching; matching only needs `&self`.
#[derive(Debug)]
pub struct Route {
    nodes: Vec<Node>,
}

impl Default for Route {
    fn default() -> Self {
        Self::new()
    }
}

impl Route {
    /// Create a tree holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeId::ROOT, None, "", NodeType::Root)],
        }
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Look a node up by id. Ids are only ever handed out by this route.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different [`Route`] with more nodes than this one.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.root().handlers.is_empty()
    }

    pub(crate) fn child(&self, node: &Node, segment: &str) -> Option<&Node> {
        node.children.get(segment).map(|id| self.node(*id))
    }

    /// Replace the root's handler list.
    pub fn set_root_handlers(&mut self, handlers: Vec<RouteHandler>) -> &mut Self {
        debug!(handlers = handlers.len(), "Root handlers registered");
        self.nodes[NodeId::ROOT.0].handlers = handlers;
        self
    }

    /// Register `handlers` at `pattern`, growing the tree as needed.
    ///
    /// Later registrations win: a second `:name` at the same position renames the
    /// parameter, and re-registering a pattern replaces its handlers.
    pub fn set_endpoint(&mut self, pattern: &str, handlers: Vec<RouteHandler>) -> &mut Self {
        let trimmed = pattern.trim_matches('/');
        if trimmed.is_empty() {
            return self.set_root_handlers(handlers);
        }

        let parts: Vec<&str> = trimmed.split('/').collect();
        let last = parts.len() - 1;
        let mut handlers = Some(handlers);
        let mut current = NodeId::ROOT;

        for (idx, part) in parts.iter().enumerate() {
            let is_final = idx == last;

            if self.nodes[current.0].node_type == NodeType::Recursive {
                warn!(
                    pattern = %pattern,
                    ignored = %parts[idx..].join("/"),
                    "Segments below a wildcard are ignored"
                );
                return self;
            }

            if let Some(param) = part.strip_prefix(':') {
                self.declare_parameter(current, param);
                if is_final {
                    self.nodes[current.0].handlers = handlers.take().unwrap_or_default();
                }
                continue;
            }

            if *part == "*" {
                if !is_final {
                    warn!(
                        pattern = %pattern,
                        ignored = %parts[idx + 1..].join("/"),
                        "Segments after a wildcard are ignored"
                    );
                }
                self.declare_wildcard(current, pattern, handlers.take().unwrap_or_default());
                return self;
            }

            current = match self.nodes[current.0].children.get(*part) {
                Some(&child) => {
                    if is_final {
                        let node = &mut self.nodes[child.0];
                        if node.node_type == NodeType::Namespace {
                            node.node_type = NodeType::EndPoint;
                            node.parameter_name = Arc::from(*part);
                        }
                        node.handlers = handlers.take().unwrap_or_default();
                    }
                    child
                }
                None => {
                    let id = NodeId(self.nodes.len());
                    let mut node = Node::new(id, Some(current), part, NodeType::Namespace);
                    if is_final {
                        node.node_type = NodeType::EndPoint;
                        node.parameter_name = Arc::from(*part);
                        node.handlers = handlers.take().unwrap_or_default();
                    }
                    self.nodes.push(node);
                    self.nodes[current.0].children.insert((*part).to_string(), id);
                    id
                }
            };
        }

        debug!(pattern = %pattern, node = %self.path_of(current), "Endpoint registered");
        self
    }

    fn declare_parameter(&mut self, id: NodeId, param: &str) {
        let node = &mut self.nodes[id.0];
        if node.declared && node.parameter_name.as_ref() != param {
            warn!(
                node = %node.name,
                previous = %node.parameter_name,
                parameter = %param,
                "Parameter name redeclared; last registration wins"
            );
        }
        // The root keeps its type; it only gains a parameter slot.
        if node.node_type != NodeType::Root {
            node.node_type = NodeType::EndPoint;
        }
        node.parameter_name = Arc::from(param);
        node.declared = true;
    }

    // On the root this yields a catch-all: the parameter name stays empty and the empty path
    // still resolves to the root itself.
    fn declare_wildcard(&mut self, id: NodeId, pattern: &str, handlers: Vec<RouteHandler>) {
        let node = &mut self.nodes[id.0];
        if !node.children.is_empty() {
            warn!(
                pattern = %pattern,
                shadowed = node.children.len(),
                "Wildcard replaces existing child routes"
            );
            node.children.clear();
        }
        node.node_type = NodeType::Recursive;
        node.parameter_name = Arc::from(node.name.as_str());
        node.declared = false;
        node.handlers = handlers;
        debug!(pattern = %pattern, "Wildcard endpoint registered");
    }

    /// Render the registration pattern that leads to `id`.
    ///
    /// Explicit parameters render as `:name`, wildcards as `*`, the root as `/`.
    #[must_use]
    pub fn path_of(&self, id: NodeId) -> String {
        let mut segments: Vec<String> = Vec::new();
        let mut cursor = Some(id);

        while let Some(nid) = cursor {
            let node = self.node(nid);
            match node.node_type {
                NodeType::Recursive => {
                    segments.push("*".to_string());
                    if !node.is_root() {
                        segments.push(node.name.clone());
                    }
                }
                NodeType::Root | NodeType::EndPoint | NodeType::Namespace => {
                    if node.declared {
                        segments.push(format!(":{}", node.parameter_name));
                    }
                    if !node.is_root() {
                        segments.push(node.name.clone());
                    }
                }
            }
            cursor = node.parent;
        }

        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    fn collect_paths(&self, node: &Node, out: &mut BTreeSet<String>) {
        for child in node.children.values() {
            self.collect_paths(self.node(*child), out);
        }
        if node.node_type != NodeType::Namespace {
            out.insert(self.path_of(node.id));
        }
    }
}

/// Sorted listing of every root, endpoint and wildcard pattern, one per line.
impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths = BTreeSet::new();
        self.collect_paths(self.root(), &mut paths);
        let listing: Vec<String> = paths.into_iter().collect();
        f.write_str(&listing.join("\n"))
    }
}
