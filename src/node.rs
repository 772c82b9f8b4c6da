//! The pre-filter [`Node`] tree produced by one build pass.

use std::{
    collections::BTreeMap,
    fmt::{Debug, Formatter},
    sync::Arc,
};

use serde::Serialize;
use serde_json::Value;

use crate::filter::NodeFilter;

/// Free-form node and context metadata.
pub type Metadata = BTreeMap<String, Value>;

/// Node metadata flag: never show the node.
pub const META_HIDDEN: &str = "visibility.hidden";
/// Node metadata flag: show the node to authenticated users only.
pub const META_AUTHENTICATED_ONLY: &str = "visibility.authenticated_only";
/// Node metadata flag: show the node to anonymous users only.
pub const META_ANONYMOUS_ONLY: &str = "visibility.anonymous_only";
/// Node metadata list: the node is shown to users in any of these roles.
pub const META_ROLES: &str = "roles";

/// One navigation entry as authored by the site map's builders.
///
/// A default `Node` is the zero value every decorator chain starts from: no scalar fields, no
/// children, no filters. Children are owned exclusively by their parent.
#[derive(Clone, Default, Serialize)]
pub struct Node {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub target: Option<String>,
    pub metadata: Metadata,
    pub children: Vec<Node>,
    #[serde(skip)]
    pub filters: Vec<Arc<dyn NodeFilter>>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        self.visit(|_, _, _| count += 1);
        count
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order walk handing every node its parent and depth.
    pub fn visit<'n, F>(&'n self, mut f: F)
    where
        F: FnMut(Option<&'n Node>, &'n Node, usize),
    {
        fn walk<'n, F>(parent: Option<&'n Node>, node: &'n Node, depth: usize, f: &mut F)
        where
            F: FnMut(Option<&'n Node>, &'n Node, usize),
        {
            f(parent, node, depth);
            for child in &node.children {
                walk(Some(node), child, depth + 1, f);
            }
        }
        walk(None, self, 0, &mut f);
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("title", &self.title)
            .field("description", &self.description)
            .field("url", &self.url)
            .field("target", &self.target)
            .field("metadata", &self.metadata)
            .field("filters", &self.filters.len())
            .field("children", &self.children)
            .finish()
    }
}
