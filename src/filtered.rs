//! The request-scoped, presentation-ready output of a filter pass.
//!
//! A [`FilteredTree`] is an arena of [`FilteredNode`]s laid out in pre-order. Parent and child
//! links are [`FilteredNodeId`]s into the arena, so the tree has back-references without owning
//! cycles. A tree always holds at least its root.

use serde::Serialize;
use serde_json::Value;

use crate::node::{Metadata, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FilteredNodeId(usize);

impl FilteredNodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredNode {
    pub id: FilteredNodeId,
    /// Materialized path such as `/`, `/0` or `/1/0`, unique within the tree.
    pub key: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub target: Option<String>,
    /// Per-pass copy of the source node's metadata. Filters may write to it freely.
    pub metadata: Metadata,
    pub is_current: bool,
    pub parent: Option<FilteredNodeId>,
    pub children: Vec<FilteredNodeId>,
}

impl FilteredNode {
    /// Candidate for `source` before any filter has run. `id` and `children` are assigned when
    /// the node is placed in a [`FilteredTree`].
    pub fn from_node(source: &Node, key: String, parent: Option<FilteredNodeId>) -> Self {
        FilteredNode {
            id: FilteredNodeId(0),
            key,
            title: source.title.clone(),
            description: source.description.clone(),
            url: source.url.clone(),
            target: source.target.clone(),
            metadata: source.metadata.clone(),
            is_current: false,
            parent,
            children: Vec::new(),
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredTree {
    nodes: Vec<FilteredNode>,
}

impl FilteredTree {
    pub const ROOT: FilteredNodeId = FilteredNodeId(0);

    pub fn with_root(mut root: FilteredNode) -> Self {
        root.id = Self::ROOT;
        root.parent = None;
        root.children.clear();
        FilteredTree { nodes: vec![root] }
    }

    /// Append `node` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// If `parent` does not belong to this tree.
    pub fn attach(&mut self, parent: FilteredNodeId, mut node: FilteredNode) -> FilteredNodeId {
        let id = FilteredNodeId(self.nodes.len());
        node.id = id;
        node.parent = Some(parent);
        node.children.clear();
        self.nodes[parent.0].children.push(id);
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> &FilteredNode {
        &self.nodes[Self::ROOT.0]
    }

    pub fn get(&self, id: FilteredNodeId) -> Option<&FilteredNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: FilteredNodeId) -> Option<&mut FilteredNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: FilteredNodeId) -> Option<&FilteredNode> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    pub fn children(&self, id: FilteredNodeId) -> impl Iterator<Item = &FilteredNode> + '_ {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.get(*c))
    }

    /// Depth-first, pre-order traversal starting at the root.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![Self::ROOT],
        }
    }

    pub fn find_by_key(&self, key: &str) -> Option<&FilteredNode> {
        self.iter().find(|n| n.key == key)
    }

    /// First node in pre-order whose `is_current` flag is set.
    pub fn find_current(&self) -> Option<&FilteredNode> {
        self.iter().find(|n| n.is_current)
    }

    /// The path from the root down to `id`, inclusive. Empty if `id` is not in this tree.
    pub fn breadcrumbs(&self, id: FilteredNodeId) -> Vec<&FilteredNode> {
        let mut trail = Vec::new();
        let mut cursor = self.get(id);
        while let Some(node) = cursor {
            trail.push(node);
            cursor = node.parent.and_then(|p| self.get(p));
        }
        trail.reverse();
        trail
    }

    pub fn current_trail(&self) -> Vec<&FilteredNode> {
        self.find_current()
            .map(|n| self.breadcrumbs(n.id))
            .unwrap_or_default()
    }

    /// Title of the current node, if there is one and it has a title.
    pub fn page_title(&self) -> Option<&str> {
        self.find_current()?.title.as_deref()
    }
}

pub struct PreOrder<'t> {
    tree: &'t FilteredTree,
    stack: Vec<FilteredNodeId>,
}

impl<'t> Iterator for PreOrder<'t> {
    type Item = &'t FilteredNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.get(self.stack.pop()?)?;
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}

impl<'t> IntoIterator for &'t FilteredTree {
    type Item = &'t FilteredNode;
    type IntoIter = PreOrder<'t>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, key: &str) -> FilteredNode {
        let source = Node {
            title: Some(title.to_string()),
            ..Default::default()
        };
        FilteredNode::from_node(&source, key.to_string(), None)
    }

    /// Home
    /// ├── About
    /// │   └── Team
    /// └── Blog
    fn sample_tree() -> FilteredTree {
        let mut tree = FilteredTree::with_root(candidate("Home", "/"));
        let about = tree.attach(FilteredTree::ROOT, candidate("About", "/0"));
        tree.attach(about, candidate("Team", "/0/0"));
        tree.attach(FilteredTree::ROOT, candidate("Blog", "/1"));
        tree
    }

    #[test]
    fn test_attach_links_both_directions() {
        let tree = sample_tree();
        let team = tree.find_by_key("/0/0").unwrap();
        assert_eq!(tree.parent(team.id).unwrap().title.as_deref(), Some("About"));
        let titles: Vec<_> = tree
            .children(FilteredTree::ROOT)
            .map(|n| n.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, vec!["About", "Blog"]);
        assert!(tree.root().is_root());
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_preorder_iteration() {
        let tree = sample_tree();
        let keys: Vec<_> = tree.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["/", "/0", "/0/0", "/1"]);
    }

    #[test]
    fn test_current_trail_and_page_title() {
        let mut tree = sample_tree();
        assert!(tree.find_current().is_none());
        assert!(tree.current_trail().is_empty());
        assert!(tree.page_title().is_none());

        let team = tree.find_by_key("/0/0").unwrap().id;
        tree.get_mut(team).unwrap().is_current = true;
        let trail: Vec<_> = tree
            .current_trail()
            .into_iter()
            .map(|n| n.title.as_deref().unwrap())
            .collect();
        assert_eq!(trail, vec!["Home", "About", "Team"]);
        assert_eq!(tree.page_title(), Some("Team"));
    }

    #[test]
    fn test_metadata_is_copied_from_source() {
        let mut source = Node::new();
        source
            .metadata
            .insert("icon".to_string(), Value::from("house"));
        let mut filtered = FilteredNode::from_node(&source, "/".to_string(), None);
        filtered
            .metadata
            .insert("icon".to_string(), Value::from("changed"));
        assert_eq!(source.metadata["icon"], Value::from("house"));
    }
}
