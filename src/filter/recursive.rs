use crate::{
    context::FilterContext,
    error::SiteMapError,
    filtered::{FilteredNode, FilteredNodeId, FilteredTree},
    node::Node,
};

pub const DEFAULT_DELIMITER: &str = "/";

/// Checks that `delimiter` can separate positional key segments.
///
/// Segments are decimal indices, so a delimiter containing a digit could make two distinct paths
/// render to the same key.
pub fn validate_delimiter(delimiter: &str) -> Result<(), SiteMapError> {
    if delimiter.is_empty() {
        return Err(SiteMapError::invalid_argument(
            "delimiter",
            "key delimiter must be non-empty",
        ));
    }
    if delimiter.chars().any(|c| c.is_ascii_digit()) {
        return Err(SiteMapError::invalid_argument(
            "delimiter",
            format!("key delimiter '{delimiter}' must not contain ASCII digits"),
        ));
    }
    Ok(())
}

/// Turns a built [`Node`] tree into a request-scoped [`FilteredTree`].
///
/// Returns `Ok(None)` when the root itself is filtered out.
pub trait RecursiveNodeFilter: Send + Sync {
    fn filter(
        &self,
        ctx: &FilterContext<'_>,
        root: &Node,
    ) -> Result<Option<FilteredTree>, SiteMapError>;
}

/// Depth-first, pre-order filter pass.
///
/// Every node is filtered with its context's default filters followed by its own filters, in
/// that order, stopping at the first filter that rejects it. Parents are always filtered before
/// their children and siblings in source order.
///
/// Keys are materialized paths built from the node's index among *all* of its source siblings:
/// a child at index 1 keeps key `/1` even when its sibling at index 0 was dropped.
#[derive(Debug, Clone)]
pub struct DepthFirstFilter {
    delimiter: String,
}

impl Default for DepthFirstFilter {
    fn default() -> Self {
        DepthFirstFilter {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

impl DepthFirstFilter {
    pub fn new(delimiter: impl Into<String>) -> Result<Self, SiteMapError> {
        let delimiter = delimiter.into();
        validate_delimiter(&delimiter)?;
        Ok(DepthFirstFilter { delimiter })
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    fn child_key(&self, parent_key: &str, index: usize) -> String {
        if parent_key.ends_with(self.delimiter.as_str()) {
            format!("{parent_key}{index}")
        } else {
            format!("{parent_key}{}{index}", self.delimiter)
        }
    }

    fn passes(
        &self,
        candidate: &mut FilteredNode,
        source: &Node,
        ctx: &mut FilterContext<'_>,
    ) -> Result<bool, SiteMapError> {
        for filter in ctx.default_filters().iter().chain(source.filters.iter()) {
            if !filter.filter(candidate, ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn filter_children(
        &self,
        tree: &mut FilteredTree,
        parent_id: FilteredNodeId,
        parent: &Node,
        parent_ctx: &FilterContext<'_>,
    ) -> Result<(), SiteMapError> {
        let parent_key = match tree.get(parent_id) {
            Some(node) => node.key.clone(),
            None => {
                return Err(SiteMapError::Configuration(format!(
                    "filtered parent {parent_id:?} is missing from the tree"
                )))
            }
        };

        for (index, child) in parent.children.iter().enumerate() {
            let key = self.child_key(&parent_key, index);
            let mut candidate = FilteredNode::from_node(child, key, Some(parent_id));
            let mut child_ctx = parent_ctx.child();
            if !self.passes(&mut candidate, child, &mut child_ctx)? {
                tracing::trace!(
                    "[DepthFirstFilter::filter_children] dropped {} ({:?}) with {} descendant(s)",
                    candidate.key,
                    candidate.title,
                    child.subtree_size() - 1
                );
                continue;
            }
            let id = tree.attach(parent_id, candidate);
            self.filter_children(tree, id, child, &child_ctx)?;
        }
        Ok(())
    }
}

impl RecursiveNodeFilter for DepthFirstFilter {
    fn filter(
        &self,
        ctx: &FilterContext<'_>,
        root: &Node,
    ) -> Result<Option<FilteredTree>, SiteMapError> {
        let mut candidate = FilteredNode::from_node(root, self.delimiter.clone(), None);
        let mut root_ctx = ctx.child();
        if !self.passes(&mut candidate, root, &mut root_ctx)? {
            tracing::warn!(
                "[DepthFirstFilter::filter] root node {:?} was filtered out for request {}",
                root.title,
                ctx.request().request_id()
            );
            return Ok(None);
        }

        let mut tree = FilteredTree::with_root(candidate);
        self.filter_children(&mut tree, FilteredTree::ROOT, root, &root_ctx)?;
        tracing::debug!(
            "[DepthFirstFilter::filter] kept {} of {} node(s) for request {}",
            tree.len(),
            root.subtree_size(),
            ctx.request().request_id()
        );
        Ok(Some(tree))
    }
}
