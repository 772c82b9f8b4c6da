//! Per-node filters and the recursive pass that applies them.
//!
//! # Module Organization
//!
//! - [`recursive`]: [`RecursiveNodeFilter`] and the default [`DepthFirstFilter`]
//! - [`standard`]: visibility, role and current-node filters plus the [`StandardFilters`] provider
//!
//! A [`NodeFilter`] sees a [`FilteredNode`] candidate and the node's [`FilterContext`]. Returning
//! `Ok(false)` drops the node and, since it is never visited, its whole subtree. Filters may also
//! rewrite the candidate's presentation fields, metadata or `is_current` flag.

use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

use crate::{context::FilterContext, error::SiteMapError, filtered::FilteredNode};

pub mod recursive;
pub mod standard;

pub use recursive::{DepthFirstFilter, RecursiveNodeFilter};
pub use standard::{CurrentNodeFilter, RoleFilter, StandardFilters, VisibilityFilter};

pub trait NodeFilter: Send + Sync {
    fn filter(
        &self,
        node: &mut FilteredNode,
        ctx: &mut FilterContext<'_>,
    ) -> Result<bool, SiteMapError>;
}

/// Adapts a closure into a [`NodeFilter`].
pub struct FnFilter<F>(F);

impl<F> NodeFilter for FnFilter<F>
where
    F: Fn(&mut FilteredNode, &mut FilterContext<'_>) -> Result<bool, SiteMapError> + Send + Sync,
{
    fn filter(
        &self,
        node: &mut FilteredNode,
        ctx: &mut FilterContext<'_>,
    ) -> Result<bool, SiteMapError> {
        (self.0)(node, ctx)
    }
}

impl<F> Debug for FnFilter<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnFilter")
    }
}

pub fn filter_fn<F>(f: F) -> FnFilter<F>
where
    F: Fn(&mut FilteredNode, &mut FilterContext<'_>) -> Result<bool, SiteMapError> + Send + Sync,
{
    FnFilter(f)
}

/// Supplies the filters applied to every node, ahead of node-specific ones.
///
/// Called once when a [`crate::SiteMapCoordinator`] is constructed.
pub trait DefaultFilterProvider {
    fn filters(&self) -> Vec<Arc<dyn NodeFilter>>;
}

impl DefaultFilterProvider for Vec<Arc<dyn NodeFilter>> {
    fn filters(&self) -> Vec<Arc<dyn NodeFilter>> {
        self.clone()
    }
}

/// Provider for site maps that only use node-specific filters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDefaultFilters;

impl DefaultFilterProvider for NoDefaultFilters {
    fn filters(&self) -> Vec<Arc<dyn NodeFilter>> {
        Vec::new()
    }
}
