//! [`SiteMapCoordinator`]: owns the cached build of one site map and filters it per request.

use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

use once_cell::sync::OnceCell;

use crate::{
    builder::NodeBuilder,
    config::SiteMapConfig,
    context::{BuilderContext, FilterContext},
    error::SiteMapError,
    filter::{
        DefaultFilterProvider, DepthFirstFilter, NodeFilter, RecursiveNodeFilter, StandardFilters,
    },
    filtered::{FilteredNode, FilteredTree},
    node::Node,
    request::RequestContext,
};

/// Coordinates the two phases of serving a site map:
///
/// 1. **Build** (once per coordinator): the site map's builder chain runs against a root
///    [`BuilderContext`] for the first request that arrives. The resulting [`Node`] tree is cached
///    for the coordinator's lifetime. Concurrent first callers block until that single build
///    finishes; a failed build is not cached and the next caller retries.
/// 2. **Filter** (every request): a fresh [`FilterContext`] over the captured default filters is
///    handed to the [`RecursiveNodeFilter`], producing a new [`FilteredTree`]. Filtered output is
///    never cached here.
///
/// Filters only ever see per-pass copies of node metadata, so nothing a filter writes during one
/// request is visible to the next.
pub struct SiteMapCoordinator {
    recursive_filter: Arc<dyn RecursiveNodeFilter>,
    default_filters: Vec<Arc<dyn NodeFilter>>,
    site_map: Arc<dyn NodeBuilder>,
    root: OnceCell<Arc<Node>>,
}

impl SiteMapCoordinator {
    /// Default filters are taken from `provider` once, here, and reused for every request.
    pub fn new(
        recursive_filter: Arc<dyn RecursiveNodeFilter>,
        provider: &dyn DefaultFilterProvider,
        site_map: Arc<dyn NodeBuilder>,
    ) -> Self {
        let default_filters = provider.filters();
        tracing::debug!(
            "[SiteMapCoordinator::new] captured {} default filter(s)",
            default_filters.len()
        );
        SiteMapCoordinator {
            recursive_filter,
            default_filters,
            site_map,
            root: OnceCell::new(),
        }
    }

    pub fn builder() -> SiteMapCoordinatorBuilder {
        SiteMapCoordinatorBuilder::default()
    }

    /// Depth-first filtering with the standard default filters, as configured.
    pub fn from_config(
        config: &SiteMapConfig,
        site_map: Arc<dyn NodeBuilder>,
    ) -> Result<Self, SiteMapError> {
        config.validate()?;
        Ok(Self::new(
            Arc::new(DepthFirstFilter::new(config.delimiter.clone())?),
            &StandardFilters::from_config(config),
            site_map,
        ))
    }

    pub fn default_filters(&self) -> &[Arc<dyn NodeFilter>] {
        &self.default_filters
    }

    pub fn is_built(&self) -> bool {
        self.root.get().is_some()
    }

    /// The cached, unfiltered tree, building it first if no request has done so yet.
    pub fn unfiltered_root(&self, request: &RequestContext) -> Result<Arc<Node>, SiteMapError> {
        self.root
            .get_or_try_init(|| {
                tracing::info!(
                    "[SiteMapCoordinator::unfiltered_root] building site map for request {}",
                    request.request_id()
                );
                let mut ctx = BuilderContext::new(request);
                let root = self.site_map.build(&mut ctx)?;
                tracing::debug!(
                    "[SiteMapCoordinator::unfiltered_root] built {} node(s)",
                    root.subtree_size()
                );
                Ok(Arc::new(root))
            })
            .cloned()
    }

    /// Filter the cached tree for `request`.
    ///
    /// Fails with [`SiteMapError::Configuration`] if the root node itself is filtered out.
    pub fn root_node(&self, request: &RequestContext) -> Result<FilteredTree, SiteMapError> {
        let root = self.unfiltered_root(request)?;
        let ctx = FilterContext::new(request, &self.default_filters);
        self.recursive_filter.filter(&ctx, &root)?.ok_or_else(|| {
            SiteMapError::Configuration(
                "filtering did not produce a root node; check the filters attached to the root"
                    .to_string(),
            )
        })
    }

    /// First node of `tree`, in pre-order, marked as current.
    pub fn current_node<'t>(
        &self,
        request: &RequestContext,
        tree: &'t FilteredTree,
    ) -> Option<&'t FilteredNode> {
        let current = tree.find_current();
        tracing::trace!(
            "[SiteMapCoordinator::current_node] request {} -> {:?}",
            request.request_id(),
            current.map(|n| &n.key)
        );
        current
    }
}

impl Debug for SiteMapCoordinator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteMapCoordinator")
            .field("default_filters", &self.default_filters.len())
            .field("is_built", &self.is_built())
            .finish()
    }
}

/// Assembles a [`SiteMapCoordinator`] from parts, reporting whichever is missing.
#[derive(Default)]
pub struct SiteMapCoordinatorBuilder {
    recursive_filter: Option<Arc<dyn RecursiveNodeFilter>>,
    default_filters: Option<Box<dyn DefaultFilterProvider>>,
    site_map: Option<Arc<dyn NodeBuilder>>,
}

impl SiteMapCoordinatorBuilder {
    pub fn recursive_filter(mut self, filter: impl RecursiveNodeFilter + 'static) -> Self {
        self.recursive_filter = Some(Arc::new(filter));
        self
    }

    pub fn default_filters(mut self, provider: impl DefaultFilterProvider + 'static) -> Self {
        self.default_filters = Some(Box::new(provider));
        self
    }

    pub fn site_map(mut self, site_map: impl NodeBuilder + 'static) -> Self {
        self.site_map = Some(Arc::new(site_map));
        self
    }

    pub fn build(self) -> Result<SiteMapCoordinator, SiteMapError> {
        let recursive_filter = self.recursive_filter.ok_or_else(|| {
            SiteMapError::invalid_argument("recursive_filter", "no recursive node filter supplied")
        })?;
        let provider = self.default_filters.ok_or_else(|| {
            SiteMapError::invalid_argument("default_filters", "no default filter provider supplied")
        })?;
        let site_map = self.site_map.ok_or_else(|| {
            SiteMapError::invalid_argument("site_map", "no root site map builder supplied")
        })?;
        Ok(SiteMapCoordinator::new(
            recursive_filter,
            provider.as_ref(),
            site_map,
        ))
    }
}
