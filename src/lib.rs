//! # sitemap-core
//!
//! Declarative site maps for server-side web applications.
//!
//! Application code describes its navigation hierarchy once, at startup, as a chain of node
//! builders. For every request the library turns that description into a tree of *visible*
//! navigation nodes, filtered by authentication and role state and annotated with which node is
//! the current page. Hosts render the result as menus, breadcrumbs and page titles.
//!
//! ## Architecture
//!
//! - **[`builder`]**: [`NodeBuilder`] chains. A [`SiteMapNode`] starts each chain and
//!   [`NodeBuilderExt`] adds decorators (`with_title`, `for_controller`, `with_children`, ...)
//! - **[`context`]**: [`BuilderContext`] and [`FilterContext`], hierarchical per-request scopes
//!   carrying ambient metadata from ancestors to descendants
//! - **[`node`]**: the unfiltered [`Node`] tree, built once and cached
//! - **[`filter`]**: [`NodeFilter`]s, the standard default filters and the
//!   [`RecursiveNodeFilter`] pass
//! - **[`filtered`]**: the per-request [`FilteredTree`] with keys, parent links and helpers for
//!   breadcrumbs and page titles
//! - **[`coordinator`]**: [`SiteMapCoordinator`], the build-once cache plus per-request filtering
//! - **[`host`]**: [`SiteMapHost`], the application-lifetime registry of named site maps
//! - **[`request`]**: [`RequestContext`] and the host-supplied [`Principal`] and [`UrlResolver`]
//!   capabilities
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use sitemap_core::{
//!     NodeBuilderExt, RequestContext, SiteMapConfig, SiteMapCoordinator, SiteMapNode, User,
//! };
//!
//! let site_map = SiteMapNode::new()
//!     .with_title("Home")
//!     .with_url("/")
//!     .with_children(vec![
//!         SiteMapNode::new().with_title("About").with_url("/about").boxed(),
//!         SiteMapNode::new()
//!             .with_title("Account")
//!             .with_url("/account")
//!             .authenticated_only()
//!             .boxed(),
//!     ]);
//!
//! let coordinator =
//!     SiteMapCoordinator::from_config(&SiteMapConfig::default(), Arc::new(site_map))?;
//!
//! let request = RequestContext::parse("/about")?;
//! let tree = coordinator.root_node(&request)?;
//! assert_eq!(tree.len(), 2); // "Account" is hidden from anonymous visitors
//! assert_eq!(coordinator.current_node(&request, &tree).unwrap().key, "/0");
//!
//! let member = RequestContext::parse("/account")?.with_principal(User::new("ada", ["member"]));
//! let tree = coordinator.root_node(&member)?;
//! assert_eq!(tree.page_title(), Some("Account"));
//! # Ok::<(), sitemap_core::SiteMapError>(())
//! ```
//!
//! ## Keys
//!
//! Every filtered node gets a materialized-path key: `/` for the root, then the node's index
//! among its parent's children in the authored order (`/0`, `/1/0`, ...). Indices are not
//! renumbered when siblings are filtered out, so a node's key is stable across principals.
//!
//! ## Context metadata
//!
//! Lookups that find no value anywhere in the ancestor chain fail with
//! [`SiteMapError::MissingMetadata`]; there is no silent default.

pub mod builder;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod filter;
pub mod filtered;
pub mod host;
pub mod node;
pub mod request;
#[cfg(test)]
mod tests;

pub use builder::{Decorated, Decoration, NodeBuilder, NodeBuilderExt, SiteMapNode};
pub use config::SiteMapConfig;
pub use context::{BuilderContext, FilterContext, MetadataScope};
pub use coordinator::{SiteMapCoordinator, SiteMapCoordinatorBuilder};
pub use error::*;
pub use filter::{
    filter_fn, DefaultFilterProvider, DepthFirstFilter, NodeFilter, RecursiveNodeFilter,
    StandardFilters,
};
pub use filtered::{FilteredNode, FilteredNodeId, FilteredTree};
pub use host::SiteMapHost;
pub use node::{Metadata, Node};
pub use request::{Anonymous, Principal, RequestContext, RouteTemplateResolver, UrlResolver, User};
