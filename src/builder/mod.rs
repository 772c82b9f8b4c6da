//! Declarative node builders.
//!
//! A site map is a chain of [`NodeBuilder`]s. Every chain starts at a [`SiteMapNode`], which
//! yields the zero-value [`Node`], and is wrapped by [`Decorated`] builders that each apply one
//! [`Decoration`] to the node their inner builder returned:
//!
//! ```rust
//! use sitemap_core::{BuilderContext, NodeBuilder, NodeBuilderExt, RequestContext, SiteMapNode};
//!
//! let site_map = SiteMapNode::new()
//!     .with_title("Home")
//!     .with_url("/")
//!     .with_children(vec![
//!         SiteMapNode::new().with_title("About").with_url("/about").boxed(),
//!         SiteMapNode::new().with_title("Admin").with_url("/admin").in_roles(["admin"]).boxed(),
//!     ]);
//!
//! let request = RequestContext::parse("/about").unwrap();
//! let node = site_map.build(&mut BuilderContext::new(&request)).unwrap();
//! assert_eq!(node.children.len(), 2);
//! ```
//!
//! Decorators mutate the node they receive and hand the same node back. The children decorators
//! are the exception: they build a fresh subtree per child, each in its own child
//! [`BuilderContext`].
//!
//! Filters are not decorations. [`NodeBuilderExt::add_filter`] appends to the filter list owned
//! by the chain's [`SiteMapNode`], which copies it onto the node it builds.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    context::BuilderContext,
    error::SiteMapError,
    filter::NodeFilter,
    node::Node,
    request::RouteValues,
};

pub mod decorators;

pub use decorators::{
    Children, ChildrenFrom, Description, ForController, MetadataEntry, Roles, Target, Title, Url,
    UrlFromRoute, Visibility,
};

pub trait NodeBuilder: Send + Sync {
    fn build(&self, ctx: &mut BuilderContext<'_>) -> Result<Node, SiteMapError>;

    /// Filters that end up on the node this chain produces.
    fn filters(&self) -> &[Arc<dyn NodeFilter>];

    fn filters_mut(&mut self) -> &mut Vec<Arc<dyn NodeFilter>>;
}

impl NodeBuilder for Box<dyn NodeBuilder> {
    fn build(&self, ctx: &mut BuilderContext<'_>) -> Result<Node, SiteMapError> {
        self.as_ref().build(ctx)
    }

    fn filters(&self) -> &[Arc<dyn NodeFilter>] {
        self.as_ref().filters()
    }

    fn filters_mut(&mut self) -> &mut Vec<Arc<dyn NodeFilter>> {
        self.as_mut().filters_mut()
    }
}

/// The terminal builder of every chain.
#[derive(Clone, Default)]
pub struct SiteMapNode {
    filters: Vec<Arc<dyn NodeFilter>>,
}

impl SiteMapNode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeBuilder for SiteMapNode {
    fn build(&self, _ctx: &mut BuilderContext<'_>) -> Result<Node, SiteMapError> {
        Ok(Node {
            filters: self.filters.clone(),
            ..Node::default()
        })
    }

    fn filters(&self) -> &[Arc<dyn NodeFilter>] {
        &self.filters
    }

    fn filters_mut(&mut self) -> &mut Vec<Arc<dyn NodeFilter>> {
        &mut self.filters
    }
}

/// One concern applied to a node after its inner builder ran.
pub trait Decoration: Send + Sync {
    fn decorate(&self, node: &mut Node, ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError>;
}

pub struct Decorated<D> {
    inner: Box<dyn NodeBuilder>,
    decoration: D,
}

impl<D: Decoration> Decorated<D> {
    pub fn new(inner: Box<dyn NodeBuilder>, decoration: D) -> Self {
        Decorated { inner, decoration }
    }

    pub fn inner(&self) -> &dyn NodeBuilder {
        self.inner.as_ref()
    }

    pub fn decoration(&self) -> &D {
        &self.decoration
    }
}

impl<D: Decoration> NodeBuilder for Decorated<D> {
    fn build(&self, ctx: &mut BuilderContext<'_>) -> Result<Node, SiteMapError> {
        let mut node = self.inner.build(ctx)?;
        self.decoration.decorate(&mut node, ctx)?;
        Ok(node)
    }

    fn filters(&self) -> &[Arc<dyn NodeFilter>] {
        self.inner.filters()
    }

    fn filters_mut(&mut self) -> &mut Vec<Arc<dyn NodeFilter>> {
        self.inner.filters_mut()
    }
}

/// Fluent construction of decorator chains.
pub trait NodeBuilderExt: NodeBuilder + Sized + 'static {
    fn boxed(self) -> Box<dyn NodeBuilder> {
        Box::new(self)
    }

    fn decorate<D: Decoration>(self, decoration: D) -> Decorated<D> {
        Decorated::new(Box::new(self), decoration)
    }

    fn with_title(self, title: impl Into<String>) -> Decorated<Title> {
        self.decorate(Title(title.into()))
    }

    fn with_description(self, description: impl Into<String>) -> Decorated<Description> {
        self.decorate(Description(description.into()))
    }

    fn with_url(self, url: impl Into<String>) -> Decorated<Url> {
        self.decorate(Url(url.into()))
    }

    fn with_target(self, target: impl Into<String>) -> Decorated<Target> {
        self.decorate(Target(target.into()))
    }

    /// An empty `key` is reported as [`SiteMapError::InvalidArgument`] when the chain is built.
    fn with_metadata(
        self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Decorated<MetadataEntry> {
        self.decorate(MetadataEntry {
            key: key.into(),
            value: value.into(),
        })
    }

    fn hidden(self) -> Decorated<Visibility> {
        self.decorate(Visibility::Hidden)
    }

    fn authenticated_only(self) -> Decorated<Visibility> {
        self.decorate(Visibility::AuthenticatedOnly)
    }

    fn anonymous_only(self) -> Decorated<Visibility> {
        self.decorate(Visibility::AnonymousOnly)
    }

    fn in_roles<I, S>(self, roles: I) -> Decorated<Roles>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.decorate(Roles(roles.into_iter().map(Into::into).collect()))
    }

    /// Sets the `controller` context value for this node and its descendants.
    fn for_controller(self, controller: impl Into<String>) -> Decorated<ForController> {
        self.decorate(ForController(controller.into()))
    }

    /// URL from the request's route table using `action` and the inherited controller.
    fn with_url_from_route(self, action: impl Into<String>) -> Decorated<UrlFromRoute> {
        let mut values = RouteValues::new();
        values.insert("action".to_string(), action.into());
        self.decorate(UrlFromRoute(values))
    }

    fn with_url_from_route_values(self, values: RouteValues) -> Decorated<UrlFromRoute> {
        self.decorate(UrlFromRoute(values))
    }

    /// Replaces the node's children with one subtree per builder.
    fn with_children(self, children: Vec<Box<dyn NodeBuilder>>) -> Decorated<Children> {
        self.decorate(Children(children))
    }

    /// Replaces the node's children with builders produced at build time by `generator`.
    fn with_children_from<G>(self, generator: G) -> Decorated<ChildrenFrom>
    where
        G: Fn(&BuilderContext<'_>) -> Result<Vec<Box<dyn NodeBuilder>>, SiteMapError>
            + Send
            + Sync
            + 'static,
    {
        self.decorate(ChildrenFrom::new(generator))
    }

    fn add_filter(self, filter: impl NodeFilter + 'static) -> Self {
        self.add_shared_filter(Arc::new(filter))
    }

    fn add_shared_filter(mut self, filter: Arc<dyn NodeFilter>) -> Self {
        self.filters_mut().push(filter);
        self
    }
}

impl<T: NodeBuilder + Sized + 'static> NodeBuilderExt for T {}
