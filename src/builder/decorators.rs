use std::fmt::{Debug, Formatter};

use serde_json::Value;

use crate::{
    builder::{Decoration, NodeBuilder},
    context::{BuilderContext, MetadataScope, CONTROLLER_KEY},
    error::SiteMapError,
    node::{Node, META_ANONYMOUS_ONLY, META_AUTHENTICATED_ONLY, META_HIDDEN, META_ROLES},
    request::RouteValues,
};

#[derive(Debug, Clone)]
pub struct Title(pub String);

impl Decoration for Title {
    fn decorate(&self, node: &mut Node, _ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError> {
        node.title = Some(self.0.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Description(pub String);

impl Decoration for Description {
    fn decorate(&self, node: &mut Node, _ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError> {
        node.description = Some(self.0.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Url(pub String);

impl Decoration for Url {
    fn decorate(&self, node: &mut Node, _ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError> {
        node.url = Some(self.0.clone());
        Ok(())
    }
}

/// Link target, e.g. `_blank`.
#[derive(Debug, Clone)]
pub struct Target(pub String);

impl Decoration for Target {
    fn decorate(&self, node: &mut Node, _ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError> {
        node.target = Some(self.0.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MetadataEntry {
    pub key: String,
    pub value: Value,
}

impl Decoration for MetadataEntry {
    fn decorate(&self, node: &mut Node, _ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError> {
        if self.key.is_empty() {
            return Err(SiteMapError::invalid_argument(
                "key",
                "node metadata keys must be non-empty",
            ));
        }
        node.metadata.insert(self.key.clone(), self.value.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    AuthenticatedOnly,
    AnonymousOnly,
}

impl Visibility {
    pub fn metadata_key(&self) -> &'static str {
        match self {
            Visibility::Hidden => META_HIDDEN,
            Visibility::AuthenticatedOnly => META_AUTHENTICATED_ONLY,
            Visibility::AnonymousOnly => META_ANONYMOUS_ONLY,
        }
    }
}

impl Decoration for Visibility {
    fn decorate(&self, node: &mut Node, _ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError> {
        node.metadata
            .insert(self.metadata_key().to_string(), Value::Bool(true));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Roles(pub Vec<String>);

impl Decoration for Roles {
    fn decorate(&self, node: &mut Node, _ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError> {
        node.metadata.insert(
            META_ROLES.to_string(),
            Value::Array(self.0.iter().cloned().map(Value::String).collect()),
        );
        Ok(())
    }
}

/// Publishes the controller name to this builder's context and, through it, to descendants.
#[derive(Debug, Clone)]
pub struct ForController(pub String);

impl Decoration for ForController {
    fn decorate(&self, _node: &mut Node, ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError> {
        ctx.set_metadata(CONTROLLER_KEY, self.0.clone())
    }
}

/// Generates the node URL from route values. Without an explicit `controller` value, the nearest
/// `for_controller` upstream supplies it.
#[derive(Debug, Clone)]
pub struct UrlFromRoute(pub RouteValues);

impl Decoration for UrlFromRoute {
    fn decorate(&self, node: &mut Node, ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError> {
        let mut values = self.0.clone();
        if !values.contains_key(CONTROLLER_KEY) {
            let controller: String = ctx.required_metadata(
                CONTROLLER_KEY,
                true,
                "for_controller() on this node or one of its ancestors",
            )?;
            values.insert(CONTROLLER_KEY.to_string(), controller);
        }
        node.url = Some(ctx.request().resolve_url(&values)?);
        Ok(())
    }
}

fn build_children(
    builders: &[Box<dyn NodeBuilder>],
    ctx: &BuilderContext<'_>,
) -> Result<Vec<Node>, SiteMapError> {
    builders
        .iter()
        .map(|builder| {
            let mut child_ctx = ctx.child();
            builder.build(&mut child_ctx)
        })
        .collect()
}

pub struct Children(pub Vec<Box<dyn NodeBuilder>>);

impl Decoration for Children {
    fn decorate(&self, node: &mut Node, ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError> {
        node.children = build_children(&self.0, ctx)?;
        Ok(())
    }
}

impl Debug for Children {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Children").field(&self.0.len()).finish()
    }
}

type ChildGenerator =
    dyn Fn(&BuilderContext<'_>) -> Result<Vec<Box<dyn NodeBuilder>>, SiteMapError> + Send + Sync;

/// Children produced by a callback at build time, e.g. one entry per product category.
pub struct ChildrenFrom {
    generator: Box<ChildGenerator>,
}

impl ChildrenFrom {
    pub fn new<G>(generator: G) -> Self
    where
        G: Fn(&BuilderContext<'_>) -> Result<Vec<Box<dyn NodeBuilder>>, SiteMapError>
            + Send
            + Sync
            + 'static,
    {
        ChildrenFrom {
            generator: Box::new(generator),
        }
    }
}

impl Decoration for ChildrenFrom {
    fn decorate(&self, node: &mut Node, ctx: &mut BuilderContext<'_>) -> Result<(), SiteMapError> {
        let builders = (self.generator)(&*ctx)?;
        tracing::trace!(
            "[ChildrenFrom::decorate] generator produced {} child builder(s) at depth {}",
            builders.len(),
            ctx.depth()
        );
        node.children = build_children(&builders, ctx)?;
        Ok(())
    }
}

impl Debug for ChildrenFrom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChildrenFrom")
    }
}
