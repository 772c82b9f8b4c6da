//! Hierarchical per-request scopes for the build and filter passes.
//!
//! - [`BuilderContext`]: one per builder invocation, carries ambient state such as the current
//!   controller name down a decorator chain
//! - [`FilterContext`]: one per visited node during filtering, additionally exposes the default
//!   filters of the pass
//!
//! Both are trees rooted at a single [`RequestContext`]. A child borrows its parent, so metadata
//! set on a context is visible to that context and its descendants only. Lookups through
//! [`MetadataScope`] are strict: a key that no context in the chain defines is an error.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{error::SiteMapError, filter::NodeFilter, node::Metadata, request::RequestContext};

/// Context metadata key written by `for_controller` and read by route-based URL decorators.
pub const CONTROLLER_KEY: &str = "controller";

fn check_key(key: &str) -> Result<(), SiteMapError> {
    if key.is_empty() {
        return Err(SiteMapError::invalid_argument(
            "key",
            "metadata keys must be non-empty",
        ));
    }
    Ok(())
}

/// Shared lookup logic for contexts that chain to a parent.
pub trait MetadataScope {
    fn local_metadata(&self) -> &Metadata;

    fn parent_scope(&self) -> Option<&Self>;

    fn local_metadata_mut(&mut self) -> &mut Metadata;

    fn set_metadata(&mut self, key: &str, value: impl Into<Value>) -> Result<(), SiteMapError> {
        check_key(key)?;
        self.local_metadata_mut().insert(key.to_string(), value.into());
        Ok(())
    }

    /// Nearest defined value for `key`, searching ancestors when `recursive` is set.
    fn raw_metadata(&self, key: &str, recursive: bool) -> Result<&Value, SiteMapError> {
        self.raw_metadata_from(key, recursive, "an ancestor context")
    }

    /// Like [`raw_metadata`](Self::raw_metadata), but a missing key reports `provided_by` as the
    /// thing that should have set it.
    fn raw_metadata_from(
        &self,
        key: &str,
        recursive: bool,
        provided_by: &str,
    ) -> Result<&Value, SiteMapError> {
        check_key(key)?;
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = current.local_metadata().get(key) {
                return Ok(value);
            }
            if !recursive {
                break;
            }
            scope = current.parent_scope();
        }
        Err(SiteMapError::missing_metadata(key, provided_by))
    }

    fn metadata<T: DeserializeOwned>(&self, key: &str, recursive: bool) -> Result<T, SiteMapError> {
        self.required_metadata(key, recursive, "an ancestor context")
    }

    /// Typed lookup whose missing-key error names `provided_by`, e.g. the decorator or filter
    /// expected to set `key` upstream.
    fn required_metadata<T: DeserializeOwned>(
        &self,
        key: &str,
        recursive: bool,
        provided_by: &str,
    ) -> Result<T, SiteMapError> {
        let value = self.raw_metadata_from(key, recursive, provided_by)?;
        serde_json::from_value(value.clone()).map_err(|e| {
            SiteMapError::Serialization(format!("context metadata '{key}' has the wrong type: {e}"))
        })
    }

    fn contains_metadata(&self, key: &str, recursive: bool) -> bool {
        self.raw_metadata(key, recursive).is_ok()
    }
}

/// Scope for one builder invocation during the build pass.
#[derive(Debug)]
pub struct BuilderContext<'a> {
    request: &'a RequestContext,
    parent: Option<&'a BuilderContext<'a>>,
    depth: usize,
    metadata: Metadata,
}

impl<'a> BuilderContext<'a> {
    pub fn new(request: &'a RequestContext) -> Self {
        BuilderContext {
            request,
            parent: None,
            depth: 0,
            metadata: Metadata::new(),
        }
    }

    /// A fresh scope for one child builder. Siblings never share a child context.
    pub fn child(&self) -> BuilderContext<'_> {
        BuilderContext {
            request: self.request,
            parent: Some(self),
            depth: self.depth + 1,
            metadata: Metadata::new(),
        }
    }

    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    pub fn parent(&self) -> Option<&BuilderContext<'a>> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl MetadataScope for BuilderContext<'_> {
    fn local_metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn parent_scope(&self) -> Option<&Self> {
        self.parent
    }

    fn local_metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Scope for one node during a filter pass.
pub struct FilterContext<'a> {
    request: &'a RequestContext,
    default_filters: &'a [Arc<dyn NodeFilter>],
    parent: Option<&'a FilterContext<'a>>,
    depth: usize,
    metadata: Metadata,
}

impl<'a> FilterContext<'a> {
    pub fn new(request: &'a RequestContext, default_filters: &'a [Arc<dyn NodeFilter>]) -> Self {
        FilterContext {
            request,
            default_filters,
            parent: None,
            depth: 0,
            metadata: Metadata::new(),
        }
    }

    pub fn child(&self) -> FilterContext<'_> {
        FilterContext {
            request: self.request,
            default_filters: self.default_filters,
            parent: Some(self),
            depth: self.depth + 1,
            metadata: Metadata::new(),
        }
    }

    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    /// Filters applied to every node ahead of the node's own filters.
    pub fn default_filters(&self) -> &'a [Arc<dyn NodeFilter>] {
        self.default_filters
    }

    pub fn parent(&self) -> Option<&FilterContext<'a>> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl MetadataScope for FilterContext<'_> {
    fn local_metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn parent_scope(&self) -> Option<&Self> {
        self.parent
    }

    fn local_metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl std::fmt::Debug for FilterContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterContext")
            .field("request", &self.request.request_id())
            .field("default_filters", &self.default_filters.len())
            .field("depth", &self.depth)
            .field("metadata", &self.metadata)
            .finish()
    }
}
