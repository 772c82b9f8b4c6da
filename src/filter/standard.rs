use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::{
    config::{DefaultFilterConfig, SiteMapConfig},
    context::FilterContext,
    error::SiteMapError,
    filter::{DefaultFilterProvider, NodeFilter},
    filtered::FilteredNode,
    node::{META_ANONYMOUS_ONLY, META_AUTHENTICATED_ONLY, META_HIDDEN, META_ROLES},
};

/// Drops nodes whose visibility flags exclude the current principal.
#[derive(Debug, Default, Clone, Copy)]
pub struct VisibilityFilter;

impl NodeFilter for VisibilityFilter {
    fn filter(
        &self,
        node: &mut FilteredNode,
        ctx: &mut FilterContext<'_>,
    ) -> Result<bool, SiteMapError> {
        if node.flag(META_HIDDEN) {
            return Ok(false);
        }
        let authenticated = ctx.request().principal().is_authenticated();
        if node.flag(META_AUTHENTICATED_ONLY) && !authenticated {
            return Ok(false);
        }
        if node.flag(META_ANONYMOUS_ONLY) && authenticated {
            return Ok(false);
        }
        Ok(true)
    }
}

/// Keeps a node only if the principal is in one of its required roles. Nodes without a role
/// list are unrestricted.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleFilter;

impl NodeFilter for RoleFilter {
    fn filter(
        &self,
        node: &mut FilteredNode,
        ctx: &mut FilterContext<'_>,
    ) -> Result<bool, SiteMapError> {
        let Some(roles) = node.metadata.get(META_ROLES) else {
            return Ok(true);
        };
        let roles = match roles {
            Value::Array(roles) => roles,
            other => {
                return Err(SiteMapError::Configuration(format!(
                    "node {} has malformed '{META_ROLES}' metadata, expected a list: {other}",
                    node.key
                )))
            }
        };
        if roles.is_empty() {
            return Ok(true);
        }
        let principal = ctx.request().principal();
        Ok(roles
            .iter()
            .filter_map(Value::as_str)
            .any(|role| principal.is_in_role(role)))
    }
}

/// Marks the node whose URL path equals the request path as current. Never drops a node.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentNodeFilter {
    case_sensitive: bool,
}

impl CurrentNodeFilter {
    pub fn new(case_sensitive: bool) -> Self {
        CurrentNodeFilter { case_sensitive }
    }

    fn url_path(url: &str) -> String {
        let path = match Url::parse(url) {
            Ok(absolute) => absolute.path().to_string(),
            Err(_) => url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        normalize(&path)
    }

    pub fn matches(&self, node_url: &str, request_path: &str) -> bool {
        let node_path = Self::url_path(node_url);
        let request_path = normalize(request_path);
        if self.case_sensitive {
            node_path == request_path
        } else {
            node_path.eq_ignore_ascii_case(&request_path)
        }
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

impl NodeFilter for CurrentNodeFilter {
    fn filter(
        &self,
        node: &mut FilteredNode,
        ctx: &mut FilterContext<'_>,
    ) -> Result<bool, SiteMapError> {
        if let Some(url) = node.url.as_deref() {
            if self.matches(url, ctx.request().path()) {
                tracing::trace!("[CurrentNodeFilter::filter] {} is current", node.key);
                node.is_current = true;
            }
        }
        Ok(true)
    }
}

/// The built-in default filters, in the order visibility, roles, current node.
#[derive(Debug, Clone, Default)]
pub struct StandardFilters {
    enabled: DefaultFilterConfig,
    case_sensitive: bool,
}

impl StandardFilters {
    pub fn new(enabled: DefaultFilterConfig, case_sensitive: bool) -> Self {
        StandardFilters {
            enabled,
            case_sensitive,
        }
    }

    pub fn from_config(config: &SiteMapConfig) -> Self {
        Self::new(
            config.default_filters.clone(),
            config.current_node.case_sensitive,
        )
    }
}

impl DefaultFilterProvider for StandardFilters {
    fn filters(&self) -> Vec<Arc<dyn NodeFilter>> {
        let mut filters: Vec<Arc<dyn NodeFilter>> = Vec::new();
        if self.enabled.visibility {
            filters.push(Arc::new(VisibilityFilter));
        }
        if self.enabled.roles {
            filters.push(Arc::new(RoleFilter));
        }
        if self.enabled.current_node {
            filters.push(Arc::new(CurrentNodeFilter::new(self.case_sensitive)));
        }
        filters
    }
}
