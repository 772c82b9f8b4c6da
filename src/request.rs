//! Request identity and the host-supplied capabilities it carries.
//!
//! The core never inspects a [`RequestContext`] beyond equality and forwarding. Filters and
//! decorators reach authentication state through [`Principal`] and route-to-URL generation through
//! [`UrlResolver`], both of which the hosting framework provides.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Debug, Formatter},
    sync::Arc,
};

use http::{Method, Uri};
use once_cell::sync::Lazy;
use regex::Regex;
use url::form_urlencoded;
use uuid::Uuid;

use crate::error::SiteMapError;

/// Route values (`controller`, `action`, `id`, ...) used to generate URLs.
pub type RouteValues = BTreeMap<String, String>;

/// Authentication and role lookup for the user behind a request.
pub trait Principal: Send + Sync + Debug {
    fn name(&self) -> Option<&str>;
    fn is_authenticated(&self) -> bool;
    fn is_in_role(&self, role: &str) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl Principal for Anonymous {
    fn name(&self) -> Option<&str> {
        None
    }

    fn is_authenticated(&self) -> bool {
        false
    }

    fn is_in_role(&self, _role: &str) -> bool {
        false
    }
}

/// An authenticated user with a fixed role set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub roles: BTreeSet<String>,
}

impl User {
    pub fn new<I, S>(name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        User {
            name: name.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl Principal for User {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn is_authenticated(&self) -> bool {
        true
    }

    fn is_in_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Route-to-URL generation, normally backed by the web framework's routing table.
pub trait UrlResolver: Send + Sync + Debug {
    fn resolve(
        &self,
        values: &RouteValues,
        request: &RequestContext,
    ) -> Result<String, SiteMapError>;
}

/// Resolver used when the host registered no routes. Every resolution fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRoutes;

impl UrlResolver for NoRoutes {
    fn resolve(
        &self,
        values: &RouteValues,
        _request: &RequestContext,
    ) -> Result<String, SiteMapError> {
        Err(SiteMapError::UrlResolution(format!(
            "no route table configured, cannot resolve {values:?}"
        )))
    }
}

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?P<optional>\?)?\}$")
        .expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param { name: String, optional: bool },
}

/// One route pattern such as `/{controller}/{action}/{id?}` plus its default values.
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    pattern: String,
    segments: Vec<Segment>,
    defaults: RouteValues,
}

impl RouteTemplate {
    pub fn parse(pattern: &str, defaults: RouteValues) -> Result<Self, SiteMapError> {
        let segments = pattern
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match PLACEHOLDER.captures(s) {
                Some(caps) => Ok(Segment::Param {
                    name: caps["name"].to_string(),
                    optional: caps.name("optional").is_some(),
                }),
                None if s.contains(['{', '}']) => Err(SiteMapError::invalid_argument(
                    "pattern",
                    format!("'{s}' in '{pattern}' is not a literal or {{name}} segment"),
                )),
                None => Ok(Segment::Literal(s.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RouteTemplate {
            pattern: pattern.to_string(),
            segments,
            defaults,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn has_param(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Param { name: n, .. } if n == name))
    }

    /// Fill the template, or `None` when `values` cannot satisfy it.
    fn fill(&self, values: &RouteValues) -> Option<String> {
        // Defaults that are not template parameters act as constraints.
        for (key, default) in &self.defaults {
            if !self.has_param(key) && values.get(key).is_some_and(|v| v != default) {
                return None;
            }
        }

        let mut parts: Vec<(String, bool)> = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => parts.push((text.clone(), false)),
                Segment::Param { name, optional } => {
                    let default = self.defaults.get(name);
                    match (values.get(name), default) {
                        (Some(value), Some(default)) => {
                            parts.push((value.clone(), value.eq_ignore_ascii_case(default)))
                        }
                        (Some(value), None) => parts.push((value.clone(), false)),
                        (None, Some(default)) => parts.push((default.clone(), true)),
                        (None, None) if *optional => parts.push((String::new(), true)),
                        (None, None) => return None,
                    }
                }
            }
        }

        // Trailing segments that only restate defaults are dropped.
        while parts.last().is_some_and(|(_, droppable)| *droppable) {
            parts.pop();
        }
        if parts.iter().any(|(text, _)| text.is_empty()) {
            return None;
        }

        let mut url = format!(
            "/{}",
            parts
                .iter()
                .map(|(text, _)| text.as_str())
                .collect::<Vec<_>>()
                .join("/")
        );

        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut has_query = false;
        for (key, value) in values {
            if !self.has_param(key) && !self.defaults.contains_key(key) {
                query.append_pair(key, value);
                has_query = true;
            }
        }
        if has_query {
            url.push('?');
            url.push_str(&query.finish());
        }
        Some(url)
    }
}

/// Ordered route table. The first template that can be filled wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTemplateResolver {
    templates: Vec<RouteTemplate>,
}

impl RouteTemplateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, defaults: &[(&str, &str)]) -> Result<Self, SiteMapError> {
        let defaults = defaults
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.templates.push(RouteTemplate::parse(pattern, defaults)?);
        Ok(self)
    }

    pub fn templates(&self) -> &[RouteTemplate] {
        &self.templates
    }
}

impl UrlResolver for RouteTemplateResolver {
    fn resolve(
        &self,
        values: &RouteValues,
        _request: &RequestContext,
    ) -> Result<String, SiteMapError> {
        for template in &self.templates {
            if let Some(url) = template.fill(values) {
                tracing::trace!(
                    "[RouteTemplateResolver::resolve] {values:?} -> {url} via {}",
                    template.pattern()
                );
                return Ok(url);
            }
        }
        Err(SiteMapError::UrlResolution(format!(
            "no route template matched {values:?}"
        )))
    }
}

/// The per-request identity handed to [`crate::SiteMapCoordinator::root_node`].
///
/// Two contexts are equal only when they share a `request_id`; clones compare equal.
#[derive(Clone)]
pub struct RequestContext {
    request_id: Uuid,
    method: Method,
    uri: Uri,
    principal: Arc<dyn Principal>,
    url_resolver: Arc<dyn UrlResolver>,
}

impl RequestContext {
    pub fn new(uri: Uri) -> Self {
        RequestContext {
            request_id: Uuid::new_v4(),
            method: Method::GET,
            uri,
            principal: Arc::new(Anonymous),
            url_resolver: Arc::new(NoRoutes),
        }
    }

    pub fn parse(uri: &str) -> Result<Self, SiteMapError> {
        let uri = uri
            .parse::<Uri>()
            .map_err(|e| SiteMapError::invalid_argument("uri", e.to_string()))?;
        Ok(Self::new(uri))
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_principal(mut self, principal: impl Principal + 'static) -> Self {
        self.principal = Arc::new(principal);
        self
    }

    pub fn with_url_resolver(mut self, resolver: Arc<dyn UrlResolver>) -> Self {
        self.url_resolver = resolver;
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn principal(&self) -> &dyn Principal {
        self.principal.as_ref()
    }

    pub fn url_resolver(&self) -> &dyn UrlResolver {
        self.url_resolver.as_ref()
    }

    /// Resolve route values through this request's [`UrlResolver`].
    pub fn resolve_url(&self, values: &RouteValues) -> Result<String, SiteMapError> {
        self.url_resolver.resolve(values, self)
    }
}

impl PartialEq for RequestContext {
    fn eq(&self, other: &Self) -> bool {
        self.request_id == other.request_id
    }
}

impl Eq for RequestContext {}

impl Debug for RequestContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("principal", &self.principal)
            .finish()
    }
}
