//! Tests for builder chains and decorators

use super::helpers::*;
use crate::{
    builder::{NodeBuilder, NodeBuilderExt, SiteMapNode},
    context::{BuilderContext, MetadataScope, CONTROLLER_KEY},
    error::SiteMapError,
    node::{META_AUTHENTICATED_ONLY, META_HIDDEN, META_ROLES},
    request::{RequestContext, RouteTemplateResolver, RouteValues},
};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use test_log::test;

fn routed_request(path: &str) -> RequestContext {
    let routes = RouteTemplateResolver::new()
        .route(
            "/{controller}/{action}/{id?}",
            &[("controller", "Home"), ("action", "Index")],
        )
        .unwrap();
    RequestContext::parse(path)
        .unwrap()
        .with_url_resolver(Arc::new(routes))
}

fn build(
    builder: &dyn NodeBuilder,
    request: &RequestContext,
) -> Result<crate::node::Node, SiteMapError> {
    let mut ctx = BuilderContext::new(request);
    builder.build(&mut ctx)
}

#[test]
fn test_base_builder_yields_zero_value() {
    let request = RequestContext::parse("/").unwrap();
    let node = build(&SiteMapNode::new(), &request).unwrap();
    assert!(node.title.is_none());
    assert!(node.description.is_none());
    assert!(node.url.is_none());
    assert!(node.target.is_none());
    assert!(node.children.is_empty());
    assert!(node.filters.is_empty());
}

#[test]
fn test_decorators_accumulate_on_one_node() {
    let request = RequestContext::parse("/").unwrap();
    let chain = SiteMapNode::new()
        .with_title("Docs")
        .with_description("Reference material")
        .with_url("https://docs.example.com")
        .with_target("_blank")
        .with_metadata("icon", "book")
        .authenticated_only()
        .in_roles(["staff", "admin"]);
    let node = build(&chain, &request).unwrap();

    assert_eq!(node.title.as_deref(), Some("Docs"));
    assert_eq!(node.description.as_deref(), Some("Reference material"));
    assert_eq!(node.url.as_deref(), Some("https://docs.example.com"));
    assert_eq!(node.target.as_deref(), Some("_blank"));
    assert_eq!(node.metadata["icon"], Value::from("book"));
    assert!(node.flag(META_AUTHENTICATED_ONLY));
    assert!(!node.flag(META_HIDDEN));
    assert_eq!(node.metadata[META_ROLES], serde_json::json!(["staff", "admin"]));
    assert!(node.children.is_empty());
}

#[test]
fn test_outer_decorator_overrides_inner() {
    let request = RequestContext::parse("/").unwrap();
    let chain = SiteMapNode::new().with_title("Draft").with_title("Final");
    assert_eq!(build(&chain, &request).unwrap().title.as_deref(), Some("Final"));
}

#[test]
fn test_filters_reach_the_base_through_decorators() {
    let request = RequestContext::parse("/").unwrap();
    let chain = SiteMapNode::new()
        .add_filter(Verdict(true))
        .with_title("Home")
        .hidden()
        .add_filter(Verdict(false));
    assert_eq!(chain.filters().len(), 2);
    let node = build(&chain, &request).unwrap();
    assert_eq!(node.filters.len(), 2);
}

#[test]
fn test_children_are_distinct_subtrees() {
    let request = RequestContext::parse("/").unwrap();
    let chain = SiteMapNode::new().with_title("Home").with_children(vec![
        SiteMapNode::new().with_title("About").boxed(),
        SiteMapNode::new()
            .with_title("Blog")
            .with_children(vec![SiteMapNode::new().with_title("Archive").boxed()])
            .boxed(),
    ]);
    let node = build(&chain, &request).unwrap();
    let titles: Vec<_> = node
        .children
        .iter()
        .map(|c| c.title.as_deref().unwrap())
        .collect();
    assert_eq!(titles, vec!["About", "Blog"]);
    assert_eq!(node.children[1].children[0].title.as_deref(), Some("Archive"));
    assert_eq!(node.subtree_size(), 4);
}

#[test]
fn test_with_children_replaces_earlier_children() {
    let request = RequestContext::parse("/").unwrap();
    let chain = SiteMapNode::new()
        .with_children(vec![SiteMapNode::new().with_title("Old").boxed()])
        .with_children(vec![SiteMapNode::new().with_title("New").boxed()]);
    let node = build(&chain, &request).unwrap();
    assert_eq!(node.children.len(), 1);
    assert_eq!(node.children[0].title.as_deref(), Some("New"));
}

#[test]
fn test_controller_flows_to_descendant_urls() {
    let request = routed_request("/");
    let chain = SiteMapNode::new()
        .for_controller("Products")
        .with_title("Products")
        .with_url_from_route("Index")
        .with_children(vec![
            SiteMapNode::new()
                .with_title("Detail")
                .with_url_from_route("Detail")
                .boxed(),
            SiteMapNode::new()
                .for_controller("Admin")
                .with_title("Manage")
                .with_url_from_route("Products")
                .boxed(),
            SiteMapNode::new()
                .with_title("Compare")
                .with_url_from_route("Compare")
                .boxed(),
        ]);
    let node = build(&chain, &request).unwrap();

    assert_eq!(node.url.as_deref(), Some("/Products"));
    let urls: Vec<_> = node
        .children
        .iter()
        .map(|c| c.url.as_deref().unwrap())
        .collect();
    // The "Admin" override stays inside its own subtree.
    assert_eq!(urls, vec!["/Products/Detail", "/Admin/Products", "/Products/Compare"]);
}

#[test]
fn test_explicit_route_values_need_no_controller() {
    let request = routed_request("/");
    let mut values = RouteValues::new();
    values.insert("controller".to_string(), "Blog".to_string());
    values.insert("action".to_string(), "Post".to_string());
    values.insert("id".to_string(), "42".to_string());
    let chain = SiteMapNode::new().with_url_from_route_values(values);
    assert_eq!(
        build(&chain, &request).unwrap().url.as_deref(),
        Some("/Blog/Post/42")
    );
}

#[test]
fn test_missing_controller_names_the_decorator() {
    let request = routed_request("/");
    let chain = SiteMapNode::new()
        .with_title("Orphan")
        .with_url_from_route("Index");
    let err = build(&chain, &request).unwrap_err();
    match err {
        SiteMapError::MissingMetadata { key, hint } => {
            assert_eq!(key, CONTROLLER_KEY);
            assert!(hint.contains("for_controller()"));
        }
        other => panic!("expected MissingMetadata, got {other:?}"),
    }
}

#[test]
fn test_controller_set_outside_the_url_decorator_is_not_visible() {
    // for_controller wraps with_url_from_route, so it runs after the URL was resolved.
    let request = routed_request("/");
    let chain = SiteMapNode::new()
        .with_url_from_route("Index")
        .for_controller("Products");
    assert!(matches!(
        build(&chain, &request),
        Err(SiteMapError::MissingMetadata { .. })
    ));
}

#[test]
fn test_empty_metadata_key_is_invalid() {
    let request = RequestContext::parse("/").unwrap();
    let chain = SiteMapNode::new().with_metadata("", true);
    assert!(matches!(
        build(&chain, &request),
        Err(SiteMapError::InvalidArgument { ref param, .. }) if param == "key"
    ));
}

#[test]
fn test_generator_children_see_the_parent_context() {
    let request = routed_request("/");
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let chain = SiteMapNode::new()
        .for_controller("Catalog")
        .with_title("Catalog")
        .with_children_from(move |ctx| {
            counted.fetch_add(1, Ordering::SeqCst);
            let controller: String = ctx.metadata(CONTROLLER_KEY, true)?;
            Ok(["Shoes", "Hats"]
                .iter()
                .map(|category| {
                    let mut values = RouteValues::new();
                    values.insert("action".to_string(), "Category".to_string());
                    values.insert("id".to_string(), category.to_string());
                    SiteMapNode::new()
                        .with_title(format!("{controller}: {category}"))
                        .with_url_from_route_values(values)
                        .boxed()
                })
                .collect())
        });
    let node = build(&chain, &request).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let children: Vec<_> = node
        .children
        .iter()
        .map(|c| (c.title.clone().unwrap(), c.url.clone().unwrap()))
        .collect();
    assert_eq!(
        children,
        vec![
            ("Catalog: Shoes".to_string(), "/Catalog/Category/Shoes".to_string()),
            ("Catalog: Hats".to_string(), "/Catalog/Category/Hats".to_string()),
        ]
    );
}

#[test]
fn test_generator_errors_propagate() {
    let request = RequestContext::parse("/").unwrap();
    let chain = SiteMapNode::new().with_children_from(|_ctx| {
        Err(SiteMapError::Configuration("catalog unavailable".to_string()))
    });
    assert!(matches!(
        build(&chain, &request),
        Err(SiteMapError::Configuration(_))
    ));
}

#[test]
fn test_child_builders_get_their_own_context() {
    let request = RequestContext::parse("/").unwrap();
    let depths = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let recorded = depths.clone();
    let chain = SiteMapNode::new().with_children_from(move |ctx| {
        recorded.lock().push(ctx.depth());
        Ok(vec![SiteMapNode::new().boxed()])
    });
    let mut root_ctx = BuilderContext::new(&request);
    chain.build(&mut root_ctx).unwrap();
    assert_eq!(depths.lock().clone(), vec![0]);
    assert!(!root_ctx.contains_metadata(CONTROLLER_KEY, true));
}

#[test]
fn test_decorated_exposes_its_parts() {
    let request = RequestContext::parse("/").unwrap();
    let chain = SiteMapNode::new().with_title("Inner").with_url("/inner");
    assert_eq!(chain.decoration().0, "/inner");

    let node = build(chain.inner(), &request).unwrap();
    assert_eq!(node.title.as_deref(), Some("Inner"));
    assert!(node.url.is_none());
    assert!(node.is_leaf());
}

#[test]
fn test_first_matching_route_template_wins() {
    let routes = RouteTemplateResolver::new()
        .route("/blog/{slug}", &[])
        .unwrap()
        .route(
            "/{controller}/{action}/{id?}",
            &[("controller", "Home"), ("action", "Index")],
        )
        .unwrap();
    assert_eq!(routes.templates().len(), 2);
    assert_eq!(routes.templates()[0].pattern(), "/blog/{slug}");

    let request = RequestContext::parse("/")
        .unwrap()
        .with_url_resolver(Arc::new(routes));
    let mut post = RouteValues::new();
    post.insert("slug".to_string(), "hello".to_string());
    assert_eq!(request.resolve_url(&post).unwrap(), "/blog/hello");
}
