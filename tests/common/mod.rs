//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::sync::Arc;

use sitemap_core::{
    NodeBuilder, NodeBuilderExt, RequestContext, RouteTemplateResolver, SiteMapNode, User,
};

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times, subsequent calls are no-ops.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Conventional `/{controller}/{action}/{id?}` routing with `Home/Index` defaults.
pub fn routes() -> Arc<RouteTemplateResolver> {
    Arc::new(
        RouteTemplateResolver::new()
            .route(
                "/{controller}/{action}/{id?}",
                &[("controller", "Home"), ("action", "Index")],
            )
            .expect("route template is valid"),
    )
}

pub fn anonymous(path: &str) -> RequestContext {
    RequestContext::parse(path)
        .expect("test path is a valid URI")
        .with_url_resolver(routes())
}

#[allow(dead_code)]
pub fn signed_in(path: &str, roles: &[&str]) -> RequestContext {
    anonymous(path).with_principal(User::new("ada", roles.iter().copied()))
}

/// Storefront navigation:
///
/// ```text
/// Home                      /
/// ├── Products              /Products
/// │   ├── Shoes             /Products/Category/Shoes
/// │   └── Hats              /Products/Category/Hats
/// ├── Account               /Account            (signed-in only)
/// │   └── Orders            /Account/Orders
/// ├── Sign in               /Account/Login      (anonymous only)
/// └── Admin                 /Admin              (admin role)
/// ```
pub fn storefront() -> impl NodeBuilder + 'static {
    init_logging();
    SiteMapNode::new()
        .for_controller("Home")
        .with_title("Home")
        .with_url_from_route("Index")
        .with_children(vec![
            SiteMapNode::new()
                .for_controller("Products")
                .with_title("Products")
                .with_url_from_route("Index")
                .with_children_from(|_ctx| {
                    Ok(["Shoes", "Hats"]
                        .into_iter()
                        .map(|category| {
                            let values = [
                                ("action".to_string(), "Category".to_string()),
                                ("id".to_string(), category.to_string()),
                            ]
                            .into_iter()
                            .collect();
                            SiteMapNode::new()
                                .with_title(category)
                                .with_url_from_route_values(values)
                                .boxed()
                        })
                        .collect())
                })
                .boxed(),
            SiteMapNode::new()
                .for_controller("Account")
                .with_title("Account")
                .with_url_from_route("Index")
                .authenticated_only()
                .with_children(vec![SiteMapNode::new()
                    .with_title("Orders")
                    .with_url_from_route("Orders")
                    .boxed()])
                .boxed(),
            SiteMapNode::new()
                .for_controller("Account")
                .with_title("Sign in")
                .with_url_from_route("Login")
                .anonymous_only()
                .boxed(),
            SiteMapNode::new()
                .for_controller("Admin")
                .with_title("Admin")
                .with_url_from_route("Index")
                .in_roles(["admin"])
                .boxed(),
        ])
}
