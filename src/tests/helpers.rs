//! Shared test utilities for site map testing

use crate::{
    builder::NodeBuilder,
    context::{BuilderContext, FilterContext},
    error::SiteMapError,
    filter::NodeFilter,
    filtered::FilteredNode,
    node::Node,
};
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A node with a title and the given children
pub fn titled(title: &str, children: Vec<Node>) -> Node {
    init_logging();
    Node {
        title: Some(title.to_string()),
        children,
        ..Default::default()
    }
}

/// A node with a title, a URL and the given children
pub fn linked(title: &str, url: &str, children: Vec<Node>) -> Node {
    Node {
        url: Some(url.to_string()),
        ..titled(title, children)
    }
}

pub fn with_filter(mut node: Node, filter: impl NodeFilter + 'static) -> Node {
    node.filters.push(Arc::new(filter));
    node
}

/// Filter with a fixed verdict
pub struct Verdict(pub bool);

impl NodeFilter for Verdict {
    fn filter(
        &self,
        _node: &mut FilteredNode,
        _ctx: &mut FilterContext<'_>,
    ) -> Result<bool, SiteMapError> {
        Ok(self.0)
    }
}

/// Records `(label, node key)` for every invocation, then keeps the node.
#[derive(Clone)]
pub struct Recorder {
    pub label: &'static str,
    pub log: Arc<Mutex<Vec<(String, String)>>>,
}

impl Recorder {
    pub fn new(label: &'static str, log: &Arc<Mutex<Vec<(String, String)>>>) -> Self {
        Recorder {
            label,
            log: log.clone(),
        }
    }
}

impl NodeFilter for Recorder {
    fn filter(
        &self,
        node: &mut FilteredNode,
        _ctx: &mut FilterContext<'_>,
    ) -> Result<bool, SiteMapError> {
        self.log
            .lock()
            .push((self.label.to_string(), node.key.clone()));
        Ok(true)
    }
}

/// Site map builder returning a fixed tree and counting its invocations. With `fail_after`
/// set, every invocation past that count errors.
pub struct CountingSiteMap {
    pub tree: Node,
    pub builds: Arc<AtomicUsize>,
    pub fail_after: Option<usize>,
    filters: Vec<Arc<dyn NodeFilter>>,
}

impl CountingSiteMap {
    pub fn new(tree: Node) -> Self {
        CountingSiteMap {
            tree,
            builds: Arc::new(AtomicUsize::new(0)),
            fail_after: None,
            filters: Vec::new(),
        }
    }

    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }
}

impl NodeBuilder for CountingSiteMap {
    fn build(&self, _ctx: &mut BuilderContext<'_>) -> Result<Node, SiteMapError> {
        let previous = self.builds.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| previous >= limit) {
            return Err(SiteMapError::Configuration(format!(
                "site map built {} times",
                previous + 1
            )));
        }
        Ok(self.tree.clone())
    }

    fn filters(&self) -> &[Arc<dyn NodeFilter>] {
        &self.filters
    }

    fn filters_mut(&mut self) -> &mut Vec<Arc<dyn NodeFilter>> {
        &mut self.filters
    }
}
