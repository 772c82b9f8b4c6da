//! Application-lifetime registry of named site maps.
//!
//! The host application creates one [`SiteMapHost`] at startup, registers its coordinators and
//! shares the handle (usually as `Arc<SiteMapHost>`) with request handlers. There is no global
//! instance; tests build their own.

use std::{collections::BTreeMap, sync::Arc};

use parking_lot::RwLock;

use crate::{
    coordinator::SiteMapCoordinator, error::SiteMapError, filtered::FilteredTree,
    request::RequestContext,
};

/// Name used by hosts that serve a single site map.
pub const DEFAULT_SITE_MAP: &str = "default";

#[derive(Debug, Default)]
pub struct SiteMapHost {
    coordinators: RwLock<BTreeMap<String, Arc<SiteMapCoordinator>>>,
}

impl SiteMapHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `coordinator` under `name`, returning any coordinator it replaced.
    pub fn register(
        &self,
        name: &str,
        coordinator: SiteMapCoordinator,
    ) -> Result<Option<Arc<SiteMapCoordinator>>, SiteMapError> {
        if name.is_empty() {
            return Err(SiteMapError::invalid_argument(
                "name",
                "site map names must be non-empty",
            ));
        }
        tracing::info!("[SiteMapHost::register] registering site map '{name}'");
        let replaced = self
            .coordinators
            .write()
            .insert(name.to_string(), Arc::new(coordinator));
        if replaced.is_some() {
            tracing::warn!("[SiteMapHost::register] replaced existing site map '{name}'");
        }
        Ok(replaced)
    }

    pub fn unregister(&self, name: &str) -> Option<Arc<SiteMapCoordinator>> {
        self.coordinators.write().remove(name)
    }

    pub fn coordinator(&self, name: &str) -> Result<Arc<SiteMapCoordinator>, SiteMapError> {
        self.coordinators.read().get(name).cloned().ok_or_else(|| {
            SiteMapError::Configuration(format!(
                "root builder not set: no site map named '{name}', call SiteMapHost::register"
            ))
        })
    }

    /// Filtered tree of the site map registered under `name`.
    pub fn root_node(
        &self,
        name: &str,
        request: &RequestContext,
    ) -> Result<FilteredTree, SiteMapError> {
        // The registry lock is released before building or filtering.
        let coordinator = self.coordinator(name)?;
        coordinator.root_node(request)
    }

    pub fn names(&self) -> Vec<String> {
        self.coordinators.read().keys().cloned().collect()
    }
}
