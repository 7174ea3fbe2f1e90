use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::instance::{MetadataInstance, MetadataSnapshot};
use crate::error::{Result, SsrCoreError};

/// Stable handle for a registered instance.
///
/// Handles are allocated in increasing order, so ordering by handle is
/// ordering by registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl InstanceId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    version: u64,
    instances: BTreeMap<InstanceId, MetadataInstance>,
}

/// Live metadata contributions for one page.
///
/// Every mutation recomputes the merged snapshot and publishes it on a
/// `watch` channel, so the page always observes the latest aggregate no
/// matter how many render passes happen before it settles.
pub struct MetadataRegistry {
    inner: RwLock<RegistryInner>,
    title_template: Option<String>,
    default_title: String,
    changes: watch::Sender<Arc<MetadataSnapshot>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::with_title(None, String::new())
    }

    /// Create a registry that formats titles with `template` (`%s` placeholder)
    /// and falls back to `default_title`.
    pub fn with_title(title_template: Option<String>, default_title: String) -> Self {
        let initial = MetadataSnapshot::merge(
            std::iter::empty(),
            title_template.as_deref(),
            &default_title,
        );
        let (changes, _) = watch::channel(Arc::new(initial));
        Self {
            inner: RwLock::new(RegistryInner::default()),
            title_template,
            default_title,
            changes,
        }
    }

    /// Register a new instance and return its handle.
    pub fn add(&self, instance: MetadataInstance) -> InstanceId {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = InstanceId(inner.next_id);
        inner.next_id += 1;
        inner.instances.insert(id, instance);
        self.publish(&mut inner);
        id
    }

    /// Replace the fields of a registered instance in place.
    ///
    /// Returns [`SsrCoreError::StaleInstance`] if the handle was never
    /// registered or was already removed. Callers may ignore it.
    pub fn update(&self, id: InstanceId, fields: MetadataInstance) -> Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let Some(instance) = inner.instances.get_mut(&id) else {
            return Err(SsrCoreError::StaleInstance(id.0));
        };
        instance.assign(fields);
        self.publish(&mut inner);
        Ok(())
    }

    /// Unregister an instance. Removing twice is harmless.
    ///
    /// Returns whether the instance was registered.
    pub fn remove(&self, id: InstanceId) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let removed = inner.instances.remove(&id).is_some();
        if removed {
            self.publish(&mut inner);
        }
        removed
    }

    /// Latest merged snapshot.
    pub fn snapshot(&self) -> Arc<MetadataSnapshot> {
        self.changes.borrow().clone()
    }

    /// Receive every future snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<MetadataSnapshot>> {
        self.changes.subscribe()
    }

    /// Registered instances in registration order.
    pub fn instances(&self) -> Vec<(InstanceId, MetadataInstance)> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .instances
            .iter()
            .map(|(id, instance)| (*id, instance.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish(&self, inner: &mut RegistryInner) {
        inner.version += 1;
        let mut snapshot = MetadataSnapshot::merge(
            inner.instances.values(),
            self.title_template.as_deref(),
            &self.default_title,
        );
        snapshot.version = inner.version;
        self.changes.send_replace(Arc::new(snapshot));
    }
}

impl Default for MetadataRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MetadataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataRegistry")
            .field("instances", &self.len())
            .field("version", &self.snapshot().version)
            .finish()
    }
}
