use std::sync::Arc;

use super::instance::MetadataInstance;
use super::registry::{InstanceId, MetadataRegistry};

/// Per-component binding to a [`MetadataRegistry`].
///
/// The rendering integration owns one slot per metadata-producing component:
/// the first `render` registers, later renders update the same instance in
/// place, and dropping the slot (unmount) unregisters it.
#[derive(Debug)]
pub struct MetadataSlot {
    registry: Arc<MetadataRegistry>,
    id: Option<InstanceId>,
}

impl MetadataSlot {
    pub fn new(registry: Arc<MetadataRegistry>) -> Self {
        Self { registry, id: None }
    }

    /// Handle of the registered instance, once rendered.
    pub fn id(&self) -> Option<InstanceId> {
        self.id
    }

    pub fn render(&mut self, data: MetadataInstance) {
        let Some(id) = self.id else {
            self.id = Some(self.registry.add(data));
            return;
        };

        if let Err(error) = self.registry.update(id, data) {
            tracing::warn!(instance = %id, %error, "Ignoring update of stale metadata instance");
        }
    }

    /// Unregister now instead of on drop.
    pub fn unmount(&mut self) {
        if let Some(id) = self.id.take() {
            self.registry.remove(id);
        }
    }
}

impl Drop for MetadataSlot {
    fn drop(&mut self) {
        self.unmount();
    }
}
