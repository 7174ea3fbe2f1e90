use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::metadata::{MetadataRegistry, MetadataSnapshot};
use crate::skip_list::SkipList;

/// Server-to-client bookkeeping carried by the metadata sub-store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrData {
    #[serde(flatten)]
    pub skip: SkipList,
    /// Server module ids required while rendering, in first-use order.
    #[serde(default)]
    pub preload_modules: Vec<String>,
}

/// Metadata sub-store: the per-page registry plus SSR bookkeeping.
#[derive(Debug)]
pub struct MetadataStore {
    registry: Arc<MetadataRegistry>,
    ssr_data: RwLock<SsrData>,
}

impl MetadataStore {
    pub fn new(registry: MetadataRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            ssr_data: RwLock::new(SsrData::default()),
        }
    }

    pub fn registry(&self) -> &Arc<MetadataRegistry> {
        &self.registry
    }

    pub fn snapshot(&self) -> Arc<MetadataSnapshot> {
        self.registry.snapshot()
    }

    /// Record that a server module was used by this render.
    pub fn require_module(&self, id: impl Into<String>) {
        let id = id.into();
        let mut data = self.ssr_data.write().unwrap_or_else(PoisonError::into_inner);
        if !data.preload_modules.contains(&id) {
            data.preload_modules.push(id);
        }
    }

    pub fn preload_modules(&self) -> Vec<String> {
        self.ssr_data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .preload_modules
            .clone()
    }

    pub fn set_skip_list(&self, skip: SkipList) {
        self.ssr_data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .skip = skip;
    }

    pub fn skip_list(&self) -> SkipList {
        self.ssr_data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .skip
            .clone()
    }

    pub fn to_json(&self) -> Value {
        let mut value = serde_json::to_value(&*self.snapshot()).unwrap_or_else(|_| json!({}));
        let instances: Vec<Value> = self
            .registry
            .instances()
            .into_iter()
            .map(|(id, instance)| json!({"id": id, "fields": instance}))
            .collect();
        let ssr_data = {
            let data = self.ssr_data.read().unwrap_or_else(PoisonError::into_inner);
            serde_json::to_value(&*data).unwrap_or(Value::Null)
        };
        if let Value::Object(fields) = &mut value {
            fields.insert("instances".to_string(), Value::from(instances));
            fields.insert("ssrData".to_string(), ssr_data);
        }
        value
    }

    /// Take the skip lists from an embedded snapshot.
    ///
    /// Everything else is rebuilt by the client's own metadata instances.
    pub fn hydrate(&self, incoming: &Value) {
        let Some(ssr_data) = incoming.get("ssrData") else {
            return;
        };
        match SkipList::deserialize(ssr_data) {
            Ok(skip) => self.set_skip_list(skip),
            Err(error) => {
                tracing::warn!(%error, "Ignoring malformed skip lists in embedded snapshot");
            }
        }
    }
}
