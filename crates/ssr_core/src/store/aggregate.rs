use std::{collections::BTreeMap, fmt, sync::Arc};

use serde_json::{Map, Value};

use super::metadata::MetadataStore;
use super::observable::Observable;
use super::router::RouterStore;
use super::snapshot::{exclude, to_plain, EMBED_EXCLUSIONS};
use super::styles::StyleCollector;
use crate::config::SsrOptions;
use crate::error::{Result, SsrCoreError};
use crate::metadata::MetadataRegistry;

/// Names of the built-in sub-stores.
pub const ROUTER_KEY: &str = "router";
pub const METADATA_KEY: &str = "metadata";
pub const STYLES_KEY: &str = "styles";

const RESERVED_KEYS: &[&str] = &[ROUTER_KEY, METADATA_KEY, STYLES_KEY];

/// Constructor of a feature sub-store's initial tree.
pub type FeatureInit = Arc<dyn Fn() -> Observable + Send + Sync>;

/// Uninitialized store map: how to build every feature sub-store.
#[derive(Clone, Default)]
pub struct StoreDescriptors {
    features: Vec<(String, FeatureInit)>,
}

impl StoreDescriptors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feature sub-store. Re-registering a name replaces it.
    pub fn with_feature<F>(mut self, name: impl Into<String>, init: F) -> Result<Self>
    where
        F: Fn() -> Observable + Send + Sync + 'static,
    {
        let name = name.into();
        if RESERVED_KEYS.contains(&name.as_str()) {
            return Err(SsrCoreError::ReservedStoreName(name));
        }
        self.features.retain(|(existing, _)| *existing != name);
        self.features.push((name, Arc::new(init)));
        Ok(self)
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|(name, _)| name.as_str())
    }

    /// Build a fresh store.
    pub fn init(&self, options: &SsrOptions) -> Store {
        let registry =
            MetadataRegistry::with_title(options.title_template.clone(), options.default_title.clone());
        Store {
            router: RouterStore::new(),
            metadata: MetadataStore::new(registry),
            styles: StyleCollector::new(),
            features: self
                .features
                .iter()
                .map(|(name, init)| (name.clone(), init()))
                .collect(),
        }
    }
}

impl fmt::Debug for StoreDescriptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.feature_names()).finish()
    }
}

/// The store aggregate of one request (server) or one process (client).
pub struct Store {
    router: RouterStore,
    metadata: MetadataStore,
    styles: StyleCollector,
    features: BTreeMap<String, Observable>,
}

impl Store {
    pub fn router(&self) -> &RouterStore {
        &self.router
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn styles(&self) -> &StyleCollector {
        &self.styles
    }

    pub fn feature(&self, name: &str) -> Option<&Observable> {
        self.features.get(name)
    }

    /// Full plain snapshot, including server-only bookkeeping.
    pub fn snapshot(&self) -> Value {
        let mut root = Map::new();
        root.insert(ROUTER_KEY.to_string(), self.router.to_json());
        root.insert(METADATA_KEY.to_string(), self.metadata.to_json());
        root.insert(STYLES_KEY.to_string(), self.styles.to_json());
        for (name, feature) in &self.features {
            root.insert(name.clone(), to_plain(feature));
        }
        Value::Object(root)
    }

    /// Snapshot safe to embed in the page and hydrate from.
    pub fn embeddable_snapshot(&self) -> Value {
        let mut value = self.snapshot();
        exclude(&mut value, EMBED_EXCLUSIONS);
        value
    }

    /// Merge an embedded snapshot into this store.
    ///
    /// Router state is overwritten, the metadata sub-store takes the skip
    /// lists, feature stores merge per container kind. Unknown keys are
    /// skipped.
    pub fn hydrate(&self, snapshot: &Value) {
        let Value::Object(entries) = snapshot else {
            tracing::warn!("Embedded store snapshot is not an object, skipping hydration");
            return;
        };

        for (key, value) in entries {
            match key.as_str() {
                ROUTER_KEY => self.router.hydrate(value),
                METADATA_KEY => self.metadata.hydrate(value),
                STYLES_KEY => {}
                name => match self.features.get(name) {
                    Some(feature) => {
                        feature.merge_json(value);
                    }
                    None => {
                        tracing::warn!(key = %name, "Skipping unknown key in embedded store snapshot");
                    }
                },
            }
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("router", &self.router.location())
            .field("metadata", &self.metadata)
            .field("styles", &self.styles.len())
            .field("features", &self.features.keys().collect::<Vec<_>>())
            .finish()
    }
}
