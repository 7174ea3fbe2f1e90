use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current location as seen by route handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLocation {
    pub path: String,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

/// Router sub-store.
#[derive(Debug, Default)]
pub struct RouterStore {
    location: RwLock<RouteLocation>,
}

impl RouterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, path: impl Into<String>, query: BTreeMap<String, String>) {
        let mut location = self.location.write().unwrap_or_else(PoisonError::into_inner);
        location.path = path.into();
        location.query = query;
    }

    pub fn location(&self) -> RouteLocation {
        self.location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn path(&self) -> String {
        self.location().path
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.location()).unwrap_or(Value::Null)
    }

    /// Overwrite with an embedded location. Malformed input is ignored.
    pub fn hydrate(&self, incoming: &Value) {
        match RouteLocation::deserialize(incoming) {
            Ok(location) => {
                *self.location.write().unwrap_or_else(PoisonError::into_inner) = location;
            }
            Err(error) => {
                tracing::warn!(%error, "Ignoring malformed router state in embedded snapshot");
            }
        }
    }
}
