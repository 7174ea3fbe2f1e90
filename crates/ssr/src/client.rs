//! Client-side handoff of the server-embedded store snapshot.

use std::sync::{Mutex, PoisonError};

use hydrate_ssr_core::{Section, SkipList, Store};
use serde_json::{Deserializer, Value};

/// One-shot handoff of the snapshot embedded by the server.
///
/// The payload can be taken exactly once; the source is cleared on take so
/// it is never applied twice.
#[derive(Debug, Default)]
pub struct EmbeddedSnapshot {
    payload: Mutex<Option<Value>>,
}

impl EmbeddedSnapshot {
    pub fn new(payload: Value) -> Self {
        Self {
            payload: Mutex::new(Some(payload)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Find `window.<global>=...;` in a served document and parse its JSON.
    pub fn from_document(html: &str, global: &str) -> Self {
        let marker = format!("window.{global}=");
        let payload = html.find(&marker).and_then(|at| {
            let json = &html[at + marker.len()..];
            // Stop at the end of the first JSON value, ignoring the trailing `;`.
            Deserializer::from_str(json).into_iter::<Value>().next()?.ok()
        });
        Self {
            payload: Mutex::new(payload),
        }
    }

    /// Take the payload, leaving nothing behind.
    pub fn take(&self) -> Option<Value> {
        self.payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_present(&self) -> bool {
        self.payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Whether client rehydration must leave `position` in `section` alone.
pub fn should_skip(store: &Store, section: Section, position: usize) -> bool {
    store.metadata().skip_list().should_skip(section, position)
}

/// Skip lists the server handed over, as hydrated into `store`.
pub fn skip_list(store: &Store) -> SkipList {
    store.metadata().skip_list()
}
