use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use serde_json::Value;

/// Shared field table of an object-like container.
pub type Fields = Arc<RwLock<BTreeMap<String, Observable>>>;

/// Shared item list of a sequence-like container.
pub type Items = Arc<RwLock<Vec<Observable>>>;

/// A node of a feature store tree.
///
/// Containers are shared handles, so a tree may reference the same
/// container twice or even contain itself. The variant decides how an
/// embedded snapshot is merged into it while hydrating:
///
/// - `Object`: every field in the snapshot is merged into the matching field,
///   one level deep. An `Object` field is replaced, not merged.
/// - `Map`: keys in the snapshot replace their entries, other keys stay.
/// - `List`: replaced wholesale.
/// - `Value`: overwritten.
#[derive(Clone)]
pub enum Observable {
    Value(Value),
    Object(Fields),
    Map(Fields),
    List(Items),
}

impl Observable {
    pub fn value(value: impl Into<Value>) -> Self {
        Observable::Value(value.into())
    }

    pub fn object() -> Self {
        Observable::Object(Arc::default())
    }

    pub fn map() -> Self {
        Observable::Map(Arc::default())
    }

    pub fn list() -> Self {
        Observable::List(Arc::default())
    }

    /// Build a tree from plain JSON. Objects become `Object`, arrays `List`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(entries) => {
                let fields = entries
                    .iter()
                    .map(|(key, value)| (key.clone(), Observable::from_json(value)))
                    .collect();
                Observable::Object(Arc::new(RwLock::new(fields)))
            }
            Value::Array(items) => {
                let items = items.iter().map(Observable::from_json).collect();
                Observable::List(Arc::new(RwLock::new(items)))
            }
            other => Observable::Value(other.clone()),
        }
    }

    /// Builder form of [`Observable::set`].
    pub fn with(self, key: impl Into<String>, value: Observable) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field on an `Object` or `Map`. Ignored on other variants.
    pub fn set(&self, key: impl Into<String>, value: Observable) {
        if let Some(fields) = self.fields() {
            fields
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key.into(), value);
        }
    }

    /// Field of an `Object` or `Map`.
    pub fn get(&self, key: &str) -> Option<Observable> {
        let fields = self.fields()?;
        let fields = fields.read().unwrap_or_else(PoisonError::into_inner);
        fields.get(key).cloned()
    }

    /// Append to a `List`. Ignored on other variants.
    pub fn push(&self, item: Observable) {
        if let Observable::List(items) = self {
            items
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .push(item);
        }
    }

    /// Scalar payload of a `Value`.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Observable::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Cloned entries of a container, taken without holding the lock after return.
    pub(crate) fn entries(&self) -> Vec<(String, Observable)> {
        match self {
            Observable::Object(fields) | Observable::Map(fields) => fields
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            Observable::List(items) => items
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect(),
            Observable::Value(_) => Vec::new(),
        }
    }

    /// Identity of the underlying container, `None` for scalars.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Observable::Object(fields) | Observable::Map(fields) => {
                Some(Arc::as_ptr(fields) as *const () as usize)
            }
            Observable::List(items) => Some(Arc::as_ptr(items) as *const () as usize),
            Observable::Value(_) => None,
        }
    }

    fn fields(&self) -> Option<&Fields> {
        match self {
            Observable::Object(fields) | Observable::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Merge an embedded snapshot into this node.
    ///
    /// Returns the node that should take this node's place: containers are
    /// updated in place and return themselves, lists and scalars are
    /// replaced.
    pub fn merge_json(&self, incoming: &Value) -> Observable {
        match (self, incoming) {
            (Observable::Object(fields), Value::Object(entries)) => {
                for (key, value) in entries {
                    // Never hold the lock across the recursive merge.
                    let current = fields
                        .read()
                        .unwrap_or_else(PoisonError::into_inner)
                        .get(key)
                        .cloned();
                    let merged = match current {
                        Some(current) => current.merge_field(value),
                        None => Observable::from_json(value),
                    };
                    fields
                        .write()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(key.clone(), merged);
                }
                self.clone()
            }
            (Observable::Map(fields), Value::Object(entries)) => {
                let mut fields = fields.write().unwrap_or_else(PoisonError::into_inner);
                for (key, value) in entries {
                    fields.insert(key.clone(), Observable::from_json(value));
                }
                drop(fields);
                self.clone()
            }
            (Observable::List(items), Value::Array(values)) => {
                let replacement = values.iter().map(Observable::from_json).collect();
                *items.write().unwrap_or_else(PoisonError::into_inner) = replacement;
                self.clone()
            }
            (_, value) => Observable::from_json(value),
        }
    }

    /// Merge one field of an `Object`. Only maps and lists keep their identity.
    fn merge_field(&self, incoming: &Value) -> Observable {
        match self {
            Observable::Object(_) => Observable::from_json(incoming),
            _ => self.merge_json(incoming),
        }
    }
}

impl From<Value> for Observable {
    fn from(value: Value) -> Self {
        Observable::from_json(&value)
    }
}

impl fmt::Debug for Observable {
    // Containers may be cyclic, print only their shape.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observable::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Observable::Object(_) => write!(f, "Object({} fields)", self.entries().len()),
            Observable::Map(_) => write!(f, "Map({} entries)", self.entries().len()),
            Observable::List(_) => write!(f, "List({} items)", self.entries().len()),
        }
    }
}
