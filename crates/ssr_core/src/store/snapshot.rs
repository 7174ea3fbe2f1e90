//! Plain JSON snapshots of store trees.

use serde_json::{Map, Value};

use super::observable::Observable;

/// Key of the placeholder that replaces a cyclic reference.
pub const CIRCULAR_KEY: &str = "$circular";

/// Fields removed before the snapshot is embedded in the page: collected
/// styles, registered metadata instances and preload bookkeeping.
pub const EMBED_EXCLUSIONS: &[&str] = &[
    "/styles",
    "/metadata/instances",
    "/metadata/ssrData/preloadModules",
];

/// Depth-first structural copy of `root`.
///
/// A container that is its own ancestor is replaced by
/// `{"$circular": "<pointer to the ancestor>"}` instead of being walked
/// again. `Map` containers are exported as objects.
pub fn to_plain(root: &Observable) -> Value {
    let mut ancestors = Vec::new();
    walk(root, String::new(), &mut ancestors)
}

fn walk(node: &Observable, pointer: String, ancestors: &mut Vec<(usize, String)>) -> Value {
    let Some(identity) = node.identity() else {
        return node.as_value().cloned().unwrap_or(Value::Null);
    };

    if let Some((_, at)) = ancestors.iter().find(|(id, _)| *id == identity) {
        let mut placeholder = Map::new();
        placeholder.insert(CIRCULAR_KEY.to_string(), Value::String(at.clone()));
        return Value::Object(placeholder);
    }

    ancestors.push((identity, pointer.clone()));
    let entries = node.entries();
    let value = match node {
        Observable::List(_) => Value::Array(
            entries
                .into_iter()
                .map(|(key, child)| walk(&child, child_pointer(&pointer, &key), ancestors))
                .collect(),
        ),
        _ => Value::Object(
            entries
                .into_iter()
                .map(|(key, child)| {
                    let value = walk(&child, child_pointer(&pointer, &key), ancestors);
                    (key, value)
                })
                .collect(),
        ),
    };
    ancestors.pop();
    value
}

fn child_pointer(parent: &str, key: &str) -> String {
    format!("{parent}/{}", key.replace('~', "~0").replace('/', "~1"))
}

/// Remove the fields at the given JSON pointers. Missing paths are ignored.
pub fn exclude(value: &mut Value, pointers: &[&str]) {
    for pointer in pointers {
        let Some((parent, key)) = pointer.rsplit_once('/') else {
            continue;
        };
        let key = key.replace("~1", "/").replace("~0", "~");
        if let Some(Value::Object(fields)) = value.pointer_mut(parent) {
            fields.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_self_reference_becomes_placeholder() {
        let node = Observable::from_json(&json!({"name": "root", "tags": ["a"]}));
        node.set("me", node.clone());

        let plain = to_plain(&node);

        assert_eq!(
            plain,
            json!({"name": "root", "tags": ["a"], "me": {"$circular": ""}})
        );
        // The placeholder survives a JSON round trip unchanged.
        let decoded: Value = serde_json::from_str(&plain.to_string()).unwrap();
        assert_eq!(decoded["me"][CIRCULAR_KEY], "");
        assert_eq!(decoded["name"], "root");
    }

    #[test]
    fn test_deep_cycle_points_at_ancestor() {
        let parent = Observable::object();
        let child = Observable::list();
        parent.set("child", child.clone());
        child.push(Observable::value(1));
        child.push(parent.clone());

        let plain = to_plain(&Observable::object().with("root", parent));

        assert_eq!(
            plain,
            json!({"root": {"child": [1, {"$circular": "/root"}]}})
        );
    }

    #[test]
    fn test_shared_non_cyclic_reference_is_copied() {
        let shared = Observable::from_json(&json!({"x": 1}));
        let root = Observable::object()
            .with("a", shared.clone())
            .with("b", shared);

        assert_eq!(to_plain(&root), json!({"a": {"x": 1}, "b": {"x": 1}}));
    }

    #[test]
    fn test_pointer_segments_are_escaped() {
        let inner = Observable::object();
        inner.set("loop", inner.clone());
        let root = Observable::object().with("a/b", inner);

        assert_eq!(
            to_plain(&root),
            json!({"a/b": {"loop": {"$circular": "/a~1b"}}})
        );
    }

    #[test]
    fn test_exclude_removes_only_named_fields() {
        let mut value = json!({
            "styles": ["a{}"],
            "metadata": {"title": "x", "instances": [], "ssrData": {"headSkip": [3], "preloadModules": ["1"]}},
            "feature": {"n": 1}
        });

        exclude(&mut value, EMBED_EXCLUSIONS);

        assert_eq!(
            value,
            json!({
                "metadata": {"title": "x", "ssrData": {"headSkip": [3]}},
                "feature": {"n": 1}
            })
        );
    }

    #[test]
    fn test_exclude_ignores_missing_paths() {
        let mut value = json!({"a": 1});
        exclude(&mut value, &["/metadata/instances", "/b"]);
        assert_eq!(value, json!({"a": 1}));
    }
}
