use serde::{Deserialize, Serialize};

use crate::skip_list::MetadataCounts;
use crate::view::Attrs;

/// Inline style block contributed by a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleEntry {
    #[serde(default)]
    pub attrs: Attrs,
    pub body: String,
}

impl StyleEntry {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            attrs: Attrs::new(),
            body: body.into(),
        }
    }
}

/// One component's contribution to the document metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub meta: Vec<Attrs>,
    #[serde(default)]
    pub link: Vec<Attrs>,
    #[serde(default)]
    pub style: Vec<StyleEntry>,
    #[serde(default)]
    pub html_attrs: Attrs,
    #[serde(default)]
    pub body_attrs: Attrs,
}

impl MetadataInstance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a `<meta>` tag from `(name, value)` attribute pairs.
    pub fn meta<K, V>(mut self, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.meta.push(collect_attrs(attrs));
        self
    }

    /// Add a `<link>` tag from `(name, value)` attribute pairs.
    pub fn link<K, V>(mut self, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.link.push(collect_attrs(attrs));
        self
    }

    pub fn style(mut self, entry: StyleEntry) -> Self {
        self.style.push(entry);
        self
    }

    pub fn html_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.html_attrs.insert(name.into(), value.into());
        self
    }

    pub fn body_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.body_attrs.insert(name.into(), value.into());
        self
    }

    /// Replace every field with the ones from `fields`.
    ///
    /// Nothing from the previous render survives when the new contribution
    /// omits it.
    pub fn assign(&mut self, fields: MetadataInstance) {
        *self = fields;
    }
}

fn collect_attrs<K, V>(attrs: impl IntoIterator<Item = (K, V)>) -> Attrs
where
    K: Into<String>,
    V: Into<String>,
{
    attrs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Merged view of every registered instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSnapshot {
    /// Title fragment from the last instance that set one.
    pub title_fragment: Option<String>,
    /// Final title after applying the template or default.
    pub full_title: String,
    pub meta: Vec<Attrs>,
    pub link: Vec<Attrs>,
    pub style: Vec<StyleEntry>,
    pub html_attrs: Attrs,
    pub body_attrs: Attrs,
    /// Bumped on every registry mutation.
    pub version: u64,
}

impl MetadataSnapshot {
    /// Merge instances in iteration order.
    ///
    /// List fields concatenate. The title and attribute maps are last
    /// registered wins.
    pub fn merge<'a>(
        instances: impl IntoIterator<Item = &'a MetadataInstance>,
        title_template: Option<&str>,
        default_title: &str,
    ) -> Self {
        let mut snapshot = MetadataSnapshot::default();

        for instance in instances {
            if let Some(title) = instance.title.as_ref().filter(|t| !t.is_empty()) {
                snapshot.title_fragment = Some(title.clone());
            }
            snapshot.meta.extend(instance.meta.iter().cloned());
            snapshot.link.extend(instance.link.iter().cloned());
            snapshot.style.extend(instance.style.iter().cloned());
            snapshot
                .html_attrs
                .extend(instance.html_attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
            snapshot
                .body_attrs
                .extend(instance.body_attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        snapshot.full_title = match (&snapshot.title_fragment, title_template) {
            (Some(fragment), Some(template)) => template.replace("%s", fragment),
            (Some(fragment), None) => fragment.clone(),
            (None, _) => default_title.to_string(),
        };

        snapshot
    }

    /// Entry counts consumed by the skip-list computation.
    pub fn counts(&self) -> MetadataCounts {
        MetadataCounts {
            meta: self.meta.len(),
            link: self.link.len(),
            style: self.style.len(),
        }
    }
}
