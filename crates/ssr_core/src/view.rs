//! Minimal render tree and the rendering engine seam.
//!
//! The tree is the "draw target" handed from route resolution to the
//! renderer. Any engine can be plugged in through [`Renderer`]; the bundled
//! [`HtmlRenderer`] writes plain HTML.

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::escape::{escape_attr, escape_text};
use crate::store::Store;

/// Attribute map. Ordered so rendering is deterministic.
pub type Attrs = BTreeMap<String, String>;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// A node in the render tree.
#[derive(Clone)]
pub enum View {
    Element {
        tag: String,
        attrs: Attrs,
        children: Vec<View>,
    },
    Text(String),
    /// Pre-rendered markup inserted verbatim.
    Raw(String),
    Fragment(Vec<View>),
    /// Makes a store available to the subtree. Renders only its child.
    Provider { store: Arc<Store>, child: Box<View> },
}

impl View {
    pub fn element(tag: impl Into<String>) -> Self {
        View::Element {
            tag: tag.into(),
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        View::Text(text.into())
    }

    pub fn raw(html: impl Into<String>) -> Self {
        View::Raw(html.into())
    }

    pub fn fragment(children: impl IntoIterator<Item = View>) -> Self {
        View::Fragment(children.into_iter().collect())
    }

    /// Wrap a view in a provider bound to `store`.
    pub fn provider(store: Arc<Store>, child: View) -> Self {
        View::Provider {
            store,
            child: Box::new(child),
        }
    }

    /// Add an attribute. No-op on non-element nodes.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let View::Element { attrs, .. } = &mut self {
            attrs.insert(name.into(), value.into());
        }
        self
    }

    /// Add every attribute in `extra`, overriding existing keys.
    pub fn attrs(mut self, extra: &Attrs) -> Self {
        if let View::Element { attrs, .. } = &mut self {
            attrs.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        self
    }

    /// Append a child. No-op on non-element nodes.
    pub fn child(mut self, child: View) -> Self {
        if let View::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    pub fn children(mut self, extra: impl IntoIterator<Item = View>) -> Self {
        if let View::Element { children, .. } = &mut self {
            children.extend(extra);
        }
        self
    }

    /// Tag name for element nodes.
    pub fn tag(&self) -> Option<&str> {
        match self {
            View::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Children of an element or fragment.
    pub fn child_nodes(&self) -> &[View] {
        match self {
            View::Element { children, .. } | View::Fragment(children) => children,
            _ => &[],
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            View::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            _ => None,
        }
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Element {
                tag,
                attrs,
                children,
            } => f
                .debug_struct("Element")
                .field("tag", tag)
                .field("attrs", attrs)
                .field("children", children)
                .finish(),
            View::Text(text) => f.debug_tuple("Text").field(text).finish(),
            View::Raw(html) => f.debug_tuple("Raw").field(html).finish(),
            View::Fragment(children) => f.debug_tuple("Fragment").field(children).finish(),
            // The store may be cyclic, never print it.
            View::Provider { child, .. } => f.debug_struct("Provider").field("child", child).finish(),
        }
    }
}

/// Rendering engine seam.
pub trait Renderer: Send + Sync {
    /// Render markup the client will hydrate.
    fn render_to_string(&self, view: &View) -> String;

    /// Render markup that is never hydrated (the document shell).
    fn render_to_static_markup(&self, view: &View) -> String;
}

/// Plain HTML renderer.
///
/// `render_to_string` separates adjacent text nodes with empty comments so
/// the client can split them back into distinct nodes while hydrating.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render_to_string(&self, view: &View) -> String {
        let mut out = String::new();
        write_view(&mut out, view, true);
        out
    }

    fn render_to_static_markup(&self, view: &View) -> String {
        let mut out = String::new();
        write_view(&mut out, view, false);
        out
    }
}

fn write_view(out: &mut String, view: &View, hydratable: bool) {
    match view {
        View::Element {
            tag,
            attrs,
            children,
        } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs {
                if !is_valid_attr_name(name) {
                    tracing::warn!(tag = %tag, attr = %name, "Dropping invalid attribute name");
                    continue;
                }
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }
            write_children(out, children, hydratable);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        View::Text(text) => out.push_str(&escape_text(text)),
        View::Raw(html) => out.push_str(html),
        View::Fragment(children) => write_children(out, children, hydratable),
        View::Provider { child, .. } => write_view(out, child, hydratable),
    }
}

/// Attribute names may not contain whitespace, quotes, `<`, `>`, `/`, `=` or
/// control characters.
fn is_valid_attr_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
        })
}

fn write_children(out: &mut String, children: &[View], hydratable: bool) {
    let mut previous_text = false;
    for child in children {
        let is_text = matches!(child, View::Text(_));
        if hydratable && is_text && previous_text {
            out.push_str("<!---->");
        }
        write_view(out, child, hydratable);
        previous_text = is_text;
    }
}
