//! The HTML document template.
//!
//! The order of top-level `<head>` and `<body>` children here is the contract
//! the skip list encodes. [`DocumentParts::skip_list`] derives positions from
//! the same parts that are emitted, and the tests below check every position
//! against the emitted tree.

use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value};

use crate::config::SsrOptions;
use crate::error::{Result, SsrCoreError};
use crate::escape::escape_script_json;
use crate::metadata::MetadataSnapshot;
use crate::skip_list::{compute_skip_list, SkipList};
use crate::view::{Renderer, View};

const DEV_HTML_START: &str = "<!-- == SERVER SIDE RENDERED HTML START == -->";
const DEV_HTML_END: &str = "<!-- === SERVER SIDE RENDERED HTML END === -->";
const DEV_STORE_START: &str = "/* == STORE FOR CLIENT HYDRATION START == */";
const DEV_STORE_END: &str = "/* === STORE FOR CLIENT HYDRATION END === */";
const DEV_FOOTER: &str = "<!-- running in development mode -->";

/// Everything the template needs for one page.
#[derive(Debug, Clone, Copy)]
pub struct DocumentParts<'a> {
    pub metadata: &'a MetadataSnapshot,
    /// Hydratable markup of the draw target.
    pub app_html: &'a str,
    /// Body of the store script, see [`store_script`].
    pub store_script: &'a str,
    /// Preload chunk files.
    pub chunks: &'a [String],
    /// Entry script files.
    pub entries: &'a [String],
    /// Styles collected while rendering, already joined.
    pub collected_styles: Option<&'a str>,
    pub options: &'a SsrOptions,
}

impl DocumentParts<'_> {
    /// Skip lists matching what [`DocumentParts::to_view`] emits.
    pub fn skip_list(&self) -> SkipList {
        compute_skip_list(
            self.metadata.counts(),
            self.collected_styles.is_some(),
            self.chunks.len(),
            self.entries.len(),
        )
    }

    /// The document tree, `<html>` down.
    pub fn to_view(&self) -> View {
        let dev = self.options.mode.is_development();
        let metadata = self.metadata;

        let mut head = vec![
            View::element("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1.0"),
            View::element("meta")
                .attr("content", "text/html;charset=utf-8")
                .attr("http-equiv", "Content-Type"),
            View::element("meta")
                .attr("content", "utf-8")
                .attr("http-equiv", "encoding"),
        ];
        head.extend(metadata.meta.iter().map(|a| View::element("meta").attrs(a)));
        head.extend(metadata.link.iter().map(|a| View::element("link").attrs(a)));
        head.push(View::element("title").child(View::text(metadata.full_title.as_str())));
        head.extend(metadata.style.iter().map(|style| {
            View::element("style")
                .attrs(&style.attrs)
                .child(View::raw(style.body.as_str()))
        }));
        if let Some(css) = self.collected_styles {
            head.push(View::element("style").child(View::raw(css)));
        }

        let root_html = if dev {
            format!("\n{DEV_HTML_START}\n{}\n{DEV_HTML_END}\n", self.app_html)
        } else {
            self.app_html.to_string()
        };

        let mut body = vec![
            View::element("div")
                .attr("id", "root")
                .child(View::raw(root_html)),
            View::element("script")
                .attr("async", "")
                .child(View::raw(self.store_script)),
        ];
        let public_path = &self.options.public_path;
        body.extend(self.chunks.iter().map(|file| {
            View::element("script")
                .attr("async", "")
                .attr("src", format!("{public_path}{file}"))
        }));
        body.extend(self.entries.iter().map(|file| {
            View::element("script")
                .attr("defer", "")
                .attr("src", format!("{public_path}{file}"))
        }));

        View::element("html")
            .attrs(&metadata.html_attrs)
            .child(View::element("head").children(head))
            .child(View::element("body").attrs(&metadata.body_attrs).children(body))
    }
}

/// Render the final document string.
pub fn render_document(parts: &DocumentParts<'_>, renderer: &dyn Renderer) -> String {
    let dev = parts.options.mode.is_development();
    let markup = renderer.render_to_static_markup(&parts.to_view());
    if dev {
        format!("<!DOCTYPE html>\n{markup}\n{DEV_FOOTER}")
    } else {
        format!("<!DOCTYPE html>{markup}")
    }
}

/// Script assigning `snapshot` to the configured global.
///
/// The JSON is pretty-printed with a 4-space indent in development and
/// escaped so it cannot close the surrounding `<script>`.
pub fn store_script(snapshot: &Value, options: &SsrOptions) -> Result<String> {
    let global = &options.store_global;
    if options.mode.is_development() {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        snapshot
            .serialize(&mut ser)
            .map_err(|e| SsrCoreError::Serialization(e.to_string()))?;
        let json =
            String::from_utf8(buf).map_err(|e| SsrCoreError::Serialization(e.to_string()))?;
        Ok(format!(
            "\n{DEV_STORE_START}\nwindow.{global}={};\n{DEV_STORE_END}\n",
            escape_script_json(&json)
        ))
    } else {
        let json =
            serde_json::to_string(snapshot).map_err(|e| SsrCoreError::Serialization(e.to_string()))?;
        Ok(format!("window.{global}={};", escape_script_json(&json)))
    }
}
