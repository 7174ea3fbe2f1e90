//! Configuration types for SSR with validation.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SsrCoreError};

/// Global identifier the serialized store is assigned to in the browser.
pub const DEFAULT_STORE_GLOBAL: &str = "__SSR_STORE__";

/// Chunk name whose files are the page's required entry scripts.
pub const DEFAULT_ENTRY_CHUNK: &str = "main";

/// Runtime mode of the server process.
///
/// Development reloads manifests on every request and emits readable output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Development,
    #[default]
    Production,
}

impl RuntimeMode {
    pub fn is_development(self) -> bool {
        matches!(self, RuntimeMode::Development)
    }
}

impl FromStr for RuntimeMode {
    type Err = SsrCoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RuntimeMode::Development),
            "production" | "prod" => Ok(RuntimeMode::Production),
            other => Err(SsrCoreError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeMode::Development => f.write_str("development"),
            RuntimeMode::Production => f.write_str("production"),
        }
    }
}

/// Options shared by every render (validated).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SsrOptions {
    /// Runtime mode (manifest reload policy, pretty output).
    pub mode: RuntimeMode,
    /// Chunk name in the client manifest providing the entry scripts.
    pub entry_chunk: String,
    /// URL prefix prepended to chunk files in script tags.
    pub public_path: String,
    /// Global the embedded store is assigned to.
    pub store_global: String,
    /// Title template, `%s` is replaced by the resolved title fragment.
    pub title_template: Option<String>,
    /// Title used when no metadata instance provides one.
    pub default_title: String,
}

impl SsrOptions {
    /// Create and validate options.
    pub fn new(
        mode: RuntimeMode,
        entry_chunk: impl Into<String>,
        public_path: impl Into<String>,
    ) -> Result<Self> {
        let entry_chunk = entry_chunk.into();
        let public_path = public_path.into();

        if entry_chunk.is_empty() {
            return Err(SsrCoreError::InvalidConfig(
                "entry chunk name must not be empty".to_string(),
            ));
        }
        if !public_path.starts_with('/') || !public_path.ends_with('/') {
            return Err(SsrCoreError::InvalidConfig(format!(
                "public path must start and end with '/': {public_path}"
            )));
        }

        Ok(Self {
            mode,
            entry_chunk,
            public_path,
            store_global: DEFAULT_STORE_GLOBAL.to_string(),
            title_template: None,
            default_title: String::new(),
        })
    }

    /// Create with defaults (`main` entry chunk, `/` public path).
    pub fn with_defaults(mode: RuntimeMode) -> Self {
        Self {
            mode,
            entry_chunk: DEFAULT_ENTRY_CHUNK.to_string(),
            public_path: "/".to_string(),
            store_global: DEFAULT_STORE_GLOBAL.to_string(),
            title_template: None,
            default_title: String::new(),
        }
    }

    /// Set the title template. It must contain a `%s` placeholder.
    pub fn with_title_template(mut self, template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains("%s") {
            return Err(SsrCoreError::InvalidConfig(format!(
                "title template has no %s placeholder: {template}"
            )));
        }
        self.title_template = Some(template);
        Ok(self)
    }

    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Set the global identifier, which must be a plain JS identifier.
    pub fn with_store_global(mut self, global: impl Into<String>) -> Result<Self> {
        let global = global.into();
        let valid = !global.is_empty()
            && !global.starts_with(|c: char| c.is_ascii_digit())
            && global
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !valid {
            return Err(SsrCoreError::InvalidConfig(format!(
                "store global is not a valid identifier: {global}"
            )));
        }
        self.store_global = global;
        Ok(self)
    }
}

impl Default for SsrOptions {
    fn default() -> Self {
        Self::with_defaults(RuntimeMode::Production)
    }
}
