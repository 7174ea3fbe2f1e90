use std::{path::PathBuf, time::Duration};

use clap::Args;
use hydrate_ssr_core::{RuntimeMode, SsrOptions};

/// URL prefix the client build directory is served under.
pub const ASSETS_PREFIX: &str = "/assets";

/// Rendering configuration, from flags or environment variables.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Runtime mode: `development` reloads manifests on every request
    #[arg(long, default_value = "production", env = "HYDRATE_MODE")]
    pub mode: RuntimeMode,

    /// Client build output directory (holds `stats.json` and chunk files)
    #[arg(long, default_value = "dist/client", env = "CLIENT_DIR")]
    pub client_dir: PathBuf,

    /// Server build output directory (holds `stats.json`)
    #[arg(long, default_value = "dist/server", env = "SERVER_DIR")]
    pub server_dir: PathBuf,

    /// Client chunk whose files are the page entry scripts
    #[arg(long, default_value = "main", env = "ENTRY_CHUNK")]
    pub entry_chunk: String,

    /// Title template, `%s` is replaced by the page title
    #[arg(long, env = "TITLE_TEMPLATE")]
    pub title_template: Option<String>,

    /// Title used when a page sets none
    #[arg(long, default_value = "", env = "DEFAULT_TITLE")]
    pub default_title: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "10", env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,
}

impl Config {
    /// Config with defaults pointing at the given build directories.
    #[cfg(test)]
    pub fn new(client_dir: impl Into<PathBuf>, server_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: RuntimeMode::Production,
            client_dir: client_dir.into(),
            server_dir: server_dir.into(),
            entry_chunk: hydrate_ssr_core::DEFAULT_ENTRY_CHUNK.to_string(),
            title_template: None,
            default_title: String::new(),
            request_timeout_secs: 10,
        }
    }

    /// Validated options for the page assembler.
    pub fn ssr_options(&self) -> anyhow::Result<SsrOptions> {
        let mut options =
            SsrOptions::new(self.mode, self.entry_chunk.clone(), format!("{ASSETS_PREFIX}/"))?
                .with_default_title(self.default_title.clone());
        if let Some(template) = &self.title_template {
            options = options.with_title_template(template.clone())?;
        }
        Ok(options)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
