//! Build manifest loading and caching.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use hydrate_ssr_core::{ClientManifest, ModuleGraphs, RuntimeMode, ServerManifest};
use tokio::sync::RwLock;

use crate::error::{Result, SsrError};

/// File name of the manifest in each build directory.
pub const MANIFEST_FILE: &str = "stats.json";

/// When cached manifests are re-read from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// Load on first use and keep for the process lifetime.
    Once,
    /// Reload on every call.
    EveryRequest,
}

impl From<RuntimeMode> for ReloadPolicy {
    fn from(mode: RuntimeMode) -> Self {
        match mode {
            RuntimeMode::Development => ReloadPolicy::EveryRequest,
            RuntimeMode::Production => ReloadPolicy::Once,
        }
    }
}

/// Cache of the server and client manifest pair.
///
/// The pair is replaced as a whole, so readers never see a server
/// manifest from one build next to a client manifest from another.
#[derive(Debug)]
pub struct ManifestCache {
    client_dir: PathBuf,
    server_dir: PathBuf,
    policy: ReloadPolicy,
    current: RwLock<Option<Arc<ModuleGraphs>>>,
}

impl ManifestCache {
    pub fn new(
        client_dir: impl Into<PathBuf>,
        server_dir: impl Into<PathBuf>,
        policy: ReloadPolicy,
    ) -> Self {
        Self {
            client_dir: client_dir.into(),
            server_dir: server_dir.into(),
            policy,
            current: RwLock::new(None),
        }
    }

    /// A cache that always serves `graphs` and never touches the disk.
    pub fn fixed(graphs: ModuleGraphs) -> Self {
        Self {
            client_dir: PathBuf::new(),
            server_dir: PathBuf::new(),
            policy: ReloadPolicy::Once,
            current: RwLock::new(Some(Arc::new(graphs))),
        }
    }

    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    /// Current manifest pair, loading it if the policy requires.
    pub async fn graphs(&self) -> Result<Arc<ModuleGraphs>> {
        if self.policy == ReloadPolicy::Once {
            if let Some(graphs) = self.current.read().await.as_ref() {
                return Ok(Arc::clone(graphs));
            }
        }

        let mut current = self.current.write().await;
        // Another request may have loaded while we waited for the lock.
        if self.policy == ReloadPolicy::Once {
            if let Some(graphs) = current.as_ref() {
                return Ok(Arc::clone(graphs));
            }
        }

        let graphs = Arc::new(self.load().await?);
        *current = Some(Arc::clone(&graphs));
        Ok(graphs)
    }

    /// Drop the cached pair so the next call reloads it.
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }

    async fn load(&self) -> Result<ModuleGraphs> {
        let server_path = self.server_dir.join(MANIFEST_FILE);
        let client_path = self.client_dir.join(MANIFEST_FILE);

        let server_json = read_manifest(&server_path).await?;
        let client_json = read_manifest(&client_path).await?;

        let server =
            ServerManifest::from_json(&server_json).map_err(|e| SsrError::ManifestParse {
                path: server_path.display().to_string(),
                reason: e.to_string(),
            })?;
        let client =
            ClientManifest::from_json(&client_json).map_err(|e| SsrError::ManifestParse {
                path: client_path.display().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            client_dir = %self.client_dir.display(),
            server_dir = %self.server_dir.display(),
            "Module manifests loaded"
        );

        Ok(ModuleGraphs::new(server, client))
    }
}

async fn read_manifest(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SsrError::ManifestLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}
