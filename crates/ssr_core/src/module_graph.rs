//! Build manifests and preload chunk resolution.
//!
//! A module touched while rendering on the server is known by its server
//! module id. The browser needs the client chunk holding the same source
//! file, so every id goes through
//! `server id -> source path -> client id -> chunk file(s)`. Any broken link
//! drops that module: an incomplete preload list only costs performance.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SsrCoreError};

/// Module identifier as emitted by the bundler (a string or a number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawModuleId", into = "String")]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ModuleId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<ModuleId> for String {
    fn from(id: ModuleId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawModuleId {
    Number(u64),
    Text(String),
}

impl From<RawModuleId> for ModuleId {
    fn from(raw: RawModuleId) -> Self {
        match raw {
            RawModuleId::Number(n) => ModuleId::from(n),
            RawModuleId::Text(s) => ModuleId(s),
        }
    }
}

/// A manifest value that is either one file or a list of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let files: &[String] = match self {
            OneOrMany::One(file) => std::slice::from_ref(file),
            OneOrMany::Many(files) => files,
        };
        files.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSsrData {
    #[serde(default)]
    pub module_id_to_path: HashMap<ModuleId, String>,
}

/// Server build manifest (`stats.json` in the server output directory).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerManifest {
    #[serde(default)]
    pub ssr_data: ServerSsrData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSsrData {
    #[serde(default)]
    pub module_path_to_id: HashMap<String, ModuleId>,
    #[serde(default)]
    pub module_id_to_chunk_file: HashMap<ModuleId, OneOrMany>,
}

/// Client build manifest (`stats.json` in the client output directory).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientManifest {
    #[serde(default)]
    pub assets_by_chunk_name: BTreeMap<String, OneOrMany>,
    #[serde(default)]
    pub ssr_data: ClientSsrData,
}

impl ServerManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SsrCoreError::InvalidManifest(e.to_string()))
    }
}

impl ClientManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SsrCoreError::InvalidManifest(e.to_string()))
    }
}

/// The server and client manifest pair. Always swapped together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleGraphs {
    pub server: ServerManifest,
    pub client: ClientManifest,
}

impl ModuleGraphs {
    pub fn new(server: ServerManifest, client: ClientManifest) -> Self {
        Self { server, client }
    }

    /// Script files of the entry chunk the page always loads.
    ///
    /// Only `.js` files are kept; empty names are dropped.
    pub fn entry_files(&self, entry_chunk: &str) -> Vec<String> {
        self.client
            .assets_by_chunk_name
            .get(entry_chunk)
            .map(|files| {
                files
                    .iter()
                    .filter(|f| !f.is_empty() && f.ends_with(".js"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Client chunk files to preload for the server modules used by a render.
    ///
    /// Result is in order of first occurrence, deduplicated, and never
    /// contains a file from `required`.
    pub fn resolve_chunks<I, S>(&self, server_ids: I, required: &[String]) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<&str> = required.iter().map(String::as_str).collect();
        let mut chunks = Vec::new();

        for id in server_ids {
            let id = ModuleId::new(id.as_ref());
            let Some(path) = self.server.ssr_data.module_id_to_path.get(&id) else {
                continue;
            };
            let Some(client_id) = self.client.ssr_data.module_path_to_id.get(path) else {
                continue;
            };
            let Some(files) = self.client.ssr_data.module_id_to_chunk_file.get(client_id) else {
                continue;
            };
            for file in files.iter().filter(|f| !f.is_empty()) {
                if seen.insert(file) {
                    chunks.push(file.to_string());
                }
            }
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graphs() -> ModuleGraphs {
        let server = ServerManifest::from_json(
            r#"{"ssrData": {"moduleIdToPath": {
                "10": "./src/pages/About.tsx",
                "11": "./src/pages/Account.tsx",
                "12": "./src/shared/Button.tsx",
                "13": "./src/server/db.ts",
                "14": "./src/entry.tsx"
            }}}"#,
        )
        .unwrap();
        let client = ClientManifest::from_json(
            r#"{
                "assetsByChunkName": {"main": ["main.js", "main.css", ""], "vendor": "vendor.js"},
                "ssrData": {
                    "modulePathToId": {
                        "./src/pages/About.tsx": 1,
                        "./src/pages/Account.tsx": "2",
                        "./src/shared/Button.tsx": 3,
                        "./src/entry.tsx": 4
                    },
                    "moduleIdToChunkFile": {
                        "1": "about.js",
                        "2": ["account.js", "shared.js"],
                        "3": "shared.js",
                        "4": "main.js"
                    }
                }
            }"#,
        )
        .unwrap();
        ModuleGraphs::new(server, client)
    }

    #[test]
    fn test_entry_files_keep_only_scripts() {
        let graphs = graphs();
        assert_eq!(graphs.entry_files("main"), vec!["main.js"]);
        assert_eq!(graphs.entry_files("vendor"), vec!["vendor.js"]);
        assert!(graphs.entry_files("missing").is_empty());
    }

    #[test]
    fn test_resolve_in_first_occurrence_order() {
        let graphs = graphs();
        let chunks = graphs.resolve_chunks(["11", "10"], &[]);
        assert_eq!(chunks, vec!["account.js", "shared.js", "about.js"]);
    }

    #[test]
    fn test_duplicate_chunks_appear_once() {
        let graphs = graphs();
        let chunks = graphs.resolve_chunks(["12", "11", "12"], &[]);
        assert_eq!(chunks, vec!["shared.js", "account.js"]);
    }

    #[test]
    fn test_unknown_ids_and_server_only_paths_are_dropped() {
        let graphs = graphs();
        // 99 has no path, 13 is server-only code.
        let chunks = graphs.resolve_chunks(["99", "13", "10"], &[]);
        assert_eq!(chunks, vec!["about.js"]);
    }

    #[test]
    fn test_required_entry_files_are_excluded() {
        let graphs = graphs();
        let required = graphs.entry_files("main");
        let chunks = graphs.resolve_chunks(["14", "10"], &required);
        assert_eq!(chunks, vec!["about.js"]);
    }

    #[test]
    fn test_numeric_and_string_ids_are_equivalent() {
        let id: ModuleId = serde_json::from_str("42").unwrap();
        assert_eq!(id, ModuleId::from("42"));
        let id: ModuleId = serde_json::from_str(r#""42""#).unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn test_invalid_manifest_is_an_error() {
        let err = ClientManifest::from_json("{not json").unwrap_err();
        assert!(matches!(err, SsrCoreError::InvalidManifest(_)));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let graphs = ModuleGraphs::new(
            ServerManifest::from_json("{}").unwrap(),
            ClientManifest::from_json("{}").unwrap(),
        );
        assert!(graphs.entry_files("main").is_empty());
        assert!(graphs.resolve_chunks(["1"], &[]).is_empty());
    }
}
