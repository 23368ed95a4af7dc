//! Pinned release manifest
//!
//! The manifest maps project id -> version tag -> {hash, url} and is stored
//! as pretty-printed JSON. Key order is kept as read so that re-runs without
//! changes reproduce the file byte for byte.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Pinned release of a single version
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManifestEntry {
    /// SRI digest of the asset
    pub hash: String,

    /// Download URL of the asset
    pub url: String,
}

/// Version tag -> entry for one project
pub type ProjectReleases = IndexMap<String, ManifestEntry>;

/// Whole manifest, keyed by project id
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    projects: IndexMap<String, ProjectReleases>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Json)
    }

    /// Parse manifest from JSON, skipping projects whose entries are malformed.
    ///
    /// Only input that is not a JSON object at the top level is an error.
    pub fn from_json_lenient(json: &str) -> Result<Self> {
        let raw: IndexMap<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut projects = IndexMap::new();
        for (project, value) in raw {
            match serde_json::from_value::<ProjectReleases>(value) {
                Ok(releases) => {
                    projects.insert(project, releases);
                }
                Err(e) => warn!("Skipping malformed entries for {}: {}", project, e),
            }
        }
        Ok(Self { projects })
    }

    /// Serialize with 2-space indentation and a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn get(&self, project: &str) -> Option<&ProjectReleases> {
        self.projects.get(project)
    }

    pub fn insert(&mut self, project: impl Into<String>, releases: ProjectReleases) {
        self.projects.insert(project.into(), releases);
    }

    pub fn projects(&self) -> impl Iterator<Item = (&String, &ProjectReleases)> {
        self.projects.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Total number of pinned versions across all projects
    pub fn version_count(&self) -> usize {
        self.projects.values().map(|r| r.len()).sum()
    }

    /// Write the manifest, replacing `path` in a single rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".release-pin-")
            .suffix(".json")
            .tempfile_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }
}

/// Location of the backup written next to `path` (`releases.json` -> `releases.json.bak`).
pub fn backup_path(path: &Path) -> PathBuf {
    path.with_extension("json.bak")
}

/// Result of reading the manifest from disk
#[derive(Debug)]
pub struct LoadedManifest {
    pub manifest: Manifest,

    /// Backup written from the previous contents, if the file existed
    pub backup: Option<PathBuf>,
}

/// Read the manifest at `path`, backing it up first.
///
/// A missing file yields an empty manifest. Malformed projects are skipped
/// and contents that are not a JSON object are treated as empty; the backup
/// still holds them.
pub fn load(path: &Path) -> Result<LoadedManifest> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if !path.exists() {
        return Ok(LoadedManifest {
            manifest: Manifest::new(),
            backup: None,
        });
    }

    let content = std::fs::read_to_string(path)?;
    let backup = backup_path(path);
    std::fs::write(&backup, &content)?;
    info!("Backup saved to {}", backup.display());

    let manifest = match Manifest::from_json_lenient(&content) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!("Could not parse existing {}: {}", path.display(), e);
            Manifest::new()
        }
    };

    Ok(LoadedManifest {
        manifest,
        backup: Some(backup),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: &str) -> ManifestEntry {
        ManifestEntry {
            hash: hash.to_string(),
            url: format!("https://example.invalid/{}", hash),
        }
    }

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
  "sui": {
    "mainnet-v1.0.0": {
      "hash": "sha256-abc=",
      "url": "https://example.invalid/sui.tgz"
    }
  }
}"#;
        let manifest = Manifest::from_json(json).unwrap();
        let sui = manifest.get("sui").unwrap();
        assert_eq!(sui["mainnet-v1.0.0"].hash, "sha256-abc=");
        assert_eq!(manifest.version_count(), 1);
    }

    #[test]
    fn test_format() {
        let mut releases = ProjectReleases::new();
        releases.insert("v1".into(), entry("h1"));
        let mut manifest = Manifest::new();
        manifest.insert("mvr", releases);

        let json = manifest.to_json().unwrap();
        assert_eq!(
            json,
            "{\n  \"mvr\": {\n    \"v1\": {\n      \"hash\": \"h1\",\n      \"url\": \"https://example.invalid/h1\"\n    }\n  }\n}\n"
        );
    }

    #[test]
    fn test_key_order_preserved() {
        let json = r#"{"walrus": {"b": {"hash": "1", "url": "u"}, "a": {"hash": "2", "url": "u"}}, "mvr": {}}"#;
        let manifest = Manifest::from_json(json).unwrap();
        let ids: Vec<_> = manifest.projects().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["walrus", "mvr"]);
        let tags: Vec<_> = manifest.get("walrus").unwrap().keys().cloned().collect();
        assert_eq!(tags, vec!["b", "a"]);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("releases.json");

        let mut releases = ProjectReleases::new();
        releases.insert("testnet-v2".into(), entry("h2"));
        releases.insert("mainnet-v1".into(), entry("h1"));
        let mut manifest = Manifest::new();
        manifest.insert("sui", releases);
        manifest.save(&path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.manifest, manifest);
        assert_eq!(loaded.backup, Some(dir.path().join("releases.json.bak")));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("releases.json");

        let loaded = load(&path).unwrap();
        assert!(loaded.manifest.is_empty());
        assert!(loaded.backup.is_none());
        assert!(dir.path().join("nested").is_dir());
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn test_load_malformed_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("releases.json");
        std::fs::write(&path, "{ not json").unwrap();

        let loaded = load(&path).unwrap();
        assert!(loaded.manifest.is_empty());
        let backup = loaded.backup.unwrap();
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "{ not json");
    }

    #[test]
    fn test_load_skips_only_malformed_projects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("releases.json");
        let content = r#"{
  "sui": {"mainnet-v1": {"hash": "sha256-a=", "url": "https://example.invalid/a"}},
  "legacy": ["x"],
  "walrus": {"mainnet-v2": {"hash": "sha256-b="}}
}"#;
        std::fs::write(&path, content).unwrap();

        let loaded = load(&path).unwrap();
        let sui = loaded.manifest.get("sui").unwrap();
        assert_eq!(sui["mainnet-v1"].hash, "sha256-a=");
        assert!(loaded.manifest.get("legacy").is_none());
        assert!(loaded.manifest.get("walrus").is_none());
        assert_eq!(loaded.manifest.version_count(), 1);
        assert_eq!(
            std::fs::read_to_string(loaded.backup.unwrap()).unwrap(),
            content
        );
    }

    #[test]
    fn test_load_non_object_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("releases.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        assert!(load(&path).unwrap().manifest.is_empty());
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("nix/releases.json")),
            PathBuf::from("nix/releases.json.bak")
        );
        assert_eq!(
            backup_path(Path::new("releases")),
            PathBuf::from("releases.json.bak")
        );
    }

    #[test]
    fn test_save_replaces_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("releases.json");
        std::fs::write(&path, "old").unwrap();

        Manifest::new().save(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(files.len(), 1);
    }
}
