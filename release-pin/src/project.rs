//! Upstream project definitions
//!
//! A project names an upstream repository and the release asset that should
//! be pinned for it. The built-in table covers the standalone binaries; a
//! YAML project file can replace it.

use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::{Error, Result};

/// How a release asset filename is recognised
#[derive(Debug, Clone)]
pub enum AssetPattern {
    /// Single-binary naming: the filename must be exactly this string
    Exact(String),
    /// Archive naming: the regex must match the entire filename
    Regex(Regex),
}

impl AssetPattern {
    pub fn exact(name: impl Into<String>) -> Self {
        AssetPattern::Exact(name.into())
    }

    /// Compile a pattern anchored on both ends, so partial matches are rejected.
    pub fn regex(pattern: &str) -> Result<Self> {
        let anchored = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(AssetPattern::Regex(anchored))
    }

    pub fn matches(&self, filename: &str) -> bool {
        match self {
            AssetPattern::Exact(name) => name == filename,
            AssetPattern::Regex(re) => re.is_match(filename),
        }
    }
}

/// A project whose releases are tracked in the manifest
#[derive(Debug, Clone)]
pub struct ProjectSpec {
    /// Key used in the manifest (e.g., "sui")
    pub id: String,
    /// Upstream repository as "owner/name"
    pub repo: String,
    /// Asset selector
    pub asset: AssetPattern,
}

impl ProjectSpec {
    pub fn new(id: impl Into<String>, repo: impl Into<String>, asset: AssetPattern) -> Self {
        Self {
            id: id.into(),
            repo: repo.into(),
            asset,
        }
    }
}

/// Built-in project table, in processing order.
pub fn default_projects() -> Result<Vec<ProjectSpec>> {
    Ok(vec![
        ProjectSpec::new(
            "mvr",
            "MystenLabs/mvr",
            AssetPattern::exact("mvr-ubuntu-x86_64"),
        ),
        ProjectSpec::new(
            "sui",
            "MystenLabs/sui",
            AssetPattern::regex(r"sui-.*-ubuntu-x86_64\.tgz")?,
        ),
        ProjectSpec::new(
            "walrus",
            "MystenLabs/walrus",
            AssetPattern::regex(r"walrus-.*-ubuntu-x86_64\.tgz")?,
        ),
        ProjectSpec::new(
            "walrus-sites",
            "MystenLabs/walrus-sites",
            AssetPattern::regex(r"site-builder-.*-ubuntu-x86_64\.tgz")?,
        ),
    ])
}

#[derive(Deserialize)]
struct ProjectFile {
    projects: Vec<ProjectEntry>,
}

#[derive(Deserialize)]
struct ProjectEntry {
    id: String,
    repo: String,
    asset: AssetEntry,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AssetEntry {
    #[serde(default)]
    exact: Option<String>,
    #[serde(default)]
    regex: Option<String>,
}

impl ProjectEntry {
    fn into_spec(self) -> Result<ProjectSpec> {
        let asset = match (self.asset.exact, self.asset.regex) {
            (Some(name), None) => AssetPattern::exact(name),
            (None, Some(pattern)) => AssetPattern::regex(&pattern)?,
            _ => {
                return Err(Error::Config(format!(
                    "project '{}' must set exactly one of `exact` or `regex`",
                    self.id
                )))
            }
        };
        Ok(ProjectSpec::new(self.id, self.repo, asset))
    }
}

/// Parse a YAML project table.
pub fn parse_projects(content: &str) -> Result<Vec<ProjectSpec>> {
    let file: ProjectFile = serde_yaml::from_str(content)?;
    let projects = file
        .projects
        .into_iter()
        .map(ProjectEntry::into_spec)
        .collect::<Result<Vec<_>>>()?;
    validate(&projects)?;
    Ok(projects)
}

/// Load a YAML project table from disk.
pub fn load_projects(path: &Path) -> Result<Vec<ProjectSpec>> {
    let content = std::fs::read_to_string(path)?;
    parse_projects(&content)
}

fn validate(projects: &[ProjectSpec]) -> Result<()> {
    if projects.is_empty() {
        return Err(Error::Config("no projects defined".into()));
    }

    let mut seen = HashSet::new();
    for project in projects {
        if project.id.trim().is_empty() {
            return Err(Error::Config("project id must not be empty".into()));
        }
        if !project.repo.contains('/') {
            return Err(Error::Config(format!(
                "project '{}' has invalid repository '{}' (expected owner/name)",
                project.id, project.repo
            )));
        }
        if !seen.insert(project.id.as_str()) {
            return Err(Error::Config(format!("duplicate project id '{}'", project.id)));
        }
    }
    Ok(())
}
