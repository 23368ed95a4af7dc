//! Per-project update pipeline
//!
//! For every project either the existing entries are only trimmed (cheap
//! path), or releases are fetched, hashed and merged before trimming.

use tracing::{error, info, warn};

use crate::github::ReleaseClient;
use crate::hash::AssetHasher;
use crate::manifest::{Manifest, ManifestEntry, ProjectReleases};
use crate::project::ProjectSpec;
use crate::report::{ChangeSet, ProjectChanges};
use crate::retention::{merge, retain};

/// Run options
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Re-fetch and re-hash projects that already have entries
    pub force: bool,
    /// Retention cap per network
    pub max_releases: usize,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            force: false,
            max_releases: 10,
        }
    }
}

pub struct Updater {
    client: ReleaseClient,
    hasher: AssetHasher,
    options: UpdateOptions,
}

impl Updater {
    pub fn new(client: ReleaseClient, hasher: AssetHasher, options: UpdateOptions) -> Self {
        Self {
            client,
            hasher,
            options,
        }
    }

    /// Build the new manifest for `projects` from the `existing` one.
    ///
    /// Projects not listed in `projects` are not carried over.
    pub async fn run(&self, projects: &[ProjectSpec], existing: &Manifest) -> (Manifest, ChangeSet) {
        let empty = ProjectReleases::new();
        let mut manifest = Manifest::new();
        let mut changes = ChangeSet::new();

        for project in projects {
            let current = existing.get(&project.id).unwrap_or(&empty);
            let (releases, change) = self.update_project(project, current).await;
            manifest.insert(project.id.clone(), releases);
            changes.insert(project.id.clone(), change);
        }

        (manifest, changes)
    }

    async fn update_project(
        &self,
        project: &ProjectSpec,
        existing: &ProjectReleases,
    ) -> (ProjectReleases, ProjectChanges) {
        if !self.options.force && !existing.is_empty() {
            info!(
                "Using existing {} releases (use --force to re-download)",
                project.id
            );
            let (kept, removed) = retain(existing, self.options.max_releases);
            return (
                kept,
                ProjectChanges {
                    added: Vec::new(),
                    removed,
                },
            );
        }

        let fetched = self.collect(project).await;
        let outcome = merge(existing, fetched, self.options.max_releases);
        (
            outcome.releases,
            ProjectChanges {
                added: outcome.added,
                removed: outcome.removed,
            },
        )
    }

    /// Fetch and hash the current releases of a project.
    ///
    /// Releases whose asset cannot be hashed are skipped.
    async fn collect(&self, project: &ProjectSpec) -> ProjectReleases {
        let mut result = ProjectReleases::new();

        for release in self.client.fetch(project).await {
            info!("  Processing {} {}...", project.id, release.tag);

            match self.hasher.hash(&release.url).await {
                Ok(hash) => {
                    info!("  Hash: {}", hash);
                    result.insert(
                        release.tag,
                        ManifestEntry {
                            hash,
                            url: release.url,
                        },
                    );
                }
                Err(e) => {
                    error!("  Failed to compute hash for {}: {}", release.tag, e);
                }
            }
        }

        if result.is_empty() {
            warn!("No hashed releases for {}", project.id);
        }
        result
    }
}
