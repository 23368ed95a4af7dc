//! Merge and retention policy for per-project releases

use std::collections::HashSet;

use crate::manifest::ProjectReleases;
use crate::network::group_by_network;

/// Keep the `max_per_network` greatest tags of each network.
///
/// Tags are compared as plain strings, so `v1.9.0` ranks above `v1.10.0`.
/// Returns the kept releases (in input order) and the removed tags.
pub fn retain(
    releases: &ProjectReleases,
    max_per_network: usize,
) -> (ProjectReleases, Vec<String>) {
    let groups = group_by_network(releases.keys().map(String::as_str));

    let mut keep: HashSet<&str> = HashSet::new();
    let mut removed = Vec::new();
    for (_, mut tags) in groups {
        tags.sort_unstable_by(|a, b| b.cmp(a));
        let split = max_per_network.min(tags.len());
        keep.extend(&tags[..split]);
        removed.extend(tags[split..].iter().map(|t| t.to_string()));
    }

    let kept = releases
        .iter()
        .filter(|(tag, _)| keep.contains(tag.as_str()))
        .map(|(tag, entry)| (tag.clone(), entry.clone()))
        .collect();

    (kept, removed)
}

/// Outcome of merging fetched releases into the existing ones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub releases: ProjectReleases,
    /// Fetched tags that were not present before
    pub added: Vec<String>,
    /// Tags dropped by retention
    pub removed: Vec<String>,
}

/// Overlay `fetched` onto `existing`, then apply retention.
///
/// Fetched entries replace existing ones with the same tag; existing tags
/// missing from the fetch are kept unless retention drops them.
pub fn merge(
    existing: &ProjectReleases,
    fetched: ProjectReleases,
    max_per_network: usize,
) -> MergeOutcome {
    let added = fetched
        .keys()
        .filter(|tag| !existing.contains_key(*tag))
        .cloned()
        .collect();

    let mut merged = existing.clone();
    merged.extend(fetched);

    let (releases, removed) = retain(&merged, max_per_network);
    MergeOutcome {
        releases,
        added,
        removed,
    }
}
