//! release-pin: Pinned release manifest maintenance
//!
//! This crate provides tools for:
//! - Listing upstream releases and selecting assets by naming pattern
//! - Downloading assets and computing SRI digests for Nix fetchers
//! - Merging fresh pins into an existing manifest with per-network retention
//! - Reporting added, removed and retained versions

pub mod error;
pub mod github;
pub mod hash;
pub mod manifest;
pub mod network;
pub mod project;
pub mod report;
pub mod retention;
pub mod updater;

pub use error::{Error, Result};
pub use github::{Release, ReleaseClient};
pub use hash::AssetHasher;
pub use manifest::{Manifest, ManifestEntry};
pub use project::{AssetPattern, ProjectSpec};
pub use report::{ChangeSet, Reporter};
pub use updater::{UpdateOptions, Updater};
