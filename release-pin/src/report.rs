//! Change summary and version listing

use colored::Color;
use indexmap::IndexMap;
use std::ffi::OsStr;
use std::io::{self, Write};

use crate::manifest::Manifest;
use crate::network::group_by_network;

/// Semantic style of a piece of output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Warn,
    Error,
    Success,
}

/// Color is on unless `--no-color` was given or `NO_COLOR` is set to a non-empty value.
pub fn color_enabled(no_color_flag: bool, no_color_env: Option<&OsStr>) -> bool {
    !no_color_flag && no_color_env.map_or(true, |v| v.is_empty())
}

/// Style `text` for `tone`, or return it untouched when color is disabled.
///
/// The result depends only on the arguments; terminal detection is not consulted.
pub fn paint(color: bool, tone: Tone, text: &str) -> String {
    if !color {
        return text.to_string();
    }
    let (bold, fg) = match tone {
        Tone::Info => (false, Color::Blue),
        Tone::Warn => (true, Color::Yellow),
        Tone::Error => (false, Color::Red),
        Tone::Success => (false, Color::Green),
    };
    let weight = if bold { "1" } else { "0" };
    format!("\x1b[{};{}m{}\x1b[0m", weight, fg.to_fg_str(), text)
}

/// Versions added and removed for one project during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ProjectChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Per-project changes, in processing order
pub type ChangeSet = IndexMap<String, ProjectChanges>;

/// Writes the human-readable run summary
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, tone: Tone, text: &str) -> String {
        paint(self.color, tone, text)
    }

    /// Write the change summary followed by the retained versions.
    pub fn report<W: Write>(
        &self,
        out: &mut W,
        changes: &ChangeSet,
        manifest: &Manifest,
    ) -> io::Result<()> {
        self.write_changes(out, changes)?;
        self.write_versions(out, manifest)
    }

    pub fn write_changes<W: Write>(&self, out: &mut W, changes: &ChangeSet) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", self.paint(Tone::Success, "=== Changes Summary ==="))?;

        let mut has_changes = false;
        for (project, change) in changes.iter().filter(|(_, c)| !c.is_empty()) {
            has_changes = true;
            writeln!(out)?;
            writeln!(out, "{}", self.paint(Tone::Info, &format!("{}:", project)))?;

            if !change.added.is_empty() {
                writeln!(out, "  {}", self.paint(Tone::Success, "Added:"))?;
                let mut added = change.added.clone();
                added.sort();
                for version in added {
                    writeln!(out, "    + {}", version)?;
                }
            }

            if !change.removed.is_empty() {
                writeln!(out, "  {}", self.paint(Tone::Warn, "Removed:"))?;
                let mut removed = change.removed.clone();
                removed.sort();
                for version in removed {
                    writeln!(out, "    - {}", version)?;
                }
            }
        }

        if !has_changes {
            writeln!(out, "  {}", self.paint(Tone::Warn, "No changes"))?;
        }
        Ok(())
    }

    pub fn write_versions<W: Write>(&self, out: &mut W, manifest: &Manifest) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", self.paint(Tone::Success, "=== Available Versions ==="))?;

        for (project, releases) in manifest.projects().filter(|(_, r)| !r.is_empty()) {
            writeln!(out)?;
            writeln!(
                out,
                "{} ({} versions)",
                self.paint(Tone::Info, &format!("{}:", project)),
                releases.len()
            )?;

            for (network, mut versions) in group_by_network(releases.keys().map(String::as_str)) {
                versions.sort_unstable_by(|a, b| b.cmp(a));
                writeln!(out, "  {}: {}", network, versions.join(", "))?;
            }
        }
        Ok(())
    }
}
