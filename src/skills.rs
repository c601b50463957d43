//! Skill discovery: scan injected root directories for `SKILL.md` manifests.
//!
//! Roots are always injected by the caller, never derived from the process
//! working directory or home-directory conventions, so the scan is testable
//! against plain temp directories.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file each skill directory must carry.
pub const SKILL_MANIFEST: &str = "SKILL.md";

/// A discovered skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub name: String,
    pub description: Option<String>,
    /// Directory the manifest was found in.
    pub path: PathBuf,
}

/// Scans a fixed set of root directories for skills.
#[derive(Debug, Clone)]
pub struct SkillScanner {
    roots: Vec<PathBuf>,
}

impl SkillScanner {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Walk each root's immediate subdirectories for a `SKILL.md` manifest.
    /// Unreadable roots and manifests are skipped, never errors. When the
    /// same skill name appears under several roots, the first root wins.
    pub fn scan(&self) -> Vec<Skill> {
        let mut skills = Vec::new();
        let mut seen = BTreeSet::new();
        for root in &self.roots {
            let entries = match fs::read_dir(root) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::debug!(root = %root.display(), error = %err, "skipping skill root");
                    continue;
                }
            };
            for entry in entries.flatten() {
                let dir = entry.path();
                if !dir.is_dir() {
                    continue;
                }
                let manifest = dir.join(SKILL_MANIFEST);
                let contents = match fs::read_to_string(&manifest) {
                    Ok(contents) => contents,
                    Err(_) => continue,
                };
                let (name, description) = parse_manifest(&contents, &dir);
                if seen.insert(name.clone()) {
                    skills.push(Skill {
                        name,
                        description,
                        path: dir,
                    });
                }
            }
        }
        skills
    }
}

/// Read `name:` and `description:` from the manifest's frontmatter block.
/// Falls back to the directory name when no `name:` is present.
fn parse_manifest(contents: &str, dir: &Path) -> (String, Option<String>) {
    let mut name = None;
    let mut description = None;
    let mut lines = contents.lines();
    if lines.next().map(str::trim) == Some("---") {
        for line in lines {
            let line = line.trim();
            if line == "---" {
                break;
            }
            if let Some(value) = line.strip_prefix("name:") {
                name = non_empty(value);
            } else if let Some(value) = line.strip_prefix("description:") {
                description = non_empty(value);
            }
        }
    }
    let name = name.unwrap_or_else(|| {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    (name, description)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
