use crate::{constants::GIT_DIR_ENTRY, git::Repository};
use std::path::Path;

/// Scan each `(dir, depth)` pair for git working trees.
///
/// A directory that is itself a repository is never descended into. Results
/// are sorted case-insensitively by name.
pub fn discover_repositories(dirs: &[(std::path::PathBuf, u16)]) -> Vec<Repository> {
    let mut repos = Vec::new();
    for (dir, depth) in dirs {
        scan_dir_recursive(dir, *depth, &mut repos);
    }
    repos.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    repos
}

fn scan_dir_recursive(dir: &Path, depth: u16, repos: &mut Vec<Repository>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            log::warn!("Failed to read directory {}: {err}", dir.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        if path.join(GIT_DIR_ENTRY).exists() {
            if let Some(name) = path.file_name() {
                repos.push(Repository {
                    name: name.to_string_lossy().to_string(),
                    path,
                });
            }
        } else if depth > 1 {
            scan_dir_recursive(&path, depth - 1, repos);
        }
    }
}
