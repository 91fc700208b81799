use serde::Serialize;
use std::path::PathBuf;

pub const LOADING_BRANCH_LABEL: &str = "loading...";
pub const DETACHED_BRANCH_LABEL: &str = "detached";
pub const UNKNOWN_BRANCH_LABEL: &str = "unknown";

/// A configured repository. Its index in the loaded list is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub name: String,
    pub path: PathBuf,
}

/// Snapshot produced by one status probe. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoStatus {
    pub name: String,
    pub path: PathBuf,
    pub branch: String,
    pub dirty: bool,
    pub ahead: u32,
    pub behind: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateInfo>,
}

impl RepoStatus {
    /// Placeholder shown until the first probe for `repo` completes
    pub fn loading(repo: &Repository) -> Self {
        Self::blank(repo, LOADING_BRANCH_LABEL)
    }

    pub(crate) fn blank(repo: &Repository, branch: &str) -> Self {
        Self {
            name: repo.name.clone(),
            path: repo.path.clone(),
            branch: branch.to_string(),
            dirty: false,
            ahead: 0,
            behind: 0,
            error: None,
            template: None,
        }
    }
}

/// Drift of a repository against the template it was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub url: String,
    pub branch: String,
    pub behind: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TemplateInfo {
    pub fn failed(url: impl Into<String>, branch: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: branch.into(),
            behind: 0,
            error: Some(error.into()),
        }
    }
}
