pub mod repo;
pub mod status;
pub mod template;

pub use repo::{RepoStatus, Repository, TemplateInfo};
pub use status::probe_status;
pub use template::detect_template;

use crate::exec::shell_quote;

/// Fixed message used for every sync commit
pub const COMMIT_MESSAGE: &str = "chore: rhiza manage sync";

pub const SHOW_CURRENT_BRANCH: &str = "git branch --show-current";
pub const PORCELAIN_STATUS: &str = "git status --porcelain";
pub const SHORT_STATUS: &str = "git status --short";
pub const FULL_STATUS: &str = "git status";
pub const UPSTREAM_LEFT_RIGHT: &str = "git rev-list --left-right --count HEAD...@{upstream}";
pub const LIST_REMOTES: &str = "git remote";
pub const PULL: &str = "git pull";
pub const FETCH: &str = "git fetch";
pub const ADD_ALL: &str = "git add --all";

pub fn remote_add(name: &str, url: &str) -> String {
    format!("git remote add {} {}", shell_quote(name), shell_quote(url))
}

pub fn remote_get_url(name: &str) -> String {
    format!("git remote get-url {}", shell_quote(name))
}

pub fn fetch_branch(remote: &str, branch: &str) -> String {
    format!("git fetch {} {}", shell_quote(remote), shell_quote(branch))
}

/// Commits reachable from `<remote>/<branch>` but not from `HEAD`
pub fn count_behind(remote: &str, branch: &str) -> String {
    format!("git rev-list --count {}", shell_quote(&format!("HEAD..{remote}/{branch}")))
}

pub fn checkout_new_branch(branch: &str) -> String {
    format!("git checkout -b {}", shell_quote(branch))
}

pub fn commit(message: &str) -> String {
    format!("git commit -m {}", shell_quote(message))
}

pub fn push(branch: &str, set_upstream: bool) -> String {
    if set_upstream {
        format!("git push -u origin {}", shell_quote(branch))
    } else {
        format!("git push origin {}", shell_quote(branch))
    }
}
