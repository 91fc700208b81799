use super::{
    PORCELAIN_STATUS, SHOW_CURRENT_BRANCH, UPSTREAM_LEFT_RIGHT,
    repo::{DETACHED_BRANCH_LABEL, RepoStatus, Repository, UNKNOWN_BRANCH_LABEL},
    template::detect_template,
};
use crate::exec::CommandRunner;

/// Probe branch, dirty flag, upstream drift and template drift for one repository.
///
/// Only the branch and dirty queries can fail the probe; they short-circuit
/// before anything else runs. Upstream and template problems are advisory.
pub fn probe_status(runner: &dyn CommandRunner, repo: &Repository) -> RepoStatus {
    let mut status = RepoStatus::blank(repo, UNKNOWN_BRANCH_LABEL);

    match runner.run(&repo.path, SHOW_CURRENT_BRANCH) {
        Ok(branch) if branch.is_empty() => status.branch = DETACHED_BRANCH_LABEL.to_string(),
        Ok(branch) => status.branch = branch,
        Err(e) => {
            status.error = Some(e.to_string());
            return status;
        }
    }

    match runner.run(&repo.path, PORCELAIN_STATUS) {
        Ok(output) => status.dirty = is_dirty(&output),
        Err(e) => {
            status.error = Some(e.to_string());
            return status;
        }
    }

    match runner.run(&repo.path, UPSTREAM_LEFT_RIGHT) {
        Ok(output) => {
            if let Some((ahead, behind)) = parse_left_right(&output) {
                status.ahead = ahead;
                status.behind = behind;
            }
        }
        // No upstream configured
        Err(e) => log::debug!("{}: no upstream counts: {e}", repo.name),
    }

    status.template = detect_template(runner, &repo.path);
    status
}

/// True iff a short-format status listing contains any non-blank line.
pub fn is_dirty(status_output: &str) -> bool {
    status_output.lines().any(|line| !line.trim().is_empty())
}

/// Parse `git rev-list --left-right --count HEAD...@{upstream}` output.
///
/// The left count is commits only on `HEAD` (ahead), the right count commits
/// only on the upstream (behind).
pub fn parse_left_right(output: &str) -> Option<(u32, u32)> {
    let mut parts = output.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((ahead, behind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::mock::MockCommandRunner;
    use std::path::PathBuf;

    fn repo() -> Repository {
        Repository {
            name: "alpha".to_string(),
            // Never exists, so no template marker is found
            path: PathBuf::from("/nonexistent/rhizaman/alpha"),
        }
    }

    #[test]
    fn test_is_dirty() {
        assert!(!is_dirty(""));
        assert!(!is_dirty("\n   \n"));
        assert!(is_dirty(" M src/lib.rs"));
        assert!(is_dirty("\n?? new.txt\n"));
    }

    #[test]
    fn test_parse_left_right() {
        assert_eq!(parse_left_right("2\t3"), Some((2, 3)));
        assert_eq!(parse_left_right("0 0"), Some((0, 0)));
        assert_eq!(parse_left_right(""), None);
        assert_eq!(parse_left_right("7"), None);
        assert_eq!(parse_left_right("a b"), None);
        assert_eq!(parse_left_right("1 2 3"), None);
    }

    #[test]
    fn test_clean_repo_ahead_and_behind() {
        let runner = MockCommandRunner::default();
        runner.respond(SHOW_CURRENT_BRANCH, Ok("main"));
        runner.respond(PORCELAIN_STATUS, Ok(""));
        runner.respond(UPSTREAM_LEFT_RIGHT, Ok("2\t3"));

        let status = probe_status(&runner, &repo());
        assert_eq!(status.name, "alpha");
        assert_eq!(status.branch, "main");
        assert!(!status.dirty);
        assert_eq!(status.ahead, 2);
        assert_eq!(status.behind, 3);
        assert!(status.error.is_none());
        assert!(status.template.is_none());
    }

    #[test]
    fn test_missing_upstream_defaults_to_zero_without_error() {
        let runner = MockCommandRunner::default();
        runner.respond(SHOW_CURRENT_BRANCH, Ok("feature"));
        runner.respond(PORCELAIN_STATUS, Ok(" M README.md"));
        runner.respond(
            UPSTREAM_LEFT_RIGHT,
            Err("fatal: no upstream configured for branch 'feature'"),
        );

        let status = probe_status(&runner, &repo());
        assert!(status.dirty);
        assert_eq!((status.ahead, status.behind), (0, 0));
        assert!(status.error.is_none());
    }

    #[test]
    fn test_empty_branch_is_detached() {
        let runner = MockCommandRunner::default();
        runner.respond(SHOW_CURRENT_BRANCH, Ok(""));

        let status = probe_status(&runner, &repo());
        assert_eq!(status.branch, "detached");
        assert!(status.error.is_none());
    }

    #[test]
    fn test_branch_failure_short_circuits() {
        let runner = MockCommandRunner::default();
        runner.respond(SHOW_CURRENT_BRANCH, Err("fatal: not a git repository"));

        let status = probe_status(&runner, &repo());
        assert_eq!(status.branch, "unknown");
        assert_eq!(status.error.as_deref(), Some("fatal: not a git repository"));
        assert_eq!(runner.commands(), vec![SHOW_CURRENT_BRANCH.to_string()]);
    }

    #[test]
    fn test_dirty_failure_short_circuits() {
        let runner = MockCommandRunner::default();
        runner.respond(SHOW_CURRENT_BRANCH, Ok("main"));
        runner.respond(PORCELAIN_STATUS, Err("fatal: index file corrupt"));

        let status = probe_status(&runner, &repo());
        assert_eq!(status.branch, "main");
        assert_eq!(status.error.as_deref(), Some("fatal: index file corrupt"));
        assert_eq!(runner.count(UPSTREAM_LEFT_RIGHT), 0);
    }
}
