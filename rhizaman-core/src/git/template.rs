use super::{LIST_REMOTES, count_behind, fetch_branch, remote_add, remote_get_url};
use crate::{
    constants::{TEMPLATE_MARKER_DIR, TEMPLATE_MARKER_FILE},
    exec::CommandRunner,
    git::repo::TemplateInfo,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_TEMPLATE_BRANCH: &str = "main";
pub const DEFAULT_TEMPLATE_HOST: &str = "github.com";
/// Name used when the template remote has to be created
pub const TEMPLATE_REMOTE: &str = "template";
/// Remote names recognised as pointing at the template, in order of preference
pub const CANONICAL_REMOTES: &[&str] = &["template", "rhiza"];
pub const INVALID_REPOSITORY_FORMAT: &str = "invalid repository format";

#[derive(Debug, Deserialize)]
struct TemplateMarker {
    #[serde(rename = "template-repository", default)]
    repository: Option<String>,
    #[serde(rename = "template-branch", default)]
    branch: Option<String>,
}

pub fn marker_path(repo_path: &Path) -> PathBuf {
    repo_path.join(TEMPLATE_MARKER_DIR).join(TEMPLATE_MARKER_FILE)
}

/// Report how far `repo_path` has drifted from its template.
///
/// `None` means the repository has no template marker. Every git failure
/// after the marker is parsed is swallowed and leaves `behind` at 0.
pub fn detect_template(runner: &dyn CommandRunner, repo_path: &Path) -> Option<TemplateInfo> {
    let marker = marker_path(repo_path);
    if !marker.exists() {
        return None;
    }

    let (identifier, branch) = match read_marker(&marker) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("{}: unreadable template marker: {e}", marker.display());
            return Some(TemplateInfo::failed("", DEFAULT_TEMPLATE_BRANCH, e));
        }
    };

    let url = match normalize_template_url(&identifier) {
        Ok(url) => url,
        Err(e) => return Some(TemplateInfo::failed(identifier, branch, e)),
    };

    let mut info = TemplateInfo {
        url,
        branch,
        behind: 0,
        error: None,
    };

    let remotes = match runner.run(repo_path, LIST_REMOTES) {
        Ok(output) => parse_remote_list(&output),
        Err(e) => {
            log::warn!("{}: cannot list remotes: {e}", repo_path.display());
            return Some(info);
        }
    };

    let remote = ensure_template_remote(runner, repo_path, &remotes, &info.url);

    if let Err(e) = runner.run(repo_path, &fetch_branch(&remote, &info.branch)) {
        log::warn!("{}: fetch {remote}/{} failed: {e}", repo_path.display(), info.branch);
    }

    match runner.run(repo_path, &count_behind(&remote, &info.branch)) {
        Ok(output) => {
            if let Ok(behind) = output.trim().parse() {
                info.behind = behind;
            }
        }
        Err(e) => log::debug!("{}: template drift unknown: {e}", repo_path.display()),
    }

    Some(info)
}

fn read_marker(marker: &Path) -> Result<(String, String), String> {
    let contents = std::fs::read_to_string(marker).map_err(|e| e.to_string())?;
    if contents.trim().is_empty() {
        return Err("missing template-repository".to_string());
    }
    let parsed: TemplateMarker = serde_yaml::from_str(&contents).map_err(|e| e.to_string())?;

    let repository = parsed
        .repository
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| "missing template-repository".to_string())?;
    let branch = parsed
        .branch
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| DEFAULT_TEMPLATE_BRANCH.to_string());

    Ok((repository, branch))
}

/// Turn a template identifier into a clone URL.
///
/// URLs and SSH specs pass through, `owner/name` expands to the hosted HTTPS
/// URL, anything else is rejected.
pub fn normalize_template_url(identifier: &str) -> Result<String, String> {
    let identifier = identifier.trim();
    if identifier.contains("://") || identifier.contains('@') {
        return Ok(identifier.to_string());
    }
    if !identifier.contains('/') {
        return Err(INVALID_REPOSITORY_FORMAT.to_string());
    }
    let slug = identifier.trim_matches('/');
    let slug = slug.strip_suffix(".git").unwrap_or(slug);
    Ok(format!("https://{DEFAULT_TEMPLATE_HOST}/{slug}.git"))
}

/// Path portion of a clone URL, e.g. `owner/name` for
/// `https://github.com/owner/name.git` or `git@github.com:owner/name.git`.
pub fn repo_path_of_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let path = if let Some((_, rest)) = trimmed.split_once("://") {
        rest.split_once('/').map_or("", |(_, path)| path)
    } else if let Some((_, rest)) = trimmed.split_once(':') {
        rest
    } else {
        trimmed
    };
    path.trim_matches('/').to_string()
}

fn parse_remote_list(output: &str) -> Vec<String> {
    output.split_whitespace().map(String::from).collect()
}

/// First configured remote with a canonical template name
pub fn canonical_remote(remotes: &[String]) -> Option<&str> {
    CANONICAL_REMOTES
        .iter()
        .find(|name| remotes.iter().any(|r| r == *name))
        .copied()
}

/// Pick the remote whose URL matches the template by substring containment
/// in either direction, falling back to [`TEMPLATE_REMOTE`].
pub fn select_template_remote(remotes: &[(String, String)], template_url: &str) -> String {
    let wanted = repo_path_of_url(template_url);
    if wanted.is_empty() {
        return TEMPLATE_REMOTE.to_string();
    }
    remotes
        .iter()
        .find(|(_, url)| {
            let url = url.trim();
            !url.is_empty() && (url.contains(&wanted) || wanted.contains(url))
        })
        .map_or_else(|| TEMPLATE_REMOTE.to_string(), |(name, _)| name.clone())
}

fn ensure_template_remote(
    runner: &dyn CommandRunner,
    repo_path: &Path,
    remotes: &[String],
    template_url: &str,
) -> String {
    if let Some(name) = canonical_remote(remotes) {
        return name.to_string();
    }

    // May already exist under a different name
    if let Err(e) = runner.run(repo_path, &remote_add(TEMPLATE_REMOTE, template_url)) {
        log::debug!("{}: remote add skipped: {e}", repo_path.display());
    } else {
        log::info!("{}: added remote {TEMPLATE_REMOTE} -> {template_url}", repo_path.display());
    }

    let with_urls: Vec<(String, String)> = remotes
        .iter()
        .filter_map(|name| {
            runner
                .run(repo_path, &remote_get_url(name))
                .ok()
                .map(|url| (name.clone(), url))
        })
        .collect();

    select_template_remote(&with_urls, template_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{ShellCommandRunner, mock::MockCommandRunner};
    use std::{fs, process::Command};

    fn write_marker(repo: &Path, contents: &str) {
        let dir = repo.join(TEMPLATE_MARKER_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(TEMPLATE_MARKER_FILE), contents).unwrap();
    }

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git").args(args).current_dir(dir).output().unwrap();
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// `commits` commits whose files and messages are tagged with `label`, so
    /// repositories built with different labels never share a commit.
    fn init_test_repo(dir: &Path, label: &str, commits: usize) {
        git(dir, &["init", "-b", "main"]);
        git(dir, &["config", "user.email", "test@test.com"]);
        git(dir, &["config", "user.name", "Test"]);
        for i in 0..commits {
            fs::write(dir.join(format!("{label}{i}.txt")), format!("{label} {i}")).unwrap();
            git(dir, &["add", "."]);
            git(dir, &["commit", "-m", &format!("{label} commit {i}")]);
        }
    }

    #[test]
    fn test_normalize_owner_name() {
        assert_eq!(
            normalize_template_url("jebel-quant/rhiza").unwrap(),
            "https://github.com/jebel-quant/rhiza.git"
        );
        assert_eq!(
            normalize_template_url(" jebel-quant/rhiza.git ").unwrap(),
            "https://github.com/jebel-quant/rhiza.git"
        );
    }

    #[test]
    fn test_normalize_passes_urls_through() {
        for url in [
            "https://gitlab.com/org/template.git",
            "git@github.com:org/template.git",
            "ssh://git@example.com/org/template",
            "file:///srv/templates/base",
        ] {
            assert_eq!(normalize_template_url(url).unwrap(), url);
        }
    }

    #[test]
    fn test_normalize_rejects_bare_names() {
        assert_eq!(normalize_template_url("rhiza").unwrap_err(), INVALID_REPOSITORY_FORMAT);
        assert_eq!(normalize_template_url("").unwrap_err(), INVALID_REPOSITORY_FORMAT);
    }

    #[test]
    fn test_repo_path_of_url() {
        assert_eq!(repo_path_of_url("https://github.com/jebel-quant/rhiza.git"), "jebel-quant/rhiza");
        assert_eq!(repo_path_of_url("git@github.com:jebel-quant/rhiza.git"), "jebel-quant/rhiza");
        assert_eq!(repo_path_of_url("ssh://git@host/group/sub/proj/"), "group/sub/proj");
        assert_eq!(repo_path_of_url("owner/name"), "owner/name");
    }

    #[test]
    fn test_select_template_remote_by_url() {
        let remotes = vec![
            ("origin".to_string(), "https://github.com/me/project.git".to_string()),
            ("upstream".to_string(), "git@github.com:jebel-quant/rhiza.git".to_string()),
        ];
        assert_eq!(
            select_template_remote(&remotes, "https://github.com/jebel-quant/rhiza.git"),
            "upstream"
        );
    }

    #[test]
    fn test_select_template_remote_reverse_containment() {
        let remotes = vec![("scaffold".to_string(), "jebel-quant/rhiza".to_string())];
        assert_eq!(
            select_template_remote(&remotes, "https://github.com/jebel-quant/rhiza.git"),
            "scaffold"
        );
    }

    #[test]
    fn test_select_template_remote_falls_back() {
        let remotes = vec![
            ("origin".to_string(), "https://github.com/me/project.git".to_string()),
            ("broken".to_string(), String::new()),
        ];
        assert_eq!(
            select_template_remote(&remotes, "https://github.com/jebel-quant/rhiza.git"),
            TEMPLATE_REMOTE
        );
    }

    #[test]
    fn test_canonical_remote_requires_exact_name() {
        let remotes = vec!["origin".to_string(), "rhiza".to_string()];
        assert_eq!(canonical_remote(&remotes), Some("rhiza"));
        let remotes = vec!["my-template-fork".to_string()];
        assert_eq!(canonical_remote(&remotes), None);
    }

    #[test]
    fn test_no_marker_is_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = MockCommandRunner::default();
        assert!(detect_template(&runner, tmp.path()).is_none());
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_malformed_marker_reports_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_marker(tmp.path(), "template-repository: [unclosed\n");
        let runner = MockCommandRunner::default();

        let info = detect_template(&runner, tmp.path()).unwrap();
        assert!(info.error.is_some());
        assert_eq!(info.behind, 0);
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_bare_identifier_reports_invalid_format() {
        let tmp = tempfile::tempdir().unwrap();
        write_marker(tmp.path(), "template-repository: rhiza\n");
        let runner = MockCommandRunner::default();

        let info = detect_template(&runner, tmp.path()).unwrap();
        assert_eq!(info.error.as_deref(), Some(INVALID_REPOSITORY_FORMAT));
    }

    #[test]
    fn test_marker_with_branch_and_existing_remote() {
        let tmp = tempfile::tempdir().unwrap();
        write_marker(
            tmp.path(),
            "template-repository: jebel-quant/rhiza\ntemplate-branch: develop\ninclude:\n  - .github\n",
        );
        let runner = MockCommandRunner::default();
        runner.respond(LIST_REMOTES, Ok("origin\ntemplate"));
        runner.respond("git rev-list --count HEAD..template/develop", Ok("4"));

        let info = detect_template(&runner, tmp.path()).unwrap();
        assert_eq!(info.url, "https://github.com/jebel-quant/rhiza.git");
        assert_eq!(info.branch, "develop");
        assert_eq!(info.behind, 4);
        assert!(info.error.is_none());
        assert!(runner.commands().iter().all(|c| !c.starts_with("git remote add")));
        assert_eq!(runner.count("git fetch template develop"), 1);
    }

    #[test]
    fn test_matching_remote_is_used_when_none_canonical() {
        let tmp = tempfile::tempdir().unwrap();
        write_marker(tmp.path(), "template-repository: jebel-quant/rhiza\n");
        let runner = MockCommandRunner::default();
        runner.respond(LIST_REMOTES, Ok("origin\nupstream"));
        runner.respond(
            &remote_add(TEMPLATE_REMOTE, "https://github.com/jebel-quant/rhiza.git"),
            Err("error: remote template already exists."),
        );
        runner.respond("git remote get-url origin", Ok("git@github.com:me/project.git"));
        runner.respond("git remote get-url upstream", Ok("https://github.com/jebel-quant/rhiza"));
        runner.respond("git rev-list --count HEAD..upstream/main", Ok("2"));

        let info = detect_template(&runner, tmp.path()).unwrap();
        assert_eq!(info.branch, "main");
        assert_eq!(info.behind, 2);
        assert_eq!(runner.count("git fetch upstream main"), 1);
    }

    #[test]
    fn test_fetch_and_count_failures_are_silent() {
        let tmp = tempfile::tempdir().unwrap();
        write_marker(tmp.path(), "template-repository: jebel-quant/rhiza\n");
        let runner = MockCommandRunner::default();
        runner.respond(LIST_REMOTES, Ok("template"));
        runner.respond("git fetch template main", Err("fatal: unable to access"));
        runner.respond(
            "git rev-list --count HEAD..template/main",
            Err("fatal: ambiguous argument"),
        );

        let info = detect_template(&runner, tmp.path()).unwrap();
        assert_eq!(info.behind, 0);
        assert!(info.error.is_none());
    }

    #[test]
    fn test_detection_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        write_marker(tmp.path(), "template-repository: jebel-quant/rhiza\n");
        let runner = MockCommandRunner::default();
        let add = remote_add(TEMPLATE_REMOTE, "https://github.com/jebel-quant/rhiza.git");
        runner.respond(LIST_REMOTES, Ok("origin"));
        runner.respond(LIST_REMOTES, Ok("origin\ntemplate"));

        let first = detect_template(&runner, tmp.path()).unwrap();
        let second = detect_template(&runner, tmp.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(runner.count(&add), 1);
    }

    #[test]
    fn test_real_git_template_drift() {
        let tmp = tempfile::tempdir().unwrap();
        let template = tmp.path().join("template");
        let repo = tmp.path().join("repo");
        fs::create_dir_all(&template).unwrap();
        fs::create_dir_all(&repo).unwrap();
        init_test_repo(&template, "template", 2);
        init_test_repo(&repo, "local", 1);

        let url = format!("file://{}", template.display());
        write_marker(&repo, &format!("template-repository: {url}\n"));

        let first = detect_template(&ShellCommandRunner, &repo).unwrap();
        let second = detect_template(&ShellCommandRunner, &repo).unwrap();

        assert_eq!(first.url, url);
        // Unrelated histories: every template commit is missing from HEAD
        assert_eq!(first.behind, 2);
        assert_eq!(first, second);
        let remotes = git(&repo, &["remote"]);
        assert_eq!(remotes.lines().filter(|r| *r == TEMPLATE_REMOTE).count(), 1);
    }
}
