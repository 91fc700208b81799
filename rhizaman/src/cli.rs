use rhizaman_core::{
    exec::CommandRunner,
    git::{RepoStatus, Repository, probe_status},
};
use rhizaman_tui::components::repo_list::status_line;
use serde::Serialize;
use std::{fmt::Write, path::PathBuf, thread};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Clone)]
pub struct CliError {
    message: String,
    code: i32,
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 1,
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 2,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(value: anyhow::Error) -> Self {
        Self::system(format!("{value:#}"))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct RepoOutput {
    name: String,
    path: PathBuf,
}

pub fn cmd_list(repos: &[Repository], json: bool) -> CliResult<()> {
    let output: Vec<RepoOutput> = repos
        .iter()
        .map(|repo| RepoOutput {
            name: repo.name.clone(),
            path: repo.path.clone(),
        })
        .collect();

    if json {
        print_json(&output)?;
    } else {
        print!("{}", format_repo_table(&output));
    }

    Ok(())
}

/// Probe every repository concurrently and print the results in list order.
pub fn cmd_status(repos: &[Repository], runner: &dyn CommandRunner, json: bool) -> CliResult<()> {
    let statuses = probe_all(repos, runner);

    if json {
        print_json(&statuses)?;
    } else {
        print!("{}", format_status_table(&statuses));
    }

    let failed = statuses.iter().filter(|s| s.error.is_some()).count();
    if failed > 0 {
        return Err(CliError::user(format!(
            "{failed} of {} repositories could not be probed",
            statuses.len()
        )));
    }
    Ok(())
}

fn probe_all(repos: &[Repository], runner: &dyn CommandRunner) -> Vec<RepoStatus> {
    thread::scope(|scope| {
        let handles: Vec<_> = repos
            .iter()
            .map(|repo| (repo, scope.spawn(move || probe_status(runner, repo))))
            .collect();
        handles
            .into_iter()
            .map(|(repo, handle)| {
                handle.join().unwrap_or_else(|_| {
                    let mut status = RepoStatus::loading(repo);
                    status.error = Some("status probe panicked".to_string());
                    status
                })
            })
            .collect()
    })
}

fn format_repo_table(repos: &[RepoOutput]) -> String {
    let name_header = "repo";
    let path_header = "path";
    let name_width = repos
        .iter()
        .map(|repo| repo.name.len())
        .max()
        .unwrap_or(name_header.len())
        .max(name_header.len());

    let mut out = String::new();
    let _ = writeln!(out, "{name_header:<name_width$}  {path_header}");
    for repo in repos {
        let _ = writeln!(out, "{:<name_width$}  {}", repo.name, repo.path.display());
    }
    out
}

fn format_status_table(statuses: &[RepoStatus]) -> String {
    let name_header = "repo";
    let status_header = "status";
    let name_width = statuses
        .iter()
        .map(|status| status.name.len())
        .max()
        .unwrap_or(name_header.len())
        .max(name_header.len());

    let mut out = String::new();
    let _ = writeln!(out, "{name_header:<name_width$}  {status_header}");
    for status in statuses {
        let _ = writeln!(out, "{:<name_width$}  {}", status.name, status_line(status));
    }
    out
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!(
        "{}",
        serde_json::to_string(value).map_err(|e| CliError::system(e.to_string()))?
    );
    Ok(())
}

pub fn print_error(error: &CliError, json: bool) {
    if json {
        let payload = serde_json::json!({ "error": error.message() });
        eprintln!("{payload}");
    } else {
        eprintln!("Error: {}", error.message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhizaman_core::{
        exec::mock::MockCommandRunner,
        git::{PORCELAIN_STATUS, SHOW_CURRENT_BRANCH},
    };

    fn repo(name: &str) -> Repository {
        Repository {
            name: name.to_string(),
            path: PathBuf::from(format!("/tmp/{name}")),
        }
    }

    #[test]
    fn format_repo_table_snapshot() {
        let rows = vec![
            RepoOutput {
                name: "api".to_string(),
                path: PathBuf::from("/tmp/api"),
            },
            RepoOutput {
                name: "dotfiles".to_string(),
                path: PathBuf::from("/tmp/dotfiles"),
            },
        ];
        assert_eq!(
            format_repo_table(&rows),
            "repo      path\n\
             api       /tmp/api\n\
             dotfiles  /tmp/dotfiles\n"
        );
    }

    #[test]
    fn probe_all_keeps_list_order() {
        let runner = MockCommandRunner::default();
        runner.respond_in(&PathBuf::from("/tmp/a"), SHOW_CURRENT_BRANCH, Ok("main"));
        runner.respond_in(&PathBuf::from("/tmp/b"), SHOW_CURRENT_BRANCH, Ok("dev"));
        runner.respond_in(&PathBuf::from("/tmp/b"), PORCELAIN_STATUS, Ok(" M x"));

        let statuses = probe_all(&[repo("a"), repo("b")], &runner);
        assert_eq!(statuses[0].branch, "main");
        assert_eq!(statuses[1].branch, "dev");
        assert!(statuses[1].dirty);

        assert_eq!(
            format_status_table(&statuses),
            "repo  status\n\
             a     main · clean · ↑0 ↓0\n\
             b     dev · dirty · ↑0 ↓0\n"
        );
    }

    #[test]
    fn cli_error_codes() {
        assert_eq!(CliError::user("x").code(), 1);
        assert_eq!(CliError::system("x").code(), 2);
        assert_eq!(CliError::from(anyhow::anyhow!("boom")).message(), "boom");
    }
}
