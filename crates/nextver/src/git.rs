//! Git access for release planning and tagging.
//!
//! Shells out to `git` so the user's credentials, signing, and hooks apply.
//! Every call runs inside the repository directory given to [`Repo::new`].

use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use nextver_core::version::DEFAULT_TAG;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "describe").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// A working tree that git commands run against.
#[derive(Debug, Clone)]
pub struct Repo {
    dir: Utf8PathBuf,
}

impl Repo {
    /// Run git commands from `dir`.
    pub fn new(dir: impl AsRef<Utf8Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory git commands run in.
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Check if the directory is inside a git work tree.
    #[instrument(skip(self))]
    pub fn is_inside(&self) -> GitResult<bool> {
        match self.git(&["rev-parse", "--is-inside-work-tree"]) {
            Ok(output) => Ok(output.trim() == "true"),
            Err(GitError::Command { .. } | GitError::NotARepo) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Latest stable tag reachable from `HEAD`.
    ///
    /// Pre-release tags (anything with a `-`) are skipped. Falls back to
    /// [`DEFAULT_TAG`] when no tag qualifies.
    #[instrument(skip(self))]
    pub fn latest_stable_tag(&self) -> GitResult<String> {
        if !self.has_commits()? {
            return Ok(DEFAULT_TAG.to_string());
        }

        match self.git(&["describe", "--tags", "--abbrev=0", "--exclude", "*-*"]) {
            Ok(output) => {
                let tag = output.trim().to_string();
                debug!(%tag, "latest stable tag");
                Ok(tag)
            }
            Err(GitError::Command { stderr, .. }) if is_missing_tag(&stderr) => {
                debug!(default = DEFAULT_TAG, "no tags found");
                Ok(DEFAULT_TAG.to_string())
            }
            Err(e) => Err(e),
        }
    }

    /// Full messages of the commits after `tag`, newest first.
    ///
    /// With [`DEFAULT_TAG`] the whole history of `HEAD` is read. A repository
    /// without commits yields nothing.
    #[instrument(skip(self))]
    pub fn commit_messages_since(&self, tag: &str) -> GitResult<Vec<String>> {
        if !self.has_commits()? {
            debug!("repository has no commits");
            return Ok(Vec::new());
        }

        let range = if tag == DEFAULT_TAG {
            "HEAD".to_string()
        } else {
            format!("{tag}..HEAD")
        };

        let output = self.git(&["log", &range, "--format=%B%x00"])?;
        let messages = split_log(&output);
        debug!(%range, count = messages.len(), "commit messages");
        Ok(messages)
    }

    /// Tags matching a glob, e.g. `v1.3.0-beta.*`.
    #[instrument(skip(self))]
    pub fn tags_matching(&self, pattern: &str) -> GitResult<Vec<String>> {
        let output = self.git(&["tag", "--list", pattern])?;
        let tags: Vec<String> = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        debug!(count = tags.len(), "matching tags");
        Ok(tags)
    }

    /// Create a lightweight tag at `HEAD`.
    #[instrument(skip(self))]
    pub fn create_tag(&self, tag: &str) -> GitResult<()> {
        self.git(&["tag", tag])?;
        debug!(%tag, "created tag");
        Ok(())
    }

    /// Push a single tag to `remote`.
    #[instrument(skip(self))]
    pub fn push_tag(&self, remote: &str, tag: &str) -> GitResult<()> {
        self.git(&["push", remote, &format!("refs/tags/{tag}")])?;
        debug!(%remote, %tag, "pushed tag");
        Ok(())
    }

    /// URL of a named remote, or `None` if it isn't configured.
    #[instrument(skip(self))]
    pub fn remote_url(&self, remote: &str) -> GitResult<Option<String>> {
        match self.git(&["remote", "get-url", remote]) {
            Ok(url) => {
                let url = url.trim().to_string();
                debug!(%remote, %url, "remote URL");
                Ok(Some(url))
            }
            Err(GitError::Command { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn has_commits(&self) -> GitResult<bool> {
        match self.git(&["rev-parse", "--verify", "--quiet", "HEAD"]) {
            Ok(_) => Ok(true),
            Err(GitError::Command { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Run a git command and return its stdout.
    fn git(&self, args: &[&str]) -> GitResult<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.dir.as_std_path())
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

            if stderr.contains("not a git repository") {
                return Err(GitError::NotARepo);
            }

            Err(GitError::Command {
                command: args.first().unwrap_or(&"").to_string(),
                stderr,
            })
        }
    }
}

/// Parse owner and repo from a git remote URL.
///
/// Handles both HTTPS and SSH formats:
/// - `https://github.com/owner/repo.git`
/// - `git@github.com:owner/repo.git`
pub fn parse_owner_repo(url: &str) -> Option<(String, String)> {
    let path = url.strip_prefix("git@").map_or_else(
        || {
            url.split("//")
                .nth(1)
                .and_then(|after_scheme| after_scheme.split_once('/').map(|(_, path)| path))
        },
        |rest| rest.split_once(':').map(|(_, path)| path),
    )?;

    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = path.split_once('/')?;

    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }

    Some((owner.to_string(), repo.to_string()))
}

fn is_missing_tag(stderr: &str) -> bool {
    stderr.contains("No names found")
        || stderr.contains("No tags can describe")
        || stderr.contains("cannot describe")
}

/// Split `%B%x00` log output into trimmed, non-empty messages.
fn split_log(output: &str) -> Vec<String> {
    output
        .split('\0')
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        which::which("git").is_ok()
    }

    /// A fresh repository with a committer identity, or `None` without git.
    fn scratch_repo() -> Option<(TempDir, Repo)> {
        if !git_available() {
            return None;
        }
        let tmp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let repo = Repo::new(&dir);
        repo.git(&["init", "--quiet"]).unwrap();
        repo.git(&["config", "user.email", "dev@example.com"]).unwrap();
        repo.git(&["config", "user.name", "Dev"]).unwrap();
        repo.git(&["config", "commit.gpgsign", "false"]).unwrap();
        repo.git(&["config", "tag.gpgsign", "false"]).unwrap();
        Some((tmp, repo))
    }

    fn commit(repo: &Repo, message: &str) {
        repo.git(&["commit", "--quiet", "--allow-empty", "-m", message])
            .unwrap();
    }

    #[test]
    fn split_log_drops_separators_and_blanks() {
        let output = "feat: a\n\nbody\n\0\nfix: b\n\0\n";
        assert_eq!(split_log(output), vec!["feat: a\n\nbody", "fix: b"]);
        assert!(split_log("").is_empty());
    }

    #[test]
    fn missing_tag_messages_are_recognised() {
        assert!(is_missing_tag("fatal: No names found, cannot describe anything."));
        assert!(is_missing_tag("fatal: No tags can describe 'abc123'."));
        assert!(!is_missing_tag("fatal: bad revision"));
    }

    #[test]
    fn outside_a_repo_is_not_inside() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        assert!(!Repo::new(&dir).is_inside().unwrap());
    }

    #[test]
    fn empty_repo_defaults_and_has_no_messages() {
        let Some((_tmp, repo)) = scratch_repo() else {
            return;
        };
        assert!(repo.is_inside().unwrap());
        assert_eq!(repo.latest_stable_tag().unwrap(), DEFAULT_TAG);
        assert!(repo.commit_messages_since(DEFAULT_TAG).unwrap().is_empty());
    }

    #[test]
    fn untagged_history_reads_everything() {
        let Some((_tmp, repo)) = scratch_repo() else {
            return;
        };
        commit(&repo, "feat: first");
        commit(&repo, "fix: second\n\nwith body");

        assert_eq!(repo.latest_stable_tag().unwrap(), DEFAULT_TAG);
        let messages = repo.commit_messages_since(DEFAULT_TAG).unwrap();
        assert_eq!(messages, vec!["fix: second\n\nwith body", "feat: first"]);
    }

    #[test]
    fn messages_since_tag_exclude_tagged_commit() {
        let Some((_tmp, repo)) = scratch_repo() else {
            return;
        };
        commit(&repo, "feat: released");
        repo.create_tag("v1.0.0").unwrap();
        commit(&repo, "fix: after");

        assert_eq!(repo.latest_stable_tag().unwrap(), "v1.0.0");
        assert_eq!(repo.commit_messages_since("v1.0.0").unwrap(), vec!["fix: after"]);
    }

    #[test]
    fn latest_stable_tag_skips_prereleases() {
        let Some((_tmp, repo)) = scratch_repo() else {
            return;
        };
        commit(&repo, "feat: one");
        repo.create_tag("v1.0.0").unwrap();
        commit(&repo, "feat: two");
        repo.create_tag("v1.1.0-beta.1").unwrap();

        assert_eq!(repo.latest_stable_tag().unwrap(), "v1.0.0");
    }

    #[test]
    fn tags_matching_filters_by_glob() {
        let Some((_tmp, repo)) = scratch_repo() else {
            return;
        };
        commit(&repo, "feat: one");
        for tag in ["v1.1.0-beta.1", "v1.1.0-beta.2", "v1.1.0-rc.1", "v1.0.0"] {
            repo.create_tag(tag).unwrap();
        }

        let mut tags = repo.tags_matching("v1.1.0-beta.*").unwrap();
        tags.sort();
        assert_eq!(tags, vec!["v1.1.0-beta.1", "v1.1.0-beta.2"]);
    }

    #[test]
    fn remote_url_absent_without_remote() {
        let Some((_tmp, repo)) = scratch_repo() else {
            return;
        };
        assert_eq!(repo.remote_url("origin").unwrap(), None);
    }

    #[test]
    fn parse_owner_repo_https() {
        assert_eq!(
            parse_owner_repo("https://github.com/acme/widgets.git"),
            Some(("acme".into(), "widgets".into()))
        );
        assert_eq!(
            parse_owner_repo("https://github.com/acme/widgets"),
            Some(("acme".into(), "widgets".into()))
        );
    }

    #[test]
    fn parse_owner_repo_ssh() {
        assert_eq!(
            parse_owner_repo("git@github.com:acme/widgets.git"),
            Some(("acme".into(), "widgets".into()))
        );
    }

    #[test]
    fn parse_owner_repo_invalid() {
        assert!(parse_owner_repo("not-a-url").is_none());
        assert!(parse_owner_repo("").is_none());
        assert!(parse_owner_repo("https://github.com/acme/widgets/extra").is_none());
    }
}
