//! GitHub release creation through the `gh` CLI.

use std::process::Command;

use camino::Utf8Path;
use thiserror::Error;
use tracing::{debug, instrument};

/// Environment variable `gh` reads its token from.
const GH_TOKEN_ENV: &str = "GH_TOKEN";

/// Errors from creating a release.
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Failed to execute `gh`.
    #[error("failed to run gh: {0}")]
    Exec(#[from] std::io::Error),

    /// `gh release create` returned a non-zero exit code.
    #[error("gh release create failed: {stderr}")]
    Command {
        /// Captured stderr.
        stderr: String,
    },
}

/// What to publish.
#[derive(Debug, Clone, Default)]
pub struct ReleaseRequest {
    /// Tag the release points at; must already exist on the remote.
    pub tag: String,
    /// Release title.
    pub title: String,
    /// Markdown release notes.
    pub notes: String,
    /// Create as a draft.
    pub draft: bool,
    /// Mark as a pre-release.
    pub prerelease: bool,
    /// `owner/repo`; `gh` infers it from the remotes when unset.
    pub repo: Option<String>,
}

impl ReleaseRequest {
    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "release".to_string(),
            "create".to_string(),
            self.tag.clone(),
            "--title".to_string(),
            self.title.clone(),
            "--notes".to_string(),
            self.notes.clone(),
        ];
        if self.draft {
            args.push("--draft".to_string());
        }
        if self.prerelease {
            args.push("--prerelease".to_string());
        }
        if let Some(ref repo) = self.repo {
            args.push("--repo".to_string());
            args.push(repo.clone());
        }
        args
    }
}

/// Expand `{tag}`, `{version}`, and `{previous}` in a title template.
pub fn render_title(template: &str, tag: &str, version: &str, previous: &str) -> String {
    template
        .replace("{tag}", tag)
        .replace("{version}", version)
        .replace("{previous}", previous)
}

/// Create a GitHub release and return its URL, if `gh` printed one.
///
/// A `token` is handed to `gh` through `GH_TOKEN`; without one `gh` uses
/// its own stored credentials.
///
/// # Errors
///
/// Fails if `gh` cannot be run or rejects the request.
#[instrument(skip(request, token), fields(tag = %request.tag, draft = request.draft))]
pub fn create_release(
    dir: &Utf8Path,
    request: &ReleaseRequest,
    token: Option<&str>,
) -> Result<Option<String>, ReleaseError> {
    let mut command = Command::new("gh");
    command.args(request.args()).current_dir(dir.as_std_path());
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        command.env(GH_TOKEN_ENV, token);
    }

    debug!("creating GitHub release");
    let output = command.output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ReleaseError::Command { stderr });
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!(%url, "release created");
    Ok((!url.is_empty()).then_some(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_carry_title_and_notes() {
        let request = ReleaseRequest {
            tag: "v1.3.0".into(),
            title: "Release v1.3.0".into(),
            notes: "## Changelog".into(),
            ..Default::default()
        };
        assert_eq!(
            request.args(),
            vec![
                "release",
                "create",
                "v1.3.0",
                "--title",
                "Release v1.3.0",
                "--notes",
                "## Changelog"
            ]
        );
    }

    #[test]
    fn args_include_optional_flags() {
        let request = ReleaseRequest {
            tag: "v1.3.0-rc.1".into(),
            draft: true,
            prerelease: true,
            repo: Some("acme/widgets".into()),
            ..Default::default()
        };
        let args = request.args();
        assert!(args.contains(&"--draft".to_string()));
        assert!(args.contains(&"--prerelease".to_string()));
        assert_eq!(&args[args.len() - 2..], ["--repo", "acme/widgets"]);
    }

    #[test]
    fn title_placeholders_expand() {
        assert_eq!(
            render_title("{tag} ({previous} -> {version})", "v2.0.0", "2.0.0", "v1.9.1"),
            "v2.0.0 (v1.9.1 -> 2.0.0)"
        );
        assert_eq!(render_title("Release", "v1.0.0", "1.0.0", "v0.9.0"), "Release");
    }
}
