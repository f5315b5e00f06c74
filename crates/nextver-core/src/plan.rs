//! Release planning: from the latest tag and raw commits to the next version.
//!
//! Everything here is a pure function of its inputs. The caller gathers the
//! latest tag, the commit messages, and (for pre-releases) the existing
//! channel tags, then hands them over.
//!
//! # Two-phase workflow
//!
//! 1. **Stable** ([`plan_release`]) — analyse commits, resolve the increment
//!    level, compute the next stable version.
//! 2. **Pre-release** ([`ReleasePlan::into_prerelease`]) — optionally number
//!    the stable target within a channel, given the tags matching
//!    [`ReleasePlan::prerelease_pattern`].

use semver::Version;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::changelog;
use crate::rules::RuleTable;
use crate::version::conventional::{self, Analysis};
use crate::version::prerelease;
use crate::version::{self, DEFAULT_TAG, IncrementLevel, VersionResult};

// ──────────────────────────────────────────────
// Plan types
// ──────────────────────────────────────────────

/// The computed release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePlan {
    /// Version of the latest tag.
    pub previous: Version,
    /// Highest increment warranted by the commits.
    pub level: IncrementLevel,
    /// The next version; equals the stable `previous` when `level` is `None`.
    pub next: Version,
    /// Pre-release channel, once [`ReleasePlan::into_prerelease`] applied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Per-commit analysis behind `level`.
    pub analysis: Analysis,
}

impl ReleasePlan {
    /// Whether there is anything to tag and release.
    pub fn is_release(&self) -> bool {
        self.level != IncrementLevel::None
    }

    /// Tag name of the previous version.
    pub fn previous_tag(&self) -> String {
        version::tag_name(&self.previous)
    }

    /// Tag name of the next version.
    pub fn tag(&self) -> String {
        version::tag_name(&self.next)
    }

    /// Markdown changelog for the analysed commits.
    pub fn changelog(&self) -> String {
        changelog::render(&self.analysis)
    }

    /// Glob for existing tags of `channel` under the stable target.
    pub fn prerelease_pattern(&self, channel: &str) -> String {
        prerelease::prerelease_tag_pattern(&self.next, channel)
    }

    /// Turn the stable target into the next pre-release of `channel`.
    ///
    /// `existing` holds the tags matching [`Self::prerelease_pattern`]. A plan
    /// with nothing to release is returned unchanged.
    ///
    /// # Errors
    ///
    /// Fails if the channel is invalid or the pre-release cannot be built.
    #[instrument(skip(self, existing), fields(version = %self.next))]
    pub fn into_prerelease<S: AsRef<str>>(
        mut self,
        channel: &str,
        existing: &[S],
    ) -> VersionResult<Self> {
        if !self.is_release() {
            debug!("nothing to release, skipping pre-release numbering");
            return Ok(self);
        }

        self.next = prerelease::next_prerelease(&self.next, channel, existing)?;
        self.channel = Some(channel.to_string());
        info!(next = %self.next, "pre-release planned");
        Ok(self)
    }
}

// ──────────────────────────────────────────────
// Plan
// ──────────────────────────────────────────────

/// Plan the next stable release.
///
/// An empty `latest_tag` is read as [`DEFAULT_TAG`]. Unconventional commits
/// are skipped.
///
/// # Errors
///
/// Fails if `latest_tag` is not a valid version; no default is guessed.
/// Fails with [`VersionError::Overflow`](crate::version::VersionError::Overflow)
/// if the bumped component would exceed `u64::MAX`.
#[instrument(skip(messages, rules), fields(commits = messages.len()))]
pub fn plan_release<S: AsRef<str>>(
    latest_tag: &str,
    messages: &[S],
    rules: &RuleTable,
) -> VersionResult<ReleasePlan> {
    let latest_tag = if latest_tag.trim().is_empty() {
        DEFAULT_TAG
    } else {
        latest_tag
    };
    let previous = version::parse_version(latest_tag)?;

    let analysis = conventional::analyze(messages, rules);
    let level = analysis.level;
    let next = version::next_version(&previous, level)?;

    info!(%previous, %level, %next, "release planned");

    Ok(ReleasePlan {
        previous,
        level,
        next,
        channel: None,
        analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionError;

    fn plan(latest: &str, messages: &[&str]) -> ReleasePlan {
        plan_release(latest, messages, &RuleTable::new()).unwrap()
    }

    #[test]
    fn feat_and_fix_bump_minor() {
        let p = plan("v1.2.3", &["feat: add X", "fix: correct Y"]);
        assert_eq!(p.level, IncrementLevel::Minor);
        assert_eq!(p.tag(), "v1.3.0");
        assert!(p.is_release());
    }

    #[test]
    fn breaking_header_bumps_major() {
        let p = plan("v1.2.3", &["feat!: remove old API"]);
        assert_eq!(p.level, IncrementLevel::Major);
        assert_eq!(p.tag(), "v2.0.0");
    }

    #[test]
    fn chore_is_nothing_to_release() {
        let p = plan("v1.2.3", &["chore: bump deps"]);
        assert_eq!(p.level, IncrementLevel::None);
        assert_eq!(p.tag(), "v1.2.3");
        assert!(!p.is_release());
    }

    #[test]
    fn unconventional_only_keeps_version() {
        let p = plan("v3.1.4", &["wip", "more wip"]);
        assert_eq!(p.level, IncrementLevel::None);
        assert_eq!(p.next, p.previous);
    }

    #[test]
    fn empty_tag_defaults_to_zero() {
        let p = plan("", &["fix: first patch"]);
        assert_eq!(p.previous_tag(), "v0.0.0");
        assert_eq!(p.tag(), "v0.0.1");
    }

    #[test]
    fn malformed_latest_tag_is_fatal() {
        let err = plan_release("release-7", &["fix: x"], &RuleTable::new()).unwrap_err();
        match err {
            VersionError::InvalidVersion { input, .. } => assert_eq!(input, "release-7"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn overflowing_bump_is_fatal() {
        let err = plan_release("v1.2.18446744073709551615", &["fix: x"], &RuleTable::new())
            .unwrap_err();
        assert!(matches!(err, VersionError::Overflow { .. }));
    }

    #[test]
    fn header_with_trailing_space_and_breaking_footer_bumps_major() {
        let p = plan("v1.2.3", &["feat: \n\nBREAKING CHANGE: drop api"]);
        assert_eq!(p.level, IncrementLevel::Major);
        assert_eq!(p.tag(), "v2.0.0");
        assert_eq!(p.analysis.unconventional, 0);
    }

    #[test]
    fn first_beta_prerelease() {
        let p = plan("v0.0.0", &["fix: first patch"]);
        assert_eq!(p.prerelease_pattern("beta"), "v0.0.1-beta.*");
        let empty: [&str; 0] = [];
        let p = p.into_prerelease("beta", &empty).unwrap();
        assert_eq!(p.tag(), "v0.0.1-beta.1");
        assert_eq!(p.channel.as_deref(), Some("beta"));
    }

    #[test]
    fn next_beta_after_existing() {
        let p = plan("v0.0.0", &["fix: first patch"])
            .into_prerelease("beta", &["v0.0.1-beta.3"])
            .unwrap();
        assert_eq!(p.tag(), "v0.0.1-beta.4");
    }

    #[test]
    fn prerelease_of_nothing_is_unchanged() {
        let p = plan("v1.2.3", &["docs: typo"])
            .into_prerelease("rc", &["v1.2.3-rc.1"])
            .unwrap();
        assert_eq!(p.tag(), "v1.2.3");
        assert!(p.channel.is_none());
    }

    #[test]
    fn changelog_lists_contributing_commits() {
        let p = plan("v1.0.0", &["feat: a", "ci: b"]);
        assert_eq!(p.changelog(), "## Changelog\n\n- ✨ feat: a");
    }

    #[test]
    fn plan_serializes_versions_as_strings() {
        let p = plan("v1.2.3", &["fix: y"]);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["previous"], "1.2.3");
        assert_eq!(json["next"], "1.2.4");
        assert_eq!(json["level"], "patch");
        assert!(json.get("channel").is_none());
    }
}
