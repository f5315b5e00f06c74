//! Command implementations

pub mod create;

pub mod doctor;

pub mod info;

pub mod next;

use anyhow::{Context, bail};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use nextver_core::config::Config;
use nextver_core::version::IncrementLevel;
use nextver_core::{ReleasePlan, plan_release};

use crate::git::Repo;

/// Pick the channel to number a pre-release in.
///
/// An explicit flag wins, and an explicitly empty one forces a stable
/// release. Otherwise the configured default applies.
pub fn resolve_channel<'a>(flag: Option<&'a str>, config: &'a Config) -> Option<&'a str> {
    match flag {
        Some(channel) => Some(channel.trim()).filter(|c| !c.is_empty()),
        None => config.default_channel(),
    }
}

/// Read the repository and plan the next release.
///
/// # Errors
///
/// Fails outside a git repository, if git fails, or if the latest tag or
/// channel is invalid.
#[instrument(skip(repo, config))]
pub fn compute_plan(
    repo: &Repo,
    config: &Config,
    channel: Option<&str>,
) -> anyhow::Result<ReleasePlan> {
    if !repo.is_inside()? {
        bail!("{} is not inside a git repository", repo.dir());
    }

    let latest = repo
        .latest_stable_tag()
        .context("failed to find the latest tag")?;
    let messages = repo
        .commit_messages_since(&latest)
        .with_context(|| format!("failed to read commits since {latest}"))?;
    debug!(%latest, commits = messages.len(), "gathered history");

    let plan = plan_release(&latest, &messages, &config.rule_table())
        .with_context(|| format!("cannot plan a release from tag {latest}"))?;

    let Some(channel) = channel else {
        return Ok(plan);
    };
    if !plan.is_release() {
        return Ok(plan);
    }

    let pattern = plan.prerelease_pattern(channel);
    let existing = repo
        .tags_matching(&pattern)
        .with_context(|| format!("failed to list tags matching {pattern}"))?;
    plan.into_prerelease(channel, &existing)
        .with_context(|| format!("cannot number a pre-release in channel {channel:?}"))
}

/// Machine-readable summary of a plan.
#[derive(Debug, Serialize)]
pub struct PlanSummary {
    /// Previous tag.
    pub previous: String,
    /// Next tag; equals `previous` when nothing is released.
    pub next: String,
    /// Increment level.
    pub level: IncrementLevel,
    /// Whether there is anything to release.
    pub release: bool,
    /// Pre-release channel, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Conventional commits considered.
    pub commits: usize,
    /// Messages that were not conventional commits.
    pub unconventional: usize,
    /// Markdown changelog.
    pub changelog: String,
}

impl From<&ReleasePlan> for PlanSummary {
    fn from(plan: &ReleasePlan) -> Self {
        Self {
            previous: plan.previous_tag(),
            next: plan.tag(),
            level: plan.level,
            release: plan.is_release(),
            channel: plan.channel.clone(),
            commits: plan.analysis.commits.len(),
            unconventional: plan.analysis.unconventional,
            changelog: plan.changelog(),
        }
    }
}

/// Print the human-readable plan header shared by `next` and `create`.
pub fn print_plan(plan: &ReleasePlan) {
    let summary = PlanSummary::from(plan);
    if summary.release {
        println!(
            "{} {} {} {}",
            "Version:".dimmed(),
            summary.previous,
            "→".dimmed(),
            summary.next.green().bold()
        );
    } else {
        println!("{} {}", "Version:".dimmed(), summary.previous);
    }
    println!("{} {}", "Level:".dimmed(), summary.level.to_string().cyan());
    if let Some(ref channel) = summary.channel {
        println!("{} {}", "Channel:".dimmed(), channel.cyan());
    }
    println!(
        "{} {} conventional, {} skipped",
        "Commits:".dimmed(),
        summary.commits,
        summary.unconventional
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextver_core::config::PrereleaseConfig;
    use nextver_core::rules::RuleTable;

    fn config_with_channel(channel: &str) -> Config {
        Config {
            prerelease: Some(PrereleaseConfig {
                channel: Some(channel.to_string()),
            }),
            ..Config::default()
        }
    }

    #[test]
    fn flag_channel_overrides_config() {
        let config = config_with_channel("beta");
        assert_eq!(resolve_channel(Some("rc"), &config), Some("rc"));
    }

    #[test]
    fn empty_flag_forces_stable() {
        let config = config_with_channel("beta");
        assert_eq!(resolve_channel(Some(""), &config), None);
    }

    #[test]
    fn config_channel_used_without_flag() {
        assert_eq!(resolve_channel(None, &config_with_channel("beta")), Some("beta"));
        assert_eq!(resolve_channel(None, &Config::default()), None);
    }

    #[test]
    fn summary_reflects_plan() {
        let plan = plan_release("v1.2.3", &["feat: x", "nope"], &RuleTable::new()).unwrap();
        let summary = PlanSummary::from(&plan);
        assert_eq!(summary.previous, "v1.2.3");
        assert_eq!(summary.next, "v1.3.0");
        assert!(summary.release);
        assert_eq!(summary.commits, 1);
        assert_eq!(summary.unconventional, 1);
        assert!(summary.changelog.contains("- ✨ feat: x"));
    }
}
