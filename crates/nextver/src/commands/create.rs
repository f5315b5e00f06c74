//! Create command: tag the next version, push it, and publish a release.

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Confirm;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, info, instrument};

use nextver_core::ReleasePlan;
use nextver_core::config::{Config, ReleaseConfig};

use super::{PlanSummary, compute_plan, print_plan, resolve_channel};
use crate::git::{self, Repo};
use crate::github::{self, ReleaseRequest};

/// Title used when the configuration sets none.
const DEFAULT_TITLE: &str = "{tag}";

/// Arguments for the `create` subcommand.
#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// Number the release as a pre-release in CHANNEL (e.g. "beta"); an
    /// empty value forces a stable release
    #[arg(long, value_name = "CHANNEL")]
    pub channel: Option<String>,

    /// Preview what would happen without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Create the tag locally without pushing it (implies --no-release)
    #[arg(long)]
    pub no_push: bool,

    /// Skip GitHub release creation
    #[arg(long)]
    pub no_release: bool,

    /// Create the GitHub release as a draft (overrides config)
    #[arg(long)]
    pub draft: bool,

    /// GitHub token for the release; gh's stored login is used when unset
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub token: Option<String>,
}

/// What happened to one step of the release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum StepStatus {
    Done,
    Planned,
    Skipped,
}

#[derive(Debug, Serialize)]
struct StepReport {
    step: &'static str,
    status: StepStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct CreateOutcome {
    #[serde(flatten)]
    plan: PlanSummary,
    dry_run: bool,
    steps: Vec<StepReport>,
    /// Whether the GitHub release was created; `gh` may print no URL.
    released: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    release_url: Option<String>,
}

/// Which steps run, after flags and configuration are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Steps {
    push: bool,
    release: bool,
    draft: bool,
    remote: String,
    title: String,
}

impl Steps {
    fn resolve(args: &CreateArgs, release: &ReleaseConfig) -> Self {
        let push = !args.no_push;
        Self {
            push,
            release: push && !args.no_release && release.github_release.unwrap_or(true),
            draft: args.draft || release.draft.unwrap_or(false),
            remote: release.remote().to_string(),
            title: release
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        }
    }
}

/// Tag and publish the next release.
#[instrument(name = "cmd_create", skip_all)]
pub fn cmd_create(
    args: CreateArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(
        json_output = global_json,
        dry_run = args.dry_run,
        "executing create command"
    );

    let repo = Repo::new(cwd);
    let channel = resolve_channel(args.channel.as_deref(), config);
    let plan = compute_plan(&repo, config, channel)?;
    let steps = Steps::resolve(&args, &config.release.clone().unwrap_or_default());

    if !plan.is_release() {
        if global_json {
            let outcome = CreateOutcome {
                plan: PlanSummary::from(&plan),
                dry_run: args.dry_run,
                steps: Vec::new(),
                released: false,
                release_url: None,
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            println!(
                "{} No releasable changes since {}; nothing to release.",
                "○".yellow(),
                plan.previous_tag()
            );
        }
        return Ok(());
    }

    let tag = plan.tag();

    if !global_json {
        if args.dry_run {
            println!("{}", "DRY RUN: no changes will be made".yellow().bold());
        }
        print_plan(&plan);
        println!();
        println!("{}", plan.changelog());
        println!();
    }

    if !args.dry_run && !args.yes && !confirm(&tag, global_json)? {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    let mut reports = Vec::new();
    let mut release_url = None;
    let mut released = false;
    let show = !global_json;

    // Tag
    if args.dry_run {
        reports.push(planned("tag", format!("would create {tag}")));
    } else {
        run_step(show, &format!("Creating tag {tag}"), || repo.create_tag(&tag))
            .with_context(|| format!("failed to create tag {tag}"))?;
        reports.push(done("tag", format!("created {tag}")));
    }

    // Push
    if !steps.push {
        reports.push(skipped("push", "--no-push"));
    } else if args.dry_run {
        reports.push(planned("push", format!("would push {tag} to {}", steps.remote)));
    } else {
        run_step(show, &format!("Pushing {tag} to {}", steps.remote), || {
            repo.push_tag(&steps.remote, &tag)
        })
        .with_context(|| {
            format!(
                "tag {tag} was created locally but could not be pushed to {}",
                steps.remote
            )
        })?;
        reports.push(done("push", format!("pushed {tag} to {}", steps.remote)));
    }

    // Release
    if !steps.release {
        let reason = if steps.push {
            "disabled"
        } else {
            "tag not pushed"
        };
        reports.push(skipped("release", reason));
    } else {
        let request = release_request(&repo, &plan, &steps)?;
        if args.dry_run {
            reports.push(planned(
                "release",
                format!("would create GitHub release \"{}\"", request.title),
            ));
        } else {
            release_url = run_step(show, "Creating GitHub release", || {
                github::create_release(repo.dir(), &request, args.token.as_deref())
            })
            .with_context(|| format!("tag {tag} was pushed but the GitHub release failed"))?;
            released = true;
            reports.push(done(
                "release",
                release_url.clone().unwrap_or_else(|| "created".to_string()),
            ));
        }
    }

    if !args.dry_run {
        info!(%tag, pushed = steps.push, released, "release created");
    }

    let outcome = CreateOutcome {
        plan: PlanSummary::from(&plan),
        dry_run: args.dry_run,
        steps: reports,
        released,
        release_url,
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for report in &outcome.steps {
            print_report(report);
        }
        println!();
        if args.dry_run {
            println!("{} Dry run complete for {}", "✓".green(), tag.bold());
        } else {
            println!("{} Released {}", "✓".green().bold(), tag.green().bold());
        }
    }

    Ok(())
}

/// Ask before touching the repository. Non-interactive runs must pass `--yes`.
fn confirm(tag: &str, global_json: bool) -> anyhow::Result<bool> {
    if global_json || !std::io::stdin().is_terminal() {
        bail!("refusing to create {tag} without confirmation; pass --yes to proceed");
    }

    Confirm::new(&format!("Create and publish {tag}?"))
        .with_default(true)
        .prompt()
        .context("confirmation prompt failed")
}

fn release_request(repo: &Repo, plan: &ReleasePlan, steps: &Steps) -> anyhow::Result<ReleaseRequest> {
    let repo_slug = repo
        .remote_url(&steps.remote)?
        .as_deref()
        .and_then(git::parse_owner_repo)
        .map(|(owner, name)| format!("{owner}/{name}"));

    let tag = plan.tag();
    Ok(ReleaseRequest {
        title: github::render_title(
            &steps.title,
            &tag,
            &plan.next.to_string(),
            &plan.previous_tag(),
        ),
        tag,
        notes: plan.changelog(),
        draft: steps.draft,
        prerelease: plan.channel.is_some(),
        repo: repo_slug,
    })
}

/// Run one step behind a spinner.
fn run_step<T, E>(show: bool, message: &str, step: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    if !show {
        return step();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(format!("{message}..."));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = step();
    spinner.finish_and_clear();
    result
}

fn done(step: &'static str, detail: String) -> StepReport {
    StepReport {
        step,
        status: StepStatus::Done,
        detail,
    }
}

fn planned(step: &'static str, detail: String) -> StepReport {
    StepReport {
        step,
        status: StepStatus::Planned,
        detail,
    }
}

fn skipped(step: &'static str, reason: &str) -> StepReport {
    StepReport {
        step,
        status: StepStatus::Skipped,
        detail: reason.to_string(),
    }
}

fn print_report(report: &StepReport) {
    match report.status {
        StepStatus::Done => println!(
            "  {} {} {}",
            "✓".green(),
            report.step.bold(),
            report.detail.dimmed()
        ),
        StepStatus::Planned => println!(
            "  {} {} {}",
            "○".green(),
            report.step.bold(),
            report.detail.dimmed()
        ),
        StepStatus::Skipped => println!(
            "  {} {} {}",
            "–".yellow(),
            report.step.bold(),
            format!("skipped: {}", report.detail).dimmed()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_default_to_push_and_release() {
        let steps = Steps::resolve(&CreateArgs::default(), &ReleaseConfig::default());
        assert!(steps.push);
        assert!(steps.release);
        assert!(!steps.draft);
        assert_eq!(steps.remote, "origin");
        assert_eq!(steps.title, DEFAULT_TITLE);
    }

    #[test]
    fn no_push_disables_release() {
        let args = CreateArgs {
            no_push: true,
            ..Default::default()
        };
        let steps = Steps::resolve(&args, &ReleaseConfig::default());
        assert!(!steps.push);
        assert!(!steps.release);
    }

    #[test]
    fn config_can_disable_release_and_force_draft() {
        let release = ReleaseConfig {
            remote: Some("upstream".into()),
            github_release: Some(false),
            draft: Some(true),
            title: Some("Release {version}".into()),
        };
        let steps = Steps::resolve(&CreateArgs::default(), &release);
        assert!(steps.push);
        assert!(!steps.release);
        assert!(steps.draft);
        assert_eq!(steps.remote, "upstream");
        assert_eq!(steps.title, "Release {version}");
    }

    #[test]
    fn draft_flag_overrides_config() {
        let args = CreateArgs {
            draft: true,
            ..Default::default()
        };
        let release = ReleaseConfig {
            draft: Some(false),
            ..Default::default()
        };
        assert!(Steps::resolve(&args, &release).draft);
    }

    #[test]
    fn step_reports_serialize_lowercase() {
        let json = serde_json::to_value(skipped("push", "--no-push")).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["step"], "push");
    }

    #[test]
    fn outcome_reports_release_without_url() {
        let plan = nextver_core::plan_release("v1.0.0", &["fix: x"], &nextver_core::RuleTable::new())
            .unwrap();
        let outcome = CreateOutcome {
            plan: PlanSummary::from(&plan),
            dry_run: false,
            steps: vec![done("release", "created".to_string())],
            released: true,
            release_url: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["released"], true);
        assert!(json.get("release_url").is_none());
        assert_eq!(json["next"], "v1.0.1");
    }

    #[test]
    fn run_step_passes_result_through() {
        let ok: Result<u8, ()> = run_step(false, "quiet", || Ok(7));
        assert_eq!(ok, Ok(7));
        let err: Result<u8, &str> = run_step(false, "quiet", || Err("boom"));
        assert_eq!(err, Err("boom"));
    }
}
