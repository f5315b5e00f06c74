//! Next command: print the version the next release would get.

use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use nextver_core::config::Config;

use super::{PlanSummary, compute_plan, print_plan, resolve_channel};
use crate::git::Repo;

/// Arguments for the `next` subcommand.
#[derive(Args, Debug, Default)]
pub struct NextArgs {
    /// Number the release as a pre-release in CHANNEL (e.g. "beta"); an
    /// empty value forces a stable release
    #[arg(long, value_name = "CHANNEL")]
    pub channel: Option<String>,

    /// Print only the next tag
    #[arg(long, conflicts_with = "changelog")]
    pub tag_only: bool,

    /// Also print the changelog
    #[arg(long)]
    pub changelog: bool,
}

/// Compute and print the next version.
#[instrument(name = "cmd_next", skip_all)]
pub fn cmd_next(
    args: NextArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    let channel = resolve_channel(args.channel.as_deref(), config);
    debug!(?channel, json_output = global_json, "executing next command");

    let plan = compute_plan(&Repo::new(cwd), config, channel)?;

    if global_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&PlanSummary::from(&plan))?
        );
        return Ok(());
    }

    if args.tag_only {
        println!("{}", plan.tag());
        return Ok(());
    }

    print_plan(&plan);
    if !plan.is_release() {
        println!("{}", "No releasable changes.".yellow());
    }
    if args.changelog {
        println!();
        println!("{}", plan.changelog());
    }

    Ok(())
}
