//! Info command: show package, configuration, and release rule information.

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use nextver_core::config::{self, Config};
use nextver_core::version::IncrementLevel;

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<String>,
    remote: String,
}

impl ConfigInfo {
    fn from_config(config: &Config, cwd: &camino::Utf8Path) -> Self {
        Self {
            config_file: config::find_project_config(cwd).map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            channel: config.default_channel().map(str::to_string),
            remote: config
                .release
                .as_ref()
                .map_or("origin", |r| r.remote())
                .to_string(),
        }
    }
}

#[derive(Serialize)]
struct RuleInfo {
    #[serde(rename = "type")]
    commit_type: String,
    release: IncrementLevel,
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
    rules: Vec<RuleInfo>,
}

impl FullInfo {
    fn gather(config: &Config, cwd: &camino::Utf8Path) -> Self {
        Self {
            package: PackageInfo::new(),
            config: ConfigInfo::from_config(config, cwd),
            rules: config
                .rule_table()
                .iter()
                .map(|(commit_type, release)| RuleInfo {
                    commit_type: commit_type.to_string(),
                    release,
                })
                .collect(),
        }
    }
}

/// Print package information and the effective release rules.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `cwd` - Current working directory for config discovery
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");

    let info = FullInfo::gather(config, cwd);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{} {}", info.package.name.bold(), info.package.version.green());
    if !info.package.description.is_empty() {
        println!("{}", info.package.description);
    }
    if !info.package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), info.package.license);
    }

    println!();
    println!("{}", "Configuration".bold().underline());
    if let Some(ref path) = info.config.config_file {
        println!("{}: {}", "Config file".dimmed(), path.cyan());
    } else {
        println!("{}: {}", "Config file".dimmed(), "none loaded".yellow());
    }
    println!("{}: {}", "Log level".dimmed(), info.config.log_level);
    if let Some(ref dir) = info.config.log_dir {
        println!("{}: {}", "Log directory".dimmed(), dir);
    }
    println!(
        "{}: {}",
        "Default channel".dimmed(),
        info.config.channel.as_deref().unwrap_or("none (stable)")
    );
    println!("{}: {}", "Remote".dimmed(), info.config.remote);

    println!();
    println!("{}", "Release Rules".bold().underline());
    for rule in &info.rules {
        let level = match rule.release {
            IncrementLevel::None => rule.release.to_string().dimmed().to_string(),
            _ => rule.release.to_string().cyan().to_string(),
        };
        println!("  {:<10} {level}", rule.commit_type);
    }
    println!(
        "  {}",
        "Breaking changes always release major; other types release nothing.".dimmed()
    );

    Ok(())
}
