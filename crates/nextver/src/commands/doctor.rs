//! Doctor command: diagnose configuration, tools, and environment.

use std::io::IsTerminal;
use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Confirm;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use nextver_core::config::{self, Config, ReleaseConfig};
use nextver_core::rules::RuleTable;

use crate::git::Repo;

/// Arguments for the `doctor` subcommand.
#[derive(Args, Debug, Default)]
pub struct DoctorArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct DoctorReport {
    directories: DirectoryPaths,
    config: ConfigStatus,
    tools: Vec<ToolStatus>,
    repository: RepoStatus,
    environment: EnvironmentInfo,
}

#[derive(Serialize)]
struct DirectoryPaths {
    config: Option<String>,
    data_local: Option<String>,
}

#[derive(Serialize)]
struct ConfigStatus {
    /// Path to the project config file, if any
    file: Option<String>,
    /// Whether a config file was found
    found: bool,
}

#[derive(Serialize)]
struct ToolStatus {
    name: &'static str,
    path: Option<String>,
    purpose: &'static str,
}

#[derive(Serialize)]
struct RepoStatus {
    inside: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest_tag: Option<String>,
}

#[derive(Serialize)]
struct EnvironmentInfo {
    /// Current working directory
    cwd: String,
    /// Relevant environment variables
    env_vars: Vec<EnvVar>,
}

#[derive(Serialize)]
struct EnvVar {
    name: &'static str,
    value: Option<String>,
    description: &'static str,
}

impl EnvVar {
    fn read(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            value: std::env::var(name).ok(),
            description,
        }
    }

    /// Report only whether a secret is set.
    fn read_secret(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            value: std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .map(|_| "(set)".to_string()),
            description,
        }
    }
}

impl DoctorReport {
    fn gather(cwd: &camino::Utf8Path) -> Self {
        let config_file = config::find_project_config(cwd);
        let repo = Repo::new(cwd);
        let inside = which::which("git").is_ok() && repo.is_inside().unwrap_or(false);

        Self {
            directories: DirectoryPaths {
                config: config::user_config_dir().map(|p| p.to_string()),
                data_local: config::user_data_local_dir().map(|p| p.to_string()),
            },
            config: ConfigStatus {
                found: config_file.is_some(),
                file: config_file.map(|p| p.to_string()),
            },
            tools: vec![
                tool("git", "reading history and tagging"),
                tool("gh", "creating GitHub releases"),
            ],
            repository: RepoStatus {
                inside,
                latest_tag: inside.then(|| repo.latest_stable_tag().ok()).flatten(),
            },
            environment: EnvironmentInfo {
                cwd: cwd.to_string(),
                env_vars: vec![
                    EnvVar::read("XDG_CONFIG_HOME", "Override config directory"),
                    EnvVar::read("RUST_LOG", "Log filter directive"),
                    EnvVar::read("NEXTVER_LOG_PATH", "Explicit log file path"),
                    EnvVar::read("NEXTVER_LOG_DIR", "Log directory"),
                    EnvVar::read_secret("GITHUB_TOKEN", "Token for GitHub releases"),
                ],
            },
        }
    }
}

fn tool(name: &'static str, purpose: &'static str) -> ToolStatus {
    ToolStatus {
        name,
        path: which::which(name).ok().map(|p| p.display().to_string()),
        purpose,
    }
}

/// Run diagnostics and report configuration status.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `cwd` - Current working directory
#[instrument(name = "cmd_doctor", skip_all, fields(json_output))]
pub fn cmd_doctor(
    _args: DoctorArgs,
    global_json: bool,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing doctor command");

    let spinner = ProgressBar::new_spinner();
    if !global_json {
        spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
        spinner.set_message("Gathering diagnostics...");
        spinner.enable_steady_tick(Duration::from_millis(80));
    }

    let report = DoctorReport::gather(cwd);
    spinner.finish_and_clear();

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Configuration".bold().underline());
    if report.config.found {
        println!(
            "  {} Config file: {}",
            "✓".green(),
            report.config.file.as_deref().unwrap_or("").cyan()
        );
    } else {
        println!("  {} No project config file found", "○".yellow());
        offer_config_creation()?;
    }
    println!();

    println!("{}", "Directories".bold().underline());
    print_dir("  Config", report.directories.config.as_deref());
    print_dir("  Data (local)", report.directories.data_local.as_deref());
    println!();

    println!("{}", "Tools".bold().underline());
    for tool in &report.tools {
        match tool.path {
            Some(ref path) => println!("  {} {}: {}", "✓".green(), tool.name, path.cyan()),
            None => println!(
                "  {} {}: {} ({})",
                "✗".red(),
                tool.name,
                "not found".yellow(),
                tool.purpose.dimmed()
            ),
        }
    }
    println!();

    println!("{}", "Repository".bold().underline());
    if report.repository.inside {
        println!("  {} Inside a git repository", "✓".green());
        if let Some(ref tag) = report.repository.latest_tag {
            println!("  {}: {}", "Latest stable tag".dimmed(), tag.cyan());
        }
    } else {
        println!("  {} Not inside a git repository", "○".yellow());
    }
    println!();

    println!("{}", "Environment".bold().underline());
    println!("  {}: {}", "Working directory".dimmed(), cwd.cyan());

    let set_vars: Vec<_> = report
        .environment
        .env_vars
        .iter()
        .filter(|v| v.value.is_some())
        .collect();

    if set_vars.is_empty() {
        println!("  {} No overrides set", "○".dimmed());
    } else {
        for var in set_vars {
            println!(
                "  {}: {}",
                var.name.dimmed(),
                var.value.as_deref().unwrap_or("").cyan()
            );
        }
    }

    Ok(())
}

fn print_dir(label: &str, path: Option<&str>) {
    print!("{}: ", label.dimmed());
    match path {
        Some(p) => println!("{}", p.cyan()),
        None => println!("{}", "(unavailable)".yellow()),
    }
}

/// A starter configuration with every default spelled out.
fn starter_config() -> Config {
    Config {
        release_rules: RuleTable::new().to_rules(),
        release: Some(ReleaseConfig {
            remote: Some("origin".to_string()),
            github_release: Some(true),
            draft: Some(false),
            title: Some("{tag}".to_string()),
        }),
        ..Config::default()
    }
}

/// Offer to create a user config file when none exists.
fn offer_config_creation() -> anyhow::Result<()> {
    let Some(config_dir) = config::user_config_dir() else {
        return Ok(());
    };

    let config_path = config_dir.join("config.yaml");
    if config_path.is_file() || !std::io::stdin().is_terminal() {
        return Ok(());
    }

    let create = Confirm::new("Create a default user config file?")
        .with_default(false)
        .with_help_message(&format!("Will create {config_path}"))
        .prompt();

    if let Ok(true) = create {
        std::fs::create_dir_all(&config_dir)?;
        let yaml = serde_saphyr::to_string(&starter_config())?;
        std::fs::write(&config_path, yaml)?;
        println!("  {} Created {}", "✓".green(), config_path.cyan());
    }

    Ok(())
}
