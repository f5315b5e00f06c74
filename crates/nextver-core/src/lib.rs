//! Core library for nextver.
//!
//! Classifies commit messages against the Conventional Commits grammar and
//! computes the next semantic version, including channel-based pre-releases.
//! Nothing here touches git, the network, or the process environment; the
//! caller supplies the latest tag, the raw commit messages, and any existing
//! pre-release tags.
//!
//! # Modules
//!
//! - [`commit`] - Message splitting and header classification
//! - [`rules`] - Commit type to increment level mapping
//! - [`version`] - Version values, increment resolution, pre-releases
//! - [`plan`] - The end-to-end release computation
//! - [`changelog`] - Markdown release notes
//! - [`config`] - Configuration loading and management
//! - [`error`] - Configuration error types
//!
//! # Quick Start
//!
//! ```
//! use nextver_core::plan::plan_release;
//! use nextver_core::rules::RuleTable;
//! use nextver_core::version::IncrementLevel;
//!
//! let plan = plan_release("v1.2.3", &["feat: add X", "fix: correct Y"], &RuleTable::new())
//!     .expect("valid tag");
//!
//! assert_eq!(plan.level, IncrementLevel::Minor);
//! assert_eq!(plan.tag(), "v1.3.0");
//! ```
#![deny(unsafe_code)]

pub mod changelog;

pub mod commit;

pub mod config;

pub mod error;

pub mod plan;

pub mod rules;

pub mod version;

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult};

pub use plan::{ReleasePlan, plan_release};

pub use rules::{ReleaseRule, RuleTable};

pub use version::{IncrementLevel, VersionError, VersionResult};

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;
