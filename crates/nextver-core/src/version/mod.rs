//! Version values, increment levels, and stable version computation.
//!
//! Versions are [`semver::Version`] values. Tags carry a `v` prefix on the
//! way in and out: `vMAJOR.MINOR.PATCH[-CHANNEL.N]`.
//!
//! Submodules fold commits into an increment level ([`conventional`]) and
//! number pre-releases within a channel ([`prerelease`]).

pub mod conventional;
pub mod prerelease;

use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag assumed when the repository has no version tags yet.
pub const DEFAULT_TAG: &str = "v0.0.0";

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    /// A tag or version string is not `MAJOR.MINOR.PATCH[-PRERELEASE]`.
    #[error("invalid version '{input}': {source}")]
    InvalidVersion {
        /// The offending input.
        input: String,
        /// Underlying parse failure.
        #[source]
        source: semver::Error,
    },

    /// A pre-release channel is empty or not a valid pre-release identifier.
    #[error("invalid pre-release channel '{channel}'")]
    InvalidChannel {
        /// The offending channel name.
        channel: String,
    },

    /// Incrementing a version component would exceed `u64::MAX`.
    #[error("version {version} cannot be incremented without overflow")]
    Overflow {
        /// The version that could not be incremented.
        version: String,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Magnitude of a version bump.
///
/// Variants are declared in ascending order so the derived ordering gives
/// `None < Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum IncrementLevel {
    /// No qualifying changes; nothing to release.
    #[default]
    None,
    /// Patch release (x.y.Z).
    Patch,
    /// Minor release (x.Y.0).
    Minor,
    /// Major release (X.0.0).
    Major,
}

impl IncrementLevel {
    /// Returns the level as a lowercase string slice.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

impl std::fmt::Display for IncrementLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An increment level name that is not one of `major`, `minor`, `patch`, `none`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown release level '{value}' (expected major, minor, patch or none)")]
pub struct ParseLevelError {
    /// The rejected value.
    pub value: String,
}

impl FromStr for IncrementLevel {
    type Err = ParseLevelError;

    /// Parses a level name, ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            _ => Err(ParseLevelError {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for IncrementLevel {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parse a version string, stripping an optional `v` prefix.
pub fn parse_version(s: &str) -> VersionResult<Version> {
    let trimmed = s.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(bare).map_err(|source| VersionError::InvalidVersion {
        input: s.to_string(),
        source,
    })
}

/// Render a version as a tag name (`v` + version).
pub fn tag_name(version: &Version) -> String {
    format!("v{version}")
}

/// The `major.minor.patch` part of a version, without pre-release or build data.
pub const fn stable(version: &Version) -> Version {
    Version::new(version.major, version.minor, version.patch)
}

/// Compute the next stable version by applying an increment level.
///
/// Any pre-release on `current` is ignored. [`IncrementLevel::None`] returns
/// the stable version unchanged, which callers treat as "nothing to release".
/// A major bump behaves the same for `0.x` as for any other major.
///
/// Returns [`VersionError::Overflow`] when the bumped component is already
/// `u64::MAX`.
pub fn next_version(current: &Version, level: IncrementLevel) -> VersionResult<Version> {
    let bump = |component: u64| {
        component
            .checked_add(1)
            .ok_or_else(|| VersionError::Overflow {
                version: current.to_string(),
            })
    };
    Ok(match level {
        IncrementLevel::None => stable(current),
        IncrementLevel::Patch => Version::new(current.major, current.minor, bump(current.patch)?),
        IncrementLevel::Minor => Version::new(current.major, bump(current.minor)?, 0),
        IncrementLevel::Major => Version::new(bump(current.major)?, 0, 0),
    })
}
