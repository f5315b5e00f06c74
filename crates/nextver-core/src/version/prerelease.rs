//! Pre-release numbering within a channel.
//!
//! Pre-release tags look like `v1.3.0-beta.4`: a target stable version, a
//! channel, and an ordinal. The next ordinal comes from the highest existing
//! tag by semver precedence, so `beta.10` outranks `beta.2`.

use semver::{Prerelease, Version};
use tracing::{debug, instrument};

use crate::version::{VersionError, VersionResult, parse_version, stable};

/// Glob for tags in `channel` under `target`, e.g. `v1.3.0-beta.*`.
pub fn prerelease_tag_pattern(target: &Version, channel: &str) -> String {
    format!("v{}-{channel}.*", stable(target))
}

/// Compute the next pre-release of `target` in `channel`.
///
/// `existing` holds tag strings already known to match
/// [`prerelease_tag_pattern`]. Unparsable entries, and entries for another
/// version or channel, are ignored. With no usable tag the result is
/// `<target>-<channel>.1`. Otherwise the trailing numeric segment of the
/// highest tag is incremented; a non-numeric trailing segment gets a fresh
/// `.1` appended instead.
///
/// # Errors
///
/// Returns [`VersionError::InvalidChannel`] if `channel` is not a valid
/// pre-release identifier, or [`VersionError::InvalidVersion`] if the
/// resulting pre-release cannot be built.
#[instrument(skip(target, existing), fields(version = %target, candidates = existing.len()))]
pub fn next_prerelease<S: AsRef<str>>(
    target: &Version,
    channel: &str,
    existing: &[S],
) -> VersionResult<Version> {
    validate_channel(channel)?;

    let base = stable(target);
    let prefix = format!("{channel}.");

    let highest = existing
        .iter()
        .filter_map(|tag| {
            let tag = tag.as_ref();
            match parse_version(tag) {
                Ok(v) => Some(v),
                Err(err) => {
                    debug!(%tag, error = %err, "ignoring unparsable tag");
                    None
                }
            }
        })
        .filter(|v| stable(v) == base && v.pre.as_str().starts_with(&prefix))
        .max();

    let pre = match highest {
        None => format!("{channel}.1"),
        Some(max) => {
            debug!(highest = %max, "highest existing pre-release");
            bump_ordinal(max.pre.as_str())
        }
    };

    let mut next = base;
    next.pre = Prerelease::new(&pre).map_err(|source| VersionError::InvalidVersion {
        input: pre.clone(),
        source,
    })?;
    Ok(next)
}

fn validate_channel(channel: &str) -> VersionResult<()> {
    let valid = !channel.is_empty()
        && !channel.contains('.')
        && Prerelease::new(channel).is_ok();
    if valid {
        Ok(())
    } else {
        Err(VersionError::InvalidChannel {
            channel: channel.to_string(),
        })
    }
}

/// Increment the trailing dot-separated segment, or append `.1` when that
/// segment is not a number.
fn bump_ordinal(pre: &str) -> String {
    let ordinal = pre
        .rsplit_once('.')
        .and_then(|(head, last)| Some((head, last.parse::<u64>().ok()?.checked_add(1)?)));

    match ordinal {
        Some((head, next)) => format!("{head}.{next}"),
        None => {
            debug!(%pre, "pre-release has no numeric ordinal, appending .1");
            format!("{pre}.1")
        }
    }
}
