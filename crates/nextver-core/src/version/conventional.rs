//! Conventional-commit increment resolution.
//!
//! Each classified commit contributes a level: `Major` when breaking,
//! otherwise whatever the [`RuleTable`] says for its type. The batch level
//! is the maximum contribution, so commit order never matters.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::commit::{self, Classification};
use crate::rules::RuleTable;
use crate::version::IncrementLevel;

/// A conventional commit together with the level it contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzedCommit {
    /// The commit header line.
    pub header: String,
    /// How the header and footers were read.
    #[serde(flatten)]
    pub classification: Classification,
    /// The commit's contribution to the batch level.
    pub level: IncrementLevel,
}

/// Outcome of analysing a batch of raw commit messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    /// Highest contribution across all conventional commits.
    pub level: IncrementLevel,
    /// Conventional commits, in input order.
    pub commits: Vec<AnalyzedCommit>,
    /// How many messages did not match the conventional header shape.
    pub unconventional: usize,
}

/// The level a single classified commit contributes.
pub fn contribution(commit: &Classification, rules: &RuleTable) -> IncrementLevel {
    if commit.breaking {
        IncrementLevel::Major
    } else {
        rules.lookup(&commit.commit_type)
    }
}

/// Fold classified commits into the highest contribution.
pub fn resolve_increment<'a, I>(commits: I, rules: &RuleTable) -> IncrementLevel
where
    I: IntoIterator<Item = &'a Classification>,
{
    commits
        .into_iter()
        .map(|c| contribution(c, rules))
        .max()
        .unwrap_or_default()
}

/// Split, classify, and fold a batch of raw commit messages.
///
/// Unconventional messages are skipped and counted, never treated as errors.
#[instrument(skip_all, fields(messages = messages.len()))]
pub fn analyze<S: AsRef<str>>(messages: &[S], rules: &RuleTable) -> Analysis {
    let mut analysis = Analysis::default();

    for raw in messages {
        let parsed = commit::split_message(raw.as_ref());
        let Some(classification) = commit::classify(&parsed) else {
            debug!(header = %parsed.header, "skipping unconventional commit");
            analysis.unconventional += 1;
            continue;
        };

        let level = contribution(&classification, rules);
        analysis.level = analysis.level.max(level);
        analysis.commits.push(AnalyzedCommit {
            header: parsed.header,
            classification,
            level,
        });
    }

    debug!(
        level = %analysis.level,
        conventional = analysis.commits.len(),
        unconventional = analysis.unconventional,
        "commits analysed"
    );
    analysis
}
