//! Commit message splitting and conventional-commit classification.
//!
//! A raw message is first split into header, body, and footer blocks
//! ([`split_message`]), then the header is matched against
//! `type[(scope)][!]: description` ([`classify`]). Messages whose header
//! does not match are unconventional and yield `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// `type[(scope)][!]: description`
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>\w+)(?:\((?P<scope>[^()]+)\))?(?P<breaking>!)?: (?P<description>.*)$")
        .expect("header pattern is valid")
});

/// First line of a footer paragraph: `token: `, where token may contain dashes.
static FOOTER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:BREAKING CHANGE|BREAKING-CHANGE|[\w-]+): ").expect("footer pattern is valid")
});

const BREAKING_TRAILERS: [&str; 2] = ["BREAKING CHANGE:", "BREAKING-CHANGE:"];

/// A commit message split into its three blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommit {
    /// First line of the message.
    pub header: String,
    /// Paragraphs between the header block and the footers.
    pub body: String,
    /// Trailing run of footer-shaped paragraphs.
    pub footers: String,
}

/// The conventional-commit reading of a header plus footers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Commit type, e.g. `feat`.
    #[serde(rename = "type")]
    pub commit_type: String,
    /// Optional parenthesised scope.
    pub scope: Option<String>,
    /// Header `!` marker or a breaking-change footer trailer.
    pub breaking: bool,
    /// Free text after `: `.
    pub description: String,
}

/// Split a raw commit message into header, body, and footers.
///
/// Paragraphs are separated by blank lines. The header is the first line of
/// the first paragraph. Of the remaining paragraphs, the longest suffix whose
/// paragraphs all open with a footer token is the footer block; the rest is
/// the body. An empty message yields all-empty fields.
///
/// Only the message as a whole is trimmed; the header keeps any trailing
/// spaces, so `feat: ` stays a header with an empty description.
pub fn split_message(raw: &str) -> ParsedCommit {
    let normalized = raw.replace("\r\n", "\n");
    let paragraphs = paragraphs(normalized.trim());

    let Some((first, rest)) = paragraphs.split_first() else {
        return ParsedCommit::default();
    };

    let header = first
        .first()
        .copied()
        .unwrap_or_default()
        .trim_end_matches('\r')
        .to_string();
    let footer_start = footer_start(rest);

    ParsedCommit {
        header,
        body: join_paragraphs(&rest[..footer_start]),
        footers: join_paragraphs(&rest[footer_start..]),
    }
}

/// Classify a split commit.
///
/// Returns `None` for unconventional headers.
pub fn classify(commit: &ParsedCommit) -> Option<Classification> {
    let caps = HEADER.captures(&commit.header)?;

    let header_breaking = caps.name("breaking").is_some();
    let footer_breaking = has_breaking_footer(&commit.footers);

    Some(Classification {
        commit_type: caps["type"].to_string(),
        scope: caps.name("scope").map(|m| m.as_str().to_string()),
        breaking: header_breaking || footer_breaking,
        description: caps["description"].to_string(),
    })
}

/// Split and classify a raw message in one step.
pub fn classify_message(raw: &str) -> Option<Classification> {
    classify(&split_message(raw))
}

/// Whether any footer line opens with a breaking-change trailer.
///
/// Tokens are case-sensitive. Body text is never inspected.
pub fn has_breaking_footer(footers: &str) -> bool {
    footers.lines().map(str::trim).any(|line| {
        BREAKING_TRAILERS
            .iter()
            .any(|trailer| line.starts_with(trailer))
    })
}

fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut out: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn is_footer_paragraph(paragraph: &[&str]) -> bool {
    paragraph
        .first()
        .is_some_and(|line| FOOTER_TOKEN.is_match(line))
}

/// Index of the first paragraph in the trailing footer run.
///
/// Scanning stops at the last non-footer paragraph, so a footer-shaped
/// paragraph before it stays in the body.
fn footer_start(paragraphs: &[Vec<&str>]) -> usize {
    paragraphs
        .iter()
        .rposition(|p| !is_footer_paragraph(p))
        .map_or(0, |idx| idx + 1)
}

fn join_paragraphs(paragraphs: &[Vec<&str>]) -> String {
    paragraphs
        .iter()
        .map(|p| p.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_empty_message() {
        assert_eq!(split_message(""), ParsedCommit::default());
        assert_eq!(split_message("  \n\n  "), ParsedCommit::default());
    }

    #[test]
    fn split_header_only() {
        let parsed = split_message("feat: add login\n");
        assert_eq!(parsed.header, "feat: add login");
        assert!(parsed.body.is_empty());
        assert!(parsed.footers.is_empty());
    }

    #[test]
    fn split_header_uses_first_line_of_first_block() {
        let parsed = split_message("fix: one\nwrapped continuation");
        assert_eq!(parsed.header, "fix: one");
        assert!(parsed.body.is_empty());
    }

    #[test]
    fn split_body_and_footers() {
        let parsed = split_message(
            "feat(api): add endpoint\n\nFirst paragraph.\n\nSecond paragraph.\n\nRefs: #12\nReviewed-by: Sam",
        );
        assert_eq!(parsed.header, "feat(api): add endpoint");
        assert_eq!(parsed.body, "First paragraph.\n\nSecond paragraph.");
        assert_eq!(parsed.footers, "Refs: #12\nReviewed-by: Sam");
    }

    #[test]
    fn split_contiguous_footer_paragraphs() {
        let parsed = split_message("fix: x\n\nbody\n\nRefs: #1\n\nBREAKING CHANGE: gone");
        assert_eq!(parsed.body, "body");
        assert_eq!(parsed.footers, "Refs: #1\n\nBREAKING CHANGE: gone");
    }

    #[test]
    fn footer_scan_stops_at_first_non_footer_paragraph() {
        // "Refs: #1" looks like a footer but sits before plain prose, so the
        // scan must stop at the prose instead of skipping past it.
        let parsed = split_message("fix: x\n\nRefs: #1\n\nplain prose\n\nAcked-by: Kim");
        assert_eq!(parsed.body, "Refs: #1\n\nplain prose");
        assert_eq!(parsed.footers, "Acked-by: Kim");
    }

    #[test]
    fn split_without_footers() {
        let parsed = split_message("docs: readme\n\njust words here");
        assert_eq!(parsed.body, "just words here");
        assert!(parsed.footers.is_empty());
    }

    #[test]
    fn split_only_footers_after_header() {
        let parsed = split_message("feat: x\n\nBREAKING-CHANGE: api removed");
        assert!(parsed.body.is_empty());
        assert_eq!(parsed.footers, "BREAKING-CHANGE: api removed");
    }

    #[test]
    fn split_handles_crlf() {
        let parsed = split_message("fix: y\r\n\r\nbody\r\n\r\nRefs: #2\r\n");
        assert_eq!(parsed.header, "fix: y");
        assert_eq!(parsed.body, "body");
        assert_eq!(parsed.footers, "Refs: #2");
    }

    #[test]
    fn split_keeps_trailing_space_of_header() {
        let parsed = split_message("feat: \n\nBREAKING CHANGE: drop api");
        assert_eq!(parsed.header, "feat: ");
        assert_eq!(parsed.footers, "BREAKING CHANGE: drop api");

        let c = classify(&parsed).unwrap();
        assert_eq!(c.commit_type, "feat");
        assert_eq!(c.description, "");
        assert!(c.breaking);
    }

    #[test]
    fn classify_plain_type() {
        let c = classify_message("fix: correct rounding").unwrap();
        assert_eq!(c.commit_type, "fix");
        assert_eq!(c.scope, None);
        assert!(!c.breaking);
        assert_eq!(c.description, "correct rounding");
    }

    #[test]
    fn classify_with_scope() {
        let c = classify_message("feat(auth): add login").unwrap();
        assert_eq!(c.commit_type, "feat");
        assert_eq!(c.scope.as_deref(), Some("auth"));
        assert!(!c.breaking);
    }

    #[test]
    fn classify_header_breaking_marker() {
        assert!(classify_message("feat!: remove old API").unwrap().breaking);
        assert!(classify_message("refactor(core)!: drop v1").unwrap().breaking);
    }

    #[test]
    fn classify_footer_breaking_trailers() {
        assert!(
            classify_message("chore: bump\n\nBREAKING CHANGE: needs node 20")
                .unwrap()
                .breaking
        );
        assert!(
            classify_message("docs: x\n\nRefs: #4\nBREAKING-CHANGE: moved")
                .unwrap()
                .breaking
        );
    }

    #[test]
    fn classify_breaking_trailer_is_case_sensitive() {
        let c = classify_message("fix: x\n\nbreaking change: nope").unwrap();
        assert!(!c.breaking);
    }

    #[test]
    fn breaking_trailer_in_body_does_not_count() {
        let c = classify_message("fix: x\n\nBREAKING CHANGE: mentioned early\n\nprose after").unwrap();
        assert!(!c.breaking);
    }

    #[test]
    fn classify_rejects_unconventional_headers() {
        assert!(classify_message("Random commit message").is_none());
        assert!(classify_message("feat:missing space").is_none());
        assert!(classify_message("feat (x): space before scope").is_none());
        assert!(classify_message("Merge branch 'main'").is_none());
        assert!(classify_message("").is_none());
    }

    #[test]
    fn has_breaking_footer_trims_lines() {
        assert!(has_breaking_footer("Refs: #1\n   BREAKING CHANGE: x"));
        assert!(!has_breaking_footer("Refs: #1"));
    }
}
