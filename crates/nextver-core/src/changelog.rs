//! Markdown changelog for a release.
//!
//! One bullet per commit that contributes a bump, marked by the level it
//! contributes. Commits that contribute nothing are left out.

use crate::version::IncrementLevel;
use crate::version::conventional::Analysis;

/// Heading that opens every changelog.
pub const HEADING: &str = "## Changelog";

/// Entry marker for a level, or `None` when the level earns no entry.
pub const fn marker(level: IncrementLevel) -> Option<&'static str> {
    match level {
        IncrementLevel::Major => Some("💥"),
        IncrementLevel::Minor => Some("✨"),
        IncrementLevel::Patch => Some("🐛"),
        IncrementLevel::None => None,
    }
}

/// Render the changelog for an analysed batch, in commit order.
pub fn render(analysis: &Analysis) -> String {
    let entries: Vec<String> = analysis
        .commits
        .iter()
        .filter_map(|commit| marker(commit.level).map(|m| format!("- {m} {}", commit.header)))
        .collect();

    if entries.is_empty() {
        HEADING.to_string()
    } else {
        format!("{HEADING}\n\n{}", entries.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleTable;
    use crate::version::conventional::analyze;

    #[test]
    fn renders_entries_in_commit_order() {
        let analysis = analyze(
            &["feat: add X", "chore: tidy", "fix(io): correct Y", "feat!: drop Z", "hello"],
            &RuleTable::new(),
        );
        assert_eq!(
            render(&analysis),
            "## Changelog\n\n- ✨ feat: add X\n- 🐛 fix(io): correct Y\n- 💥 feat!: drop Z"
        );
    }

    #[test]
    fn empty_changelog_is_heading_only() {
        let analysis = analyze(&["docs: typo"], &RuleTable::new());
        assert_eq!(render(&analysis), HEADING);
    }

    #[test]
    fn footer_breaking_uses_major_marker() {
        let analysis = analyze(&["refactor: split\n\nBREAKING CHANGE: api"], &RuleTable::new());
        assert_eq!(render(&analysis), "## Changelog\n\n- 💥 refactor: split");
    }
}
