use chrono::DateTime;
use std::collections::HashMap;

use crate::changelog::Changelog;
use crate::classify::{Group, GroupedCommit};
use crate::tracker::github::Issue;

/// Pluggable output backend for the grouped changelog.
///
/// The pipeline is agnostic to the final text format; anything implementing
/// these four operations can consume its output.
pub trait Renderer {
    fn render_version(&self, version: &str, date: &str) -> String;
    fn render_group(&self, group: &Group, issues: &HashMap<u64, Issue>) -> String;
    fn render_commit(&self, commit: &GroupedCommit) -> String;
    fn combine(&self, version: String, groups: Vec<String>) -> String;
}

/// Render a complete changelog, skipping groups that collected no commits.
pub fn render(renderer: &dyn Renderer, changelog: &Changelog) -> String {
    let version = renderer.render_version(&changelog.version, &changelog.date);
    let groups: Vec<String> = changelog
        .groups
        .iter()
        .filter(|group| !group.commits.is_empty())
        .map(|group| renderer.render_group(group, &changelog.issues))
        .collect();

    renderer.combine(version, groups)
}

/// Default markdown renderer.
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render_version(&self, version: &str, date: &str) -> String {
        format!("## {} ({})", version, short_date(date))
    }

    fn render_group(&self, group: &Group, issues: &HashMap<u64, Issue>) -> String {
        let mut lines = vec![format!("### {}", group.name), String::new()];

        for commit in &group.commits {
            // Prefer the tracker's issue title for annotated entries; the raw
            // commit subject is the fallback.
            let line = match commit.issue_number.and_then(|number| issues.get(&number)) {
                Some(issue) => format!("- {} (#{})", issue.title, issue.number),
                None => self.render_commit(commit),
            };
            lines.push(line);
        }

        lines.join("\n")
    }

    fn render_commit(&self, commit: &GroupedCommit) -> String {
        match commit.issue_number {
            Some(number) => format!("- {} (#{})", commit.commit.message.trim(), number),
            None => format!("- {}", commit.commit.message.trim()),
        }
    }

    fn combine(&self, version: String, groups: Vec<String>) -> String {
        let mut sections = vec![version];
        sections.extend(groups);
        let mut text = sections.join("\n\n");
        text.push('\n');
        text
    }
}

/// Reduce an ISO-8601 timestamp to its calendar date.
fn short_date(date: &str) -> String {
    DateTime::parse_from_rfc3339(date)
        .map(|parsed| parsed.date_naive().to_string())
        .unwrap_or_else(|_| date.chars().take(10).collect())
}
