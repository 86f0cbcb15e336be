use regex::Regex;
use std::collections::HashMap;

use crate::git::parse::Commit;
use crate::tracker::github::Issue;

/// A label-rule matcher, resolved once at configuration load time.
///
/// Literals match by substring containment, patterns by regex test; both
/// sides of the classifier consume matchers through the same interface.
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Literal(literal) => text.contains(literal),
            Matcher::Pattern(pattern) => pattern.is_match(text),
        }
    }

    /// Remove the first occurrence of the match from `text`.
    pub fn strip_first(&self, text: &str) -> String {
        match self {
            Matcher::Literal(literal) => text.replacen(literal.as_str(), "", 1),
            Matcher::Pattern(pattern) => pattern.replace(text, "").into_owned(),
        }
    }
}

/// Maps issue labels or commit-message text to a named output group.
#[derive(Debug, Clone)]
pub struct LabelRule {
    pub matcher: Matcher,
    pub name: String,
}

/// A commit placed into a group, annotated with the issue number that
/// triggered the match (external rules only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedCommit {
    pub commit: Commit,
    pub issue_number: Option<u64>,
}

/// A label rule's name paired with every commit that satisfied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub commits: Vec<GroupedCommit>,
}

/// Partition commits into labeled groups.
///
/// External rules run first, against the fetched labels of each commit's
/// linked issues; local rules run second, against the message text of
/// commits with no linked issues. Group order follows rule input order, and
/// membership is non-exclusive: one commit may appear under several rules.
/// Commits matching no rule are omitted entirely.
pub fn classify(
    commits: &[Commit],
    issues: &HashMap<u64, Issue>,
    external_rules: &[LabelRule],
    local_rules: &[LabelRule],
) -> Vec<Group> {
    let mut groups = Vec::with_capacity(external_rules.len() + local_rules.len());

    for rule in external_rules {
        groups.push(external_group(rule, commits, issues));
    }
    for rule in local_rules {
        groups.push(local_group(rule, commits));
    }

    groups
}

/// One external rule's group: every (commit, issue number) pair whose
/// fetched issue carries a matching label. A commit with several qualifying
/// issues contributes one entry per issue; issue numbers absent from the
/// map are skipped.
fn external_group(rule: &LabelRule, commits: &[Commit], issues: &HashMap<u64, Issue>) -> Group {
    let mut members = Vec::new();

    for commit in commits {
        for &number in &commit.issues {
            let Some(issue) = issues.get(&number) else {
                continue;
            };
            if issue.labels.iter().any(|label| rule.matcher.matches(label)) {
                members.push(GroupedCommit {
                    commit: commit.clone(),
                    issue_number: Some(number),
                });
            }
        }
    }

    Group {
        name: rule.name.clone(),
        commits: members,
    }
}

/// One local rule's group: commits with zero linked issues whose message
/// matches. The match text is stripped from the message copy placed into
/// the group; the input commit is never mutated.
fn local_group(rule: &LabelRule, commits: &[Commit]) -> Group {
    let mut members = Vec::new();

    for commit in commits {
        if !commit.issues.is_empty() || !rule.matcher.matches(&commit.message) {
            continue;
        }

        let mut cleaned = commit.clone();
        cleaned.message = rule.matcher.strip_first(&commit.message);
        members.push(GroupedCommit {
            commit: cleaned,
            issue_number: None,
        });
    }

    Group {
        name: rule.name.clone(),
        commits: members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, message: &str, issues: &[u64]) -> Commit {
        Commit {
            hash: hash.to_string(),
            date: "2024-05-01T10:00:00Z".to_string(),
            message: message.to_string(),
            issues: issues.to_vec(),
        }
    }

    fn issue(number: u64, title: &str, labels: &[&str]) -> (u64, Issue) {
        (
            number,
            Issue {
                number,
                title: title.to_string(),
                labels: labels.iter().map(|l| (*l).to_string()).collect(),
            },
        )
    }

    fn rule(matcher: Matcher, name: &str) -> LabelRule {
        LabelRule {
            matcher,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_matcher_literal_is_substring_containment() {
        let matcher = Matcher::Literal("Bug".to_string());
        assert!(matcher.matches("Bug"));
        assert!(matcher.matches("Critical Bugs"));
        assert!(!matcher.matches("Feature"));
    }

    #[test]
    fn test_matcher_pattern_and_strip() {
        let matcher = Matcher::Pattern(Regex::new(r"^Hotfix[-: ]+").unwrap());
        assert!(matcher.matches("Hotfix - typo in footer"));
        assert_eq!(matcher.strip_first("Hotfix - typo in footer"), "typo in footer");
    }

    #[test]
    fn test_external_pass_annotates_issue_numbers() {
        let commits = vec![commit("a1b2c3d", "Fix #10 and #11", &[10, 11])];
        let issues = HashMap::from([
            issue(10, "Crash on load", &["Bug"]),
            issue(11, "Slow startup", &["Bug", "Performance"]),
        ]);
        let rules = vec![rule(Matcher::Literal("Bug".to_string()), "Bugs")];

        let groups = classify(&commits, &issues, &rules, &[]);

        assert_eq!(groups.len(), 1);
        let numbers: Vec<Option<u64>> =
            groups[0].commits.iter().map(|c| c.issue_number).collect();
        assert_eq!(numbers, vec![Some(10), Some(11)]);
    }

    #[test]
    fn test_external_pass_skips_unfetched_issues() {
        let commits = vec![commit("a1b2c3d", "Fix #10 and #99", &[10, 99])];
        let issues = HashMap::from([issue(10, "Crash on load", &["Bug"])]);
        let rules = vec![rule(Matcher::Literal("Bug".to_string()), "Bugs")];

        let groups = classify(&commits, &issues, &rules, &[]);

        assert_eq!(groups[0].commits.len(), 1);
        assert_eq!(groups[0].commits[0].issue_number, Some(10));
    }

    #[test]
    fn test_external_pass_is_idempotent() {
        let commits = vec![
            commit("a1b2c3d", "Fix #10", &[10]),
            commit("b2c3d4e", "Tune #11", &[11]),
        ];
        let issues = HashMap::from([
            issue(10, "Crash on load", &["Bug"]),
            issue(11, "Slow startup", &["Performance"]),
        ]);
        let rules = vec![
            rule(Matcher::Literal("Bug".to_string()), "Bugs"),
            rule(Matcher::Literal("Performance".to_string()), "Performance"),
        ];

        let first = classify(&commits, &issues, &rules, &[]);
        let second = classify(&commits, &issues, &rules, &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_local_pass_requires_zero_linked_issues() {
        let commits = vec![
            commit("a1b2c3d", "Hotfix - with ref #10", &[10]),
            commit("b2c3d4e", "Hotfix - typo in footer", &[]),
        ];
        let rules = vec![rule(Matcher::Literal("Hotfix - ".to_string()), "Others")];

        let groups = classify(&commits, &HashMap::new(), &[], &rules);

        assert_eq!(groups[0].commits.len(), 1);
        assert_eq!(groups[0].commits[0].commit.message, "typo in footer");
        assert_eq!(groups[0].commits[0].issue_number, None);
    }

    #[test]
    fn test_local_pass_strips_only_first_occurrence() {
        let commits = vec![commit("a1b2c3d", "fix: fix: double prefix", &[])];
        let rules = vec![rule(Matcher::Literal("fix: ".to_string()), "Fixes")];

        let groups = classify(&commits, &HashMap::new(), &[], &rules);

        assert_eq!(groups[0].commits[0].commit.message, "fix: double prefix");
    }

    #[test]
    fn test_group_order_is_external_then_local_in_rule_order() {
        let external = vec![
            rule(Matcher::Literal("Bug".to_string()), "Bugs"),
            rule(Matcher::Literal("Enhancement".to_string()), "Enhancements"),
        ];
        let local = vec![rule(Matcher::Literal("chore: ".to_string()), "Chores")];

        let groups = classify(&[], &HashMap::new(), &external, &local);

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Bugs", "Enhancements", "Chores"]);
    }

    #[test]
    fn test_commit_can_appear_in_multiple_groups() {
        let commits = vec![commit("a1b2c3d", "Fix #10", &[10])];
        let issues = HashMap::from([issue(10, "Crash on load", &["Bug", "Regression"])]);
        let rules = vec![
            rule(Matcher::Literal("Bug".to_string()), "Bugs"),
            rule(Matcher::Literal("Regression".to_string()), "Regressions"),
        ];

        let groups = classify(&commits, &issues, &rules, &[]);

        assert_eq!(groups[0].commits.len(), 1);
        assert_eq!(groups[1].commits.len(), 1);
    }

    #[test]
    fn test_release_window_scenario() {
        let commits = vec![
            commit("a1b2c3d", "Fix #10 - crash on load", &[10]),
            commit("b2c3d4e", "Hotfix - typo in footer", &[]),
            commit("c3d4e5f", "Merge branch x", &[]),
        ];
        let issues = HashMap::from([issue(10, "Crash on load", &["Bug"])]);
        let external = vec![rule(Matcher::Literal("Bug".to_string()), "Bugs")];
        let local = vec![rule(Matcher::Literal("Hotfix - ".to_string()), "Others")];

        let groups = classify(&commits, &issues, &external, &local);

        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].name, "Bugs");
        assert_eq!(groups[0].commits.len(), 1);
        assert_eq!(groups[0].commits[0].commit.message, "Fix #10 - crash on load");
        assert_eq!(groups[0].commits[0].issue_number, Some(10));

        assert_eq!(groups[1].name, "Others");
        assert_eq!(groups[1].commits.len(), 1);
        assert_eq!(groups[1].commits[0].commit.message, "typo in footer");

        // The merge commit matched nothing and appears nowhere.
        let all: Vec<&GroupedCommit> = groups.iter().flat_map(|g| &g.commits).collect();
        assert!(all.iter().all(|c| c.commit.hash != "c3d4e5f"));
    }
}
