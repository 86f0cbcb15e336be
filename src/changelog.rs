use log::info;
use regex::Regex;
use std::collections::HashMap;

use crate::classify::{classify, Group, LabelRule};
use crate::error::Result;
use crate::git::parse::{extract_issue_numbers, Commit};
use crate::tracker::batch::{self, BatchPolicy};
use crate::tracker::github::{GitHubClient, Issue};

/// The complete grouped result for one release, handed to the renderer.
#[derive(Debug)]
pub struct Changelog {
    pub version: String,
    pub date: String,
    pub issues: HashMap<u64, Issue>,
    pub groups: Vec<Group>,
}

/// Fetch tracker metadata for `commits` and classify them into groups.
///
/// The commits' issue references are re-derived here from the
/// caller-supplied pattern; whatever the history parser extracted earlier
/// is superseded. Referenced issues are then fetched in bounded batches and
/// the two classifier passes run over the result.
///
/// # Errors
///
/// Fails when any issue fetch exhausts its retry budget; there is no
/// partial-success mode.
pub async fn retrieve(
    mut commits: Vec<Commit>,
    issue_pattern: &Regex,
    external_rules: &[LabelRule],
    local_rules: &[LabelRule],
    client: &GitHubClient,
    policy: &BatchPolicy,
) -> Result<(HashMap<u64, Issue>, Vec<Group>)> {
    for commit in &mut commits {
        commit.issues = extract_issue_numbers(&commit.message, issue_pattern);
    }

    // Flat union, not deduplicated: a number referenced by two commits is
    // fetched twice and lands in the same map slot.
    let numbers: Vec<u64> = commits
        .iter()
        .flat_map(|commit| commit.issues.iter().copied())
        .collect();

    info!("Fetching {} issue references", numbers.len());
    let fetched = batch::fetch_all(&numbers, policy, |number| client.get_issue(number)).await?;

    let issues: HashMap<u64, Issue> = fetched
        .into_iter()
        .map(|issue| (issue.number, issue))
        .collect();

    let groups = classify(&commits, &issues, external_rules, local_rules);

    Ok((issues, groups))
}
