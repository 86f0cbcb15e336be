use log::{debug, info};
use regex::Regex;
use std::path::PathBuf;
use tokio::process::Command;

use crate::error::{RelogError, Result};
use crate::git::parse::{parse_commit_line, parse_tags, Commit, Tag};
use crate::git::window::select_window;

/// How many tag-decorated entries to inspect when listing release tags.
const TAG_LOOKBACK: usize = 20;

/// The commits bounded by two adjacent release tags.
#[derive(Debug, Clone)]
pub struct ReleaseWindow {
    /// Commits reachable from `to` but not from `from`, newest first
    pub commits: Vec<Commit>,
    /// Older bound (excluded from the window)
    pub from: Tag,
    /// Newer bound, the release being described
    pub to: Tag,
}

/// Read-only view over a git repository's tag and commit history.
///
/// All queries shell out to `git log`; nothing in the repository is ever
/// modified.
pub struct HistoryReader {
    dir: PathBuf,
    tag_pattern: Option<Regex>,
    issue_pattern: Regex,
}

impl HistoryReader {
    pub fn new(dir: impl Into<PathBuf>, tag_pattern: Option<Regex>, issue_pattern: Regex) -> Self {
        Self {
            dir: dir.into(),
            tag_pattern,
            issue_pattern,
        }
    }

    /// Resolve the release window and collect the commits inside it.
    ///
    /// # Arguments
    ///
    /// * `target_tag` - Newer bound of the window; the most recent tag when
    ///   absent
    ///
    /// # Errors
    ///
    /// Returns `InsufficientTagHistory` when fewer than two matching tags
    /// exist, `NoReleaseWindow` when the target tag is unknown or has no
    /// older neighbour, and `Git` when an invocation fails.
    pub async fn read(&self, target_tag: Option<&str>) -> Result<ReleaseWindow> {
        let lookback = TAG_LOOKBACK.to_string();
        let raw = self
            .git(&[
                "log",
                "--tags",
                "--simplify-by-decoration",
                "-n",
                &lookback,
                "--pretty=format:%cI %D",
            ])
            .await?;

        let tags = parse_tags(&raw, self.tag_pattern.as_ref());
        debug!("Found {} release tags", tags.len());

        if tags.len() < 2 {
            return Err(RelogError::InsufficientTagHistory);
        }

        let (to, from) = select_window(&tags, target_tag).ok_or_else(|| {
            RelogError::NoReleaseWindow(target_tag.unwrap_or("<latest>").to_string())
        })?;
        let (to, from) = (to.clone(), from.clone());

        let range = format!("{}..{}", from.name, to.name);
        let raw = self
            .git(&["log", "--pretty=format:%h %cI %s", &range])
            .await?;

        let commits: Vec<Commit> = raw
            .lines()
            .filter_map(|line| parse_commit_line(line, &self.issue_pattern))
            .collect();

        info!(
            "Found {} commits between {} and {}",
            commits.len(),
            from.name,
            to.name
        );

        Ok(ReleaseWindow { commits, from, to })
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        debug!("Running git {}", args.join(" "));

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()
            .await
            .map_err(|e| RelogError::Git(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RelogError::Git(format!(
                "git {} exited with {}: {}",
                args.first().unwrap_or(&""),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::process::Command as StdCommand;

    fn run_git(dir: &Path, args: &[&str], date: Option<&str>) {
        let mut command = StdCommand::new("git");
        command.args(args).current_dir(dir);
        if let Some(date) = date {
            command
                .env("GIT_AUTHOR_DATE", date)
                .env("GIT_COMMITTER_DATE", date);
        }
        let output = command.output().unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn commit(dir: &Path, message: &str, date: &str) {
        // Each commit must change the tree: `--simplify-by-decoration`
        // prunes tagged commits whose tree matches their parent's, which
        // empty commits all do.
        std::fs::write(dir.join("file.txt"), message).unwrap();
        run_git(dir, &["add", "file.txt"], None);
        run_git(dir, &["commit", "-m", message], Some(date));
    }

    fn init_repo(dir: &Path) {
        run_git(dir, &["init"], None);
        run_git(dir, &["config", "user.email", "test@example.com"], None);
        run_git(dir, &["config", "user.name", "Test"], None);
    }

    fn reader(dir: &Path) -> HistoryReader {
        HistoryReader::new(
            dir,
            Some(Regex::new(r"^v\d+\.\d+\.\d+$").unwrap()),
            Regex::new(r"(#)(\d+)").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_read_collects_commits_between_adjacent_tags() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        init_repo(dir);

        commit(dir, "Initial commit", "2024-01-01 10:00:00 +0000");
        run_git(dir, &["tag", "v1.2.0"], None);
        commit(dir, "Fix #10 - crash on load", "2024-01-02 10:00:00 +0000");
        commit(dir, "Hotfix - typo in footer", "2024-01-03 10:00:00 +0000");
        commit(dir, "Merge branch x", "2024-01-04 10:00:00 +0000");
        run_git(dir, &["tag", "v1.3.0"], None);

        let window = reader(dir).read(None).await.unwrap();

        assert_eq!(window.to.name, "v1.3.0");
        assert_eq!(window.from.name, "v1.2.0");

        let messages: Vec<&str> = window
            .commits
            .iter()
            .map(|c| c.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec![
                "Merge branch x",
                "Hotfix - typo in footer",
                "Fix #10 - crash on load",
            ]
        );
        assert_eq!(window.commits[2].issues, vec![10]);
    }

    #[tokio::test]
    async fn test_read_fails_with_single_tag() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        init_repo(dir);

        commit(dir, "Initial commit", "2024-01-01 10:00:00 +0000");
        run_git(dir, &["tag", "v1.0.0"], None);

        let result = reader(dir).read(None).await;
        assert!(matches!(result, Err(RelogError::InsufficientTagHistory)));
    }

    #[tokio::test]
    async fn test_read_fails_when_target_is_oldest_tag() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        init_repo(dir);

        commit(dir, "Initial commit", "2024-01-01 10:00:00 +0000");
        run_git(dir, &["tag", "v1.0.0"], None);
        commit(dir, "Feature work", "2024-01-02 10:00:00 +0000");
        run_git(dir, &["tag", "v1.1.0"], None);

        let result = reader(dir).read(Some("v1.0.0")).await;
        assert!(matches!(result, Err(RelogError::NoReleaseWindow(_))));
    }
}
