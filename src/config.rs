use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::classify::{LabelRule, Matcher};
use crate::error::{RelogError, Result};

/// Configuration file structure for relog.
///
/// Holds the tracker repository coordinates, the tag/issue patterns, and the
/// ordered label rules driving classification. Loaded from `relog.toml` in
/// the working directory unless an explicit path is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Issue tracker repository coordinates
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Tag and issue-reference patterns
    #[serde(default)]
    pub patterns: PatternConfig,

    /// Classification rules, evaluated in the order written
    #[serde(default)]
    pub labels: LabelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RepositoryConfig {
    /// Repository owner/organization on the tracker
    pub owner: Option<String>,

    /// Repository name on the tracker
    pub repo: Option<String>,

    /// Tracker API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PatternConfig {
    /// Regex a ref name must match to count as a release tag
    #[serde(default = "default_tag_pattern")]
    pub tag: String,

    /// Issue-reference regex; the second capture group is the issue number
    #[serde(default = "default_issue_pattern")]
    pub issue: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LabelConfig {
    /// Rules matched against fetched issue labels
    #[serde(default)]
    pub external: Vec<RuleConfig>,

    /// Rules matched against the message of commits without issue references
    #[serde(default)]
    pub local: Vec<RuleConfig>,
}

/// One label rule as written in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Literal text (`match = "Bug"`) or regex (`match = { pattern = "..." }`)
    #[serde(rename = "match")]
    pub match_: MatchConfig,

    /// Output group name
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchConfig {
    Literal(String),
    Pattern { pattern: String },
}

impl RuleConfig {
    /// Resolve into a classifier rule, compiling patterns once.
    pub fn resolve(&self) -> Result<LabelRule> {
        let matcher = match &self.match_ {
            MatchConfig::Literal(text) => Matcher::Literal(text.clone()),
            MatchConfig::Pattern { pattern } => {
                let compiled = Regex::new(pattern).map_err(|e| {
                    RelogError::Config(format!("Invalid label pattern '{pattern}': {e}"))
                })?;
                Matcher::Pattern(compiled)
            }
        };

        Ok(LabelRule {
            matcher,
            name: self.name.clone(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig::default(),
            patterns: PatternConfig::default(),
            labels: LabelConfig::default(),
        }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            base_url: default_base_url(),
        }
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            tag: default_tag_pattern(),
            issue: default_issue_pattern(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_tag_pattern() -> String {
    r"^v\d+\.\d+\.\d+$".to_string()
}

fn default_issue_pattern() -> String {
    r"(#)(\d+)".to_string()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Uses the specified path when given, otherwise `./relog.toml`.
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = path.unwrap_or_else(|| Path::new("relog.toml"));

        if !candidate.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(candidate)
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;

        toml::from_str(&contents)
            .map_err(|e| RelogError::Config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Tracker repository coordinates, required for issue enrichment.
    pub fn repository(&self) -> Result<(String, String)> {
        match (&self.repository.owner, &self.repository.repo) {
            (Some(owner), Some(repo)) => Ok((owner.clone(), repo.clone())),
            _ => Err(RelogError::Config(
                "repository.owner and repository.repo must be set".to_string(),
            )),
        }
    }

    pub fn tag_pattern(&self) -> Result<Regex> {
        compile(&self.patterns.tag, "patterns.tag")
    }

    /// The issue-reference pattern; its second capture group must exist
    /// because it carries the issue number.
    pub fn issue_pattern(&self) -> Result<Regex> {
        let pattern = compile(&self.patterns.issue, "patterns.issue")?;

        if pattern.captures_len() < 3 {
            return Err(RelogError::Config(format!(
                "patterns.issue '{}' needs a second capture group holding the issue number",
                self.patterns.issue
            )));
        }

        Ok(pattern)
    }

    pub fn external_rules(&self) -> Result<Vec<LabelRule>> {
        self.labels.external.iter().map(RuleConfig::resolve).collect()
    }

    pub fn local_rules(&self) -> Result<Vec<LabelRule>> {
        self.labels.local.iter().map(RuleConfig::resolve).collect()
    }
}

fn compile(pattern: &str, key: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| RelogError::Config(format!("Invalid regex for {key} '{pattern}': {e}")))
}
