use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::changelog::{self, Changelog};
use crate::config::Config;
use crate::git::history::HistoryReader;
use crate::render::{self, MarkdownRenderer};
use crate::tracker::batch::BatchPolicy;
use crate::tracker::github::GitHubClient;

#[derive(Parser)]
#[command(name = "relog")]
#[command(author, version, about = "Release changelog generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the changelog for a release window
    Generate {
        /// Repository working directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Newer bound of the release window; the latest tag when omitted
        #[arg(short, long)]
        tag: Option<String>,

        /// Issue tracker bearer token
        #[arg(short = 'T', long, env = "GITHUB_TOKEN")]
        token: Option<String>,

        /// Configuration file path (default: ./relog.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Generate {
                dir,
                tag,
                token,
                config,
            } => {
                self.execute_generate(dir, tag.as_deref(), token.as_deref(), config.as_deref())
                    .await
            }
        }
    }

    async fn execute_generate(
        &self,
        dir: &Path,
        tag: Option<&str>,
        token: Option<&str>,
        config_path: Option<&Path>,
    ) -> Result<()> {
        let config = Config::load(config_path).context("Failed to load configuration")?;
        let (owner, repo) = config.repository()?;

        info!("Generating changelog for {}/{}", owner, repo);

        let issue_pattern = config.issue_pattern()?;
        let reader = HistoryReader::new(dir, Some(config.tag_pattern()?), issue_pattern.clone());
        let window = reader.read(tag).await?;

        let client = GitHubClient::new(
            config.repository.base_url.clone(),
            owner,
            repo,
            token.map(Token::from),
        )?;

        let (issues, groups) = changelog::retrieve(
            window.commits,
            &issue_pattern,
            &config.external_rules()?,
            &config.local_rules()?,
            &client,
            &BatchPolicy::default(),
        )
        .await?;

        let changelog = Changelog {
            version: window.to.name.clone(),
            date: window.to.date.clone(),
            issues,
            groups,
        };
        let text = render::render(&MarkdownRenderer, &changelog);

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, &text)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            info!("Changelog written to: {}", output_path.display());
        } else {
            println!("{text}");
        }

        Ok(())
    }
}
