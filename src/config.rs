use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::tracker::github::DEFAULT_API_URL;
use crate::tracker::types::InvalidRepoId;
use crate::tracker::RepoId;

pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";
pub const DEFAULT_BUGS_FILE: &str = "bug_tickets.json";
const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse config file: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Repository not specified. Use --repo or config file.")]
    MissingRepository,

    #[error("GitHub token not specified. Use --token, config file, or GITHUB_TOKEN env var.")]
    MissingToken,

    #[error(transparent)]
    InvalidRepository(#[from] InvalidRepoId),
}

/// Settings read from `--config`. JSON unless the file ends in `.toml`.
/// Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Target repository, owner/name
    pub repository: Option<String>,
    pub github_token: Option<String>,
    pub bugs_file: Option<PathBuf>,
    /// REST endpoint, for GitHub Enterprise
    pub api_url: Option<String>,
    pub request_delay_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            toml::from_str(&contents)?
        } else {
            serde_json::from_str(&contents)?
        };
        Ok(config)
    }
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub repository: Option<String>,
    pub token: Option<String>,
    pub bugs_file: Option<PathBuf>,
    pub dry_run: bool,
    pub create_labels: bool,
    pub output_dir: Option<PathBuf>,
}

/// Everything a run needs, resolved once at startup.
#[derive(Clone)]
pub struct RunContext {
    pub token: String,
    pub repo: RepoId,
    pub bugs_file: PathBuf,
    pub dry_run: bool,
    pub create_labels: bool,
    pub output_dir: PathBuf,
    pub api_url: String,
    pub request_delay: Duration,
    pub timeout: Duration,
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("token", &"<redacted>")
            .field("repo", &self.repo)
            .field("bugs_file", &self.bugs_file)
            .field("dry_run", &self.dry_run)
            .field("create_labels", &self.create_labels)
            .field("output_dir", &self.output_dir)
            .field("api_url", &self.api_url)
            .field("request_delay", &self.request_delay)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RunContext {
    /// Resolve with precedence flag > config file > environment.
    /// `env_token` is the value of `GITHUB_TOKEN`, if set.
    pub fn resolve(
        cli: CliOverrides,
        config: Config,
        env_token: Option<String>,
    ) -> Result<RunContext, ConfigError> {
        let repository = non_empty(cli.repository)
            .or(non_empty(config.repository))
            .ok_or(ConfigError::MissingRepository)?;
        let repo: RepoId = repository.parse()?;

        let token = non_empty(cli.token)
            .or(non_empty(config.github_token))
            .or(non_empty(env_token))
            .ok_or(ConfigError::MissingToken)?;

        let bugs_file = cli
            .bugs_file
            .or(config.bugs_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUGS_FILE));

        Ok(RunContext {
            token,
            repo,
            bugs_file,
            dry_run: cli.dry_run,
            create_labels: cli.create_labels,
            output_dir: cli.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            api_url: config.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            request_delay: Duration::from_millis(
                config.request_delay_ms.unwrap_or(DEFAULT_REQUEST_DELAY_MS),
            ),
            timeout: Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
