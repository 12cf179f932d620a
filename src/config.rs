//! Configuration Management
//!
//! Sync configuration file and access token loading

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::rules::{Rule, RuleMode};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Default token file path
pub const DEFAULT_TOKEN_PATH: &str = "~/.github-token";

/// Environment variable consulted when the token file does not exist
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Configuration file contents
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    pub github: GitHubConfig,

    /// Filter rules applied to the leader's labels, in evaluation order
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// `github` section of the configuration file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GitHubConfig {
    /// Organization owning every configured repository
    pub organization: String,

    pub repositories: Vec<RepositoryConfig>,
}

/// Repository entry
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RepositoryConfig {
    pub name: String,

    /// Whether this repository is the source of truth
    #[serde(default)]
    pub leader: bool,
}

/// Rule entry as written in the file
///
/// Both fields are optional here so that a missing one is reported as an
/// invalid rule rather than a parse error.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RuleConfig {
    pub pattern: Option<String>,
    pub mode: Option<String>,
}

impl RuleConfig {
    /// Compile into a [`Rule`]
    ///
    /// # Errors
    /// - If the pattern or mode is missing
    /// - If the mode is neither `include` nor `ignore`
    /// - If the pattern is not a valid regular expression
    pub fn compile(&self) -> Result<Rule> {
        let (pattern, mode) = match (&self.pattern, &self.mode) {
            (Some(pattern), Some(mode)) => (pattern, mode),
            _ => {
                return Err(Error::config(format!(
                    "invalid rule: {} (both pattern and mode are required)",
                    self.describe()
                )))
            }
        };

        let mode: RuleMode = mode.parse()?;
        Rule::new(pattern, mode)
    }

    fn describe(&self) -> String {
        format!(
            "{{pattern: {}, mode: {}}}",
            self.pattern.as_deref().unwrap_or("<missing>"),
            self.mode.as_deref().unwrap_or("<missing>")
        )
    }
}

/// Validated sync configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Organization owning every repository
    pub organization: String,

    /// Leader repository name
    pub leader: String,

    /// Target repository names, in configuration order
    pub targets: Vec<String>,

    /// Compiled filter rules
    pub rules: Vec<Rule>,
}

impl AppConfig {
    /// Validate configuration and compile rules
    ///
    /// # Errors
    /// - If the organization is empty
    /// - If there are no repositories, or a name is empty or repeated
    /// - If there is not exactly one leader repository
    /// - If any rule is invalid
    pub fn validate(&self) -> Result<SyncConfig> {
        let organization = self.github.organization.trim();
        if organization.is_empty() {
            return Err(Error::config("github.organization is required"));
        }

        if self.github.repositories.is_empty() {
            return Err(Error::config("github.repositories must not be empty"));
        }

        let mut seen = HashSet::new();
        for repo in &self.github.repositories {
            if repo.name.trim().is_empty() {
                return Err(Error::config("repository name cannot be empty"));
            }
            if !seen.insert(repo.name.as_str()) {
                return Err(Error::config(format!(
                    "repository {} is listed more than once",
                    repo.name
                )));
            }
        }

        let leaders: Vec<&str> = self
            .github
            .repositories
            .iter()
            .filter(|repo| repo.leader)
            .map(|repo| repo.name.as_str())
            .collect();

        let leader = match leaders.as_slice() {
            [leader] => leader.to_string(),
            [] => return Err(Error::config("no leader repository configured")),
            several => {
                return Err(Error::config(format!(
                    "exactly one leader repository is allowed, found {}: {}",
                    several.len(),
                    several.join(", ")
                )))
            }
        };

        let rules = self
            .rules
            .iter()
            .map(RuleConfig::compile)
            .collect::<Result<Vec<_>>>()?;

        if rules.is_empty() {
            warn!("no rules configured; every leader label will be ignored");
        }

        Ok(SyncConfig {
            organization: organization.to_string(),
            leader,
            targets: self
                .github
                .repositories
                .iter()
                .filter(|repo| !repo.leader)
                .map(|repo| repo.name.clone())
                .collect(),
            rules,
        })
    }
}

/// Parse and validate configuration from YAML content
///
/// # Errors
/// If parsing or validation fails
pub fn parse_config(content: &str) -> Result<SyncConfig> {
    let config: AppConfig = serde_yaml::from_str(content)?;
    config.validate()
}

/// Load configuration from a YAML file
///
/// # Errors
/// If file reading, parsing, or validation fails
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SyncConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "cannot read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&content)
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

/// Read an access token from the first line of a file
///
/// # Errors
/// If the file cannot be read or the first line is blank
pub fn read_token<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = expand_home(path.as_ref());
    let content = std::fs::read_to_string(&path)?;
    let token = content.lines().next().unwrap_or("").trim();

    if token.is_empty() {
        return Err(Error::AuthenticationFailed(format!(
            "token file {} is empty",
            path.display()
        )));
    }

    Ok(token.to_string())
}

/// Get access token
///
/// Reads the token file, falling back to `GITHUB_TOKEN` when the file does
/// not exist.
///
/// # Errors
/// If neither source provides a token
pub fn resolve_token<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = expand_home(path.as_ref());
    if !path.exists() {
        if let Some(token) = std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty())
        {
            return Ok(token.trim().to_string());
        }

        return Err(Error::AuthenticationFailed(format!(
            "token file {} not found and {} is not set",
            path.display(),
            TOKEN_ENV_VAR
        )));
    }

    read_token(path)
}
