use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Immutable configuration for one migration run, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub destination: DestinationConfig,
    /// Subreddits migrated with comments when `include_comments` is set.
    #[serde(default)]
    pub subreddits: Vec<String>,
    /// Subreddits always migrated without comments.
    #[serde(default)]
    pub posts_only_subreddits: Vec<String>,
    #[serde(default)]
    pub include_comments: bool,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: format!("redferry/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    pub instance_url: String,
    pub username: String,
    pub password: String,
    /// Connection string for the instance's Postgres. Required when
    /// comments are migrated; without it the timestamp backfill is
    /// disabled entirely.
    pub database_url: Option<String>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: RunConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        required("source.client_id", &self.source.client_id)?;
        required("source.client_secret", &self.source.client_secret)?;
        required("destination.instance_url", &self.destination.instance_url)?;
        required("destination.username", &self.destination.username)?;
        required("destination.password", &self.destination.password)?;

        if Url::parse(&self.destination.instance_url).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "destination.instance_url".to_string(),
                value: self.destination.instance_url.clone(),
            });
        }
        if self.subreddits.is_empty() && self.posts_only_subreddits.is_empty() {
            return Err(ConfigError::MissingField {
                field: "subreddits".to_string(),
            });
        }
        if self.include_comments && self.destination.database_url.is_none() {
            return Err(ConfigError::MissingField {
                field: "destination.database_url".to_string(),
            });
        }
        Ok(())
    }

    /// Subreddits in processing order, each paired with whether its
    /// comments are migrated.
    pub fn subreddit_plan(&self) -> Vec<(String, bool)> {
        self.subreddits
            .iter()
            .map(|s| (s.clone(), self.include_comments))
            .chain(
                self.posts_only_subreddits
                    .iter()
                    .map(|s| (s.clone(), false)),
            )
            .collect()
    }
}

fn required(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: field.to_string(),
        });
    }
    Ok(())
}
