use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Destination error: {0}")]
    Destination(#[from] DestinationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl MigrationError {
    /// Whether this error aborts the whole run rather than a single
    /// subreddit, post or row.
    pub fn is_fatal(&self) -> bool {
        match self {
            MigrationError::Config(_) => true,
            MigrationError::Source(e) => {
                matches!(e, SourceError::AuthenticationFailed { .. })
            }
            MigrationError::Destination(e) => matches!(
                e,
                DestinationError::LoginFailed { .. }
                    | DestinationError::InvalidInstanceUrl { .. }
            ),
            MigrationError::Storage(e) => matches!(e, StorageError::Unusable { .. }),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Subreddit unavailable: {subreddit}: {reason}")]
    Unavailable { subreddit: String, reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum DestinationError {
    #[error("Invalid instance URL: {url}")]
    InvalidInstanceUrl { url: String },

    #[error("Login failed: {reason}")]
    LoginFailed { reason: String },

    #[error("No community matching: {name}")]
    CommunityNotFound { name: String },

    #[error("Write rejected for {what}: {details}")]
    WriteFailed { what: String, details: String },

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage connection unusable: {reason}")]
    Unusable { reason: String },

    #[error("Row update failed for {entity} {id}")]
    RowUpdate {
        entity: &'static str,
        id: i64,
        #[source]
        source: sqlx::Error,
    },
}
