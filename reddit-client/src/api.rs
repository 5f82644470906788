use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redferry_core::{PostSource, SourceComment, SourceConfig, SourceError, SourcePost};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::comments;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// One page of the source's hot ranking; nothing past it is fetched.
pub const HOT_LIMIT: usize = 25;

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    #[serde(default)]
    pub url: String,
    pub created_utc: f64,
    pub score: i64,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub stickied: bool,
    #[serde(default)]
    pub is_self: bool,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Debug)]
pub struct RedditClient {
    http_client: Client,
    access_token: String,
    user_agent: String,
}

impl RedditClient {
    /// Application-only OAuth login with the script credentials from the
    /// config file. The returned client is read-only.
    pub async fn login(config: &SourceConfig) -> Result<Self, SourceError> {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        info!("Requesting application-only source token");
        let response = http_client
            .post(TOKEN_URL)
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::AuthenticationFailed {
                reason: format!("token endpoint returned {}", response.status()),
            });
        }

        let token: AccessTokenResponse =
            response
                .json()
                .await
                .map_err(|e| SourceError::AuthenticationFailed {
                    reason: format!("unparseable token response: {e}"),
                })?;

        Ok(Self {
            http_client,
            access_token: token.access_token,
            user_agent: config.user_agent.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        subreddit: &str,
    ) -> Result<T, SourceError> {
        let url = format!("{REDDIT_API_BASE}{endpoint}");
        debug!("GET {url}");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header("User-Agent", &self.user_agent)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::RequestTimeout
                } else {
                    SourceError::Network(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(SourceError::RateLimitExceeded { retry_after });
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(SourceError::AuthenticationFailed {
                reason: "source token rejected".to_string(),
            });
        }
        if !status.is_success() {
            // 403 covers banned and quarantined subreddits, 404 missing ones.
            return Err(SourceError::Unavailable {
                subreddit: subreddit.to_string(),
                reason: format!("{endpoint} returned {status}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse {
                details: format!("{endpoint}: {e}"),
            })
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn fetch_hot(&self, subreddit: &str) -> Result<Vec<SourcePost>, SourceError> {
        let endpoint = format!("/r/{subreddit}/hot");
        let limit = HOT_LIMIT.to_string();
        let listing: RedditListing<RedditPostData> = self
            .get_json(&endpoint, &[("limit", limit.as_str())], subreddit)
            .await?;

        let posts = posts_from_listing(listing);
        info!("Retrieved {} hot posts from r/{}", posts.len(), subreddit);
        Ok(posts)
    }

    async fn fetch_comment_tree(
        &self,
        subreddit: &str,
        post_id: &str,
    ) -> Result<Vec<SourceComment>, SourceError> {
        let endpoint = format!("/r/{subreddit}/comments/{post_id}");
        // The endpoint answers with a two-element array: the post listing
        // and the comment listing.
        let (_post, comment_listing): (RedditListing<Value>, RedditListing<Value>) = self
            .get_json(&endpoint, &[("limit", "10000")], subreddit)
            .await?;

        let tree = comments::flatten_listing(&comment_listing);
        debug!("Flattened {} comments for post {}", tree.len(), post_id);
        Ok(tree)
    }
}

/// Strips pinned announcements and caps the listing at one hot page.
pub fn posts_from_listing(listing: RedditListing<RedditPostData>) -> Vec<SourcePost> {
    listing
        .data
        .children
        .into_iter()
        .filter(|child| child.kind == "t3" && !child.data.stickied)
        .take(HOT_LIMIT)
        .map(|child| child.data.into())
        .collect()
}

impl From<RedditPostData> for SourcePost {
    fn from(data: RedditPostData) -> Self {
        let body = if data.selftext.trim().is_empty() {
            None
        } else {
            Some(data.selftext)
        };
        let link = if data.is_self || data.url.is_empty() {
            None
        } else {
            Some(data.url)
        };
        Self {
            id: data.id,
            subreddit: data.subreddit,
            title: data.title,
            body,
            link,
            author: data.author,
            score: data.score,
            created: epoch_to_utc(data.created_utc),
            nsfw: data.over_18,
        }
    }
}

pub(crate) fn epoch_to_utc(created_utc: f64) -> DateTime<Utc> {
    DateTime::from_timestamp(created_utc as i64, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
