use std::time::Duration;

use async_trait::async_trait;
use redferry_core::{
    Destination, DestinationCommunity, DestinationConfig, DestinationError, MigratedComment,
    MigratedPost, SourceComment, SourcePost,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username_or_email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    jwt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub communities: Vec<CommunityView>,
}

#[derive(Debug, Deserialize)]
pub struct CommunityView {
    pub community: CommunityData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommunityData {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize)]
struct CreatePostRequest<'a> {
    name: &'a str,
    community_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    nsfw: bool,
}

#[derive(Deserialize)]
struct PostResponse {
    post_view: PostView,
}

#[derive(Deserialize)]
struct PostView {
    post: PostData,
}

#[derive(Deserialize)]
struct PostData {
    id: i64,
}

#[derive(Serialize)]
struct CreateCommentRequest<'a> {
    content: &'a str,
    post_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<i64>,
}

#[derive(Deserialize)]
struct CommentResponse {
    comment_view: CommentView,
}

#[derive(Deserialize)]
struct CommentView {
    comment: CommentData,
}

#[derive(Deserialize)]
struct CommentData {
    id: i64,
}

#[derive(Debug)]
pub struct LemmyClient {
    http_client: Client,
    base_url: Url,
    jwt: String,
}

impl LemmyClient {
    /// Logs in with the operator account; every migrated item is created
    /// under this identity.
    pub async fn login(config: &DestinationConfig) -> Result<Self, DestinationError> {
        let base_url = Url::parse(&config.instance_url).map_err(|_| {
            DestinationError::InvalidInstanceUrl {
                url: config.instance_url.clone(),
            }
        })?;
        let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        info!(
            "Logging in to {} as {}",
            config.instance_url, config.username
        );
        let response = http_client
            .post(endpoint(&base_url, "/api/v3/user/login")?)
            .json(&LoginRequest {
                username_or_email: &config.username,
                password: &config.password,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DestinationError::LoginFailed {
                reason: format!("login returned {}", response.status()),
            });
        }
        let login: LoginResponse =
            response
                .json()
                .await
                .map_err(|e| DestinationError::InvalidResponse {
                    details: format!("login: {e}"),
                })?;
        let jwt = login.jwt.ok_or_else(|| DestinationError::LoginFailed {
            reason: "no token in login response".to_string(),
        })?;

        Ok(Self {
            http_client,
            base_url,
            jwt,
        })
    }

    async fn search_communities(&self, name: &str) -> Result<Vec<CommunityData>, DestinationError> {
        let response = self
            .http_client
            .get(endpoint(&self.base_url, "/api/v3/search")?)
            .bearer_auth(&self.jwt)
            .query(&[
                ("q", name),
                ("type_", "Communities"),
                ("listing_type", "Local"),
                ("limit", "50"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DestinationError::InvalidResponse {
                details: format!("community search returned {status}"),
            });
        }
        let search: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| DestinationError::InvalidResponse {
                    details: format!("community search: {e}"),
                })?;
        Ok(search
            .communities
            .into_iter()
            .map(|view| view.community)
            .collect())
    }
}

#[async_trait]
impl Destination for LemmyClient {
    async fn resolve_community(
        &self,
        name: &str,
    ) -> Result<DestinationCommunity, DestinationError> {
        let candidates = self.search_communities(name).await?;
        let community =
            exact_match(name, candidates).ok_or_else(|| DestinationError::CommunityNotFound {
                name: name.to_string(),
            })?;
        debug!("Resolved community {} to id {}", community.name, community.id);
        Ok(DestinationCommunity {
            id: community.id,
            name: community.name,
        })
    }

    async fn create_post(
        &self,
        community: &DestinationCommunity,
        post: &SourcePost,
    ) -> Result<MigratedPost, DestinationError> {
        let request = CreatePostRequest {
            name: &post.title,
            community_id: community.id,
            url: post.link.as_deref(),
            body: Some(provenance_body(post)),
            nsfw: post.nsfw,
        };
        let response = self
            .http_client
            .post(endpoint(&self.base_url, "/api/v3/post")?)
            .bearer_auth(&self.jwt)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DestinationError::WriteFailed {
                what: format!("post {}", post.id),
                details: format!("create returned {status}"),
            });
        }
        let created: PostResponse =
            response
                .json()
                .await
                .map_err(|e| DestinationError::InvalidResponse {
                    details: format!("post create: {e}"),
                })?;

        info!(
            "Created post {} in {} from source {}",
            created.post_view.post.id, community.name, post.id
        );
        Ok(MigratedPost {
            id: created.post_view.post.id,
            source_id: post.id.clone(),
        })
    }

    async fn create_comment(
        &self,
        post: &MigratedPost,
        parent: Option<&MigratedComment>,
        comment: &SourceComment,
    ) -> Result<MigratedComment, DestinationError> {
        let request = CreateCommentRequest {
            content: &comment.body,
            post_id: post.id,
            parent_id: parent.map(|p| p.id),
        };
        let response = self
            .http_client
            .post(endpoint(&self.base_url, "/api/v3/comment")?)
            .bearer_auth(&self.jwt)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DestinationError::WriteFailed {
                what: format!("comment {}", comment.id),
                details: format!("create returned {status}"),
            });
        }
        let created: CommentResponse =
            response
                .json()
                .await
                .map_err(|e| DestinationError::InvalidResponse {
                    details: format!("comment create: {e}"),
                })?;

        Ok(MigratedComment {
            id: created.comment_view.comment.id,
            source_id: comment.id.clone(),
            parent_id: parent.map(|p| p.id),
        })
    }
}

fn endpoint(base: &Url, path: &str) -> Result<Url, DestinationError> {
    base.join(path).map_err(|_| DestinationError::InvalidInstanceUrl {
        url: base.to_string(),
    })
}

/// Exact, case-insensitive name equality; ambiguous results count as no
/// match.
pub fn exact_match(name: &str, candidates: Vec<CommunityData>) -> Option<CommunityData> {
    let mut matches: Vec<CommunityData> = candidates
        .into_iter()
        .filter(|c| c.name.eq_ignore_ascii_case(name))
        .collect();
    match matches.len() {
        1 => matches.pop(),
        0 => None,
        n => {
            warn!("{n} communities match {name} exactly, treating as unresolved");
            None
        }
    }
}

/// Post body with the provenance line. Authorship itself is not carried
/// over; the operator account owns everything this tool creates.
pub fn provenance_body(post: &SourcePost) -> String {
    let origin = format!(
        "Originally posted on r/{} by u/{}",
        post.subreddit, post.author
    );
    match &post.body {
        Some(body) => format!("{body}\n\n{origin}"),
        None => origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_request_omits_parent_for_top_level() {
        let request = CreateCommentRequest {
            content: "hi",
            post_id: 7,
            parent_id: None,
        };
        let value = serde_json::to_value(request).unwrap();
        assert!(value.get("parent_id").is_none());
        assert_eq!(value["post_id"], 7);
    }

    #[test]
    fn comment_request_carries_parent_for_replies() {
        let request = CreateCommentRequest {
            content: "hi",
            post_id: 7,
            parent_id: Some(42),
        };
        let value = serde_json::to_value(request).unwrap();
        assert_eq!(value["parent_id"], 42);
    }

    #[test]
    fn post_request_omits_url_for_self_posts() {
        let request = CreatePostRequest {
            name: "a title",
            community_id: 3,
            url: None,
            body: Some("text".to_string()),
            nsfw: false,
        };
        let value = serde_json::to_value(request).unwrap();
        assert!(value.get("url").is_none());
        assert_eq!(value["community_id"], 3);
        assert_eq!(value["name"], "a title");
    }
}
