use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::core::moderation::{
    Comment, Item, ItemState, PlatformClient, PlatformError, RepoRef,
};

/// Public GitHub REST endpoint; tests point the client at a local mock.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Where repositories keep their moderation config.
const CONFIG_PATH: &str = ".github/profanity.yml";

/// Minimal GitHub REST client. It deliberately exposes only the calls the
/// core layer needs, plus the per-repository config fetch.
#[derive(Clone)]
pub struct GithubApiClient {
    client: Client,
    base_url: String,
}

impl GithubApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, PlatformError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Accept",
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("User-Agent", HeaderValue::from_static("profanity-bot/0.1"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        if let Some(token) = token {
            headers.insert(
                "Authorization",
                HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                    .map_err(|e| PlatformError::Api(e.to_string()))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PlatformError::Api(e.to_string()))?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches and parses the repository's moderation config file.
    /// `None` means the repository has no config at all, which callers
    /// treat as "stop sweeping this repository". A file that is not valid
    /// YAML downgrades to the empty config so moderation stays alive on
    /// defaults.
    pub async fn fetch_repo_config(
        &self,
        repo: &RepoRef,
    ) -> Result<Option<serde_yaml::Value>, PlatformError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url, repo.owner, repo.repo, CONFIG_PATH
        );
        let response = match self.send(self.client.get(url), "fetch repo config").await {
            Ok(response) => response,
            Err(PlatformError::NotFound) => return Ok(None),
            Err(err) => return Err(err),
        };

        let file: ApiContentFile = response
            .json()
            .await
            .map_err(|e| PlatformError::Api(format!("fetch repo config: {e}")))?;
        // The contents API wraps the base64 payload across lines.
        let encoded: String = file
            .content
            .unwrap_or_default()
            .split_whitespace()
            .collect();
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| PlatformError::Api(format!("config payload is not valid base64: {e}")))?;
        let text = String::from_utf8_lossy(&bytes);

        match serde_yaml::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(
                    owner = %repo.owner,
                    repo = %repo.repo,
                    %err,
                    "config file is not valid YAML, using defaults"
                );
                Ok(Some(serde_yaml::Value::Null))
            }
        }
    }

    /// Builds a URL from encoded path segments. Label names may contain
    /// spaces, so they cannot be spliced into the path with `format!`.
    fn url_with_segments(&self, segments: &[&str]) -> Result<reqwest::Url, PlatformError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| PlatformError::Api(format!("invalid API base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| PlatformError::Api("invalid API base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issues the request and maps the platform's error vocabulary:
    /// 404 is `NotFound`, a 422 carrying `already_exists` is
    /// `AlreadyExists`, anything else non-2xx is a transport error.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<reqwest::Response, PlatformError> {
        let response = request
            .send()
            .await
            .map_err(|e| PlatformError::Api(format!("{context}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound);
        }
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNPROCESSABLE_ENTITY && body.contains("already_exists") {
            return Err(PlatformError::AlreadyExists);
        }
        Err(PlatformError::Api(format!(
            "{context}: GitHub returned {status}: {}",
            truncate(&body, 200)
        )))
    }

    fn parse_datetime(value: Option<String>) -> Option<DateTime<Utc>> {
        value
            .as_deref()
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

fn state_param(state: ItemState) -> &'static str {
    match state {
        ItemState::Open => "open",
        ItemState::Closed => "closed",
    }
}

#[async_trait]
impl PlatformClient for GithubApiClient {
    async fn search_items(
        &self,
        query: &str,
        page_size: u32,
    ) -> Result<Vec<Item>, PlatformError> {
        let per_page = page_size.to_string();
        let request = self
            .client
            .get(format!("{}/search/issues", self.base_url))
            .query(&[
                ("q", query),
                ("sort", "updated"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ]);

        let response = self.send(request, "search items").await?;
        let results: ApiSearchResults = response
            .json()
            .await
            .map_err(|e| PlatformError::Api(format!("search items: {e}")))?;
        Ok(results.items.into_iter().map(ApiItem::into_item).collect())
    }

    async fn list_comments(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Vec<Comment>, PlatformError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.base_url, repo.owner, repo.repo, number
        );
        let response = self
            .send(
                self.client.get(url).query(&[("per_page", "100")]),
                "list comments",
            )
            .await?;
        let comments: Vec<ApiComment> = response
            .json()
            .await
            .map_err(|e| PlatformError::Api(format!("list comments: {e}")))?;
        Ok(comments
            .into_iter()
            .map(|comment| Comment {
                id: comment.id,
                body: comment.body.unwrap_or_default(),
            })
            .collect())
    }

    async fn get_label(&self, repo: &RepoRef, name: &str) -> Result<(), PlatformError> {
        let url =
            self.url_with_segments(&["repos", &repo.owner, &repo.repo, "labels", name])?;
        self.send(self.client.get(url), "get label").await?;
        Ok(())
    }

    async fn create_label(
        &self,
        repo: &RepoRef,
        name: &str,
        color: &str,
    ) -> Result<(), PlatformError> {
        let url = format!("{}/repos/{}/{}/labels", self.base_url, repo.owner, repo.repo);
        self.send(
            self.client
                .post(url)
                .json(&json!({ "name": name, "color": color })),
            "create label",
        )
        .await?;
        Ok(())
    }

    async fn add_label(
        &self,
        repo: &RepoRef,
        number: u64,
        label: &str,
    ) -> Result<(), PlatformError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/labels",
            self.base_url, repo.owner, repo.repo, number
        );
        self.send(
            self.client.post(url).json(&json!({ "labels": [label] })),
            "add label",
        )
        .await?;
        Ok(())
    }

    async fn remove_label(
        &self,
        repo: &RepoRef,
        number: u64,
        label: &str,
    ) -> Result<(), PlatformError> {
        let url = self.url_with_segments(&[
            "repos",
            &repo.owner,
            &repo.repo,
            "issues",
            &number.to_string(),
            "labels",
            label,
        ])?;
        self.send(self.client.delete(url), "remove label").await?;
        Ok(())
    }

    async fn create_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> Result<(), PlatformError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.base_url, repo.owner, repo.repo, number
        );
        self.send(
            self.client.post(url).json(&json!({ "body": body })),
            "create comment",
        )
        .await?;
        Ok(())
    }

    async fn edit_title(
        &self,
        repo: &RepoRef,
        number: u64,
        title: &str,
    ) -> Result<(), PlatformError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}",
            self.base_url, repo.owner, repo.repo, number
        );
        self.send(
            self.client.patch(url).json(&json!({ "title": title })),
            "edit title",
        )
        .await?;
        Ok(())
    }

    async fn edit_body(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> Result<(), PlatformError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}",
            self.base_url, repo.owner, repo.repo, number
        );
        self.send(
            self.client.patch(url).json(&json!({ "body": body })),
            "edit body",
        )
        .await?;
        Ok(())
    }

    async fn edit_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<(), PlatformError> {
        let url = format!(
            "{}/repos/{}/{}/issues/comments/{}",
            self.base_url, repo.owner, repo.repo, comment_id
        );
        self.send(
            self.client.patch(url).json(&json!({ "body": body })),
            "edit comment",
        )
        .await?;
        Ok(())
    }

    async fn set_state(
        &self,
        repo: &RepoRef,
        number: u64,
        state: ItemState,
    ) -> Result<(), PlatformError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}",
            self.base_url, repo.owner, repo.repo, number
        );
        self.send(
            self.client
                .patch(url)
                .json(&json!({ "state": state_param(state) })),
            "set state",
        )
        .await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiSearchResults {
    #[serde(default)]
    items: Vec<ApiItem>,
}

#[derive(Debug, Deserialize)]
struct ApiItem {
    number: u64,
    title: Option<String>,
    body: Option<String>,
    labels: Option<Vec<ApiLabel>>,
    state: Option<String>,
    locked: Option<bool>,
    updated_at: Option<String>,
}

impl ApiItem {
    fn into_item(self) -> Item {
        Item {
            number: self.number,
            title: self.title.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            labels: self
                .labels
                .unwrap_or_default()
                .into_iter()
                .filter_map(|label| label.name)
                .collect(),
            state: match self.state.as_deref() {
                Some("closed") => ItemState::Closed,
                _ => ItemState::Open,
            },
            locked: self.locked.unwrap_or(false),
            updated_at: GithubApiClient::parse_datetime(self.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiLabel {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiComment {
    id: u64,
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiContentFile {
    content: Option<String>,
}
