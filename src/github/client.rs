use reqwest::{header, Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::github::paginator::Paginator;
use crate::github::rate_limiter::RateLimiter;
use crate::models::{PullRequestContext, PullRequestDetails, PullRequestFile};

/// Body of `POST /repos/{owner}/{repo}/pulls/{number}/reviews`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewPayload {
    pub commit_id: String,
    pub body: String,
    pub event: String,
    pub comments: Vec<InlineComment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlineComment {
    pub path: String,
    pub line: u32,
    pub side: String,
    pub body: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    total_count: u64,
}

pub struct GitHubClient {
    client: Client,
    rate_limiter: RateLimiter,
    search_limiter: RateLimiter,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("prreviewer/0.1"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(),
            search_limiter: RateLimiter::per_minute(30),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestDetails> {
        self.rate_limiter.wait().await;
        let url = format!("{}/repos/{}/{}/pulls/{}", self.base_url, owner, repo, number);
        tracing::info!("Fetching pull request {}/{}#{}", owner, repo, number);

        let response = self.client.get(&url).send().await?;
        self.rate_limiter.update_from_response(&response).await;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Failed to fetch pull request #{}: {} - {}",
                number, status, body
            )));
        }

        Ok(response.json().await?)
    }

    pub async fn list_pull_request_files(
        &self,
        pr: &PullRequestContext,
    ) -> Result<Vec<PullRequestFile>> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/files",
            self.base_url, pr.owner, pr.repo, pr.number
        );
        let paginator = Paginator::new(&self.client, &self.rate_limiter);
        tracing::info!("Fetching changed files for {}#{}", pr.full_name(), pr.number);
        paginator.fetch_all(&url, 100).await
    }

    /// Contents API URL with each path segment percent-encoded.
    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::GitHubApi(format!("Invalid API URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::GitHubApi(format!("Invalid API URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(["repos", owner, repo, "contents"])
            .extend(path.split('/'));
        Ok(url)
    }

    /// Raw file content at `git_ref`, or `None` if the path does not exist there.
    pub async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<String>> {
        self.rate_limiter.wait().await;
        let url = self.contents_url(owner, repo, path)?;

        let response = self
            .client
            .get(url)
            .query(&[("ref", git_ref)])
            .header(header::ACCEPT, "application/vnd.github.raw")
            .send()
            .await?;
        self.rate_limiter.update_from_response(&response).await;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Failed to fetch {}@{}: {} - {}",
                path, git_ref, status, body
            )));
        }

        Ok(Some(response.text().await?))
    }

    /// Number of code search hits for `query`.
    pub async fn search_code(&self, query: &str) -> Result<u64> {
        self.search_limiter.wait().await;
        let url = format!("{}/search/code", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("per_page", "1")])
            .send()
            .await?;
        self.search_limiter.update_from_response(&response).await;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Code search failed: {} - {}",
                status, body
            )));
        }

        let result: SearchResponse = response.json().await?;
        Ok(result.total_count)
    }

    pub async fn create_review(
        &self,
        pr: &PullRequestContext,
        review: &ReviewPayload,
    ) -> Result<()> {
        self.rate_limiter.wait().await;
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/reviews",
            self.base_url, pr.owner, pr.repo, pr.number
        );
        tracing::info!(
            "Posting review with {} inline comment(s) to {}#{}",
            review.comments.len(),
            pr.full_name(),
            pr.number
        );

        let response = self.client.post(&url).json(review).send().await?;
        self.rate_limiter.update_from_response(&response).await;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Failed to create review: {} - {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pr() -> PullRequestContext {
        PullRequestContext {
            owner: "octo".into(),
            repo: "demo".into(),
            number: 7,
            head_sha: "abc123".into(),
            title: "Add feature".into(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_list_files_follows_pagination() {
        let server = MockServer::start().await;
        let page1: Vec<_> = (0..100)
            .map(|i| serde_json::json!({"filename": format!("src/f{}.py", i), "status": "modified", "patch": "@@ -1 +1 @@\n+x"}))
            .collect();
        let next = format!(
            "<{}/repos/octo/demo/pulls/7/files?per_page=100&page=2>; rel=\"next\"",
            server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/pulls/7/files"))
            .and(query_param("page", "1"))
            .and(header_eq("authorization", "Bearer ghp_test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", next.as_str())
                    .set_body_json(page1),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/pulls/7/files"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"filename": "last.py", "status": "added", "additions": 1}
            ])))
            .mount(&server)
            .await;

        let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
        let files = client.list_pull_request_files(&pr()).await.unwrap();
        assert_eq!(files.len(), 101);
        assert_eq!(files[100].filename, "last.py");
        assert!(files[100].patch.is_none());
    }

    #[tokio::test]
    async fn test_list_files_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/pulls/7/files"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let client = GitHubClient::new("bad", &server.uri()).unwrap();
        let err = client.list_pull_request_files(&pr()).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_file_content_missing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/contents/src/gone.py"))
            .and(query_param("ref", "abc123"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
        let content = client
            .get_file_content("octo", "demo", "src/gone.py", "abc123")
            .await
            .unwrap();
        assert!(content.is_none());
    }

    #[tokio::test]
    async fn test_file_content_path_is_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/contents/docs/notes%20%231%3F.py"))
            .and(query_param("ref", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Copyright 2025\n"))
            .mount(&server)
            .await;

        let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
        let content = client
            .get_file_content("octo", "demo", "docs/notes #1?.py", "abc123")
            .await
            .unwrap();
        assert_eq!(content.as_deref(), Some("# Copyright 2025\n"));
    }

    #[tokio::test]
    async fn test_search_code_total_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/code"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"total_count": 3, "items": []})),
            )
            .mount(&server)
            .await;

        let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
        assert_eq!(client.search_code("\"x = 1\" in:file").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_create_review_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octo/demo/pulls/7/reviews"))
            .respond_with(ResponseTemplate::new(422).set_body_string("Unprocessable"))
            .mount(&server)
            .await;

        let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
        let review = ReviewPayload {
            commit_id: "abc123".into(),
            body: "summary".into(),
            event: "COMMENT".into(),
            comments: Vec::new(),
        };
        assert!(client.create_review(&pr(), &review).await.is_err());
    }
}
