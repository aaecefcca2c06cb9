//! # GitHub client (CLI <-> Core)
//!
//! This module bridges the CLI workflow to the object store abstraction in
//! [`pagepub-core::contract`]. It wires up the `ObjectStore` trait for real
//! use against the GitHub git data API: blobs, trees, commits and refs under
//! `repos/{owner}/{repo}/git/`.
//!
//! ## Client Usage
//!
//! - Construct [`GitHubClient`] from environment variables (`GITHUB_TOKEN`,
//!   `GITHUB_REPOSITORY`, optionally `GITHUB_API_URL` for GitHub
//!   Enterprise hosts).
//! - All transport, serialization and error mapping are encapsulated here;
//!   the pipeline only ever sees typed store errors.
//!
//! For the full trait contract see the core's `contract` module.

use std::env;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use pagepub_core::contract::{BlobRef, NewCommit, ObjectStore, RemoteCommit};
use pagepub_core::error::StoreError;

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Object store client backed by the GitHub git data API.
#[derive(Debug)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: &str,
    ) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(StoreError::transport)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("pagepub"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(StoreError::transport)?;

        Ok(GitHubClient {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            owner: owner.into(),
            repo: repo.into(),
        })
    }

    /// Point the client at a different API host (GitHub Enterprise).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn new_from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok(); // loads environment variables from .env if present
        let token = match env::var("GITHUB_TOKEN") {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = ?e, "GITHUB_TOKEN missing in environment");
                return Err(Box::new(e));
            }
        };
        let repo_path = match env::var("GITHUB_REPOSITORY") {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(error = ?e, "GITHUB_REPOSITORY missing in environment");
                return Err(Box::new(e));
            }
        };
        let Some((owner, repo)) = repo_path.split_once('/') else {
            tracing::error!(raw = %repo_path, "GITHUB_REPOSITORY is not of the form owner/repo");
            return Err(format!("GITHUB_REPOSITORY must be owner/repo, got {repo_path:?}").into());
        };
        if owner.is_empty() || repo.is_empty() {
            tracing::error!(raw = %repo_path, "GITHUB_REPOSITORY is not of the form owner/repo");
            return Err(format!("GITHUB_REPOSITORY must be owner/repo, got {repo_path:?}").into());
        }

        let mut client = Self::new(owner, repo, &token)
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { e.to_string().into() })?;
        if let Ok(base) = env::var("GITHUB_API_URL") {
            client = client.with_api_base(base);
        }
        tracing::info!(
            owner = %client.owner,
            repo = %client.repo,
            token_set = !token.is_empty(),
            "Initialized GitHubClient from environment"
        );
        Ok(client)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn repo_url(&self) -> String {
        format!("{}/repos/{}/{}", self.api_base, self.owner, self.repo)
    }

    fn git_url(&self, path: &str) -> String {
        format!("{}/git/{}", self.repo_url(), path)
    }
}

/// Read a failed response into a typed API error.
async fn api_error(resp: reqwest::Response) -> StoreError {
    let status = resp.status().as_u16();
    let message = resp
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable response body>".to_string());
    StoreError::Api { status, message }
}

#[derive(Serialize)]
struct CreateBlobRequest {
    content: String,
    encoding: &'static str,
}

#[derive(Deserialize)]
struct ShaResponse {
    sha: String,
}

#[derive(Serialize)]
struct TreeEntryPayload<'a> {
    path: &'a str,
    mode: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    sha: &'a str,
}

#[derive(Serialize)]
struct CreateTreeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    base_tree: Option<&'a str>,
    tree: Vec<TreeEntryPayload<'a>>,
}

#[derive(Serialize)]
struct AuthorPayload<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct CreateCommitRequest<'a> {
    message: &'a str,
    tree: &'a str,
    parents: &'a [String],
    author: AuthorPayload<'a>,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    tree: ShaResponse,
}

#[derive(Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Serialize)]
struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    reference: String,
    sha: &'a str,
}

#[derive(Serialize)]
struct UpdateRefRequest<'a> {
    sha: &'a str,
    force: bool,
}

#[derive(Deserialize)]
struct RepoResponse {
    default_branch: String,
}

#[async_trait]
impl ObjectStore for GitHubClient {
    async fn create_blob(&self, bytes: &[u8]) -> Result<String, StoreError> {
        let body = CreateBlobRequest {
            content: BASE64.encode(bytes),
            encoding: "base64",
        };
        let resp = self
            .http
            .post(self.git_url("blobs"))
            .json(&body)
            .send()
            .await
            .map_err(StoreError::transport)?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let created: ShaResponse = resp.json().await.map_err(StoreError::transport)?;
        tracing::debug!(sha = %created.sha, size = bytes.len(), "Created blob");
        Ok(created.sha)
    }

    async fn create_tree<'a>(
        &self,
        base_tree_id: Option<&'a str>,
        entries: &[BlobRef],
    ) -> Result<String, StoreError> {
        let tree: Vec<TreeEntryPayload<'_>> = entries
            .iter()
            .map(|entry| TreeEntryPayload {
                path: &entry.path,
                mode: entry.mode.as_octal(),
                kind: "blob",
                sha: &entry.object_id,
            })
            .collect();
        let body = CreateTreeRequest {
            base_tree: base_tree_id,
            tree,
        };
        let resp = self
            .http
            .post(self.git_url("trees"))
            .json(&body)
            .send()
            .await
            .map_err(StoreError::transport)?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let created: ShaResponse = resp.json().await.map_err(StoreError::transport)?;
        tracing::info!(
            sha = %created.sha,
            entries = entries.len(),
            base = base_tree_id.unwrap_or("<none>"),
            "Created tree"
        );
        Ok(created.sha)
    }

    async fn create_commit<'a>(&self, commit: NewCommit<'a>) -> Result<String, StoreError> {
        let body = CreateCommitRequest {
            message: commit.message,
            tree: commit.tree_id,
            parents: commit.parent_ids,
            author: AuthorPayload {
                name: &commit.author.name,
                email: &commit.author.email,
            },
        };
        let resp = self
            .http
            .post(self.git_url("commits"))
            .json(&body)
            .send()
            .await
            .map_err(StoreError::transport)?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let created: CommitResponse = resp.json().await.map_err(StoreError::transport)?;
        tracing::info!(sha = %created.sha, tree = %created.tree.sha, "Created commit");
        Ok(created.sha)
    }

    async fn get_commit(&self, commit_id: &str) -> Result<RemoteCommit, StoreError> {
        let resp = self
            .http
            .get(self.git_url(&format!("commits/{commit_id}")))
            .send()
            .await
            .map_err(StoreError::transport)?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let commit: CommitResponse = resp.json().await.map_err(StoreError::transport)?;
        Ok(RemoteCommit {
            object_id: commit.sha,
            tree_id: commit.tree.sha,
        })
    }

    async fn get_ref(&self, branch: &str) -> Result<String, StoreError> {
        let resp = self
            .http
            .get(self.git_url(&format!("ref/heads/{branch}")))
            .send()
            .await
            .map_err(StoreError::transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::RefNotFound(branch.to_string()));
        }
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let reference: RefResponse = resp.json().await.map_err(StoreError::transport)?;
        tracing::debug!(branch, sha = %reference.object.sha, "Resolved ref");
        Ok(reference.object.sha)
    }

    async fn create_ref(&self, branch: &str, commit_id: &str) -> Result<(), StoreError> {
        let body = CreateRefRequest {
            reference: format!("refs/heads/{branch}"),
            sha: commit_id,
        };
        let resp = self
            .http
            .post(self.git_url("refs"))
            .json(&body)
            .send()
            .await
            .map_err(StoreError::transport)?;
        let status = resp.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let message = resp
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable response body>".to_string());
            if message.contains("already exists") {
                return Err(StoreError::RefAlreadyExists(branch.to_string()));
            }
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(api_error(resp).await);
        }
        tracing::info!(branch, sha = commit_id, "Created ref");
        Ok(())
    }

    async fn update_ref(
        &self,
        branch: &str,
        commit_id: &str,
        force: bool,
    ) -> Result<(), StoreError> {
        let body = UpdateRefRequest {
            sha: commit_id,
            force,
        };
        let resp = self
            .http
            .patch(self.git_url(&format!("refs/heads/{branch}")))
            .json(&body)
            .send()
            .await
            .map_err(StoreError::transport)?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        tracing::info!(branch, sha = commit_id, force, "Updated ref");
        Ok(())
    }

    async fn get_default_branch_tip(&self) -> Result<Option<String>, StoreError> {
        let resp = self
            .http
            .get(self.repo_url())
            .send()
            .await
            .map_err(StoreError::transport)?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let repo: RepoResponse = resp.json().await.map_err(StoreError::transport)?;

        match self.get_ref(&repo.default_branch).await {
            Ok(tip) => Ok(Some(tip)),
            Err(StoreError::RefNotFound(_)) => Ok(None),
            // 409 is how the API answers git data reads on a repository
            // with no commits at all.
            Err(StoreError::Api { status: 409, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_urls_are_rooted_at_the_repository() {
        let client = GitHubClient::new("octocat", "hello-world", "token").unwrap();
        assert_eq!(
            client.git_url("blobs"),
            "https://api.github.com/repos/octocat/hello-world/git/blobs"
        );
        assert_eq!(
            client.git_url("ref/heads/gh-pages"),
            "https://api.github.com/repos/octocat/hello-world/git/ref/heads/gh-pages"
        );
    }

    #[test]
    fn api_base_override_drops_trailing_slash() {
        let client = GitHubClient::new("octocat", "hello-world", "token")
            .unwrap()
            .with_api_base("https://github.example.com/api/v3/");
        assert_eq!(
            client.repo_url(),
            "https://github.example.com/api/v3/repos/octocat/hello-world"
        );
    }
}
