//! GitHub provider implementation using octocrab.
//!
//! This module provides the octocrab-based implementation of the provider
//! traits consumed by the reconciliation engine.

use async_trait::async_trait;
use cleanowners_core::provider::{
    FileCommit, FileContent, FileSource, MembershipSource, NewPullRequest, Organization,
    ProviderError, PublishTarget, PullRequestRef, Repository, RepositorySource,
};
use http::header::{ACCEPT, HeaderMap, HeaderValue};
use http::StatusCode;
use octocrab::models::repos::Object;
use octocrab::params::repos::Reference;

/// Media type returning a git blob as raw bytes instead of base64 JSON.
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// A wrapper around `octocrab::Octocrab` that implements the provider traits.
///
/// This wrapper is necessary due to Rust's orphan rules, which prevent
/// implementing external traits on external types.
pub struct OctocrabClient(pub octocrab::Octocrab);

impl OctocrabClient {
    /// Creates a new OctocrabClient from an Octocrab instance.
    pub fn new(client: octocrab::Octocrab) -> Self {
        Self(client)
    }
}

impl std::ops::Deref for OctocrabClient {
    type Target = octocrab::Octocrab;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extracts the HTTP status code from an octocrab error.
fn extract_status_code(error: &octocrab::Error) -> Option<StatusCode> {
    match error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code),
        _ => None,
    }
}

/// Maps an octocrab error onto the provider error classes.
fn map_error(context: String, error: octocrab::Error) -> ProviderError {
    let message = format!("{}: {}", context, error);
    match extract_status_code(&error) {
        Some(StatusCode::NOT_FOUND) => ProviderError::NotFound(message),
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            ProviderError::Forbidden(message)
        }
        _ => ProviderError::Api(message),
    }
}

fn convert_repository(repo: octocrab::models::Repository) -> Repository {
    let owner = repo
        .owner
        .as_ref()
        .map(|author| author.login.clone())
        .unwrap_or_default();
    let full_name = repo
        .full_name
        .clone()
        .unwrap_or_else(|| format!("{}/{}", owner, repo.name));

    Repository {
        owner,
        name: repo.name,
        full_name,
        default_branch: repo.default_branch,
        archived: repo.archived.unwrap_or(false),
    }
}

#[async_trait]
impl RepositorySource for OctocrabClient {
    async fn list_repositories(&self, org: &str) -> Result<Vec<Repository>, ProviderError> {
        let first = self
            .0
            .orgs(org)
            .list_repos()
            .per_page(100)
            .send()
            .await
            .map_err(|e| map_error(format!("list repositories of {}", org), e))?;
        let repos = self
            .0
            .all_pages(first)
            .await
            .map_err(|e| map_error(format!("list repositories of {}", org), e))?;
        Ok(repos.into_iter().map(convert_repository).collect())
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ProviderError> {
        self.0
            .repos(owner, name)
            .get()
            .await
            .map(convert_repository)
            .map_err(|e| map_error(format!("get repository {}/{}", owner, name), e))
    }
}

#[async_trait]
impl FileSource for OctocrabClient {
    async fn get_file(
        &self,
        repo: &Repository,
        path: &str,
    ) -> Result<Option<FileContent>, ProviderError> {
        let items = match self
            .0
            .repos(&repo.owner, &repo.name)
            .get_content()
            .path(path)
            .send()
            .await
        {
            Ok(items) => items,
            Err(e) if extract_status_code(&e) == Some(StatusCode::NOT_FOUND) => return Ok(None),
            Err(e) => return Err(map_error(format!("get {} in {}", path, repo.full_name), e)),
        };

        // A directory at the path comes back as a listing; only a file counts.
        let Some(item) = items.items.into_iter().find(|item| item.r#type == "file") else {
            return Ok(None);
        };

        let withheld = item.encoding.as_deref() == Some("none");
        let content = if withheld {
            None
        } else {
            item.decoded_content().map(String::into_bytes)
        };

        Ok(Some(FileContent {
            path: item.path,
            size: u64::try_from(item.size).unwrap_or(0),
            sha: item.sha,
            content,
        }))
    }

    async fn get_blob(&self, repo: &Repository, sha: &str) -> Result<Vec<u8>, ProviderError> {
        let context = || format!("get blob {} in {}", sha, repo.full_name);
        let route = format!("/repos/{}/{}/git/blobs/{}", repo.owner, repo.name, sha);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(RAW_MEDIA_TYPE));

        let response = self
            .0
            ._get_with_headers(route, Some(headers))
            .await
            .map_err(|e| map_error(context(), e))?;
        let response = octocrab::map_github_error(response)
            .await
            .map_err(|e| map_error(context(), e))?;
        let body = self
            .0
            .body_to_string(response)
            .await
            .map_err(|e| ProviderError::Decode(format!("{}: {}", context(), e)))?;
        Ok(body.into_bytes())
    }
}

#[async_trait]
impl MembershipSource for OctocrabClient {
    async fn get_organization(&self, name: &str) -> Result<Option<Organization>, ProviderError> {
        match self.0.orgs(name).get().await {
            Ok(org) => Ok(Some(Organization { login: org.login })),
            Err(e) if extract_status_code(&e) == Some(StatusCode::NOT_FOUND) => Ok(None),
            Err(e) => Err(map_error(format!("get organization {}", name), e)),
        }
    }

    async fn is_member(&self, org: &Organization, handle: &str) -> Result<bool, ProviderError> {
        self.0
            .orgs(&org.login)
            .check_membership(handle)
            .await
            .map_err(|e| map_error(format!("check membership of {} in {}", handle, org.login), e))
    }
}

#[async_trait]
impl PublishTarget for OctocrabClient {
    async fn get_ref(&self, repo: &Repository, branch: &str) -> Result<String, ProviderError> {
        let reference = self
            .0
            .repos(&repo.owner, &repo.name)
            .get_ref(&Reference::Branch(branch.to_string()))
            .await
            .map_err(|e| map_error(format!("get heads/{} in {}", branch, repo.full_name), e))?;

        #[allow(unreachable_patterns)]
        match reference.object {
            Object::Commit { sha, .. } | Object::Tag { sha, .. } => Ok(sha),
            _ => Err(ProviderError::Decode(format!(
                "heads/{} in {} does not point at a commit",
                branch, repo.full_name
            ))),
        }
    }

    async fn create_ref(
        &self,
        repo: &Repository,
        branch: &str,
        sha: &str,
    ) -> Result<(), ProviderError> {
        self.0
            .repos(&repo.owner, &repo.name)
            .create_ref(&Reference::Branch(branch.to_string()), sha)
            .await
            .map(|_| ())
            .map_err(|e| map_error(format!("create refs/heads/{} in {}", branch, repo.full_name), e))
    }

    async fn update_file(
        &self,
        repo: &Repository,
        commit: &FileCommit<'_>,
        sha: &str,
    ) -> Result<(), ProviderError> {
        self.0
            .repos(&repo.owner, &repo.name)
            .update_file(commit.path, commit.message, commit.content, sha)
            .branch(commit.branch)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| map_error(format!("update {} in {}", commit.path, repo.full_name), e))
    }

    async fn create_file(
        &self,
        repo: &Repository,
        commit: &FileCommit<'_>,
    ) -> Result<(), ProviderError> {
        self.0
            .repos(&repo.owner, &repo.name)
            .create_file(commit.path, commit.message, commit.content)
            .branch(commit.branch)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| map_error(format!("create {} in {}", commit.path, repo.full_name), e))
    }

    async fn create_pull_request(
        &self,
        repo: &Repository,
        pull: &NewPullRequest<'_>,
    ) -> Result<PullRequestRef, ProviderError> {
        let created = self
            .0
            .pulls(&repo.owner, &repo.name)
            .create(pull.title, pull.head, pull.base)
            .body(pull.body)
            .send()
            .await
            .map_err(|e| map_error(format!("open pull request in {}", repo.full_name), e))?;

        Ok(PullRequestRef {
            number: created.number,
            html_url: created
                .html_url
                .map(|url| url.to_string())
                .unwrap_or_default(),
        })
    }
}
