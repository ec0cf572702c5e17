//! Source-hosting provider abstraction.
//!
//! The reconciliation engine never talks to GitHub directly. It consumes the
//! capability traits below, which the CLI implements on top of octocrab and
//! tests implement with in-memory fakes.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// A repository as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    /// Owner login (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Full name in `owner/name` form.
    pub full_name: String,
    /// Default branch name, if the provider reported one.
    pub default_branch: Option<String>,
    /// Whether the repository is archived.
    pub archived: bool,
}

impl Repository {
    /// Creates a repository record with `full_name` derived from the parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self {
            full_name: format!("{}/{}", owner, name),
            owner,
            name,
            default_branch: None,
            archived: false,
        }
    }

    /// Sets the default branch.
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = Some(branch.into());
        self
    }

    /// Sets the archived flag.
    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }
}

/// A file retrieved through the contents API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Path within the repository.
    pub path: String,
    /// Size in bytes as reported by the provider.
    pub size: u64,
    /// Blob SHA of the file.
    pub sha: String,
    /// Decoded body, or `None` when the provider withheld it for size.
    pub content: Option<Vec<u8>>,
}

/// An organization that resolved successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    /// Organization login.
    pub login: String,
}

/// A pull request opened by the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRef {
    /// Pull request number.
    pub number: u64,
    /// Browser URL of the pull request.
    pub html_url: String,
}

/// A single-file commit onto a branch.
#[derive(Debug, Clone, Copy)]
pub struct FileCommit<'a> {
    /// Path of the file to write.
    pub path: &'a str,
    /// Commit message.
    pub message: &'a str,
    /// New file body.
    pub content: &'a [u8],
    /// Branch receiving the commit.
    pub branch: &'a str,
}

/// Parameters for opening a pull request.
#[derive(Debug, Clone, Copy)]
pub struct NewPullRequest<'a> {
    /// Pull request title.
    pub title: &'a str,
    /// Pull request body.
    pub body: &'a str,
    /// Branch with the changes.
    pub head: &'a str,
    /// Branch to merge into.
    pub base: &'a str,
}

/// Errors reported by provider implementations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource does not exist or is hidden from the caller.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller is not allowed to perform the request.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The provider API returned an unexpected error.
    #[error("GitHub API error: {0}")]
    Api(String),

    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Returns true for the not-found class.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Enumerates repositories to reconcile.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Lists every repository of an organization.
    async fn list_repositories(&self, org: &str) -> Result<Vec<Repository>, ProviderError>;

    /// Fetches a single repository.
    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ProviderError>;
}

/// Reads repository files.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Retrieves a file on the default branch.
    ///
    /// Returns `Ok(None)` when nothing exists at `path`.
    async fn get_file(
        &self,
        repo: &Repository,
        path: &str,
    ) -> Result<Option<FileContent>, ProviderError>;

    /// Retrieves and decodes a git blob by SHA.
    async fn get_blob(&self, repo: &Repository, sha: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Answers organization membership questions.
#[async_trait]
pub trait MembershipSource: Send + Sync {
    /// Looks up an organization. Returns `Ok(None)` when it does not exist.
    async fn get_organization(&self, name: &str) -> Result<Option<Organization>, ProviderError>;

    /// Checks whether `handle` is currently a member of `org`.
    async fn is_member(&self, org: &Organization, handle: &str) -> Result<bool, ProviderError>;
}

/// Writes branches, files and pull requests.
#[async_trait]
pub trait PublishTarget: Send + Sync {
    /// Resolves `heads/<branch>` to its commit SHA.
    async fn get_ref(&self, repo: &Repository, branch: &str) -> Result<String, ProviderError>;

    /// Creates `refs/heads/<branch>` pointing at `sha`.
    async fn create_ref(
        &self,
        repo: &Repository,
        branch: &str,
        sha: &str,
    ) -> Result<(), ProviderError>;

    /// Replaces an existing file whose current blob SHA is `sha`.
    async fn update_file(
        &self,
        repo: &Repository,
        commit: &FileCommit<'_>,
        sha: &str,
    ) -> Result<(), ProviderError>;

    /// Creates a file that does not exist on the branch yet.
    async fn create_file(
        &self,
        repo: &Repository,
        commit: &FileCommit<'_>,
    ) -> Result<(), ProviderError>;

    /// Opens a pull request.
    async fn create_pull_request(
        &self,
        repo: &Repository,
        pull: &NewPullRequest<'_>,
    ) -> Result<PullRequestRef, ProviderError>;
}

/// Every capability the reconciliation run needs.
pub trait Provider: RepositorySource + FileSource + MembershipSource + PublishTarget {}

impl<T> Provider for T where T: RepositorySource + FileSource + MembershipSource + PublishTarget {}
