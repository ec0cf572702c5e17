//! Branch, commit and pull request creation.

use crate::provider::{
    FileCommit, NewPullRequest, ProviderError, PublishTarget, PullRequestRef, Repository,
};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Prefix of every branch the publisher creates.
pub const BRANCH_PREFIX: &str = "codeowners-";

/// Produces the unique part of new branch names.
pub trait BranchIdGenerator: Send {
    /// Returns a fresh identifier.
    fn next_id(&mut self) -> String;
}

/// Random UUID-v4 style branch identifiers.
#[derive(Debug, Clone)]
pub struct UuidBranchIds {
    rng: StdRng,
}

impl UuidBranchIds {
    /// Creates a generator seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a deterministic generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for UuidBranchIds {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchIdGenerator for UuidBranchIds {
    fn next_id(&mut self) -> String {
        let mut bytes = [0u8; 16];
        self.rng.fill(&mut bytes);
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }
}

/// Errors from publishing a change.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A write was refused; the provider reports missing write access as
    /// not-found or forbidden.
    #[error("failed to {step}, check write permissions: {source}")]
    PermissionDenied {
        /// The step that failed.
        step: &'static str,
        /// The provider error.
        source: ProviderError,
    },

    /// The repository has no default branch to branch from.
    #[error("repository {0} has no default branch")]
    MissingDefaultBranch(String),

    /// Any other provider failure.
    #[error("failed to {step}: {source}")]
    Provider {
        /// The step that failed.
        step: &'static str,
        /// The provider error.
        source: ProviderError,
    },
}

impl PublishError {
    /// Returns true when the failure only means this repository is skipped.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. } | Self::MissingDefaultBranch(_))
    }

    fn classify(step: &'static str, source: ProviderError) -> Self {
        match source {
            ProviderError::NotFound(_) | ProviderError::Forbidden(_) => {
                Self::PermissionDenied { step, source }
            }
            source => Self::Provider { step, source },
        }
    }
}

/// The change to propose on one repository.
#[derive(Debug, Clone, Copy)]
pub struct ChangeRequest<'a> {
    /// Path of the CODEOWNERS file.
    pub path: &'a str,
    /// Current blob SHA of the file, `None` to create it.
    pub file_sha: Option<&'a str>,
    /// Rewritten file body.
    pub content: &'a [u8],
    /// Commit message.
    pub commit_message: &'a str,
    /// Pull request title.
    pub title: &'a str,
    /// Pull request body.
    pub body: &'a str,
}

/// Proposes a file change through a new branch and pull request.
///
/// The branch is `codeowners-<id>` created from the head of the default
/// branch; the pull request targets the default branch.
pub async fn publish_change<P, G>(
    target: &P,
    ids: &mut G,
    repo: &Repository,
    change: &ChangeRequest<'_>,
) -> Result<PullRequestRef, PublishError>
where
    P: PublishTarget + ?Sized,
    G: BranchIdGenerator + ?Sized,
{
    let base = repo
        .default_branch
        .as_deref()
        .ok_or_else(|| PublishError::MissingDefaultBranch(repo.full_name.clone()))?;

    let base_sha = target
        .get_ref(repo, base)
        .await
        .map_err(|e| PublishError::classify("resolve default branch", e))?;

    let branch = format!("{}{}", BRANCH_PREFIX, ids.next_id());
    debug!(
        "{}: creating branch {} at {} ({})",
        repo.full_name, branch, base_sha, base
    );
    target
        .create_ref(repo, &branch, &base_sha)
        .await
        .map_err(|e| PublishError::classify("create branch", e))?;

    let commit = FileCommit {
        path: change.path,
        message: change.commit_message,
        content: change.content,
        branch: &branch,
    };
    let written = match change.file_sha {
        Some(sha) => target.update_file(repo, &commit, sha).await,
        None => target.create_file(repo, &commit).await,
    };
    written.map_err(|e| PublishError::classify("commit file", e))?;

    let pull = target
        .create_pull_request(
            repo,
            &NewPullRequest {
                title: change.title,
                body: change.body,
                head: &branch,
                base,
            },
        )
        .await
        .map_err(|e| PublishError::classify("open pull request", e))?;

    info!("{}: created pull request {}", repo.full_name, pull.html_url);
    Ok(pull)
}
