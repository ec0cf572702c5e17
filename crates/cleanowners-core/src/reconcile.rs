//! Per-repository reconciliation and the run loop.

use crate::locate::locate_codeowners;
use crate::membership::MembershipResolver;
use crate::parse::{OwnerHandle, ParserConfig, parse_handles_with_config};
use crate::provider::{Provider, ProviderError, PullRequestRef, Repository};
use crate::publish::{BranchIdGenerator, ChangeRequest, PublishError, publish_change};
use crate::rewrite::remove_handles;
use crate::stats::RunStatistics;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Default pull request title.
pub const DEFAULT_TITLE: &str = "Clean up CODEOWNERS file";
/// Default pull request body.
pub const DEFAULT_BODY: &str = "Consider these updates to the CODEOWNERS file to remove users no longer in this organization.";
/// Default commit message.
pub const DEFAULT_COMMIT_MESSAGE: &str =
    "Remove users no longer in this organization from CODEOWNERS file";

/// Settings for a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Organization used for membership checks. Falls back to each
    /// repository's owner when unset.
    pub organization: Option<String>,
    /// Full names of repositories that are never processed.
    pub exempt_repositories: HashSet<String>,
    /// Detect and report only; never create branches or pull requests.
    pub dry_run: bool,
    /// Pull request title.
    pub title: String,
    /// Pull request body.
    pub body: String,
    /// Commit message.
    pub commit_message: String,
    /// Keep team handles in [`ReconciliationResult::handles_found`].
    pub include_teams: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            organization: None,
            exempt_repositories: HashSet::new(),
            dry_run: false,
            title: DEFAULT_TITLE.to_string(),
            body: DEFAULT_BODY.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            include_teams: false,
        }
    }
}

impl ReconcileConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the organization used for membership checks.
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Sets the exempt repositories.
    pub fn with_exempt_repositories<I, S>(mut self, repos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exempt_repositories = repos.into_iter().map(Into::into).collect();
        self
    }

    /// Sets dry-run mode.
    pub fn with_dry_run(mut self, value: bool) -> Self {
        self.dry_run = value;
        self
    }

    /// Sets the pull request title and body.
    pub fn with_pull_request_text(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.title = title.into();
        self.body = body.into();
        self
    }

    /// Sets the commit message.
    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    /// Sets whether team handles are reported.
    pub fn with_include_teams(mut self, value: bool) -> Self {
        self.include_teams = value;
        self
    }
}

/// Terminal state of one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Listed in the exemption list.
    SkippedExempt,
    /// Archived repository.
    SkippedArchived,
    /// No non-empty CODEOWNERS file.
    SkippedMissing,
    /// The organization for membership checks does not exist.
    SkippedBadOrg,
    /// Publishing was refused for lack of write access.
    SkippedWriteFailed,
    /// Every individual owner is still a member.
    NoOp,
    /// Stale owners found but nothing published (dry run).
    ReportedOnly,
    /// A pull request was opened.
    PullRequestCreated,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::SkippedExempt => "skipped-exempt",
            Outcome::SkippedArchived => "skipped-archived",
            Outcome::SkippedMissing => "skipped-missing",
            Outcome::SkippedBadOrg => "skipped-bad-org",
            Outcome::SkippedWriteFailed => "skipped-write-failed",
            Outcome::NoOp => "no-op",
            Outcome::ReportedOnly => "reported-only",
            Outcome::PullRequestCreated => "pull-request-created",
        };
        f.write_str(text)
    }
}

/// What happened to one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// Repository full name.
    pub repository: String,
    /// Terminal state.
    pub outcome: Outcome,
    /// Path of the CODEOWNERS file, when one was found.
    pub codeowners_path: Option<String>,
    /// Handles parsed from the file.
    pub handles_found: Vec<OwnerHandle>,
    /// Individual handles that are no longer members, without duplicates.
    pub stale_individuals: Vec<String>,
    /// Whether rewritten content differing from the original was produced.
    pub file_changed: bool,
    /// The pull request, when one was opened.
    pub pull_request: Option<PullRequestRef>,
}

impl ReconciliationResult {
    fn new(repo: &Repository, outcome: Outcome) -> Self {
        Self {
            repository: repo.full_name.clone(),
            outcome,
            codeowners_path: None,
            handles_found: Vec::new(),
            stale_individuals: Vec::new(),
            file_changed: false,
            pull_request: None,
        }
    }
}

/// Faults that end the run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The configured organization does not exist.
    #[error("organization {0} not found; set a valid organization or a repository list")]
    OrganizationNotFound(String),

    /// A provider call failed unexpectedly.
    #[error("{repository}: {source}")]
    Provider {
        /// Repository (or organization) being processed.
        repository: String,
        /// The provider error.
        source: ProviderError,
    },

    /// Publishing failed for a reason other than write access.
    #[error("{repository}: {source}")]
    Publish {
        /// Repository being processed.
        repository: String,
        /// The publish error.
        source: PublishError,
    },
}

/// Which repositories a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositorySelection {
    /// Every repository of an organization.
    Organization(String),
    /// Explicit `(owner, name)` pairs.
    List(Vec<(String, String)>),
}

/// Fetches the repositories of a selection.
///
/// In organization mode the organization must exist, otherwise the run
/// cannot start.
pub async fn collect_repositories<P>(
    provider: &P,
    selection: &RepositorySelection,
) -> Result<Vec<Repository>, ReconcileError>
where
    P: Provider + ?Sized,
{
    match selection {
        RepositorySelection::Organization(org) => {
            let found = provider
                .get_organization(org)
                .await
                .map_err(|source| ReconcileError::Provider {
                    repository: org.clone(),
                    source,
                })?;
            if found.is_none() {
                return Err(ReconcileError::OrganizationNotFound(org.clone()));
            }
            let repos = provider
                .list_repositories(org)
                .await
                .map_err(|source| ReconcileError::Provider {
                    repository: org.clone(),
                    source,
                })?;
            info!("Found {} repositories in {}", repos.len(), org);
            Ok(repos)
        }
        RepositorySelection::List(entries) => {
            let mut repos = Vec::with_capacity(entries.len());
            for (owner, name) in entries {
                let repo = provider.get_repository(owner, name).await.map_err(|source| {
                    ReconcileError::Provider {
                        repository: format!("{}/{}", owner, name),
                        source,
                    }
                })?;
                repos.push(repo);
            }
            Ok(repos)
        }
    }
}

/// Drives reconciliation of repositories one at a time.
pub struct Reconciler<'a, P: ?Sized, G> {
    provider: &'a P,
    config: &'a ReconcileConfig,
    membership: MembershipResolver<'a, P>,
    branch_ids: G,
    stop: Option<Arc<AtomicBool>>,
}

impl<'a, P, G> Reconciler<'a, P, G>
where
    P: Provider + ?Sized,
    G: BranchIdGenerator,
{
    /// Creates a reconciler.
    pub fn new(provider: &'a P, config: &'a ReconcileConfig, branch_ids: G) -> Self {
        Self {
            provider,
            config,
            membership: MembershipResolver::new(provider),
            branch_ids,
            stop: None,
        }
    }

    /// Stops [`Reconciler::reconcile_all`] between repositories once the
    /// flag is set.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Reconciles repositories in order, updating `stats` as it goes.
    ///
    /// An error ends the loop; `stats` still reflects every repository
    /// completed before it.
    pub async fn reconcile_all(
        &mut self,
        repos: &[Repository],
        stats: &mut RunStatistics,
    ) -> Result<Vec<ReconciliationResult>, ReconcileError> {
        let mut results = Vec::with_capacity(repos.len());
        for repo in repos {
            if self.stop_requested() {
                info!("Stop requested, {} repositories left unprocessed", repos.len() - results.len());
                break;
            }
            results.push(self.reconcile(repo, stats).await?);
        }
        Ok(results)
    }

    /// Reconciles a single repository.
    pub async fn reconcile(
        &mut self,
        repo: &Repository,
        stats: &mut RunStatistics,
    ) -> Result<ReconciliationResult, ReconcileError> {
        let name = repo.full_name.as_str();
        let provider_error = |source| ReconcileError::Provider {
            repository: name.to_string(),
            source,
        };

        if self.config.exempt_repositories.contains(name) {
            info!("Skipping {} as it is in the exempt repositories list", name);
            return Ok(ReconciliationResult::new(repo, Outcome::SkippedExempt));
        }
        if repo.archived {
            info!("Skipping {} as it is archived", name);
            return Ok(ReconciliationResult::new(repo, Outcome::SkippedArchived));
        }

        let Some(file) = locate_codeowners(self.provider, repo)
            .await
            .map_err(provider_error)?
        else {
            info!("Skipping {} as it does not have a CODEOWNERS file", name);
            stats.record_missing(name);
            return Ok(ReconciliationResult::new(repo, Outcome::SkippedMissing));
        };
        stats.repos_with_codeowners += 1;

        let mut result = ReconciliationResult::new(repo, Outcome::NoOp);
        result.codeowners_path = Some(file.path.clone());

        let parser_config = ParserConfig::new().with_include_teams(self.config.include_teams);
        result.handles_found = parse_handles_with_config(&file.text(), parser_config);
        let individuals: Vec<&str> = result
            .handles_found
            .iter()
            .filter_map(OwnerHandle::individual_name)
            .collect();
        debug!("{}: {} individual owner(s) in {}", name, individuals.len(), file.path);

        let org_name = self
            .config
            .organization
            .as_deref()
            .unwrap_or(repo.owner.as_str());
        let Some(org) = self
            .membership
            .resolve_org(org_name)
            .await
            .map_err(provider_error)?
        else {
            warn!("Owner {} of repo {} is not an organization", org_name, name);
            result.outcome = Outcome::SkippedBadOrg;
            return Ok(result);
        };

        let mut stale = Vec::new();
        for handle in &individuals {
            if self
                .membership
                .is_member(&org, handle)
                .await
                .map_err(provider_error)?
            {
                continue;
            }
            info!(
                "{} is not a member of {}. Suggest removing them from {}",
                handle, org.login, name
            );
            stats.users_to_remove += 1;
            if !stale.iter().any(|s: &String| s.as_str() == *handle) {
                stale.push(handle.to_string());
            }
        }
        stats.record_stale(name, stale.clone());
        result.stale_individuals = stale;

        if result.stale_individuals.is_empty() {
            return Ok(result);
        }
        if self.config.dry_run {
            result.outcome = Outcome::ReportedOnly;
            return Ok(result);
        }

        let updated = remove_handles(&file.content, &result.stale_individuals);
        if updated == file.content {
            warn!("{}: stale handles are not present as @handle tokens, nothing to change", name);
            result.outcome = Outcome::ReportedOnly;
            return Ok(result);
        }
        result.file_changed = true;
        stats.eligible_for_pull_request += 1;

        let change = ChangeRequest {
            path: &file.path,
            file_sha: Some(&file.sha),
            content: &updated,
            commit_message: &self.config.commit_message,
            title: &self.config.title,
            body: &self.config.body,
        };
        match publish_change(self.provider, &mut self.branch_ids, repo, &change).await {
            Ok(pull) => {
                stats.record_pull_request(name, pull.html_url.as_str());
                result.pull_request = Some(pull);
                result.outcome = Outcome::PullRequestCreated;
            }
            Err(e) if e.is_recoverable() => {
                warn!("{}: failed to create pull request: {}", name, e);
                result.outcome = Outcome::SkippedWriteFailed;
            }
            Err(source) => {
                return Err(ReconcileError::Publish {
                    repository: name.to_string(),
                    source,
                });
            }
        }

        Ok(result)
    }
}
