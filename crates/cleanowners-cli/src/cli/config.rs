//! Configuration handling for the CLI.
//!
//! Converts CLI arguments into the library's configuration types, validates
//! them before any repository is touched, and builds the GitHub client.

use crate::cli::Args;
use cleanowners_core::reconcile::{
    DEFAULT_BODY, DEFAULT_COMMIT_MESSAGE, DEFAULT_TITLE, ReconcileConfig, RepositorySelection,
};
use jsonwebtoken::EncodingKey;
use octocrab::Octocrab;
use octocrab::models::{AppId, InstallationId};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use thiserror::Error;

/// Maximum pull request title length.
pub const MAX_TITLE_LEN: usize = 70;
/// Maximum pull request body and commit message length.
pub const MAX_BODY_LEN: usize = 65536;

/// Errors that can occur during configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration.
    #[error("missing required configuration: {0}")]
    MissingRequired(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// GitHub authentication error.
    #[error("GitHub authentication error: {0}")]
    GitHubAuth(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The run completed.
    Success = 0,
    /// Application startup failed (wrong configuration or authentication).
    StartupFailure = 1,
    /// Application terminated by signal (SIGINT/SIGTERM).
    Terminated = 2,
    /// The run stopped on an unexpected GitHub error.
    RunFailed = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// How to authenticate to GitHub.
#[derive(Debug)]
pub enum GithubAuth {
    /// GitHub App installation.
    App {
        /// App ID.
        app_id: u64,
        /// Installation ID.
        installation_id: u64,
        /// PEM private key.
        private_key: SecretString,
    },
    /// Personal access token.
    Token(SecretString),
}

/// Validated and processed configuration for a run.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Repositories to process.
    pub selection: RepositorySelection,
    /// Settings for the reconciler.
    pub reconcile: ReconcileConfig,
    /// GitHub credentials.
    pub auth: GithubAuth,
    /// API base URL for GitHub Enterprise, if any.
    pub base_url: Option<String>,
    /// Markdown report path.
    pub report_path: PathBuf,
    /// Whether to output JSON.
    pub json_output: bool,
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let organization = args
            .organization
            .as_deref()
            .map(str::trim)
            .filter(|org| !org.is_empty())
            .map(str::to_string);

        let repositories = parse_repository_list(args.repository.as_deref().unwrap_or_default())?;

        let selection = match (&organization, repositories.is_empty()) {
            (_, false) => RepositorySelection::List(repositories),
            (Some(org), true) => RepositorySelection::Organization(org.clone()),
            (None, true) => {
                return Err(ConfigError::MissingRequired(
                    "ORGANIZATION or REPOSITORY must be set".to_string(),
                ));
            }
        };

        let auth = github_auth(args)?;

        let exempt: Vec<String> = args
            .exempt_repos
            .iter()
            .flatten()
            .map(|repo| repo.trim())
            .filter(|repo| !repo.is_empty())
            .map(str::to_string)
            .collect();

        let title = text_or_default(args.title.as_deref(), DEFAULT_TITLE, "TITLE", MAX_TITLE_LEN)?;
        let body = text_or_default(args.body.as_deref(), DEFAULT_BODY, "BODY", MAX_BODY_LEN)?;
        let commit_message = text_or_default(
            args.commit_message.as_deref(),
            DEFAULT_COMMIT_MESSAGE,
            "COMMIT_MESSAGE",
            MAX_BODY_LEN,
        )?;

        let mut reconcile = ReconcileConfig::new()
            .with_exempt_repositories(exempt)
            .with_dry_run(parse_dry_run(args.dry_run.as_deref())?)
            .with_pull_request_text(title, body)
            .with_commit_message(commit_message)
            .with_include_teams(args.include_teams);
        if let Some(org) = organization {
            reconcile = reconcile.with_organization(org);
        }

        let base_url = args
            .gh_enterprise_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        Ok(Self {
            selection,
            reconcile,
            auth,
            base_url,
            report_path: args.report_path.clone(),
            json_output: args.json,
        })
    }
}

/// Splits `owner/name` entries, rejecting anything else.
pub fn parse_repository_list(entries: &[String]) -> Result<Vec<(String, String)>, ConfigError> {
    entries
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok((owner.to_string(), name.to_string()))
            }
            _ => Err(ConfigError::Invalid(format!(
                "REPOSITORY entry '{}' must be in the format owner/name",
                entry
            ))),
        })
        .collect()
}

/// Parses the dry-run setting; only `true` and `false` are accepted.
pub fn parse_dry_run(value: Option<&str>) -> Result<bool, ConfigError> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if v.is_empty() || v == "false" => Ok(false),
        Some(v) if v == "true" => Ok(true),
        Some(v) => Err(ConfigError::Invalid(format!(
            "DRY_RUN must be 'true' or 'false', got '{}'",
            v
        ))),
    }
}

fn text_or_default(
    value: Option<&str>,
    default: &str,
    name: &str,
    max_len: usize,
) -> Result<String, ConfigError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(default.to_string()),
        Some(v) if v.chars().count() > max_len => Err(ConfigError::Invalid(format!(
            "{} is too long, max {} characters",
            name, max_len
        ))),
        Some(v) => Ok(v.to_string()),
    }
}

fn github_auth(args: &Args) -> Result<GithubAuth, ConfigError> {
    if let (Some(app_id), Some(installation_id), Some(private_key)) = (
        args.gh_app_id,
        args.gh_app_installation_id,
        args.gh_app_private_key.as_ref(),
    ) {
        return Ok(GithubAuth::App {
            app_id,
            installation_id,
            private_key: SecretString::from(private_key.clone()),
        });
    }

    match args.gh_token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => Ok(GithubAuth::Token(SecretString::from(token.to_string()))),
        None => Err(ConfigError::MissingRequired(
            "GH_TOKEN, or GH_APP_ID with GH_APP_INSTALLATION_ID and GH_APP_PRIVATE_KEY".to_string(),
        )),
    }
}

/// Creates an authenticated Octocrab client.
pub async fn create_octocrab(config: &ValidatedConfig) -> Result<Octocrab, ConfigError> {
    let base_url = config.base_url.as_deref();

    match &config.auth {
        GithubAuth::App {
            app_id,
            installation_id,
            private_key,
        } => {
            let key = EncodingKey::from_rsa_pem(private_key.expose_secret().as_bytes())
                .map_err(|e| ConfigError::GitHubAuth(format!("invalid private key: {}", e)))?;

            let mut app_builder = Octocrab::builder().app(AppId(*app_id), key);
            if let Some(url) = base_url {
                app_builder = app_builder
                    .base_uri(url)
                    .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?;
            }
            let app_client = app_builder.build().map_err(|e| {
                ConfigError::GitHubAuth(format!("failed to create app client: {}", e))
            })?;

            app_client
                .installation(InstallationId(*installation_id))
                .map_err(|e| {
                    ConfigError::GitHubAuth(format!("failed to get installation client: {}", e))
                })
        }
        GithubAuth::Token(token) => {
            let mut builder = Octocrab::builder();
            if let Some(url) = base_url {
                builder = builder
                    .base_uri(url)
                    .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?;
            }
            builder
                .personal_token(token.expose_secret().to_string())
                .build()
                .map_err(|e| ConfigError::GitHubAuth(format!("failed to build client: {}", e)))
        }
    }
}
