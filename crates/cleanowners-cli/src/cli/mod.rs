//! CLI module for cleanowners.
//!
//! Command-line argument parsing using Clap. Every option can also be set
//! through an environment variable so the tool can run as a CI job step.

pub mod config;
pub mod github;
pub mod output;

use clap::Parser;
use std::path::PathBuf;

/// Removes former organization members from CODEOWNERS files.
///
/// Scans the repositories of an organization (or an explicit list), finds
/// individual CODEOWNERS entries that are no longer organization members and
/// opens a pull request removing them.
#[derive(Parser, Debug)]
#[command(name = "cleanowners")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Organization whose repositories are scanned and whose membership is checked.
    #[arg(long, env = "ORGANIZATION")]
    pub organization: Option<String>,

    /// Comma-separated list of repositories in 'owner/name' format.
    #[arg(long, env = "REPOSITORY", value_delimiter = ',')]
    pub repository: Option<Vec<String>>,

    /// GitHub personal access token.
    #[arg(long, env = "GH_TOKEN")]
    pub gh_token: Option<String>,

    /// GitHub Enterprise API URL.
    #[arg(long, env = "GH_ENTERPRISE_URL")]
    pub gh_enterprise_url: Option<String>,

    /// GitHub App ID for authentication (alternative to a token).
    #[arg(long, env = "GH_APP_ID")]
    pub gh_app_id: Option<u64>,

    /// GitHub App Installation ID (required when using App authentication).
    #[arg(long, env = "GH_APP_INSTALLATION_ID")]
    pub gh_app_installation_id: Option<u64>,

    /// GitHub App private key in PEM format (required when using App authentication).
    #[arg(long, env = "GH_APP_PRIVATE_KEY", allow_hyphen_values = true)]
    pub gh_app_private_key: Option<String>,

    /// Comma-separated list of repositories ('owner/name') to leave alone.
    #[arg(long, env = "EXEMPT_REPOS", value_delimiter = ',')]
    pub exempt_repos: Option<Vec<String>>,

    /// Report stale owners without opening pull requests ('true' or 'false').
    #[arg(
        long,
        env = "DRY_RUN",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub dry_run: Option<String>,

    /// Pull request title (max 70 characters).
    #[arg(long, env = "TITLE")]
    pub title: Option<String>,

    /// Pull request body.
    #[arg(long, env = "BODY")]
    pub body: Option<String>,

    /// Commit message for the CODEOWNERS change.
    #[arg(long, env = "COMMIT_MESSAGE")]
    pub commit_message: Option<String>,

    /// Also list team handles in debug output.
    #[arg(long, env = "INCLUDE_TEAMS", default_value = "false")]
    pub include_teams: bool,

    /// Where to write the Markdown report.
    #[arg(long, env = "REPORT_PATH", default_value = "report.md")]
    pub report_path: PathBuf,

    /// Print the run statistics as JSON instead of the text summary.
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Increase verbosity level (-v for info, -vv for debug, -vvv for trace).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Returns true if GitHub App authentication is configured.
    pub fn has_github_app_auth(&self) -> bool {
        self.gh_app_id.is_some()
            && self.gh_app_installation_id.is_some()
            && self.gh_app_private_key.is_some()
    }

    /// Returns true if any GitHub authentication is configured.
    pub fn has_github_auth(&self) -> bool {
        self.has_github_app_auth() || self.gh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}
