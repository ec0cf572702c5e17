//! Cleanowners Core
//!
//! Finds individual owners in GitHub CODEOWNERS files who are no longer
//! members of the owning organization and proposes their removal through a
//! pull request.
//!
//! # Features
//!
//! - **Locator**: Finds the active CODEOWNERS file among the standard paths
//! - **Parser**: Extracts `@user` and `@org/team` handles
//! - **Membership**: Resolves organizations and checks membership, cached per run
//! - **Rewriter**: Removes stale `@handle` tokens without touching anything else
//! - **Publisher**: Creates a branch, commits the change and opens a pull request
//! - **Reconciler**: Runs the whole sequence per repository, honouring dry-run
//!   mode and an exemption list, and accumulates run statistics
//!
//! All provider access goes through the traits in [`provider`], so the engine
//! runs against any implementation (the CLI uses octocrab).
//!
//! # Quick Start
//!
//! ```rust
//! use cleanowners_core::parse::parse_handles;
//! use cleanowners_core::rewrite::remove_handles;
//!
//! let input = "*.rs @rustacean @former-member\n/docs/ @github/docs-team\n";
//!
//! let handles = parse_handles(input);
//! assert_eq!(handles.len(), 2);
//!
//! let updated = remove_handles(input.as_bytes(), &["former-member"]);
//! assert_eq!(updated, b"*.rs @rustacean \n/docs/ @github/docs-team\n");
//! ```
//!
//! # Modules
//!
//! - [`parse`]: Handle extraction
//! - [`provider`]: Provider capability traits and data types
//! - [`locate`]: CODEOWNERS file lookup
//! - [`membership`]: Organization membership resolution
//! - [`rewrite`]: Content rewriting
//! - [`publish`]: Branch, commit and pull request creation
//! - [`reconcile`]: The per-repository state machine and run loop
//! - [`stats`]: Run statistics and summary text

pub mod locate;
pub mod membership;
pub mod parse;
pub mod provider;
pub mod publish;
pub mod reconcile;
pub mod rewrite;
pub mod stats;

#[cfg(test)]
mod testing;

// Re-export commonly used types at the crate root
pub use locate::{CODEOWNERS_PATHS, CodeownersFile, locate_codeowners};
pub use parse::{OwnerHandle, ParserConfig, parse_handles, parse_handles_with_config};
pub use provider::{Provider, ProviderError, Repository};
pub use publish::{BranchIdGenerator, UuidBranchIds};
pub use reconcile::{
    Outcome, ReconcileConfig, ReconcileError, Reconciler, ReconciliationResult,
    RepositorySelection, collect_repositories,
};
pub use stats::RunStatistics;
