//! Locates the CODEOWNERS file of a remote repository.

use crate::provider::{FileSource, ProviderError, Repository};
use log::{debug, trace};

/// Candidate CODEOWNERS locations, highest priority first.
pub const CODEOWNERS_PATHS: [&str; 3] = [".github/CODEOWNERS", "CODEOWNERS", "docs/CODEOWNERS"];

/// The active CODEOWNERS file of a repository, fully decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeownersFile {
    /// Path the file was found at.
    pub path: String,
    /// Size reported by the provider.
    pub size: u64,
    /// Blob SHA, needed to update the file later.
    pub sha: String,
    /// Decoded file body.
    pub content: Vec<u8>,
}

impl CodeownersFile {
    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Finds the CODEOWNERS file in a repository.
///
/// Probes [`CODEOWNERS_PATHS`] in order and returns the first non-empty
/// file. A path that does not exist is treated as absent, whether the
/// provider reports it as `Ok(None)` or as a not-found error. Other
/// provider errors are returned.
///
/// When the provider withholds the inline body (large files), the body is
/// fetched through the blob API by SHA, so callers always receive decoded
/// content.
pub async fn locate_codeowners<S>(
    source: &S,
    repo: &Repository,
) -> Result<Option<CodeownersFile>, ProviderError>
where
    S: FileSource + ?Sized,
{
    for path in CODEOWNERS_PATHS {
        let file = match source.get_file(repo, path).await {
            Ok(Some(file)) => file,
            Ok(None) => {
                trace!("{}: no file at {}", repo.full_name, path);
                continue;
            }
            Err(e) if e.is_not_found() => {
                trace!("{}: {} not found: {}", repo.full_name, path, e);
                continue;
            }
            Err(e) => return Err(e),
        };

        if file.size == 0 {
            trace!("{}: {} is empty", repo.full_name, path);
            continue;
        }

        let content = match file.content {
            Some(content) => content,
            None => {
                debug!(
                    "{}: {} body withheld ({} bytes), reading blob {}",
                    repo.full_name, path, file.size, file.sha
                );
                source.get_blob(repo, &file.sha).await?
            }
        };

        debug!("{}: using {}", repo.full_name, path);
        return Ok(Some(CodeownersFile {
            path: path.to_string(),
            size: file.size,
            sha: file.sha,
            content,
        }));
    }

    Ok(None)
}
