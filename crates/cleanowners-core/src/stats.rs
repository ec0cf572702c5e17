//! Run statistics and the end-of-run summary.

use serde::Serialize;

/// Stale handles found in one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoUsers {
    /// Repository full name.
    pub repository: String,
    /// Handles to remove, first-seen order, no duplicates.
    pub users: Vec<String>,
}

/// A pull request opened during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoPullRequest {
    /// Repository full name.
    pub repository: String,
    /// Browser URL of the pull request.
    pub html_url: String,
}

/// Counters accumulated across one run.
///
/// Created at run start, updated once per processed repository and read at
/// the end for the summary and the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStatistics {
    /// Stale handle occurrences found.
    pub users_to_remove: usize,
    /// Pull requests opened.
    pub pull_requests_created: usize,
    /// Repositories where a pull request was attempted.
    pub eligible_for_pull_request: usize,
    /// Repositories without a non-empty CODEOWNERS file.
    pub repos_without_codeowners: usize,
    /// Repositories with a CODEOWNERS file.
    pub repos_with_codeowners: usize,
    /// Names of the repositories counted in `repos_without_codeowners`.
    pub repos_missing_codeowners: Vec<String>,
    /// Stale handles per repository, in processing order.
    pub users_by_repo: Vec<RepoUsers>,
    /// Pull requests opened, in processing order.
    pub pull_requests: Vec<RepoPullRequest>,
}

impl RunStatistics {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a repository without a CODEOWNERS file.
    pub fn record_missing(&mut self, repository: impl Into<String>) {
        self.repos_without_codeowners += 1;
        self.repos_missing_codeowners.push(repository.into());
    }

    /// Records the stale handles of a repository. Empty lists are dropped.
    pub fn record_stale(&mut self, repository: impl Into<String>, users: Vec<String>) {
        if users.is_empty() {
            return;
        }
        self.users_by_repo.push(RepoUsers {
            repository: repository.into(),
            users,
        });
    }

    /// Records an opened pull request.
    pub fn record_pull_request(&mut self, repository: impl Into<String>, html_url: impl Into<String>) {
        self.pull_requests_created += 1;
        self.pull_requests.push(RepoPullRequest {
            repository: repository.into(),
            html_url: html_url.into(),
        });
    }

    /// Percentage of eligible repositories that got a pull request.
    pub fn pull_request_rate(&self) -> Option<f64> {
        percent(self.pull_requests_created, self.eligible_for_pull_request)
    }

    /// Percentage of processed repositories that had a CODEOWNERS file.
    pub fn codeowners_rate(&self) -> Option<f64> {
        percent(
            self.repos_with_codeowners,
            self.repos_with_codeowners + self.repos_without_codeowners,
        )
    }

    /// Renders the human-readable summary, one sentence per line.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Found {} users to remove", self.users_to_remove),
            format!("Created {} pull requests successfully", self.pull_requests_created),
            format!(
                "Skipped {} repositories without a CODEOWNERS file",
                self.repos_without_codeowners
            ),
            format!(
                "Processed {} repositories with a CODEOWNERS file",
                self.repos_with_codeowners
            ),
        ];

        lines.push(match self.pull_request_rate() {
            Some(rate) => format!(
                "{}% of eligible repositories had pull requests created",
                format_percent(rate)
            ),
            None => "No pull requests were needed".to_string(),
        });

        lines.push(match self.codeowners_rate() {
            Some(rate) => format!(
                "{}% of repositories had CODEOWNERS files",
                format_percent(rate)
            ),
            None => "No repositories were processed".to_string(),
        });

        lines
    }
}

fn percent(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64 * 100.0)
}

/// Rounds to two decimals, always keeping one fractional digit (`50.0`).
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{:?}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunStatistics {
        RunStatistics {
            users_to_remove: 4,
            pull_requests_created: 5,
            eligible_for_pull_request: 10,
            repos_without_codeowners: 2,
            repos_with_codeowners: 3,
            ..RunStatistics::default()
        }
    }

    #[test]
    fn summary_percentages() {
        let lines = sample().summary_lines();
        assert_eq!(lines[0], "Found 4 users to remove");
        assert_eq!(lines[1], "Created 5 pull requests successfully");
        assert_eq!(lines[2], "Skipped 2 repositories without a CODEOWNERS file");
        assert_eq!(lines[3], "Processed 3 repositories with a CODEOWNERS file");
        assert_eq!(lines[4], "50.0% of eligible repositories had pull requests created");
        assert_eq!(lines[5], "60.0% of repositories had CODEOWNERS files");
    }

    #[test]
    fn no_eligible_repositories() {
        let stats = RunStatistics {
            eligible_for_pull_request: 0,
            ..sample()
        };
        let lines = stats.summary_lines();
        assert_eq!(lines[4], "No pull requests were needed");
    }

    #[test]
    fn nothing_processed() {
        let lines = RunStatistics::new().summary_lines();
        assert_eq!(lines[5], "No repositories were processed");
    }

    #[test]
    fn format_percent_rounds_to_two_places() {
        assert_eq!(format_percent(100.0 / 3.0), "33.33");
        assert_eq!(format_percent(200.0 / 3.0), "66.67");
        assert_eq!(format_percent(100.0), "100.0");
    }

    #[test]
    fn record_helpers() {
        let mut stats = RunStatistics::new();
        stats.record_missing("org/a");
        stats.record_stale("org/b", vec!["alice".to_string()]);
        stats.record_stale("org/c", Vec::new());
        stats.record_pull_request("org/b", "https://github.com/org/b/pull/1");

        assert_eq!(stats.repos_without_codeowners, 1);
        assert_eq!(stats.repos_missing_codeowners, vec!["org/a"]);
        assert_eq!(stats.users_by_repo.len(), 1);
        assert_eq!(stats.users_by_repo[0].repository, "org/b");
        assert_eq!(stats.pull_requests_created, 1);
    }
}
