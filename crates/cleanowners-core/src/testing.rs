//! In-memory provider used by the unit tests.

use crate::provider::{
    FileCommit, FileContent, FileSource, MembershipSource, NewPullRequest, Organization,
    ProviderError, PublishTarget, PullRequestRef, Repository, RepositorySource,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Which provider call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    GetRef,
    CreateRef,
    WriteFile,
    CreatePull,
}

/// How a failing call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailWith {
    NotFound,
    Api,
}

impl FailWith {
    fn error(self, what: &str) -> ProviderError {
        match self {
            FailWith::NotFound => ProviderError::NotFound(what.to_string()),
            FailWith::Api => ProviderError::Api(what.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommit {
    pub repo: String,
    pub path: String,
    pub branch: String,
    pub message: String,
    pub content: Vec<u8>,
    pub sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPull {
    pub repo: String,
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

#[derive(Default)]
pub struct FakeProvider {
    org_repos: HashMap<String, Vec<Repository>>,
    files: HashMap<(String, String), FileContent>,
    file_errors: HashMap<(String, String), FailWith>,
    blobs: HashMap<(String, String), Vec<u8>>,
    members: HashMap<String, HashSet<String>>,
    refs: HashMap<(String, String), String>,
    fail: Option<(FailAt, FailWith)>,
    calls: Mutex<Vec<String>>,
    refs_created: Mutex<Vec<(String, String, String)>>,
    commits: Mutex<Vec<RecordedCommit>>,
    pulls: Mutex<Vec<RecordedPull>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_org(mut self, org: &str, members: &[&str]) -> Self {
        self.members.insert(
            org.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn with_org_repo(mut self, org: &str, repo: Repository) -> Self {
        self.org_repos.entry(org.to_string()).or_default().push(repo);
        self
    }

    pub fn with_file(mut self, repo: &str, path: &str, content: &str) -> Self {
        self.files.insert(
            (repo.to_string(), path.to_string()),
            FileContent {
                path: path.to_string(),
                size: content.len() as u64,
                sha: format!("sha-{}", path),
                content: Some(content.as_bytes().to_vec()),
            },
        );
        self
    }

    /// Registers a file whose body is only reachable through the blob API.
    pub fn with_large_file(mut self, repo: &str, path: &str, content: &str) -> Self {
        let sha = format!("blob-{}", path);
        self.files.insert(
            (repo.to_string(), path.to_string()),
            FileContent {
                path: path.to_string(),
                size: content.len() as u64,
                sha: sha.clone(),
                content: None,
            },
        );
        self.blobs
            .insert((repo.to_string(), sha), content.as_bytes().to_vec());
        self
    }

    pub fn with_file_error(mut self, repo: &str, path: &str, fail: FailWith) -> Self {
        self.file_errors
            .insert((repo.to_string(), path.to_string()), fail);
        self
    }

    pub fn with_branch(mut self, repo: &str, branch: &str, sha: &str) -> Self {
        self.refs
            .insert((repo.to_string(), branch.to_string()), sha.to_string());
        self
    }

    pub fn failing(mut self, at: FailAt, with: FailWith) -> Self {
        self.fail = Some((at, with));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn refs_created(&self) -> Vec<(String, String, String)> {
        self.refs_created.lock().unwrap().clone()
    }

    pub fn commits(&self) -> Vec<RecordedCommit> {
        self.commits.lock().unwrap().clone()
    }

    pub fn pulls(&self) -> Vec<RecordedPull> {
        self.pulls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, at: FailAt) -> Result<(), ProviderError> {
        match self.fail {
            Some((fail_at, with)) if fail_at == at => Err(with.error(&format!("{:?}", at))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl RepositorySource for FakeProvider {
    async fn list_repositories(&self, org: &str) -> Result<Vec<Repository>, ProviderError> {
        self.record(format!("list_repositories {}", org));
        self.org_repos
            .get(org)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(org.to_string()))
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ProviderError> {
        self.record(format!("get_repository {}/{}", owner, name));
        self.org_repos
            .values()
            .flatten()
            .find(|r| r.owner == owner && r.name == name)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("{}/{}", owner, name)))
    }
}

#[async_trait]
impl FileSource for FakeProvider {
    async fn get_file(
        &self,
        repo: &Repository,
        path: &str,
    ) -> Result<Option<FileContent>, ProviderError> {
        self.record(format!("get_file {} {}", repo.full_name, path));
        let key = (repo.full_name.clone(), path.to_string());
        if let Some(fail) = self.file_errors.get(&key) {
            return Err(fail.error(path));
        }
        Ok(self.files.get(&key).cloned())
    }

    async fn get_blob(&self, repo: &Repository, sha: &str) -> Result<Vec<u8>, ProviderError> {
        self.record(format!("get_blob {} {}", repo.full_name, sha));
        self.blobs
            .get(&(repo.full_name.clone(), sha.to_string()))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(sha.to_string()))
    }
}

#[async_trait]
impl MembershipSource for FakeProvider {
    async fn get_organization(&self, name: &str) -> Result<Option<Organization>, ProviderError> {
        self.record(format!("get_organization {}", name));
        Ok(self.members.contains_key(name).then(|| Organization {
            login: name.to_string(),
        }))
    }

    async fn is_member(&self, org: &Organization, handle: &str) -> Result<bool, ProviderError> {
        self.record(format!("is_member {} {}", org.login, handle));
        Ok(self
            .members
            .get(&org.login)
            .is_some_and(|members| members.contains(handle)))
    }
}

#[async_trait]
impl PublishTarget for FakeProvider {
    async fn get_ref(&self, repo: &Repository, branch: &str) -> Result<String, ProviderError> {
        self.record(format!("get_ref {} heads/{}", repo.full_name, branch));
        self.check(FailAt::GetRef)?;
        self.refs
            .get(&(repo.full_name.clone(), branch.to_string()))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("heads/{}", branch)))
    }

    async fn create_ref(
        &self,
        repo: &Repository,
        branch: &str,
        sha: &str,
    ) -> Result<(), ProviderError> {
        self.record(format!("create_ref {} refs/heads/{}", repo.full_name, branch));
        self.check(FailAt::CreateRef)?;
        self.refs_created.lock().unwrap().push((
            repo.full_name.clone(),
            format!("refs/heads/{}", branch),
            sha.to_string(),
        ));
        Ok(())
    }

    async fn update_file(
        &self,
        repo: &Repository,
        commit: &FileCommit<'_>,
        sha: &str,
    ) -> Result<(), ProviderError> {
        self.record(format!("update_file {} {}", repo.full_name, commit.path));
        self.check(FailAt::WriteFile)?;
        self.commits.lock().unwrap().push(RecordedCommit {
            repo: repo.full_name.clone(),
            path: commit.path.to_string(),
            branch: commit.branch.to_string(),
            message: commit.message.to_string(),
            content: commit.content.to_vec(),
            sha: Some(sha.to_string()),
        });
        Ok(())
    }

    async fn create_file(
        &self,
        repo: &Repository,
        commit: &FileCommit<'_>,
    ) -> Result<(), ProviderError> {
        self.record(format!("create_file {} {}", repo.full_name, commit.path));
        self.check(FailAt::WriteFile)?;
        self.commits.lock().unwrap().push(RecordedCommit {
            repo: repo.full_name.clone(),
            path: commit.path.to_string(),
            branch: commit.branch.to_string(),
            message: commit.message.to_string(),
            content: commit.content.to_vec(),
            sha: None,
        });
        Ok(())
    }

    async fn create_pull_request(
        &self,
        repo: &Repository,
        pull: &NewPullRequest<'_>,
    ) -> Result<PullRequestRef, ProviderError> {
        self.record(format!("create_pull_request {}", repo.full_name));
        self.check(FailAt::CreatePull)?;
        let mut pulls = self.pulls.lock().unwrap();
        pulls.push(RecordedPull {
            repo: repo.full_name.clone(),
            title: pull.title.to_string(),
            body: pull.body.to_string(),
            head: pull.head.to_string(),
            base: pull.base.to_string(),
        });
        let number = pulls.len() as u64;
        Ok(PullRequestRef {
            number,
            html_url: format!("https://github.com/{}/pull/{}", repo.full_name, number),
        })
    }
}
