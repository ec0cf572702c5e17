//! Organization membership lookups with per-run caching.

use crate::provider::{MembershipSource, Organization, ProviderError};
use log::{debug, trace, warn};
use std::collections::HashMap;

/// Resolves organizations and membership through a [`MembershipSource`].
///
/// Results are cached for the lifetime of the resolver, which is one run:
/// membership is not expected to change mid-run, and the same people tend
/// to own many repositories of one organization.
pub struct MembershipResolver<'a, M: ?Sized> {
    source: &'a M,
    orgs: HashMap<String, Option<Organization>>,
    members: HashMap<(String, String), bool>,
}

impl<'a, M> MembershipResolver<'a, M>
where
    M: MembershipSource + ?Sized,
{
    /// Creates a resolver with empty caches.
    pub fn new(source: &'a M) -> Self {
        Self {
            source,
            orgs: HashMap::new(),
            members: HashMap::new(),
        }
    }

    /// Looks up an organization, returning `None` when it does not exist.
    pub async fn resolve_org(&mut self, name: &str) -> Result<Option<Organization>, ProviderError> {
        if let Some(cached) = self.orgs.get(name) {
            trace!("Organization {} resolved from cache", name);
            return Ok(cached.clone());
        }

        let org = match self.source.get_organization(name).await {
            Ok(org) => org,
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        if org.is_none() {
            warn!("Organization {} not found", name);
        }
        self.orgs.insert(name.to_string(), org.clone());
        Ok(org)
    }

    /// Checks whether `handle` belongs to `org`.
    pub async fn is_member(
        &mut self,
        org: &Organization,
        handle: &str,
    ) -> Result<bool, ProviderError> {
        let key = (org.login.clone(), handle.to_string());
        if let Some(&member) = self.members.get(&key) {
            trace!("Membership of {} in {} from cache", handle, org.login);
            return Ok(member);
        }

        let member = self.source.is_member(org, handle).await?;
        debug!(
            "{} is {}a member of {}",
            handle,
            if member { "" } else { "not " },
            org.login
        );
        self.members.insert(key, member);
        Ok(member)
    }
}

impl<M: ?Sized> std::fmt::Debug for MembershipResolver<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipResolver")
            .field("source", &"<dyn MembershipSource>")
            .field("orgs", &self.orgs.len())
            .field("members", &self.members.len())
            .finish()
    }
}
