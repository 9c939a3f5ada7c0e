use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::snapshot::{OrganizationEntitlements, PermissionSnapshot};
use crate::store::{EntitlementStore, PermissionSnapshotStore};
use crate::types::{OrganizationId, SubjectId};

/// In-memory snapshot store for tests and demos.
///
/// Stands in for the compiler-backed persistence: rows are replaced
/// wholesale, exactly as the external compiler supersedes a row on each
/// recompilation.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    permission_rows: RwLock<HashMap<(OrganizationId, SubjectId), PermissionSnapshot>>,
    entitlement_rows: RwLock<HashMap<OrganizationId, OrganizationEntitlements>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the compiled permission snapshot for a subject.
    pub fn set_permission_snapshot(
        &self,
        organization: OrganizationId,
        subject: SubjectId,
        snapshot: PermissionSnapshot,
    ) {
        let mut guard = self.inner.permission_rows.write().expect("poisoned lock");
        guard.insert((organization, subject), snapshot);
    }

    /// Removes the compiled permission snapshot for a subject.
    pub fn remove_permission_snapshot(&self, organization: &OrganizationId, subject: &SubjectId) {
        let mut guard = self.inner.permission_rows.write().expect("poisoned lock");
        guard.remove(&(organization.clone(), subject.clone()));
    }

    /// Replaces the compiled entitlement row for its organization.
    pub fn set_entitlements(&self, entitlements: OrganizationEntitlements) {
        let mut guard = self.inner.entitlement_rows.write().expect("poisoned lock");
        guard.insert(entitlements.organization_id.clone(), entitlements);
    }

    /// Removes the compiled entitlement row for an organization.
    pub fn remove_entitlements(&self, organization: &OrganizationId) {
        let mut guard = self.inner.entitlement_rows.write().expect("poisoned lock");
        guard.remove(organization);
    }
}

#[async_trait]
impl PermissionSnapshotStore for MemoryStore {
    async fn permission_snapshot(
        &self,
        organization: OrganizationId,
        subject: SubjectId,
    ) -> std::result::Result<Option<PermissionSnapshot>, crate::StoreError> {
        let guard = self.inner.permission_rows.read().expect("poisoned lock");
        Ok(guard.get(&(organization, subject)).cloned())
    }
}

#[async_trait]
impl EntitlementStore for MemoryStore {
    async fn organization_entitlements(
        &self,
        organization: OrganizationId,
    ) -> std::result::Result<Option<OrganizationEntitlements>, crate::StoreError> {
        let guard = self.inner.entitlement_rows.read().expect("poisoned lock");
        Ok(guard.get(&organization).cloned())
    }
}
