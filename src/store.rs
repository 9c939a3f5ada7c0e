use crate::error::StoreError;
use crate::snapshot::{OrganizationEntitlements, PermissionSnapshot};
use crate::types::{OrganizationId, SubjectId};
use async_trait::async_trait;

/// Store interface for compiled permission snapshots.
///
/// The external compiler persists one row per (organization, subject);
/// this trait only reads the latest row. `Ok(None)` means no row has been
/// compiled yet, which loaders translate into the empty (deny-all)
/// snapshot.
#[async_trait]
pub trait PermissionSnapshotStore {
    /// Returns the latest compiled permission snapshot for a subject.
    async fn permission_snapshot(
        &self,
        organization: OrganizationId,
        subject: SubjectId,
    ) -> std::result::Result<Option<PermissionSnapshot>, StoreError>;
}

/// Store interface for compiled organization entitlements.
#[async_trait]
pub trait EntitlementStore {
    /// Returns the latest compiled entitlement row for an organization.
    async fn organization_entitlements(
        &self,
        organization: OrganizationId,
    ) -> std::result::Result<Option<OrganizationEntitlements>, StoreError>;
}

/// Composite store trait.
pub trait SnapshotStore: PermissionSnapshotStore + EntitlementStore + Send + Sync {}

impl<T> SnapshotStore for T where T: PermissionSnapshotStore + EntitlementStore + Send + Sync {}
