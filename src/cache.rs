use crate::snapshot::{OrganizationEntitlements, PermissionSnapshot};
use crate::types::{OrganizationId, SubjectId};
use async_trait::async_trait;
use std::sync::Arc;

/// Cache interface for loaded snapshots.
///
/// Entries hold the same `Arc`s the loader hands to evaluators, so a hit
/// costs one clone. Invalidation is the application's responsibility and
/// should follow every external recompilation (role edit, plan change).
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// Gets the cached permission snapshot for a (organization, subject)
    /// pair.
    async fn get_permissions(
        &self,
        organization: &OrganizationId,
        subject: &SubjectId,
    ) -> Option<Arc<PermissionSnapshot>>;

    /// Sets the cached permission snapshot for a (organization, subject)
    /// pair.
    async fn set_permissions(
        &self,
        organization: &OrganizationId,
        subject: &SubjectId,
        snapshot: Arc<PermissionSnapshot>,
    );

    /// Gets the cached entitlement row for an organization.
    async fn get_entitlements(
        &self,
        organization: &OrganizationId,
    ) -> Option<Arc<OrganizationEntitlements>>;

    /// Sets the cached entitlement row for an organization.
    async fn set_entitlements(
        &self,
        organization: &OrganizationId,
        entitlements: Arc<OrganizationEntitlements>,
    );

    /// Invalidates the cached permission snapshot for a subject.
    async fn invalidate_subject(&self, organization: &OrganizationId, subject: &SubjectId);

    /// Invalidates every entry belonging to an organization.
    async fn invalidate_organization(&self, organization: &OrganizationId);
}

/// No-op cache implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl SnapshotCache for NoCache {
    async fn get_permissions(
        &self,
        _organization: &OrganizationId,
        _subject: &SubjectId,
    ) -> Option<Arc<PermissionSnapshot>> {
        None
    }

    async fn set_permissions(
        &self,
        _organization: &OrganizationId,
        _subject: &SubjectId,
        _snapshot: Arc<PermissionSnapshot>,
    ) {
    }

    async fn get_entitlements(
        &self,
        _organization: &OrganizationId,
    ) -> Option<Arc<OrganizationEntitlements>> {
        None
    }

    async fn set_entitlements(
        &self,
        _organization: &OrganizationId,
        _entitlements: Arc<OrganizationEntitlements>,
    ) {
    }

    async fn invalidate_subject(&self, _organization: &OrganizationId, _subject: &SubjectId) {}

    async fn invalidate_organization(&self, _organization: &OrganizationId) {}
}
