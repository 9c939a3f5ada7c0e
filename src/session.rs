use crate::cache::{NoCache, SnapshotCache};
use crate::entitlements::EntitlementEvaluator;
use crate::error::{Error, Result};
use crate::permission::{DefaultPermissionValidator, PermissionValidator};
use crate::permissions::PermissionEvaluator;
use crate::snapshot::PermissionSnapshot;
use crate::store::SnapshotStore;
use crate::types::{OrganizationId, SubjectId};
use std::sync::Arc;
use tracing::warn;

/// Session-scoped loader for compiled snapshots.
///
/// One loader serves many requests; each [`Loader::load`] call produces an
/// [`Access`] value that owns its snapshots for the lifetime of one
/// request or client session. A permission or plan change is picked up by
/// loading again (after invalidating the cache), never by mutating an
/// existing `Access`. Replacement is a wholesale swap of the snapshot
/// `Arc`s, so concurrent readers see either the old or the new facts in
/// full.
#[derive(Debug)]
pub struct Loader<S, C = NoCache> {
    store: S,
    cache: C,
    validate_slugs: bool,
}

/// Builder for [`Loader`].
pub struct LoaderBuilder<S, C = NoCache> {
    store: S,
    cache: C,
    validate_slugs: bool,
}

impl<S> LoaderBuilder<S, NoCache> {
    /// Creates a new builder with default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: NoCache,
            validate_slugs: false,
        }
    }
}

impl<S, C> LoaderBuilder<S, C> {
    /// Enables or disables slug re-validation on loaded rows.
    ///
    /// When enabled, allow entries that fail the default slug validator
    /// are dropped before the snapshot is handed out. Dropping denies the
    /// slug, so a malformed compiler row degrades restrictively.
    pub fn validate_slugs(mut self, on: bool) -> Self {
        self.validate_slugs = on;
        self
    }

    /// Sets the cache implementation.
    pub fn cache<C2: SnapshotCache>(self, cache: C2) -> LoaderBuilder<S, C2> {
        LoaderBuilder {
            store: self.store,
            cache,
            validate_slugs: self.validate_slugs,
        }
    }

    /// Builds the loader.
    pub fn build(self) -> Loader<S, C> {
        Loader {
            store: self.store,
            cache: self.cache,
            validate_slugs: self.validate_slugs,
        }
    }
}

/// Loaded evaluators for one request or client session.
///
/// Immutable once issued. The permission evaluator and the entitlement
/// evaluator each hold exactly one snapshot; refreshing means calling
/// [`Loader::load`] again and replacing the whole value.
#[derive(Clone, Debug)]
pub struct Access {
    permissions: PermissionEvaluator,
    entitlements: EntitlementEvaluator,
}

impl Access {
    /// Creates an access value from already-built evaluators.
    pub fn new(permissions: PermissionEvaluator, entitlements: EntitlementEvaluator) -> Self {
        Self {
            permissions,
            entitlements,
        }
    }

    /// Creates a fully fail-closed access value.
    ///
    /// Used in place of a loaded value when the session layer could not
    /// reach the store and chooses to degrade instead of erroring.
    pub fn denied() -> Self {
        Self {
            permissions: PermissionEvaluator::empty(),
            entitlements: EntitlementEvaluator::unloaded(),
        }
    }

    /// Returns the permission evaluator.
    pub fn permissions(&self) -> &PermissionEvaluator {
        &self.permissions
    }

    /// Returns the entitlement evaluator.
    pub fn entitlements(&self) -> &EntitlementEvaluator {
        &self.entitlements
    }
}

impl<S, C> Loader<S, C>
where
    S: SnapshotStore,
    C: SnapshotCache,
{
    /// Loads both evaluators for a subject within an organization.
    pub async fn load(&self, organization: &OrganizationId, subject: &SubjectId) -> Result<Access> {
        let permissions = self.load_permissions(organization, subject).await?;
        let entitlements = self.load_entitlements(organization).await?;
        Ok(Access::new(permissions, entitlements))
    }

    /// Loads the permission evaluator for a subject.
    ///
    /// A missing compiled row yields the shared empty snapshot: the
    /// subject is denied everything until the external compiler produces
    /// one.
    pub async fn load_permissions(
        &self,
        organization: &OrganizationId,
        subject: &SubjectId,
    ) -> Result<PermissionEvaluator> {
        if let Some(cached) = self.cache.get_permissions(organization, subject).await {
            return Ok(PermissionEvaluator::new(cached));
        }

        let row = self
            .store
            .permission_snapshot(organization.clone(), subject.clone())
            .await
            .map_err(Error::from)?;

        let Some(snapshot) = row else {
            warn!(
                organization = %organization,
                subject = %subject,
                "no compiled permission snapshot; denying all"
            );
            return Ok(PermissionEvaluator::empty());
        };

        let snapshot = Arc::new(self.sanitize(snapshot, organization, subject));
        self.cache
            .set_permissions(organization, subject, snapshot.clone())
            .await;
        Ok(PermissionEvaluator::new(snapshot))
    }

    /// Loads the entitlement evaluator for an organization.
    ///
    /// A missing compiled row yields the unloaded evaluator: no modules,
    /// zero limits, plan "free".
    pub async fn load_entitlements(
        &self,
        organization: &OrganizationId,
    ) -> Result<EntitlementEvaluator> {
        if let Some(cached) = self.cache.get_entitlements(organization).await {
            return Ok(EntitlementEvaluator::new(cached));
        }

        let row = self
            .store
            .organization_entitlements(organization.clone())
            .await
            .map_err(Error::from)?;

        let Some(entitlements) = row else {
            warn!(
                organization = %organization,
                "no compiled entitlement row; treating organization as free plan"
            );
            return Ok(EntitlementEvaluator::unloaded());
        };

        let entitlements = Arc::new(entitlements);
        self.cache
            .set_entitlements(organization, entitlements.clone())
            .await;
        Ok(EntitlementEvaluator::new(entitlements))
    }

    /// Drops the cached permission snapshot for a subject.
    ///
    /// Call after the external compiler recompiled the subject (role
    /// edit, override change).
    pub async fn invalidate_subject(&self, organization: &OrganizationId, subject: &SubjectId) {
        self.cache.invalidate_subject(organization, subject).await;
    }

    /// Drops every cached entry for an organization.
    ///
    /// Call after a plan or addon change recompiled the organization.
    pub async fn invalidate_organization(&self, organization: &OrganizationId) {
        self.cache.invalidate_organization(organization).await;
    }

    fn sanitize(
        &self,
        mut snapshot: PermissionSnapshot,
        organization: &OrganizationId,
        subject: &SubjectId,
    ) -> PermissionSnapshot {
        if !snapshot.deny.is_empty() {
            // Compiled rows resolve denies into `allow` up front; a
            // populated deny set marks a row from the pre-compiled format.
            warn!(
                organization = %organization,
                subject = %subject,
                deny_len = snapshot.deny.len(),
                "compiled snapshot carries deny entries; ignoring them"
            );
        }
        if self.validate_slugs {
            let before = snapshot.allow.len();
            snapshot.allow.retain(|slug| {
                DefaultPermissionValidator
                    .validate(slug.as_str())
                    .is_ok()
            });
            let dropped = before - snapshot.allow.len();
            if dropped > 0 {
                warn!(
                    organization = %organization,
                    subject = %subject,
                    dropped,
                    "dropped malformed permission slugs from snapshot"
                );
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::permission::Permission;
    use crate::snapshot::OrganizationEntitlements;
    use crate::store::{EntitlementStore, PermissionSnapshotStore};
    use crate::types::PlanId;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TestStore {
        permission_rows: Mutex<HashMap<(OrganizationId, SubjectId), PermissionSnapshot>>,
        entitlement_rows: Mutex<HashMap<OrganizationId, OrganizationEntitlements>>,
        permission_reads: AtomicUsize,
        fail: bool,
    }

    impl TestStore {
        fn put_permissions(&self, org: &str, subject: &str, slugs: &[&str]) {
            let mut guard = self.permission_rows.lock().unwrap();
            guard.insert(
                (
                    OrganizationId::try_from(org).unwrap(),
                    SubjectId::try_from(subject).unwrap(),
                ),
                PermissionSnapshot::from_slugs(slugs).unwrap(),
            );
        }

        fn put_entitlements(&self, org: &str, row: OrganizationEntitlements) {
            let mut guard = self.entitlement_rows.lock().unwrap();
            guard.insert(OrganizationId::try_from(org).unwrap(), row);
        }
    }

    #[async_trait]
    impl PermissionSnapshotStore for TestStore {
        async fn permission_snapshot(
            &self,
            organization: OrganizationId,
            subject: SubjectId,
        ) -> std::result::Result<Option<PermissionSnapshot>, StoreError> {
            if self.fail {
                return Err("store unavailable".into());
            }
            self.permission_reads.fetch_add(1, Ordering::SeqCst);
            let guard = self.permission_rows.lock().unwrap();
            Ok(guard.get(&(organization, subject)).cloned())
        }
    }

    #[async_trait]
    impl EntitlementStore for TestStore {
        async fn organization_entitlements(
            &self,
            organization: OrganizationId,
        ) -> std::result::Result<Option<OrganizationEntitlements>, StoreError> {
            if self.fail {
                return Err("store unavailable".into());
            }
            let guard = self.entitlement_rows.lock().unwrap();
            Ok(guard.get(&organization).cloned())
        }
    }

    fn org() -> OrganizationId {
        OrganizationId::try_from("org_1").unwrap()
    }

    fn subject() -> SubjectId {
        SubjectId::try_from("user_1").unwrap()
    }

    fn pro_row() -> OrganizationEntitlements {
        OrganizationEntitlements::new(org(), PlanId::try_from("plan_pro").unwrap(), "pro")
            .with_module("warehouse")
            .with_limit("warehouse.max_products", -1)
    }

    #[test]
    fn load_should_return_evaluators_backed_by_store_rows() {
        let store = TestStore::default();
        store.put_permissions("org_1", "user_1", &["warehouse.products.read"]);
        store.put_entitlements("org_1", pro_row());

        let loader = LoaderBuilder::new(store).build();
        let access = block_on(loader.load(&org(), &subject())).unwrap();

        assert!(access.permissions().can("warehouse.products.read"));
        assert!(access.permissions().cannot("warehouse.products.delete"));
        assert!(access.entitlements().has_module("warehouse"));
        assert_eq!(access.entitlements().plan_name(), "pro");
    }

    #[test]
    fn missing_permission_row_should_deny_everything() {
        let store = TestStore::default();
        store.put_entitlements("org_1", pro_row());

        let loader = LoaderBuilder::new(store).build();
        let access = block_on(loader.load(&org(), &subject())).unwrap();

        assert!(access.permissions().cannot("warehouse.products.read"));
        assert!(access.permissions().snapshot().allow.is_empty());
    }

    #[test]
    fn missing_entitlement_row_should_read_as_free_plan() {
        let store = TestStore::default();
        store.put_permissions("org_1", "user_1", &["warehouse.products.read"]);

        let loader = LoaderBuilder::new(store).build();
        let access = block_on(loader.load(&org(), &subject())).unwrap();

        assert_eq!(access.entitlements().plan_name(), "free");
        assert!(!access.entitlements().has_module("warehouse"));
        assert_eq!(access.entitlements().limit("warehouse.max_products"), 0);
    }

    #[test]
    fn store_error_should_propagate() {
        let store = TestStore {
            fail: true,
            ..TestStore::default()
        };

        let loader = LoaderBuilder::new(store).build();
        let result = block_on(loader.load(&org(), &subject()));

        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[test]
    fn denied_access_is_fully_fail_closed() {
        let access = Access::denied();

        assert!(access.permissions().cannot("warehouse.products.read"));
        assert_eq!(access.entitlements().plan_name(), "free");
        assert_eq!(access.entitlements().limit("warehouse.max_products"), 0);
    }

    #[test]
    fn validate_slugs_should_drop_malformed_entries() {
        let store = TestStore::default();
        {
            let mut guard = store.permission_rows.lock().unwrap();
            let mut snapshot = PermissionSnapshot::default();
            snapshot
                .allow
                .insert(Permission::from_string("warehouse.products.read".to_string()));
            snapshot
                .allow
                .insert(Permission::from_string("warehouse.*".to_string()));
            guard.insert((org(), subject()), snapshot);
        }

        let loader = LoaderBuilder::new(store).validate_slugs(true).build();
        let access = block_on(loader.load(&org(), &subject())).unwrap();

        assert!(access.permissions().can("warehouse.products.read"));
        assert!(access.permissions().cannot("warehouse.*"));
        assert_eq!(access.permissions().snapshot().allow.len(), 1);
    }

    #[cfg(feature = "memory-cache")]
    #[test]
    fn cache_hit_should_skip_the_store() {
        use crate::memory_cache::MemoryCache;

        let store = TestStore::default();
        store.put_permissions("org_1", "user_1", &["warehouse.products.read"]);
        store.put_entitlements("org_1", pro_row());

        let loader = LoaderBuilder::new(store).cache(MemoryCache::new(16)).build();

        let first = block_on(loader.load(&org(), &subject())).unwrap();
        assert!(first.permissions().can("warehouse.products.read"));
        let reads_after_first = loader.store.permission_reads.load(Ordering::SeqCst);

        let second = block_on(loader.load(&org(), &subject())).unwrap();
        assert!(second.permissions().can("warehouse.products.read"));
        assert_eq!(
            loader.store.permission_reads.load(Ordering::SeqCst),
            reads_after_first
        );
    }

    #[cfg(feature = "memory-cache")]
    #[test]
    fn invalidation_then_reload_swaps_the_whole_snapshot() {
        use crate::memory_cache::MemoryCache;

        let store = TestStore::default();
        store.put_permissions("org_1", "user_1", &["warehouse.products.read"]);
        store.put_entitlements("org_1", pro_row());

        let loader = LoaderBuilder::new(store).cache(MemoryCache::new(16)).build();
        let before = block_on(loader.load(&org(), &subject())).unwrap();
        assert!(before.permissions().can("warehouse.products.read"));
        assert!(before.permissions().cannot("warehouse.products.edit"));

        // The external compiler recompiles the subject and the
        // application invalidates.
        loader
            .store
            .put_permissions("org_1", "user_1", &["warehouse.products.edit"]);
        block_on(loader.invalidate_subject(&org(), &subject()));

        let after = block_on(loader.load(&org(), &subject())).unwrap();
        assert!(after.permissions().can("warehouse.products.edit"));
        assert!(after.permissions().cannot("warehouse.products.read"));

        // The value loaded earlier is untouched by the swap.
        assert!(before.permissions().can("warehouse.products.read"));
    }
}
