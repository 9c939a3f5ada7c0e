use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::cache::SnapshotCache;
use crate::snapshot::{OrganizationEntitlements, PermissionSnapshot};
use crate::types::{OrganizationId, SubjectId};

/// In-memory cache for loaded snapshots.
///
/// A simple LRU with optional TTL, holding permission snapshots keyed by
/// (organization, subject) and entitlement rows keyed by organization.
/// Intended for tests and small deployments where a process-local cache
/// is sufficient.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    permissions: Arc<Mutex<LruMap<PermissionKey, Arc<PermissionSnapshot>>>>,
    entitlements: Arc<Mutex<LruMap<OrganizationId, Arc<OrganizationEntitlements>>>>,
    capacity: usize,
    ttl: Option<Duration>,
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PermissionKey {
    organization: OrganizationId,
    subject: SubjectId,
}

#[derive(Debug)]
struct LruMap<K, V> {
    entries: HashMap<K, LruEntry<V>>,
    order: VecDeque<K>,
}

#[derive(Debug)]
struct LruEntry<V> {
    value: V,
    updated_at: Instant,
}

impl<K, V> Default for LruMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> LruMap<K, V> {
    fn get(&mut self, key: &K, ttl: Option<Duration>, now: Instant) -> Option<V> {
        if let Some(ttl) = ttl
            && let Some(entry) = self.entries.get(key)
            && is_expired(entry.updated_at, ttl, now)
        {
            self.remove(key);
            return None;
        }

        let value = self.entries.get(key).map(|entry| entry.value.clone());
        if value.is_some() {
            self.touch(key);
        }
        value
    }

    fn set(&mut self, key: K, value: V, capacity: usize, ttl: Option<Duration>, now: Instant) {
        if let Some(ttl) = ttl {
            self.prune_expired(ttl, now);
        }

        self.entries.insert(
            key.clone(),
            LruEntry {
                value,
                updated_at: now,
            },
        );
        self.touch(&key);
        self.evict_if_needed(capacity);
    }

    fn remove(&mut self, key: &K) {
        if self.entries.remove(key).is_some() {
            self.order.retain(|existing| existing != key);
        }
    }

    fn retain_keys(&mut self, keep: impl Fn(&K) -> bool) {
        self.entries.retain(|key, _| keep(key));
        self.order.retain(|key| self.entries.contains_key(key));
    }

    fn touch(&mut self, key: &K) {
        self.order.retain(|existing| existing != key);
        self.order.push_back(key.clone());
    }

    fn prune_expired(&mut self, ttl: Duration, now: Instant) {
        self.entries
            .retain(|_, entry| !is_expired(entry.updated_at, ttl, now));
        self.order.retain(|key| self.entries.contains_key(key));
    }

    fn evict_if_needed(&mut self, capacity: usize) {
        if capacity == 0 {
            self.entries.clear();
            self.order.clear();
            return;
        }

        while self.entries.len() > capacity {
            if let Some(key) = self.order.pop_front() {
                self.entries.remove(&key);
            } else {
                break;
            }
        }
    }
}

fn is_expired(updated_at: Instant, ttl: Duration, now: Instant) -> bool {
    now.saturating_duration_since(updated_at) > ttl
}

impl MemoryCache {
    /// Creates a new cache with the given per-keyspace capacity.
    ///
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            permissions: Arc::new(Mutex::new(LruMap::default())),
            entitlements: Arc::new(Mutex::new(LruMap::default())),
            capacity,
            ttl: None,
        }
    }

    /// Configures a time-to-live for cache entries.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    fn key(organization: &OrganizationId, subject: &SubjectId) -> PermissionKey {
        PermissionKey {
            organization: organization.clone(),
            subject: subject.clone(),
        }
    }
}

#[async_trait]
impl SnapshotCache for MemoryCache {
    async fn get_permissions(
        &self,
        organization: &OrganizationId,
        subject: &SubjectId,
    ) -> Option<Arc<PermissionSnapshot>> {
        if self.capacity == 0 {
            return None;
        }

        let key = Self::key(organization, subject);
        let mut guard = self.permissions.lock().expect("poisoned lock");
        guard.get(&key, self.ttl, Instant::now())
    }

    async fn set_permissions(
        &self,
        organization: &OrganizationId,
        subject: &SubjectId,
        snapshot: Arc<PermissionSnapshot>,
    ) {
        if self.capacity == 0 {
            return;
        }

        let key = Self::key(organization, subject);
        let mut guard = self.permissions.lock().expect("poisoned lock");
        guard.set(key, snapshot, self.capacity, self.ttl, Instant::now());
    }

    async fn get_entitlements(
        &self,
        organization: &OrganizationId,
    ) -> Option<Arc<OrganizationEntitlements>> {
        if self.capacity == 0 {
            return None;
        }

        let mut guard = self.entitlements.lock().expect("poisoned lock");
        guard.get(organization, self.ttl, Instant::now())
    }

    async fn set_entitlements(
        &self,
        organization: &OrganizationId,
        entitlements: Arc<OrganizationEntitlements>,
    ) {
        if self.capacity == 0 {
            return;
        }

        let mut guard = self.entitlements.lock().expect("poisoned lock");
        guard.set(
            organization.clone(),
            entitlements,
            self.capacity,
            self.ttl,
            Instant::now(),
        );
    }

    async fn invalidate_subject(&self, organization: &OrganizationId, subject: &SubjectId) {
        let key = Self::key(organization, subject);
        let mut guard = self.permissions.lock().expect("poisoned lock");
        guard.remove(&key);
    }

    async fn invalidate_organization(&self, organization: &OrganizationId) {
        {
            let mut guard = self.permissions.lock().expect("poisoned lock");
            guard.retain_keys(|key| &key.organization != organization);
        }
        let mut guard = self.entitlements.lock().expect("poisoned lock");
        guard.remove(organization);
    }
}
