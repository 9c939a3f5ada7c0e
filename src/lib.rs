//! Compiled permission and entitlement snapshot evaluation.
//!
//! This crate implements the read side of a "compile, don't evaluate"
//! authorization model: an external compiler flattens role assignments,
//! deny rules, and subscription state into per-subject permission
//! snapshots and per-organization entitlement rows, and the evaluators
//! here answer queries against those facts with O(1) membership checks.
//! Missing data always reads as denied ([`PermissionSnapshot::empty_shared`],
//! [`EntitlementEvaluator::unloaded`]).
//!
//! # Examples
//!
//! Evaluating a compiled snapshot directly:
//! ```
//! use rs_grants::{PermissionEvaluator, PermissionSnapshot};
//! use std::sync::Arc;
//!
//! let snapshot = PermissionSnapshot::from_slugs([
//!     "warehouse.products.read",
//!     "warehouse.products.edit",
//! ])
//! .unwrap();
//! let evaluator = PermissionEvaluator::new(Arc::new(snapshot));
//! assert!(evaluator.can("warehouse.products.read"));
//! assert!(evaluator.cannot("warehouse.products.delete"));
//! ```
//!
//! Loading snapshots through a store (enable `memory-store`):
//! ```no_run
//! use rs_grants::{LoaderBuilder, OrganizationId, SubjectId};
//! # #[cfg(feature = "memory-store")]
//! # {
//! use rs_grants::MemoryStore;
//! let store = MemoryStore::new();
//! let loader = LoaderBuilder::new(store).build();
//! let organization = OrganizationId::try_from("org_1").unwrap();
//! let subject = SubjectId::try_from("user_1").unwrap();
//! let _ = loader.load(&organization, &subject);
//! # }
//! ```
//!
//! Creating a process-local cache (enable `memory-cache`):
//! ```no_run
//! # #[cfg(feature = "memory-cache")]
//! # {
//! use rs_grants::MemoryCache;
//! use std::time::Duration;
//! let cache = MemoryCache::new(1024).with_ttl(Duration::from_secs(30));
//! # let _ = cache;
//! # }
//! ```
#![forbid(unsafe_code)]

mod cache;
mod entitlements;
mod error;
mod known;
mod label;
mod limits;
mod permission;
mod permissions;
mod session;
mod snapshot;
mod store;
mod types;
#[cfg(feature = "memory-cache")]
mod memory_cache;

#[cfg(feature = "memory-store")]
mod memory_store;

#[cfg(feature = "axum")]
pub mod axum;

pub use crate::cache::{NoCache, SnapshotCache};
pub use crate::entitlements::{EntitlementEvaluator, UNLOADED_PLAN_NAME};
pub use crate::error::{Error, Result, StoreError};
pub use crate::known::{KnownLimit, KnownModule};
pub use crate::label::{NavItem, Translator, resolve_label};
pub use crate::limits::{Filter, FilterValue, LimitCatalog, LimitStrategy, MeterPeriod};
pub use crate::permission::{DefaultPermissionValidator, Permission, PermissionValidator};
pub use crate::permissions::PermissionEvaluator;
pub use crate::session::{Access, Loader, LoaderBuilder};
pub use crate::snapshot::{FeatureValue, OrganizationEntitlements, PermissionSnapshot};
pub use crate::store::{EntitlementStore, PermissionSnapshotStore, SnapshotStore};
pub use crate::types::{OrganizationId, PlanId, SubjectId};

#[cfg(feature = "memory-store")]
pub use crate::memory_store::MemoryStore;

#[cfg(feature = "memory-cache")]
pub use crate::memory_cache::MemoryCache;
