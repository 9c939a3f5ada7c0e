use crate::error::Result;
use crate::permission::Permission;
use crate::types::{OrganizationId, PlanId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

/// Compiled permission facts for one subject within one organization.
///
/// Produced by an external compiler whenever the subject's roles, overrides,
/// or scope change. The row is immutable once issued: updates arrive as a
/// brand-new snapshot that the owning session layer swaps in wholesale.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PermissionSnapshot {
    /// Allowed permission slugs. Membership here is the sole source of
    /// truth; absence means denied.
    pub allow: HashSet<Permission>,
    /// Retained for schema compatibility with the pre-compiled row format.
    /// The compiler applies deny resolution before producing `allow`, so
    /// this set is always empty in compiled rows.
    #[cfg_attr(feature = "serde", serde(default))]
    pub deny: HashSet<Permission>,
}

static EMPTY_SNAPSHOT: OnceLock<Arc<PermissionSnapshot>> = OnceLock::new();

impl PermissionSnapshot {
    /// Creates a snapshot from an allow set.
    pub fn new(allow: HashSet<Permission>) -> Self {
        Self {
            allow,
            deny: HashSet::new(),
        }
    }

    /// Creates a snapshot from raw slugs, validating each one.
    pub fn from_slugs<I>(slugs: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut allow = HashSet::new();
        for slug in slugs {
            allow.insert(Permission::new(slug)?);
        }
        Ok(Self::new(allow))
    }

    /// Returns the shared empty snapshot.
    ///
    /// Every loader path that finds no compiled row for a subject must hand
    /// out this value so that "missing" is indistinguishable from
    /// "everything denied".
    pub fn empty_shared() -> Arc<Self> {
        EMPTY_SNAPSHOT
            .get_or_init(|| Arc::new(Self::default()))
            .clone()
    }

    /// Returns whether the slug is a member of the allow set.
    pub fn is_allowed(&self, slug: &str) -> bool {
        self.allow.contains(slug)
    }
}

/// Value of a single entitlement feature flag.
///
/// Boolean checks through [`EntitlementEvaluator::has_feature`] only
/// recognize `Bool(true)`; numeric and textual values must be read through
/// the raw accessor.
///
/// [`EntitlementEvaluator::has_feature`]: crate::EntitlementEvaluator::has_feature
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FeatureValue {
    /// On/off flag.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Free-form textual value.
    Text(String),
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Compiled entitlement facts for one organization.
///
/// Derived by the external compiler from the subscription plan plus addons
/// plus manual overrides. Limit keys are flat strings; the dot in
/// `warehouse.max_products` is a naming convention, not a path separator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrganizationEntitlements {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Current subscription plan identity.
    pub plan_id: PlanId,
    /// Human-readable plan name.
    pub plan_name: String,
    /// Module slugs enabled for the organization.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enabled_modules: HashSet<String>,
    /// Business-context slugs enabled for the organization.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enabled_contexts: HashSet<String>,
    /// Feature flags keyed by feature name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub features: HashMap<String, FeatureValue>,
    /// Numeric caps keyed by limit name. `-1` means unlimited, `0` means
    /// disallowed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub limits: HashMap<String, i64>,
    /// Unix timestamp (seconds) of the last compilation.
    #[cfg_attr(feature = "serde", serde(default))]
    pub updated_at: i64,
}

impl OrganizationEntitlements {
    /// Creates an entitlement row with empty modules, features, and limits.
    pub fn new(
        organization_id: OrganizationId,
        plan_id: PlanId,
        plan_name: impl Into<String>,
    ) -> Self {
        Self {
            organization_id,
            plan_id,
            plan_name: plan_name.into(),
            enabled_modules: HashSet::new(),
            enabled_contexts: HashSet::new(),
            features: HashMap::new(),
            limits: HashMap::new(),
            updated_at: 0,
        }
    }

    /// Adds an enabled module slug.
    pub fn with_module(mut self, slug: impl Into<String>) -> Self {
        self.enabled_modules.insert(slug.into());
        self
    }

    /// Adds an enabled business-context slug.
    pub fn with_context(mut self, slug: impl Into<String>) -> Self {
        self.enabled_contexts.insert(slug.into());
        self
    }

    /// Sets a feature value.
    pub fn with_feature(mut self, key: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.features.insert(key.into(), value.into());
        self
    }

    /// Sets a numeric limit.
    pub fn with_limit(mut self, key: impl Into<String>, cap: i64) -> Self {
        self.limits.insert(key.into(), cap);
        self
    }
}
