use crate::snapshot::{FeatureValue, OrganizationEntitlements};
use std::sync::Arc;

/// Fallback plan label reported while no entitlement row is loaded.
pub const UNLOADED_PLAN_NAME: &str = "free";

/// Read-side view over an organization's compiled entitlements.
///
/// Mirrors [`PermissionEvaluator`]: synchronous, total, side-effect-free
/// lookups against facts the external compiler derived from plan, addons,
/// and overrides. An evaluator built without a row answers every query
/// with the restrictive default, so an upstream load failure degrades to
/// hidden affordances rather than accidental access.
///
/// This surface feeds UI gating and is advisory; the authoritative check
/// for any action stays server-side at the point of that action.
///
/// [`PermissionEvaluator`]: crate::PermissionEvaluator
#[derive(Clone, Debug, Default)]
pub struct EntitlementEvaluator {
    entitlements: Option<Arc<OrganizationEntitlements>>,
}

impl EntitlementEvaluator {
    /// Creates an evaluator over a loaded entitlement row.
    pub fn new(entitlements: Arc<OrganizationEntitlements>) -> Self {
        Self {
            entitlements: Some(entitlements),
        }
    }

    /// Creates an evaluator with no row loaded.
    ///
    /// Every module check returns false, every limit is 0, and the plan
    /// reports as [`UNLOADED_PLAN_NAME`].
    pub fn unloaded() -> Self {
        Self { entitlements: None }
    }

    /// Returns whether the module slug is enabled.
    pub fn has_module(&self, slug: impl AsRef<str>) -> bool {
        self.entitlements
            .as_deref()
            .is_some_and(|row| row.enabled_modules.contains(slug.as_ref()))
    }

    /// Returns whether the module slug is disabled or unknown.
    pub fn lacks_module(&self, slug: impl AsRef<str>) -> bool {
        !self.has_module(slug)
    }

    /// Returns whether at least one module slug is enabled. Empty input is
    /// false.
    pub fn has_any_module<I>(&self, slugs: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        slugs.into_iter().any(|slug| self.has_module(slug))
    }

    /// Returns whether every module slug is enabled. Empty input is
    /// vacuously true.
    pub fn has_all_modules<I>(&self, slugs: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        slugs.into_iter().all(|slug| self.has_module(slug))
    }

    /// Returns whether the business-context slug is enabled.
    pub fn has_context(&self, slug: impl AsRef<str>) -> bool {
        self.entitlements
            .as_deref()
            .is_some_and(|row| row.enabled_contexts.contains(slug.as_ref()))
    }

    /// Returns whether the feature is stored as the boolean `true`.
    ///
    /// Numeric and textual feature values answer false here on purpose:
    /// the boolean check stays trivial, and typed values are read through
    /// [`EntitlementEvaluator::feature`] instead.
    pub fn has_feature(&self, key: impl AsRef<str>) -> bool {
        matches!(self.feature(key), Some(FeatureValue::Bool(true)))
    }

    /// Returns the raw feature value, if any.
    pub fn feature(&self, key: impl AsRef<str>) -> Option<&FeatureValue> {
        self.entitlements
            .as_deref()
            .and_then(|row| row.features.get(key.as_ref()))
    }

    /// Returns the numeric cap for a limit key.
    ///
    /// An unrecognized key, like an unloaded row, reads as 0 (disallowed),
    /// never as unlimited.
    pub fn limit(&self, key: impl AsRef<str>) -> i64 {
        self.entitlements
            .as_deref()
            .and_then(|row| row.limits.get(key.as_ref()).copied())
            .unwrap_or(0)
    }

    /// Returns whether the limit key maps to the unlimited sentinel `-1`.
    pub fn is_unlimited(&self, key: impl AsRef<str>) -> bool {
        self.limit(key) == -1
    }

    /// Returns the plan name, or [`UNLOADED_PLAN_NAME`] when no row is
    /// loaded.
    pub fn plan_name(&self) -> &str {
        self.entitlements
            .as_deref()
            .map_or(UNLOADED_PLAN_NAME, |row| row.plan_name.as_str())
    }

    /// Returns the underlying entitlement row for diagnostics and for
    /// reading non-boolean feature values.
    pub fn entitlements(&self) -> Option<&OrganizationEntitlements> {
        self.entitlements.as_deref()
    }
}
