use crate::snapshot::PermissionSnapshot;
use std::sync::Arc;

/// Read-side view over a compiled permission snapshot.
///
/// All queries are synchronous, total, and side-effect-free: the policy
/// work (role flattening, deny resolution, wildcard expansion) already
/// happened when the snapshot was compiled, so a check is a single set
/// membership test. The evaluator holds exactly one snapshot for its
/// lifetime; a permission change is observed by constructing a new
/// evaluator around the freshly loaded snapshot.
#[derive(Clone, Debug)]
pub struct PermissionEvaluator {
    snapshot: Arc<PermissionSnapshot>,
}

impl PermissionEvaluator {
    /// Creates an evaluator over a loaded snapshot.
    pub fn new(snapshot: Arc<PermissionSnapshot>) -> Self {
        Self { snapshot }
    }

    /// Creates an evaluator that denies everything.
    ///
    /// Session layers that fail to load a snapshot must hand out this
    /// value instead of skipping permission checks.
    pub fn empty() -> Self {
        Self::new(PermissionSnapshot::empty_shared())
    }

    /// Returns whether the slug is in the allow set.
    ///
    /// The input is compared verbatim; no normalization or case folding.
    pub fn can(&self, permission: impl AsRef<str>) -> bool {
        self.snapshot.is_allowed(permission.as_ref())
    }

    /// Returns whether the slug is absent from the allow set.
    pub fn cannot(&self, permission: impl AsRef<str>) -> bool {
        !self.can(permission)
    }

    /// Returns whether at least one slug is allowed. Empty input is false.
    pub fn can_any<I>(&self, permissions: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        permissions.into_iter().any(|slug| self.can(slug))
    }

    /// Returns whether every slug is allowed. Empty input is vacuously true.
    pub fn can_all<I>(&self, permissions: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        permissions.into_iter().all(|slug| self.can(slug))
    }

    /// Returns the underlying snapshot for diagnostics.
    pub fn snapshot(&self) -> &PermissionSnapshot {
        &self.snapshot
    }
}

impl Default for PermissionEvaluator {
    fn default() -> Self {
        Self::empty()
    }
}
