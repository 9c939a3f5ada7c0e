//! Static metadata describing how each limit key is enforced.
//!
//! The catalog is configuration, not snapshot data: it maps a limit key to
//! the one strategy a limit checker should use to measure current usage.
//! The checker itself lives with the application's data layer; this crate
//! only defines the vocabulary.

use crate::known::KnownLimit;
use std::collections::HashMap;

/// How a limit's current usage is measured.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum LimitStrategy {
    /// Usage is the row count of `table` under `filters`.
    Derived {
        /// Table whose matching rows are counted.
        table: String,
        /// Conjunctive filter list applied to the count.
        filters: Vec<Filter>,
    },
    /// Usage is an incrementing counter that resets at a period boundary.
    Metered {
        /// Period after which the counter resets.
        period: MeterPeriod,
    },
}

/// One column filter of a derived-count strategy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Filter {
    /// Column name.
    pub column: String,
    /// Comparison operator, e.g. `eq`.
    pub operator: String,
    /// Right-hand side of the comparison.
    pub value: FilterValue,
}

impl Filter {
    /// Creates an equality filter.
    pub fn eq(column: impl Into<String>, value: FilterValue) -> Self {
        Self {
            column: column.into(),
            operator: "eq".to_string(),
            value,
        }
    }
}

/// Right-hand side of a filter: a literal, or a placeholder resolved to
/// the organization being checked.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FilterValue {
    /// Fixed literal value.
    Literal(String),
    /// Substituted with the id of the organization under evaluation.
    CurrentOrganization,
}

/// Reset boundary for metered limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MeterPeriod {
    /// Counter resets at the start of each calendar month.
    Month,
    /// Counter resets at the start of each day.
    Day,
}

/// Registry mapping each limit key to exactly one strategy.
#[derive(Clone, Debug, Default)]
pub struct LimitCatalog {
    strategies: HashMap<String, LimitStrategy>,
}

impl LimitCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog seeded with the application's known limits.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(
            KnownLimit::WarehouseMaxProducts,
            LimitStrategy::Derived {
                table: "products".to_string(),
                filters: vec![Filter::eq("organization_id", FilterValue::CurrentOrganization)],
            },
        );
        catalog.register(
            KnownLimit::WarehouseMaxLocations,
            LimitStrategy::Derived {
                table: "locations".to_string(),
                filters: vec![Filter::eq("organization_id", FilterValue::CurrentOrganization)],
            },
        );
        catalog.register(
            KnownLimit::OrganizationMaxMembers,
            LimitStrategy::Derived {
                table: "organization_members".to_string(),
                filters: vec![
                    Filter::eq("organization_id", FilterValue::CurrentOrganization),
                    Filter::eq("status", FilterValue::Literal("active".to_string())),
                ],
            },
        );
        catalog.register(
            KnownLimit::OrganizationMaxBranches,
            LimitStrategy::Derived {
                table: "branches".to_string(),
                filters: vec![Filter::eq("organization_id", FilterValue::CurrentOrganization)],
            },
        );
        catalog.register(
            KnownLimit::DocumentsMonthlyExports,
            LimitStrategy::Metered {
                period: MeterPeriod::Month,
            },
        );
        catalog
    }

    /// Registers or replaces the strategy for a limit key.
    pub fn register(&mut self, key: impl AsRef<str>, strategy: LimitStrategy) {
        self.strategies
            .insert(key.as_ref().to_string(), strategy);
    }

    /// Looks up the strategy for a limit key.
    pub fn strategy(&self, key: impl AsRef<str>) -> Option<&LimitStrategy> {
        self.strategies.get(key.as_ref())
    }

    /// Iterates over registered (key, strategy) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LimitStrategy)> {
        self.strategies
            .iter()
            .map(|(key, strategy)| (key.as_str(), strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_known_limit() {
        let catalog = LimitCatalog::builtin();
        for limit in [
            KnownLimit::WarehouseMaxProducts,
            KnownLimit::WarehouseMaxLocations,
            KnownLimit::OrganizationMaxMembers,
            KnownLimit::OrganizationMaxBranches,
            KnownLimit::DocumentsMonthlyExports,
        ] {
            assert!(catalog.strategy(limit).is_some(), "missing {limit}");
        }
    }

    #[test]
    fn derived_strategies_scope_to_current_organization() {
        let catalog = LimitCatalog::builtin();
        let Some(LimitStrategy::Derived { table, filters }) =
            catalog.strategy(KnownLimit::WarehouseMaxProducts)
        else {
            panic!("expected derived strategy");
        };

        assert_eq!(table, "products");
        assert!(filters.iter().any(|filter| {
            filter.column == "organization_id" && filter.value == FilterValue::CurrentOrganization
        }));
    }

    #[test]
    fn exports_are_metered_monthly() {
        let catalog = LimitCatalog::builtin();
        assert_eq!(
            catalog.strategy(KnownLimit::DocumentsMonthlyExports),
            Some(&LimitStrategy::Metered {
                period: MeterPeriod::Month
            })
        );
    }

    #[test]
    fn register_replaces_existing_strategy() {
        let mut catalog = LimitCatalog::builtin();
        catalog.register(
            KnownLimit::DocumentsMonthlyExports,
            LimitStrategy::Metered {
                period: MeterPeriod::Day,
            },
        );
        assert_eq!(
            catalog.strategy("documents.monthly_exports"),
            Some(&LimitStrategy::Metered {
                period: MeterPeriod::Day
            })
        );
    }

    #[test]
    fn unknown_keys_have_no_strategy() {
        let catalog = LimitCatalog::builtin();
        assert!(catalog.strategy("warehouse.max_widgets").is_none());
    }
}
