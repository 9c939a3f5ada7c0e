//! Closed enumerations of the module and limit keys the surrounding
//! application ships with.
//!
//! Snapshots remain string-keyed so deployments can introduce new slugs
//! without a crate release; these enums exist to give the common keys a
//! compile-time spelling. Evaluator queries take `impl AsRef<str>`, so an
//! enum value and a dynamic string share one lookup path.

use crate::error::Error;
use std::fmt;

/// Module slugs known to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum KnownModule {
    /// Warehouse management: products, locations, stock movements.
    Warehouse,
    /// Online storefront integration.
    Ecommerce,
    /// Business-to-business sales channel.
    B2b,
    /// Point-of-sale channel.
    Pos,
    /// Manufacturing orders and bills of material.
    Manufacturing,
    /// Reporting and analytics.
    Analytics,
    /// Team and member management.
    Teams,
    /// Document storage and templates.
    Documents,
}

impl KnownModule {
    /// Stable slug used in entitlement rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModule::Warehouse => "warehouse",
            KnownModule::Ecommerce => "ecommerce",
            KnownModule::B2b => "b2b",
            KnownModule::Pos => "pos",
            KnownModule::Manufacturing => "manufacturing",
            KnownModule::Analytics => "analytics",
            KnownModule::Teams => "teams",
            KnownModule::Documents => "documents",
        }
    }
}

impl fmt::Display for KnownModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for KnownModule {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for KnownModule {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Error> {
        match value {
            "warehouse" => Ok(KnownModule::Warehouse),
            "ecommerce" => Ok(KnownModule::Ecommerce),
            "b2b" => Ok(KnownModule::B2b),
            "pos" => Ok(KnownModule::Pos),
            "manufacturing" => Ok(KnownModule::Manufacturing),
            "analytics" => Ok(KnownModule::Analytics),
            "teams" => Ok(KnownModule::Teams),
            "documents" => Ok(KnownModule::Documents),
            other => Err(Error::InvalidId(format!("unknown module slug: {other}"))),
        }
    }
}

/// Limit keys known to the application.
///
/// The dot in each key is part of the name, not a path separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KnownLimit {
    /// Cap on product records per organization.
    #[cfg_attr(feature = "serde", serde(rename = "warehouse.max_products"))]
    WarehouseMaxProducts,
    /// Cap on storage locations per organization.
    #[cfg_attr(feature = "serde", serde(rename = "warehouse.max_locations"))]
    WarehouseMaxLocations,
    /// Cap on organization members.
    #[cfg_attr(feature = "serde", serde(rename = "organization.max_members"))]
    OrganizationMaxMembers,
    /// Cap on branches per organization.
    #[cfg_attr(feature = "serde", serde(rename = "organization.max_branches"))]
    OrganizationMaxBranches,
    /// Metered document exports per calendar month.
    #[cfg_attr(feature = "serde", serde(rename = "documents.monthly_exports"))]
    DocumentsMonthlyExports,
}

impl KnownLimit {
    /// Stable key used in entitlement rows and the limit catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownLimit::WarehouseMaxProducts => "warehouse.max_products",
            KnownLimit::WarehouseMaxLocations => "warehouse.max_locations",
            KnownLimit::OrganizationMaxMembers => "organization.max_members",
            KnownLimit::OrganizationMaxBranches => "organization.max_branches",
            KnownLimit::DocumentsMonthlyExports => "documents.monthly_exports",
        }
    }
}

impl fmt::Display for KnownLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for KnownLimit {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for KnownLimit {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Error> {
        match value {
            "warehouse.max_products" => Ok(KnownLimit::WarehouseMaxProducts),
            "warehouse.max_locations" => Ok(KnownLimit::WarehouseMaxLocations),
            "organization.max_members" => Ok(KnownLimit::OrganizationMaxMembers),
            "organization.max_branches" => Ok(KnownLimit::OrganizationMaxBranches),
            "documents.monthly_exports" => Ok(KnownLimit::DocumentsMonthlyExports),
            other => Err(Error::InvalidLimitKey(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_slugs_round_trip() {
        for module in [
            KnownModule::Warehouse,
            KnownModule::Ecommerce,
            KnownModule::B2b,
            KnownModule::Pos,
            KnownModule::Manufacturing,
            KnownModule::Analytics,
            KnownModule::Teams,
            KnownModule::Documents,
        ] {
            assert_eq!(KnownModule::try_from(module.as_str()).unwrap(), module);
        }
        assert!(KnownModule::try_from("spreadsheets").is_err());
    }

    #[test]
    fn limit_keys_round_trip() {
        for limit in [
            KnownLimit::WarehouseMaxProducts,
            KnownLimit::WarehouseMaxLocations,
            KnownLimit::OrganizationMaxMembers,
            KnownLimit::OrganizationMaxBranches,
            KnownLimit::DocumentsMonthlyExports,
        ] {
            assert_eq!(KnownLimit::try_from(limit.as_str()).unwrap(), limit);
        }
        assert!(KnownLimit::try_from("warehouse.max_widgets").is_err());
    }

    #[test]
    fn enums_work_as_evaluator_keys() {
        use crate::EntitlementEvaluator;
        use crate::snapshot::OrganizationEntitlements;
        use crate::types::{OrganizationId, PlanId};
        use std::sync::Arc;

        let row = OrganizationEntitlements::new(
            OrganizationId::try_from("org_1").unwrap(),
            PlanId::try_from("plan_pro").unwrap(),
            "pro",
        )
        .with_module(KnownModule::Warehouse.as_str())
        .with_limit(KnownLimit::WarehouseMaxProducts.as_str(), -1);

        let eval = EntitlementEvaluator::new(Arc::new(row));
        assert!(eval.has_module(KnownModule::Warehouse));
        assert!(eval.is_unlimited(KnownLimit::WarehouseMaxProducts));
    }
}
