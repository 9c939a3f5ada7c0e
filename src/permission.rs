use crate::error::{Error, Result};
use std::borrow::Borrow;
use std::fmt;

/// Permission slug wrapper (`domain.resource.action`).
///
/// Slugs are produced by an external compilation step that has already
/// resolved role hierarchies, deny overrides, and wildcard grants into a
/// flat allow set. Lookups against a snapshot are exact string membership;
/// no case folding or pattern matching happens at evaluation time.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Permission(String);

impl Permission {
    /// Parses and validates a permission slug using the default validator.
    ///
    /// Leading and trailing whitespace is trimmed. The slug itself is kept
    /// verbatim; membership checks are case sensitive.
    pub fn new(value: impl AsRef<str>) -> Result<Self> {
        Self::new_with(value, &DefaultPermissionValidator)
    }

    /// Parses and validates a permission slug with a custom validator.
    pub fn new_with(value: impl AsRef<str>, validator: &dyn PermissionValidator) -> Result<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidPermission(
                "permission must not be empty".to_string(),
            ));
        }
        validator.validate(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    /// Creates a permission from a trusted string without validation.
    pub fn from_string(value: String) -> Self {
        Self(value)
    }

    /// Returns the underlying string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Permission {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::from_string(value)
    }
}

/// Permission validator interface for custom slug rules.
pub trait PermissionValidator: Send + Sync {
    /// Validates a trimmed permission slug.
    fn validate(&self, value: &str) -> Result<()>;
}

/// Default strict slug validator.
///
/// Requires at least three non-empty dotted segments
/// (`domain.resource.action`). Wildcard segments are rejected: a literal
/// `*` reaching this crate means the grant was never compiled.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPermissionValidator;

impl PermissionValidator for DefaultPermissionValidator {
    fn validate(&self, value: &str) -> Result<()> {
        let segments: Vec<&str> = value.split('.').collect();
        if segments.len() < 3 {
            return Err(Error::InvalidPermission(
                "permission must be in domain.resource.action format".to_string(),
            ));
        }
        for segment in segments {
            if segment == "*" {
                return Err(Error::InvalidPermission(
                    "wildcard segments are resolved at compile time and not accepted here"
                        .to_string(),
                ));
            }
            if !is_valid_segment(segment) {
                return Err(Error::InvalidPermission(
                    "segment contains invalid characters".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn is_valid_segment(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    segment
        .chars()
        .all(|ch| matches!(ch, 'a'..='z' | '0'..='9' | '_' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_from_should_trim() {
        let permission = Permission::try_from(" warehouse.products.read ").unwrap();
        assert_eq!(permission.as_str(), "warehouse.products.read");
    }

    #[test]
    fn try_from_should_reject_two_segments() {
        let result = Permission::try_from("warehouse.read");
        assert!(matches!(result, Err(Error::InvalidPermission(_))));
    }

    #[test]
    fn try_from_should_reject_empty_segments() {
        let result = Permission::try_from("warehouse..read");
        assert!(matches!(result, Err(Error::InvalidPermission(_))));
    }

    #[test]
    fn try_from_should_reject_wildcard_segments() {
        let result = Permission::try_from("warehouse.products.*");
        assert!(matches!(result, Err(Error::InvalidPermission(_))));
    }

    #[test]
    fn try_from_should_reject_uppercase() {
        let result = Permission::try_from("Warehouse.Products.Read");
        assert!(matches!(result, Err(Error::InvalidPermission(_))));
    }

    #[test]
    fn deep_slugs_are_accepted() {
        let permission = Permission::try_from("warehouse.stock.movements.create").unwrap();
        assert_eq!(permission.as_str(), "warehouse.stock.movements.create");
    }
}
