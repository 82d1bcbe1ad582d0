//! Product identifiers.
//!
//! Catalog products are keyed by opaque string IDs (e.g. `"880RR"`). The same
//! ID is the merge key for cart line items, so two entries with equal IDs are
//! the same product.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The input is empty or only whitespace.
    #[error("product id cannot be empty")]
    Empty,
}

/// A catalog product identifier.
///
/// Surrounding whitespace is trimmed on parse; the remaining text is kept
/// verbatim (IDs are case-sensitive).
///
/// ## Examples
///
/// ```
/// use sleep_outside_core::ProductId;
///
/// let id = ProductId::parse(" 880RR ").unwrap();
/// assert_eq!(id.as_str(), "880RR");
///
/// assert!(ProductId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Parse a `ProductId` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`ProductIdError::Empty`] if the input is empty after trimming.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ProductIdError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductId {
    type Error = ProductIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id = ProductId::parse("  985PR \n").unwrap();
        assert_eq!(id.as_str(), "985PR");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ProductId::parse(""), Err(ProductIdError::Empty));
        assert_eq!(ProductId::parse(" \t "), Err(ProductIdError::Empty));
    }

    #[test]
    fn test_ids_are_case_sensitive() {
        let upper = ProductId::parse("880RR").unwrap();
        let lower = ProductId::parse("880rr").unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn test_serde_is_plain_string() {
        let id = ProductId::parse("344YJ").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"344YJ\"");

        let parsed: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<ProductId>("\"\"").is_err());
    }
}
