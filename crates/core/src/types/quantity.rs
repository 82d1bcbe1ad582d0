//! Cart line quantities.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Number of units of one product in the cart.
///
/// Always within [`Quantity::MIN`]..=[`Quantity::MAX`]. Every constructor
/// clamps instead of failing, so arithmetic on quantities can never leave the
/// range.
///
/// ```
/// use sleep_outside_core::Quantity;
///
/// assert_eq!(Quantity::clamped(0).get(), 1);
/// assert_eq!(Quantity::clamped(42).get(), 10);
/// assert_eq!(Quantity::clamped(3).offset(-1).get(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u8);

impl Quantity {
    /// Smallest quantity a line item can hold.
    pub const MIN: Self = Self(1);
    /// Largest quantity a line item can hold.
    pub const MAX: Self = Self(10);

    /// Create a quantity, clamping `value` into the valid range.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let value = value.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0));
        u8::try_from(value).map_or(Self::MIN, Self)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Apply a signed change, clamping the result.
    #[must_use]
    pub fn offset(self, delta: i64) -> Self {
        Self::clamped(i64::from(self.0).saturating_add(delta))
    }

    /// One more unit, up to [`Quantity::MAX`].
    #[must_use]
    pub fn increment(self) -> Self {
        self.offset(1)
    }

    /// Whether another unit can be added.
    #[must_use]
    pub fn can_increase(self) -> bool {
        self < Self::MAX
    }

    /// Whether a unit can be taken away.
    #[must_use]
    pub fn can_decrease(self) -> bool {
        self > Self::MIN
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        Self::from(quantity.0)
    }
}

// Stored quantities may come from older data without range checks.
impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Ok(Self::clamped(value))
    }
}
