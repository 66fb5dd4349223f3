//! Basis-point representation for fee rates.

use core::fmt;

use primitive_types::U256;

/// Number of basis points in one whole (100%).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// A rate expressed in basis points (1 bp = 0.01%, 10 000 bp = 100%).
///
/// Values above 10 000 are representable but meaningless as a fee rate;
/// [`is_valid_percent`](Self::is_valid_percent) reports whether the value
/// lies in range.
///
/// # Examples
///
/// ```
/// use pair_amm::domain::BasisPoints;
///
/// let bp = BasisPoints::new(30);
/// assert!(bp.is_valid_percent());
/// assert_eq!(bp.complement(), Some(BasisPoints::new(9_970)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BasisPoints(u32);

impl BasisPoints {
    /// Zero basis points (0%).
    pub const ZERO: Self = Self(0);

    /// 100% expressed in basis points.
    pub const MAX_PERCENT: Self = Self(BPS_DENOMINATOR);

    /// Creates a new `BasisPoints` from a raw `u32` value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the underlying `u32` value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the value is in `0..=10_000`.
    #[must_use]
    pub const fn is_valid_percent(&self) -> bool {
        self.0 <= BPS_DENOMINATOR
    }

    /// The share of an amount that is *kept* at this rate: `10_000 - self`.
    ///
    /// Returns `None` when the value exceeds 100%.
    #[must_use]
    pub const fn complement(&self) -> Option<Self> {
        match BPS_DENOMINATOR.checked_sub(self.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Widens to 256 bits for use in fee-scaled products.
    #[must_use]
    pub fn widen(&self) -> U256 {
        U256::from(self.0)
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants() {
        assert_eq!(BasisPoints::ZERO.get(), 0);
        assert_eq!(BasisPoints::MAX_PERCENT.get(), 10_000);
        assert_eq!(BasisPoints::default(), BasisPoints::ZERO);
    }

    #[test]
    fn valid_percent_range() {
        assert!(BasisPoints::MAX_PERCENT.is_valid_percent());
        assert!(!BasisPoints::new(10_001).is_valid_percent());
    }

    #[test]
    fn complement_of_fee() {
        assert_eq!(BasisPoints::new(30).complement(), Some(BasisPoints::new(9_970)));
        assert_eq!(BasisPoints::ZERO.complement(), Some(BasisPoints::MAX_PERCENT));
        assert_eq!(BasisPoints::new(10_001).complement(), None);
    }

    #[test]
    fn widen_matches_value() {
        assert_eq!(BasisPoints::new(30).widen(), U256::from(30u32));
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", BasisPoints::new(30)), "30bp");
    }
}
