//! Pair share units.

use core::fmt;

use primitive_types::U256;

use crate::error::AmmError;

/// A quantity of pair shares (the fungible liquidity token).
///
/// Kept distinct from [`Amount`](super::Amount): shares are claims on the
/// pooled reserves, not balances of either pooled token.
///
/// # Examples
///
/// ```
/// use pair_amm::domain::Liquidity;
///
/// let a = Liquidity::new(1_000);
/// let b = Liquidity::new(2_000);
/// assert_eq!(a.checked_add(&b), Some(Liquidity::new(3_000)));
/// assert_eq!(a.checked_sub(&b), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[must_use]
pub struct Liquidity(u128);

impl Liquidity {
    /// No shares.
    pub const ZERO: Self = Self(0);

    /// Sentinel for an unlimited share allowance.
    pub const MAX: Self = Self(u128::MAX);

    /// Creates a new `Liquidity` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if there are no shares.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Widens to 256 bits.
    #[must_use]
    pub fn widen(&self) -> U256 {
        U256::from(self.0)
    }

    /// Narrows a 256-bit intermediate back to share units.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if `value` does not fit in 128 bits.
    pub fn narrow(value: U256, context: &'static str) -> Result<Self, AmmError> {
        if value > U256::from(u128::MAX) {
            return Err(AmmError::Overflow(context));
        }
        Ok(Self(value.low_u128()))
    }
}

impl fmt::Display for Liquidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants() {
        assert!(Liquidity::ZERO.is_zero());
        assert_eq!(Liquidity::MAX.get(), u128::MAX);
        assert_eq!(Liquidity::default(), Liquidity::ZERO);
    }

    #[test]
    fn checked_ops_report_bounds() {
        assert_eq!(Liquidity::MAX.checked_add(&Liquidity::new(1)), None);
        assert_eq!(
            Liquidity::new(9_000).checked_sub(&Liquidity::new(4_000)),
            Some(Liquidity::new(5_000))
        );
    }

    #[test]
    fn narrow_rejects_wide_values() {
        let wide = Liquidity::MAX.widen() + U256::one();
        assert_eq!(
            Liquidity::narrow(wide, "shares"),
            Err(AmmError::Overflow("shares"))
        );
        assert_eq!(Liquidity::narrow(U256::from(5u8), "shares"), Ok(Liquidity::new(5)));
    }

    #[test]
    fn display() {
        assert_eq!(Liquidity::new(4_000).to_string(), "4000");
    }
}
