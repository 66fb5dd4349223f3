//! Raw token amount with checked arithmetic.

use core::fmt;

use primitive_types::U256;

use crate::error::AmmError;

/// Largest value a pair reserve may hold (`2^112 - 1`).
pub const MAX_RESERVE: u128 = (1u128 << 112) - 1;

/// A raw token amount in the token's smallest unit.
///
/// All `u128` values are valid amounts.  Pair reserves are narrower:
/// [`Amount::to_reserve`] enforces the 112-bit reserve width.
///
/// Arithmetic methods are checked: they return `None` on overflow,
/// underflow, or division by zero instead of panicking.  Products of two
/// amounts are computed in 256 bits via [`Amount::widen`].
///
/// # Examples
///
/// ```
/// use pair_amm::domain::Amount;
///
/// let a = Amount::new(100);
/// let b = Amount::new(200);
/// assert_eq!(a.checked_add(&b), Some(Amount::new(300)));
/// assert_eq!(b.checked_sub(&a), Some(Amount::new(100)));
/// assert_eq!(b.checked_div(&Amount::new(3)), Some(Amount::new(66)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[must_use]
pub struct Amount(u128);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Maximum representable amount.
    pub const MAX: Self = Self(u128::MAX);

    /// Creates a new `Amount` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the amount is zero.
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

    /// Checked multiplication. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_mul(&self, other: &Self) -> Option<Self> {
        match self.0.checked_mul(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Truncating division.  Returns `None` if `divisor` is zero.
    #[must_use]
    pub const fn checked_div(&self, divisor: &Self) -> Option<Self> {
        match self.0.checked_div(divisor.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Widens to 256 bits for overflow-free products.
    #[must_use]
    pub fn widen(&self) -> U256 {
        U256::from(self.0)
    }

    /// Narrows a 256-bit intermediate back to an `Amount`.
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

    /// Returns `self` if it fits the 112-bit reserve width.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the amount exceeds [`MAX_RESERVE`].
    pub const fn to_reserve(self) -> Result<Self, AmmError> {
        if self.0 > MAX_RESERVE {
            return Err(AmmError::Overflow("reserve exceeds 112 bits"));
        }
        Ok(self)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
