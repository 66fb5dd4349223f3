//! Binary fixed point with 112 fractional bits.
//!
//! A `UQ112x112` value stores `x * 2^112` in the low 224 bits of a `U256`.
//! Encoding a 112-bit reserve and dividing by another 112-bit reserve
//! always fits, which is what makes the pair's price accumulators exact.

use core::fmt;

use primitive_types::U256;

use super::CheckedArithmetic;
use crate::domain::Amount;
use crate::error::AmmError;

const RESOLUTION: u32 = 112;

/// `2^112`, the fixed-point scale.
#[must_use]
pub fn q112() -> U256 {
    U256::from(1u128 << RESOLUTION)
}

/// An unsigned fixed-point number with 112 integer and 112 fractional bits.
///
/// # Examples
///
/// ```
/// use pair_amm::domain::Amount;
/// use pair_amm::math::Uq112x112;
///
/// // Price of 1 unit of token0 in token1 when reserves are (5_000, 10_000).
/// let price = Uq112x112::ratio(Amount::new(10_000), Amount::new(5_000)).expect("valid");
/// assert_eq!(price.mul_decode(Amount::new(7)).expect("fits"), Amount::new(14));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uq112x112(U256);

impl Uq112x112 {
    /// Fixed-point zero.
    pub const ZERO: Self = Self(U256([0; 4]));

    /// Wraps a raw scaled value.
    #[must_use]
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Returns the raw scaled value.
    #[must_use]
    pub const fn raw(&self) -> U256 {
        self.0
    }

    /// Encodes a 112-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if `value` exceeds 112 bits.
    pub fn encode(value: Amount) -> Result<Self, AmmError> {
        let value = value.to_reserve()?;
        Ok(Self(value.widen().safe_mul(&q112())?))
    }

    /// Divides by an integer, truncating.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `divisor` is zero.
    pub fn uqdiv(self, divisor: Amount) -> Result<Self, AmmError> {
        Ok(Self(self.0.safe_div(&divisor.widen())?))
    }

    /// `numerator / denominator` as a fixed-point value.
    ///
    /// # Errors
    ///
    /// Fails like [`encode`](Self::encode) and [`uqdiv`](Self::uqdiv).
    pub fn ratio(numerator: Amount, denominator: Amount) -> Result<Self, AmmError> {
        Self::encode(numerator)?.uqdiv(denominator)
    }

    /// Multiplies by an integer and drops the fractional part.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the product exceeds 256 bits or
    /// the decoded result exceeds 128 bits.
    pub fn mul_decode(self, amount: Amount) -> Result<Amount, AmmError> {
        let scaled = self.0.safe_mul(&amount.widen())?.safe_div(&q112())?;
        Amount::narrow(scaled, "fixed-point decode overflow")
    }

    /// Adds `self * elapsed` to an accumulator, wrapping modulo `2^256`.
    ///
    /// Consumers only ever look at differences between two readings, which
    /// stay correct across a wrap.
    #[must_use]
    pub fn accumulate(self, accumulator: U256, elapsed: u32) -> U256 {
        let (term, _) = self.0.overflowing_mul(U256::from(elapsed));
        let (sum, _) = accumulator.overflowing_add(term);
        sum
    }
}

impl fmt::Display for Uq112x112 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let integer = self.0 / q112();
        write!(f, "{integer}+{}/2^112", self.0 % q112())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::MAX_RESERVE;

    #[test]
    fn encode_scales_by_q112() {
        let Ok(one) = Uq112x112::encode(Amount::new(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(one.raw(), q112());
    }

    #[test]
    fn encode_rejects_wide_values() {
        let Err(AmmError::Overflow(_)) = Uq112x112::encode(Amount::new(MAX_RESERVE + 1)) else {
            panic!("expected Overflow");
        };
    }

    #[test]
    fn largest_ratio_fits_224_bits() {
        let Ok(p) = Uq112x112::ratio(Amount::new(MAX_RESERVE), Amount::new(1)) else {
            panic!("expected Ok");
        };
        assert!(p.raw().bits() <= 224);
    }

    #[test]
    fn uqdiv_by_zero() {
        let Ok(one) = Uq112x112::encode(Amount::new(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(one.uqdiv(Amount::ZERO), Err(AmmError::DivisionByZero));
    }

    #[test]
    fn fractional_prices_decode() {
        // 1/3 * 300 = 99.99.. -> 99
        let Ok(third) = Uq112x112::ratio(Amount::new(1), Amount::new(3)) else {
            panic!("expected Ok");
        };
        assert_eq!(third.mul_decode(Amount::new(300)), Ok(Amount::new(99)));
    }

    #[test]
    fn accumulate_wraps() {
        let Ok(p) = Uq112x112::ratio(Amount::new(MAX_RESERVE), Amount::new(1)) else {
            panic!("expected Ok");
        };
        let near_max = U256::MAX - p.raw() + U256::one();
        // near_max + p == 2^256 == 0 mod 2^256
        assert_eq!(p.accumulate(near_max, 1), U256::zero());
    }
}
