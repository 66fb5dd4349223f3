//! Integer square root.

use primitive_types::U256;

/// Floor square root by the Babylonian method.
///
/// Starting from `y / 2 + 1` the iterate decreases monotonically to
/// `floor(sqrt(y))`; the loop stops at the first non-decreasing step.
///
/// # Examples
///
/// ```
/// use pair_amm::math::isqrt;
/// use primitive_types::U256;
///
/// assert_eq!(isqrt(U256::from(25_000_000u64)), U256::from(5_000u64));
/// assert_eq!(isqrt(U256::from(24u8)), U256::from(4u8));
/// ```
#[must_use]
pub fn isqrt(y: U256) -> U256 {
    let two = U256::from(2u8);
    if y > U256::from(3u8) {
        let mut z = y;
        let mut x = y / two + U256::one();
        while x < z {
            z = x;
            x = (y / x + x) / two;
        }
        z
    } else if y.is_zero() {
        U256::zero()
    } else {
        U256::one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn small_values() {
        let expected = [0u8, 1, 1, 1, 2, 2, 2, 2, 2, 3];
        for (y, want) in expected.iter().enumerate() {
            assert_eq!(isqrt(U256::from(y)), U256::from(*want), "isqrt({y})");
        }
    }

    #[test]
    fn max_value() {
        // floor(sqrt(2^256 - 1)) = 2^128 - 1
        assert_eq!(isqrt(U256::MAX), U256::from(u128::MAX));
    }

    proptest! {
        #[test]
        fn floor_property(y in any::<u128>()) {
            let y = U256::from(y);
            let r = isqrt(y);
            prop_assert!(r * r <= y);
            let next = r + U256::one();
            prop_assert!(next * next > y);
        }
    }
}
