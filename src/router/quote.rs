//! Pure pricing helpers.
//!
//! These functions read nothing but their arguments, so they can be used
//! to preview an operation before submitting it.  Fee-aware helpers come
//! in two flavors: the plain ones assume the default 30 bp tier, the
//! `_with_fee` ones take the pair's [`FeeTier`].

use crate::domain::{Address, Amount, FeeTier, TokenPair};
use crate::error::AmmError;
use crate::factory::pair_address;
use crate::math::{mul_div, CheckedArithmetic};

/// `amount_a` of one token, valued in the other at the reserve ratio.
///
/// # Errors
///
/// - [`AmmError::InsufficientAmount`] if `amount_a` is zero.
/// - [`AmmError::InsufficientLiquidity`] if either reserve is zero.
///
/// # Examples
///
/// ```
/// use pair_amm::domain::Amount;
/// use pair_amm::router::quote;
///
/// let b = quote(Amount::new(100), Amount::new(1_000), Amount::new(4_000)).expect("quote");
/// assert_eq!(b, Amount::new(400));
/// ```
pub fn quote(amount_a: Amount, reserve_a: Amount, reserve_b: Amount) -> Result<Amount, AmmError> {
    if amount_a.is_zero() {
        return Err(AmmError::InsufficientAmount);
    }
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    Amount::narrow(
        mul_div(amount_a.widen(), reserve_b.widen(), reserve_a.widen())?,
        "quote overflow",
    )
}

/// Largest output a swap of `amount_in` can take at the default fee.
///
/// # Errors
///
/// See [`get_amount_out_with_fee`].
pub fn get_amount_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
) -> Result<Amount, AmmError> {
    get_amount_out_with_fee(amount_in, reserve_in, reserve_out, FeeTier::default())
}

/// Largest output a swap of `amount_in` can take:
/// `in * (10_000 - f) * r_out / (r_in * 10_000 + in * (10_000 - f))`.
///
/// # Errors
///
/// - [`AmmError::InsufficientInputAmount`] if `amount_in` is zero.
/// - [`AmmError::InsufficientLiquidity`] if either reserve is zero.
///
/// # Examples
///
/// ```
/// use pair_amm::domain::Amount;
/// use pair_amm::router::get_amount_out;
///
/// let out = get_amount_out(Amount::new(1_000), Amount::new(10_000), Amount::new(10_000))
///     .expect("quote");
/// assert_eq!(out, Amount::new(906));
/// ```
pub fn get_amount_out_with_fee(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee: FeeTier,
) -> Result<Amount, AmmError> {
    if amount_in.is_zero() {
        return Err(AmmError::InsufficientInputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    let in_with_fee = amount_in.widen().safe_mul(&fee.retained_weight()?)?;
    let numerator = in_with_fee.safe_mul(&reserve_out.widen())?;
    let denominator = reserve_in
        .widen()
        .safe_mul(&FeeTier::denominator())?
        .safe_add(&in_with_fee)?;
    Amount::narrow(numerator.safe_div(&denominator)?, "amount out overflow")
}

/// Smallest input that buys `amount_out` at the default fee.
///
/// # Errors
///
/// See [`get_amount_in_with_fee`].
pub fn get_amount_in(
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
) -> Result<Amount, AmmError> {
    get_amount_in_with_fee(amount_out, reserve_in, reserve_out, FeeTier::default())
}

/// Smallest input that buys `amount_out`:
/// `r_in * out * 10_000 / ((r_out - out) * (10_000 - f)) + 1`.
///
/// # Errors
///
/// - [`AmmError::InsufficientOutputAmount`] if `amount_out` is zero.
/// - [`AmmError::InsufficientLiquidity`] if either reserve is zero or
///   `amount_out` would drain the output reserve.
pub fn get_amount_in_with_fee(
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee: FeeTier,
) -> Result<Amount, AmmError> {
    if amount_out.is_zero() {
        return Err(AmmError::InsufficientOutputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
        return Err(AmmError::InsufficientLiquidity);
    }
    let numerator = reserve_in
        .widen()
        .safe_mul(&amount_out.widen())?
        .safe_mul(&FeeTier::denominator())?;
    let denominator = reserve_out
        .safe_sub(&amount_out)?
        .widen()
        .safe_mul(&fee.retained_weight()?)?;
    let amount_in = Amount::narrow(numerator.safe_div(&denominator)?, "amount in overflow")?;
    amount_in.safe_add(&Amount::new(1))
}

/// The amounts a deposit should actually use so that it matches the
/// current reserve ratio.
///
/// An empty pair takes both desired amounts as they are.  Otherwise the
/// full `desired_a` is used if the matching B fits within `desired_b`;
/// if not, the full `desired_b` is used with its matching A.
///
/// # Errors
///
/// - [`AmmError::InsufficientBAmount`] / [`AmmError::InsufficientAAmount`]
///   if the matching amount is below the caller's minimum.
/// - [`AmmError::AmountExceedsDesired`] if neither side fits.
///
/// # Examples
///
/// ```
/// use pair_amm::domain::Amount;
/// use pair_amm::router::resolve_deposit;
///
/// let (a, b) = resolve_deposit(
///     Amount::new(1_000), Amount::new(5_000),
///     Amount::ZERO, Amount::ZERO,
///     Amount::new(10_000), Amount::new(20_000),
/// ).expect("resolvable");
/// assert_eq!((a, b), (Amount::new(1_000), Amount::new(2_000)));
/// ```
pub fn resolve_deposit(
    desired_a: Amount,
    desired_b: Amount,
    min_a: Amount,
    min_b: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
) -> Result<(Amount, Amount), AmmError> {
    if reserve_a.is_zero() && reserve_b.is_zero() {
        return Ok((desired_a, desired_b));
    }
    let optimal_b = quote(desired_a, reserve_a, reserve_b)?;
    if optimal_b <= desired_b {
        if optimal_b < min_b {
            return Err(AmmError::InsufficientBAmount);
        }
        return Ok((desired_a, optimal_b));
    }
    let optimal_a = quote(desired_b, reserve_b, reserve_a)?;
    if optimal_a > desired_a {
        return Err(AmmError::AmountExceedsDesired);
    }
    if optimal_a < min_a {
        return Err(AmmError::InsufficientAAmount);
    }
    Ok((optimal_a, desired_b))
}

/// Address of the pair `factory` creates for two tokens.
///
/// # Errors
///
/// Same as [`sort_tokens`](crate::domain::sort_tokens).
pub fn pair_for(factory: Address, token_a: Address, token_b: Address) -> Result<Address, AmmError> {
    let tokens = TokenPair::new(token_a, token_b)?;
    Ok(pair_address(factory, &tokens))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::BasisPoints;

    fn amt(v: u128) -> Amount {
        Amount::new(v)
    }

    // -- quote ----------------------------------------------------------------

    #[test]
    fn quote_rejects_degenerate_inputs() {
        assert_eq!(quote(amt(0), amt(1), amt(1)), Err(AmmError::InsufficientAmount));
        assert_eq!(quote(amt(1), amt(0), amt(1)), Err(AmmError::InsufficientLiquidity));
        assert_eq!(quote(amt(1), amt(1), amt(0)), Err(AmmError::InsufficientLiquidity));
    }

    #[test]
    fn quote_truncates() {
        assert_eq!(quote(amt(10), amt(3), amt(1)), Ok(amt(3)));
    }

    // -- get_amount_out / get_amount_in ----------------------------------------

    #[test]
    fn amount_out_matches_997_over_1000() {
        // 1000*997*10000 / (10000*1000 + 1000*997) = 906
        assert_eq!(get_amount_out(amt(1_000), amt(10_000), amt(10_000)), Ok(amt(906)));
        assert_eq!(
            get_amount_out(amt(0), amt(10_000), amt(10_000)),
            Err(AmmError::InsufficientInputAmount)
        );
        assert_eq!(
            get_amount_out(amt(1), amt(0), amt(10_000)),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn amount_out_with_other_tiers() {
        let free = FeeTier::new(BasisPoints::ZERO);
        // 1000 * 10000 / 11000 = 909
        assert_eq!(
            get_amount_out_with_fee(amt(1_000), amt(10_000), amt(10_000), free),
            Ok(amt(909))
        );
        let Ok(one_percent) =
            get_amount_out_with_fee(amt(1_000), amt(10_000), amt(10_000), FeeTier::TIER_1_00_PERCENT)
        else {
            panic!("expected Ok");
        };
        assert!(one_percent < amt(906));
    }

    #[test]
    fn amount_in_is_returned_and_covers_output() {
        // 10000*906*10000 / (9094*9970) + 1 = 999 + 1 = 1000
        let Ok(amount_in) = get_amount_in(amt(906), amt(10_000), amt(10_000)) else {
            panic!("expected Ok");
        };
        assert_eq!(amount_in, amt(1_000));
        let Ok(out) = get_amount_out(amount_in, amt(10_000), amt(10_000)) else {
            panic!("expected Ok");
        };
        assert!(out >= amt(906));
    }

    #[test]
    fn amount_in_rejects_draining_output() {
        assert_eq!(
            get_amount_in(amt(10_000), amt(10_000), amt(10_000)),
            Err(AmmError::InsufficientLiquidity)
        );
        assert_eq!(
            get_amount_in(amt(0), amt(10_000), amt(10_000)),
            Err(AmmError::InsufficientOutputAmount)
        );
    }

    // -- resolve_deposit --------------------------------------------------------

    #[test]
    fn empty_pair_takes_desired() {
        assert_eq!(
            resolve_deposit(amt(7), amt(9), amt(7), amt(9), amt(0), amt(0)),
            Ok((amt(7), amt(9)))
        );
    }

    #[test]
    fn b_side_adjusted() {
        assert_eq!(
            resolve_deposit(amt(100), amt(300), amt(0), amt(200), amt(1_000), amt(2_000)),
            Ok((amt(100), amt(200)))
        );
        assert_eq!(
            resolve_deposit(amt(100), amt(300), amt(0), amt(201), amt(1_000), amt(2_000)),
            Err(AmmError::InsufficientBAmount)
        );
    }

    #[test]
    fn a_side_adjusted() {
        // optimal_b = 400 > 100, optimal_a = 100 * 1000 / 2000 = 50
        assert_eq!(
            resolve_deposit(amt(200), amt(100), amt(50), amt(0), amt(1_000), amt(2_000)),
            Ok((amt(50), amt(100)))
        );
        assert_eq!(
            resolve_deposit(amt(200), amt(100), amt(51), amt(0), amt(1_000), amt(2_000)),
            Err(AmmError::InsufficientAAmount)
        );
    }

    #[test]
    fn a_side_may_round_down_to_zero() {
        // optimal_b = 1 * 5 / 2 = 2 > 1, so optimal_a = 1 * 2 / 5 = 0
        assert_eq!(
            resolve_deposit(amt(1), amt(1), amt(0), amt(0), amt(2), amt(5)),
            Ok((amt(0), amt(1)))
        );
    }

    // -- pair_for ---------------------------------------------------------------

    #[test]
    fn pair_for_is_order_insensitive() {
        let f = Address::from_bytes([0xfa; 32]);
        let a = Address::from_bytes([1; 32]);
        let b = Address::from_bytes([2; 32]);
        assert_eq!(pair_for(f, a, b), pair_for(f, b, a));
        assert_eq!(pair_for(f, a, a), Err(AmmError::IdenticalAddresses));
    }
}
