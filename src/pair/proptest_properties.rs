//! Property-based tests for the pair's accounting invariants.
//!
//! 1. **First deposit**: shares are `isqrt(a0 * a1) - 1000`.
//! 2. **Invariant preservation**: `reserve0 * reserve1` never decreases
//!    across a swap.
//! 3. **Round trip**: deposit then withdraw returns no more than was put in.
//! 4. **Monotonic feasibility**: if an output is feasible, every smaller
//!    output is too; `get_amount_out` is exactly the largest feasible one.

use primitive_types::U256;
use proptest::prelude::*;

use super::test_support::*;
use super::{Context, Pair};
use crate::domain::{Amount, Liquidity};
use crate::error::AmmError;
use crate::math::isqrt;
use crate::router::get_amount_out;
use crate::token::InMemoryTokens;
use crate::traits::TokenLedger;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn seeded(reserve0: u128, reserve1: u128) -> (Pair, InMemoryTokens) {
    let pair = new_pair();
    let tokens = InMemoryTokens::new();
    let Ok(_) = deposit(&pair, &tokens, None, ALICE, reserve0, reserve1, 0) else {
        panic!("seed deposit failed");
    };
    (pair, tokens)
}

fn k(pair: &Pair) -> U256 {
    let r = pair.get_reserves();
    r.reserve0().widen() * r.reserve1().widen()
}

/// Attempts a token0 -> token1 swap and undoes it whatever the outcome.
fn try_swap_out1(
    pair: &Pair,
    tokens: &InMemoryTokens,
    amount_in: u128,
    out: u128,
) -> Result<(), AmmError> {
    let checkpoint = tokens.checkpoint();
    fund(tokens, TOKEN0, PAIR, amount_in);
    let ctx = Context::new(tokens, &NO_FEE, BOB, 1);
    let result = pair.swap(&ctx, Amount::ZERO, Amount::new(out), BOB, None);
    // also rewinds the pair through its rollback hook
    tokens.rollback(checkpoint);
    result
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn first_deposit_share_formula(a0 in 1_001u128..1_000_000_000, a1 in 1_001u128..1_000_000_000) {
        let pair = new_pair();
        let tokens = InMemoryTokens::new();
        let expected = isqrt(U256::from(a0) * U256::from(a1)).low_u128() - 1_000;
        let Ok(shares) = deposit(&pair, &tokens, None, ALICE, a0, a1, 0) else {
            panic!("deposit failed");
        };
        prop_assert_eq!(shares, Liquidity::new(expected));
        prop_assert_eq!(pair.total_supply(), Liquidity::new(expected + 1_000));
    }

    #[test]
    fn k_never_decreases_across_swaps(
        r0 in 10_000u128..1_000_000_000,
        r1 in 10_000u128..1_000_000_000,
        amount_in in 1u128..1_000_000,
    ) {
        let (pair, tokens) = seeded(r0, r1);
        let before = k(&pair);
        let Ok(out) = get_amount_out(Amount::new(amount_in), Amount::new(r0), Amount::new(r1)) else {
            panic!("quote failed");
        };
        prop_assume!(!out.is_zero());
        fund(&tokens, TOKEN0, PAIR, amount_in);
        let ctx = Context::new(&tokens, &NO_FEE, BOB, 1);
        prop_assert!(pair.swap(&ctx, Amount::ZERO, out, BOB, None).is_ok());
        prop_assert!(k(&pair) >= before);
    }

    #[test]
    fn deposit_withdraw_round_trip_never_profits(
        r0 in 10_000u128..1_000_000_000,
        r1 in 10_000u128..1_000_000_000,
        d in 1_000u128..1_000_000,
    ) {
        let (pair, tokens) = seeded(r0, r1);
        // deposit d of token0 and the proportional amount of token1
        let d1 = d * r1 / r0 + 1;
        let Ok(shares) = deposit(&pair, &tokens, None, BOB, d, d1, 1) else {
            return Ok(());
        };
        let ctx = Context::new(&tokens, &NO_FEE, BOB, 2);
        let Ok(()) = pair.transfer(&ctx, PAIR, shares) else {
            panic!("share transfer failed");
        };
        let Ok((back0, back1)) = pair.burn(&ctx, BOB) else {
            panic!("burn failed");
        };
        prop_assert!(back0 <= Amount::new(d));
        prop_assert!(back1 <= Amount::new(d1));
    }

    #[test]
    fn feasibility_is_monotonic(
        r0 in 10_000u128..1_000_000_000,
        r1 in 10_000u128..1_000_000_000,
        amount_in in 1_000u128..1_000_000,
    ) {
        let (pair, tokens) = seeded(r0, r1);
        let Ok(best) = get_amount_out(Amount::new(amount_in), Amount::new(r0), Amount::new(r1)) else {
            panic!("quote failed");
        };
        prop_assume!(!best.is_zero());
        prop_assert!(try_swap_out1(&pair, &tokens, amount_in, best.get()).is_ok());
        prop_assert!(try_swap_out1(&pair, &tokens, amount_in, best.get() / 2 + 1).is_ok());
        prop_assert_eq!(
            try_swap_out1(&pair, &tokens, amount_in, best.get() + 1),
            Err(AmmError::InvariantViolation)
        );
    }
}
