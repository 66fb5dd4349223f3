//! Share issuance and redemption.

use primitive_types::U256;
use tracing::debug;

use super::{Context, Pair, PairEvent, PairState};
use crate::config::PairConfig;
use crate::domain::{Address, Amount, Liquidity};
use crate::error::AmmError;
use crate::math::{isqrt, mul_div, CheckedArithmetic};

impl PairState {
    /// Mints the protocol's cut of fee growth since the last mint or burn.
    ///
    /// With `d` the configured divisor, the protocol receives
    /// `total * (root_k - root_k_last) / (root_k * d + root_k_last)` new
    /// shares, which is `1 / (d + 1)` of the growth in `sqrt(k)`.  Runs on
    /// the pre-update reserves.  Returns whether the fee is on.
    pub(crate) fn mint_fee(
        &mut self,
        fee_to: Option<Address>,
        config: &PairConfig,
        events: &mut Vec<PairEvent>,
    ) -> Result<bool, AmmError> {
        let Some(fee_to) = fee_to else {
            if !self.k_last.is_zero() {
                self.k_last = U256::zero();
            }
            return Ok(false);
        };
        if self.k_last.is_zero() {
            return Ok(true);
        }
        let root_k = isqrt(self.reserve0.widen().safe_mul(&self.reserve1.widen())?);
        let root_k_last = isqrt(self.k_last);
        if root_k > root_k_last {
            let total = self.shares.total_supply().widen();
            let numerator = total.safe_mul(&root_k.safe_sub(&root_k_last)?)?;
            let denominator = root_k
                .safe_mul(&U256::from(config.protocol_fee_divisor()))?
                .safe_add(&root_k_last)?;
            let fee_shares = Liquidity::narrow(
                numerator.safe_div(&denominator)?,
                "protocol fee shares overflow",
            )?;
            if !fee_shares.is_zero() {
                events.push(self.shares_mut().mint(fee_to, fee_shares)?.into());
                debug!(%fee_to, %fee_shares, "protocol fee minted");
            }
        }
        Ok(true)
    }

    fn refresh_k_last(&mut self) -> Result<(), AmmError> {
        self.k_last = self.reserve0.widen().safe_mul(&self.reserve1.widen())?;
        Ok(())
    }
}

impl Pair {
    /// Issues shares for whatever the caller sent since the last reserve
    /// write.
    ///
    /// The first deposit mints `sqrt(amount0 * amount1)` shares, of which
    /// the configured minimum liquidity is locked at [`Address::ZERO`]
    /// forever.  Later deposits mint in proportion to the smaller of the
    /// two contributions relative to the reserves, so an unbalanced
    /// deposit donates its excess to existing holders.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientLiquidityMinted`] if no shares would be
    ///   minted (including a first deposit not exceeding the minimum).
    /// - [`AmmError::Underflow`] if the pair's balance is below a reserve.
    /// - [`AmmError::Overflow`] if a reserve would exceed 112 bits.
    /// - [`AmmError::Locked`], or any token ledger error.
    pub fn mint(&self, ctx: &Context<'_>, to: Address) -> Result<Liquidity, AmmError> {
        self.execute(ctx, "mint", |state, events| {
            let (reserve0, reserve1) = (state.reserve0, state.reserve1);
            let balance0 = ctx.tokens.balance_of(state.token0, self.address)?;
            let balance1 = ctx.tokens.balance_of(state.token1, self.address)?;
            let amount0 = balance0.safe_sub(&reserve0)?;
            let amount1 = balance1.safe_sub(&reserve1)?;

            let fee_on = state.mint_fee(ctx.fees.fee_to(), &self.config, events)?;
            let total = state.shares.total_supply();
            let liquidity = if total.is_zero() {
                let root = isqrt(amount0.widen().safe_mul(&amount1.widen())?);
                let root = Liquidity::narrow(root, "initial liquidity overflow")?;
                let minimum = self.config.minimum_liquidity();
                let liquidity = root
                    .checked_sub(&minimum)
                    .ok_or(AmmError::InsufficientLiquidityMinted)?;
                events.push(state.shares_mut().mint(Address::ZERO, minimum)?.into());
                liquidity
            } else {
                let by0 = mul_div(amount0.widen(), total.widen(), reserve0.widen())?;
                let by1 = mul_div(amount1.widen(), total.widen(), reserve1.widen())?;
                Liquidity::narrow(by0.min(by1), "minted liquidity overflow")?
            };
            if liquidity.is_zero() {
                return Err(AmmError::InsufficientLiquidityMinted);
            }
            events.push(state.shares_mut().mint(to, liquidity)?.into());

            state.update(balance0, balance1, ctx.timestamp, events)?;
            if fee_on {
                state.refresh_k_last()?;
            }
            events.push(PairEvent::Mint {
                sender: ctx.sender,
                amount0,
                amount1,
            });
            debug!(pair = %self.address, %to, %amount0, %amount1, %liquidity, "mint");
            Ok(liquidity)
        })
    }

    /// Redeems every share the pair holds for a pro-rata slice of both
    /// token balances, paid to `to`.
    ///
    /// Callers first transfer the shares to redeem to the pair's own
    /// address.  Amounts are computed from balances, not reserves, so
    /// donations since the last write are included.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientLiquidityBurned`] if either amount would
    ///   be zero (including when no shares exist).
    /// - [`AmmError::Locked`], or any token ledger error.
    pub fn burn(&self, ctx: &Context<'_>, to: Address) -> Result<(Amount, Amount), AmmError> {
        self.execute(ctx, "burn", |state, events| {
            let (token0, token1) = (state.token0, state.token1);
            let balance0 = ctx.tokens.balance_of(token0, self.address)?;
            let balance1 = ctx.tokens.balance_of(token1, self.address)?;
            let liquidity = state.shares.balance_of(self.address);

            let fee_on = state.mint_fee(ctx.fees.fee_to(), &self.config, events)?;
            let total = state.shares.total_supply();
            if total.is_zero() {
                return Err(AmmError::InsufficientLiquidityBurned);
            }
            let amount0 = Amount::narrow(
                mul_div(liquidity.widen(), balance0.widen(), total.widen())?,
                "burn amount0 overflow",
            )?;
            let amount1 = Amount::narrow(
                mul_div(liquidity.widen(), balance1.widen(), total.widen())?,
                "burn amount1 overflow",
            )?;
            if amount0.is_zero() || amount1.is_zero() {
                return Err(AmmError::InsufficientLiquidityBurned);
            }

            events.push(state.shares_mut().burn(self.address, liquidity)?.into());
            ctx.tokens.transfer(token0, self.address, to, amount0)?;
            ctx.tokens.transfer(token1, self.address, to, amount1)?;
            let balance0 = ctx.tokens.balance_of(token0, self.address)?;
            let balance1 = ctx.tokens.balance_of(token1, self.address)?;

            state.update(balance0, balance1, ctx.timestamp, events)?;
            if fee_on {
                state.refresh_k_last()?;
            }
            events.push(PairEvent::Burn {
                sender: ctx.sender,
                amount0,
                amount1,
                to,
            });
            debug!(pair = %self.address, %to, %amount0, %amount1, %liquidity, "burn");
            Ok((amount0, amount1))
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::token::InMemoryTokens;
    use crate::traits::TokenLedger;

    #[test]
    fn first_deposit_locks_minimum() {
        let pair = new_pair();
        let tokens = InMemoryTokens::new();
        let Ok(shares) = deposit(&pair, &tokens, None, ALICE, 5_000, 5_000, 0) else {
            panic!("deposit failed");
        };
        assert_eq!(shares, Liquidity::new(4_000));
        assert_eq!(pair.balance_of(Address::ZERO), Liquidity::new(1_000));
        assert_eq!(pair.total_supply(), Liquidity::new(5_000));
    }

    #[test]
    fn first_deposit_at_minimum_fails() {
        let pair = new_pair();
        let tokens = InMemoryTokens::new();
        assert_eq!(
            deposit(&pair, &tokens, None, ALICE, 1_000, 1_000, 0),
            Err(AmmError::InsufficientLiquidityMinted)
        );
        assert_eq!(pair.total_supply(), Liquidity::ZERO);
    }

    #[test]
    fn proportional_second_deposit() {
        let pair = new_pair();
        let tokens = InMemoryTokens::new();
        let Ok(_) = deposit(&pair, &tokens, None, ALICE, 5_000, 5_000, 0) else {
            panic!("deposit failed");
        };
        let Ok(shares) = deposit(&pair, &tokens, None, BOB, 5_000, 5_000, 1) else {
            panic!("deposit failed");
        };
        assert_eq!(shares, Liquidity::new(5_000));
        assert_eq!(pair.total_supply(), Liquidity::new(10_000));
        let reserves = pair.get_reserves();
        assert_eq!(reserves.reserve0(), Amount::new(10_000));
        assert_eq!(reserves.reserve1(), Amount::new(10_000));
    }

    #[test]
    fn unbalanced_deposit_takes_smaller_side() {
        let pair = new_pair();
        let tokens = InMemoryTokens::new();
        let Ok(_) = deposit(&pair, &tokens, None, ALICE, 5_000, 5_000, 0) else {
            panic!("deposit failed");
        };
        let Ok(shares) = deposit(&pair, &tokens, None, BOB, 5_000, 1_000, 1) else {
            panic!("deposit failed");
        };
        assert_eq!(shares, Liquidity::new(1_000));
    }

    #[test]
    fn mint_without_deposit_fails() {
        let pair = new_pair();
        let tokens = InMemoryTokens::new();
        let Ok(_) = deposit(&pair, &tokens, None, ALICE, 5_000, 5_000, 0) else {
            panic!("deposit failed");
        };
        let ctx = Context::new(&tokens, &NO_FEE, ALICE, 0);
        assert_eq!(pair.mint(&ctx, ALICE), Err(AmmError::InsufficientLiquidityMinted));
    }

    #[test]
    fn burn_returns_pro_rata_balances() {
        let pair = new_pair();
        let tokens = InMemoryTokens::new();
        let Ok(_) = deposit(&pair, &tokens, None, ALICE, 5_000, 5_000, 0) else {
            panic!("deposit failed");
        };
        let ctx = Context::new(&tokens, &NO_FEE, ALICE, 5);
        let Ok(()) = pair.transfer(&ctx, PAIR, Liquidity::new(4_000)) else {
            panic!("share transfer failed");
        };
        let Ok((amount0, amount1)) = pair.burn(&ctx, ALICE) else {
            panic!("burn failed");
        };
        assert_eq!(amount0, Amount::new(4_000));
        assert_eq!(amount1, Amount::new(4_000));
        assert_eq!(pair.total_supply(), Liquidity::new(1_000));
        let reserves = pair.get_reserves();
        assert_eq!(reserves.reserve0(), Amount::new(1_000));
        assert_eq!(tokens.balance_of(TOKEN0, ALICE), Ok(Amount::new(4_000)));
    }

    #[test]
    fn burn_with_nothing_to_redeem_fails() {
        let pair = new_pair();
        let tokens = InMemoryTokens::new();
        let ctx = Context::new(&tokens, &NO_FEE, ALICE, 0);
        assert_eq!(pair.burn(&ctx, ALICE), Err(AmmError::InsufficientLiquidityBurned));
        let Ok(_) = deposit(&pair, &tokens, None, ALICE, 5_000, 5_000, 0) else {
            panic!("deposit failed");
        };
        assert_eq!(pair.burn(&ctx, ALICE), Err(AmmError::InsufficientLiquidityBurned));
    }

    #[test]
    fn fee_off_clears_k_last() {
        let pair = new_pair();
        let tokens = InMemoryTokens::new();
        let Ok(_) = deposit(&pair, &tokens, Some(FEE_TO), ALICE, 5_000, 5_000, 0) else {
            panic!("deposit failed");
        };
        assert_eq!(pair.k_last(), U256::from(25_000_000u64));
        let Ok(_) = deposit(&pair, &tokens, None, ALICE, 5_000, 5_000, 1) else {
            panic!("deposit failed");
        };
        assert_eq!(pair.k_last(), U256::zero());
    }

    #[test]
    fn mint_fee_takes_one_sixth_of_growth() {
        // k grew from 100^2 to 400^2 with 100 shares outstanding:
        // 100 * (400 - 100) / (400 * 5 + 100) = 30000 / 2100 = 14
        let mut state = PairState {
            reserve0: Amount::new(400),
            reserve1: Amount::new(400),
            k_last: U256::from(10_000u64),
            ..PairState::default()
        };
        let Ok(_) = state.shares_mut().mint(ALICE, Liquidity::new(100)) else {
            panic!("mint failed");
        };
        let mut events = Vec::new();
        let Ok(fee_on) = state.mint_fee(Some(FEE_TO), &PairConfig::default(), &mut events) else {
            panic!("mint_fee failed");
        };
        assert!(fee_on);
        assert_eq!(state.shares.balance_of(FEE_TO), Liquidity::new(14));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn mint_fee_without_growth_mints_nothing() {
        let mut state = PairState {
            reserve0: Amount::new(100),
            reserve1: Amount::new(100),
            k_last: U256::from(10_000u64),
            ..PairState::default()
        };
        let mut events = Vec::new();
        let Ok(true) = state.mint_fee(Some(FEE_TO), &PairConfig::default(), &mut events) else {
            panic!("expected fee on");
        };
        assert!(events.is_empty());
    }
}
