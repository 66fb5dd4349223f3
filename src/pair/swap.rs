//! Invariant-checked swaps and balance reconciliation.

use tracing::debug;

use super::{Context, Pair, PairEvent};
use crate::domain::{Address, Amount, FeeTier};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;
use crate::traits::FlashSwapCallee;

/// Input that arrived on one side: what the balance holds beyond the
/// reserve left after the payout.
fn inflow(balance: Amount, reserve: Amount, out: Amount) -> Result<Amount, AmmError> {
    let floor = reserve.safe_sub(&out)?;
    Ok(balance.checked_sub(&floor).unwrap_or(Amount::ZERO))
}

impl Pair {
    /// Pays out the requested amounts, then requires that the pair
    /// received enough input to keep the fee-adjusted constant product
    /// from decreasing.
    ///
    /// The payout happens before the input is checked.  Callers either
    /// send input beforehand or supply a [`FlashSwapCallee`] that repays
    /// during the callback.  With `f` the fee in basis points, the check is
    ///
    /// ```text
    /// (b0 * 10_000 - in0 * f) * (b1 * 10_000 - in1 * f) >= r0 * r1 * 10_000^2
    /// ```
    ///
    /// so the fee is charged on input only.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientOutputAmount`] if both outputs are zero.
    /// - [`AmmError::InsufficientLiquidity`] if an output reaches its reserve.
    /// - [`AmmError::InvalidTo`] if `to` is one of the pair's tokens.
    /// - [`AmmError::InsufficientInputAmount`] if nothing arrived.
    /// - [`AmmError::InvariantViolation`] if too little arrived.
    /// - [`AmmError::Locked`], callee errors, or any token ledger error.
    pub fn swap(
        &self,
        ctx: &Context<'_>,
        amount0_out: Amount,
        amount1_out: Amount,
        to: Address,
        callee: Option<&dyn FlashSwapCallee>,
    ) -> Result<(), AmmError> {
        self.execute(ctx, "swap", |state, events| {
            if amount0_out.is_zero() && amount1_out.is_zero() {
                return Err(AmmError::InsufficientOutputAmount);
            }
            let (reserve0, reserve1) = (state.reserve0, state.reserve1);
            if amount0_out >= reserve0 || amount1_out >= reserve1 {
                return Err(AmmError::InsufficientLiquidity);
            }
            let (token0, token1) = (state.token0, state.token1);
            if to == token0 || to == token1 {
                return Err(AmmError::InvalidTo);
            }

            if !amount0_out.is_zero() {
                ctx.tokens.transfer(token0, self.address, to, amount0_out)?;
            }
            if !amount1_out.is_zero() {
                ctx.tokens.transfer(token1, self.address, to, amount1_out)?;
            }
            if let Some(callee) = callee {
                callee.on_flash_swap(ctx, self, amount0_out, amount1_out)?;
            }
            let balance0 = ctx.tokens.balance_of(token0, self.address)?.to_reserve()?;
            let balance1 = ctx.tokens.balance_of(token1, self.address)?.to_reserve()?;

            let amount0_in = inflow(balance0, reserve0, amount0_out)?;
            let amount1_in = inflow(balance1, reserve1, amount1_out)?;
            if amount0_in.is_zero() && amount1_in.is_zero() {
                return Err(AmmError::InsufficientInputAmount);
            }

            let scale = FeeTier::denominator();
            let fee = self.config.fee_tier().basis_points().widen();
            let adjusted0 = balance0
                .widen()
                .safe_mul(&scale)?
                .safe_sub(&amount0_in.widen().safe_mul(&fee)?)?;
            let adjusted1 = balance1
                .widen()
                .safe_mul(&scale)?
                .safe_sub(&amount1_in.widen().safe_mul(&fee)?)?;
            let k_after = adjusted0.safe_mul(&adjusted1)?;
            let k_before = reserve0
                .widen()
                .safe_mul(&reserve1.widen())?
                .safe_mul(&scale.safe_mul(&scale)?)?;
            if k_after < k_before {
                return Err(AmmError::InvariantViolation);
            }

            state.update(balance0, balance1, ctx.timestamp, events)?;
            events.push(PairEvent::Swap {
                sender: ctx.sender,
                amount0_in,
                amount1_in,
                amount0_out,
                amount1_out,
                to,
            });
            debug!(
                pair = %self.address,
                %amount0_in,
                %amount1_in,
                %amount0_out,
                %amount1_out,
                %to,
                "swap"
            );
            Ok(())
        })
    }

    /// Sends any balance above the reserves to `to`.
    ///
    /// # Errors
    ///
    /// [`AmmError::Locked`], or any token ledger error.
    pub fn skim(&self, ctx: &Context<'_>, to: Address) -> Result<(Amount, Amount), AmmError> {
        self.execute(ctx, "skim", |state, _events| {
            let (token0, token1) = (state.token0, state.token1);
            let excess0 = ctx
                .tokens
                .balance_of(token0, self.address)?
                .safe_sub(&state.reserve0)?;
            let excess1 = ctx
                .tokens
                .balance_of(token1, self.address)?
                .safe_sub(&state.reserve1)?;
            if !excess0.is_zero() {
                ctx.tokens.transfer(token0, self.address, to, excess0)?;
            }
            if !excess1.is_zero() {
                ctx.tokens.transfer(token1, self.address, to, excess1)?;
            }
            debug!(pair = %self.address, %to, %excess0, %excess1, "skim");
            Ok((excess0, excess1))
        })
    }

    /// Sets the reserves to the current balances.
    ///
    /// # Errors
    ///
    /// [`AmmError::Overflow`] if a balance exceeds 112 bits,
    /// [`AmmError::Locked`], or any token ledger error.
    pub fn sync(&self, ctx: &Context<'_>) -> Result<(), AmmError> {
        self.execute(ctx, "sync", |state, events| {
            let balance0 = ctx.tokens.balance_of(state.token0, self.address)?;
            let balance1 = ctx.tokens.balance_of(state.token1, self.address)?;
            state.update(balance0, balance1, ctx.timestamp, events)?;
            debug!(pair = %self.address, reserve0 = %balance0, reserve1 = %balance1, "sync");
            Ok(())
        })
    }
}
