//! Flash-swap callback.

use crate::domain::Amount;
use crate::error::AmmError;
use crate::pair::{Context, Pair};

/// Receives control in the middle of a swap.
///
/// The pair pays out the requested amounts first, then calls
/// [`on_flash_swap`](Self::on_flash_swap), then checks that enough input
/// arrived to keep the fee-adjusted product from shrinking.  The callee
/// repays through `ctx.tokens`.
///
/// The pair is locked for the duration of the callback: any mutating
/// pair call made from inside it fails with [`AmmError::Locked`].
pub trait FlashSwapCallee {
    /// Called after the optimistic payout.
    ///
    /// # Errors
    ///
    /// Any error aborts the swap and rolls back the payout.
    fn on_flash_swap(
        &self,
        ctx: &Context<'_>,
        pair: &Pair,
        amount0_out: Amount,
        amount1_out: Amount,
    ) -> Result<(), AmmError>;
}
