//! Reserve bookkeeping and price accumulation.

use tracing::trace;

use super::{PairEvent, PairState};
use crate::domain::Amount;
use crate::error::AmmError;
use crate::math::Uq112x112;

/// A consistent reading of a pair's reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reserves {
    reserve0: Amount,
    reserve1: Amount,
    block_timestamp_last: u32,
}

impl Reserves {
    pub(crate) const fn new(reserve0: Amount, reserve1: Amount, block_timestamp_last: u32) -> Self {
        Self {
            reserve0,
            reserve1,
            block_timestamp_last,
        }
    }

    /// Recorded balance of `token0`.
    pub const fn reserve0(&self) -> Amount {
        self.reserve0
    }

    /// Recorded balance of `token1`.
    pub const fn reserve1(&self) -> Amount {
        self.reserve1
    }

    /// Time of the last reserve write, modulo `2^32`.
    #[must_use]
    pub const fn block_timestamp_last(&self) -> u32 {
        self.block_timestamp_last
    }

    /// Returns `true` while either side is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.reserve0.is_zero() || self.reserve1.is_zero()
    }
}

/// Reduces a timestamp to the 32 bits the pair keeps.
#[must_use]
pub fn block_timestamp(timestamp: u64) -> u32 {
    (timestamp & 0xFFFF_FFFF) as u32
}

impl PairState {
    /// Writes new reserves, first folding the elapsed time at the old
    /// prices into the cumulative accumulators.
    ///
    /// The elapsed time is taken modulo `2^32`, so a wrapped timestamp
    /// still yields the right interval.
    pub(crate) fn update(
        &mut self,
        balance0: Amount,
        balance1: Amount,
        timestamp: u64,
        events: &mut Vec<PairEvent>,
    ) -> Result<(), AmmError> {
        let balance0 = balance0.to_reserve()?;
        let balance1 = balance1.to_reserve()?;
        let now = block_timestamp(timestamp);
        let elapsed = now.wrapping_sub(self.block_timestamp_last);
        if elapsed > 0 && !self.reserve0.is_zero() && !self.reserve1.is_zero() {
            self.price0_cumulative_last = Uq112x112::ratio(self.reserve1, self.reserve0)?
                .accumulate(self.price0_cumulative_last, elapsed);
            self.price1_cumulative_last = Uq112x112::ratio(self.reserve0, self.reserve1)?
                .accumulate(self.price1_cumulative_last, elapsed);
            trace!(
                elapsed,
                price0_cumulative = %self.price0_cumulative_last,
                price1_cumulative = %self.price1_cumulative_last,
                "oracle accumulated"
            );
        }
        self.reserve0 = balance0;
        self.reserve1 = balance1;
        self.block_timestamp_last = now;
        events.push(PairEvent::Sync {
            reserve0: balance0,
            reserve1: balance1,
        });
        Ok(())
    }
}
