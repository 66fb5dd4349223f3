//! Time-weighted average prices from a pair's cumulative accumulators.
//!
//! A pair adds `price * seconds` to two 256-bit accumulators whenever its
//! reserves change.  Reading the accumulators at two points in time and
//! dividing the difference by the elapsed seconds gives the average price
//! over that window.  Both the accumulators and the timestamps wrap, and
//! all differences here are taken with wrapping arithmetic, so a window
//! that straddles a wrap still averages correctly.

mod observer;

use primitive_types::U256;

use crate::error::AmmError;
use crate::math::Uq112x112;
use crate::pair::{block_timestamp, Pair};

pub use observer::PriceObserver;

/// Both cumulative prices of a pair at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    timestamp: u32,
    price0_cumulative: U256,
    price1_cumulative: U256,
}

impl Observation {
    /// Reads `pair` as if its reserves had been written at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if a reserve exceeds 112 bits, which
    /// cannot happen for reserves a pair accepted.
    pub fn capture(pair: &Pair, now: u64) -> Result<Self, AmmError> {
        current_cumulative_prices(pair, now)
    }

    /// Time of the reading, modulo `2^32`.
    #[must_use]
    pub const fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Cumulative price of `token0` in `token1`.
    #[must_use]
    pub const fn price0_cumulative(&self) -> U256 {
        self.price0_cumulative
    }

    /// Cumulative price of `token1` in `token0`.
    #[must_use]
    pub const fn price1_cumulative(&self) -> U256 {
        self.price1_cumulative
    }

    /// Average prices between `self` and a later observation.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PeriodNotElapsed`] if no time passed.
    pub fn average_prices(&self, later: &Self) -> Result<(Uq112x112, Uq112x112), AmmError> {
        let elapsed = later.timestamp.wrapping_sub(self.timestamp);
        Ok((
            average_price(self.price0_cumulative, later.price0_cumulative, elapsed)?,
            average_price(self.price1_cumulative, later.price1_cumulative, elapsed)?,
        ))
    }
}

/// Cumulative prices of `pair` as of `now`, without writing to the pair.
///
/// If time passed since the last reserve write, the term the pair would
/// add on its next write is added here.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if a reserve exceeds 112 bits.
pub fn current_cumulative_prices(pair: &Pair, now: u64) -> Result<Observation, AmmError> {
    let state = pair.load_state();
    let timestamp = block_timestamp(now);
    let mut price0_cumulative = state.price0_cumulative_last;
    let mut price1_cumulative = state.price1_cumulative_last;
    let elapsed = timestamp.wrapping_sub(state.block_timestamp_last);
    if elapsed > 0 && !state.reserve0.is_zero() && !state.reserve1.is_zero() {
        price0_cumulative =
            Uq112x112::ratio(state.reserve1, state.reserve0)?.accumulate(price0_cumulative, elapsed);
        price1_cumulative =
            Uq112x112::ratio(state.reserve0, state.reserve1)?.accumulate(price1_cumulative, elapsed);
    }
    Ok(Observation {
        timestamp,
        price0_cumulative,
        price1_cumulative,
    })
}

/// `(end - start) / elapsed` as a fixed-point price, with the subtraction
/// wrapping modulo `2^256`.
///
/// # Errors
///
/// Returns [`AmmError::PeriodNotElapsed`] if `elapsed` is zero.
pub fn average_price(start: U256, end: U256, elapsed: u32) -> Result<Uq112x112, AmmError> {
    if elapsed == 0 {
        return Err(AmmError::PeriodNotElapsed);
    }
    let (delta, _) = end.overflowing_sub(start);
    Ok(Uq112x112::from_raw(delta / U256::from(elapsed)))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Amount;
    use crate::math::q112;

    #[test]
    fn average_over_wrapped_accumulator() {
        // start just below the wrap point, end past it
        let start = U256::MAX - q112() + U256::one();
        let end = q112() * U256::from(3u8);
        let Ok(avg) = average_price(start, end, 2) else {
            panic!("expected Ok");
        };
        // delta = 4 * q112 over 2 seconds
        assert_eq!(avg.raw(), q112() * U256::from(2u8));
        assert_eq!(avg.mul_decode(Amount::new(10)), Ok(Amount::new(20)));
    }

    #[test]
    fn zero_elapsed_rejected() {
        assert_eq!(
            average_price(U256::zero(), U256::one(), 0),
            Err(AmmError::PeriodNotElapsed)
        );
    }
}
