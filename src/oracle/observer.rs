//! Fixed-window TWAP consumer.

use std::sync::Arc;

use tracing::debug;

use super::Observation;
use crate::domain::{Address, Amount};
use crate::error::AmmError;
use crate::math::Uq112x112;
use crate::pair::Pair;

/// Tracks one pair's average prices over a fixed window.
///
/// Call [`update`](Self::update) at most once per `period` seconds; between
/// updates [`consult`](Self::consult) prices amounts at the average over
/// the last completed window.  Until the first update the averages are
/// zero.
#[derive(Debug)]
pub struct PriceObserver {
    pair: Arc<Pair>,
    period: u32,
    last: Observation,
    price0_average: Uq112x112,
    price1_average: Uq112x112,
}

impl PriceObserver {
    /// Starts observing `pair` at `now`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidConfiguration`] if `period` is zero.
    /// - [`AmmError::InsufficientLiquidity`] if the pair has no reserves.
    pub fn new(pair: Arc<Pair>, period: u32, now: u64) -> Result<Self, AmmError> {
        if period == 0 {
            return Err(AmmError::InvalidConfiguration("observation period must be non-zero"));
        }
        if pair.get_reserves().is_empty() {
            return Err(AmmError::InsufficientLiquidity);
        }
        let last = Observation::capture(&pair, now)?;
        Ok(Self {
            pair,
            period,
            last,
            price0_average: Uq112x112::ZERO,
            price1_average: Uq112x112::ZERO,
        })
    }

    /// Closes the current window at `now` and starts the next one.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PeriodNotElapsed`] if less than `period` seconds
    /// passed since the last update.
    pub fn update(&mut self, now: u64) -> Result<(), AmmError> {
        let current = Observation::capture(&self.pair, now)?;
        let elapsed = current.timestamp().wrapping_sub(self.last.timestamp());
        if elapsed < self.period {
            return Err(AmmError::PeriodNotElapsed);
        }
        let (price0, price1) = self.last.average_prices(&current)?;
        self.price0_average = price0;
        self.price1_average = price1;
        self.last = current;
        debug!(pair = %self.pair.address(), elapsed, %price0, %price1, "twap window closed");
        Ok(())
    }

    /// Values `amount_in` of `token` in the other token at the window
    /// average.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidAsset`] if `token` is not in the pair.
    /// - [`AmmError::Overflow`] if the result exceeds 128 bits.
    pub fn consult(&self, token: Address, amount_in: Amount) -> Result<Amount, AmmError> {
        if token == self.pair.token0() {
            self.price0_average.mul_decode(amount_in)
        } else if token == self.pair.token1() {
            self.price1_average.mul_decode(amount_in)
        } else {
            Err(AmmError::InvalidAsset)
        }
    }

    /// Average `token0` price over the last window.
    #[must_use]
    pub const fn price0_average(&self) -> Uq112x112 {
        self.price0_average
    }

    /// Average `token1` price over the last window.
    #[must_use]
    pub const fn price1_average(&self) -> Uq112x112 {
        self.price1_average
    }
}
