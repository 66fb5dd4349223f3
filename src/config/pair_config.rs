//! Per-pair economic parameters.

use crate::domain::{FeeTier, Liquidity};
use crate::error::AmmError;

/// Immutable parameters every pair created by a factory shares.
///
/// # Defaults
///
/// | Field | Default |
/// |-------|---------|
/// | `fee_tier` | 30 bp |
/// | `minimum_liquidity` | 1000 shares |
/// | `protocol_fee_divisor` | 5 (protocol takes 1/6 of fee growth) |
///
/// # Validation
///
/// - The fee must be below 100%.
/// - The minimum liquidity and the protocol fee divisor must be non-zero.
///
/// # Examples
///
/// ```
/// use pair_amm::config::PairConfig;
/// use pair_amm::domain::{FeeTier, Liquidity};
///
/// let cfg = PairConfig::new(FeeTier::TIER_0_05_PERCENT, Liquidity::new(1_000), 5)
///     .expect("valid config");
/// assert_eq!(cfg.fee_tier(), FeeTier::TIER_0_05_PERCENT);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairConfig {
    fee_tier: FeeTier,
    minimum_liquidity: Liquidity,
    protocol_fee_divisor: u32,
}

impl PairConfig {
    /// Creates a validated `PairConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] if any parameter is out
    /// of range.
    pub fn new(
        fee_tier: FeeTier,
        minimum_liquidity: Liquidity,
        protocol_fee_divisor: u32,
    ) -> Result<Self, AmmError> {
        let config = Self {
            fee_tier,
            minimum_liquidity,
            protocol_fee_divisor,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] naming the first
    /// violated constraint.
    pub fn validate(&self) -> Result<(), AmmError> {
        if self.fee_tier.basis_points() >= crate::domain::BasisPoints::MAX_PERCENT {
            return Err(AmmError::InvalidConfiguration("fee must be below 100%"));
        }
        if self.minimum_liquidity.is_zero() {
            return Err(AmmError::InvalidConfiguration(
                "minimum liquidity must be non-zero",
            ));
        }
        if self.protocol_fee_divisor == 0 {
            return Err(AmmError::InvalidConfiguration(
                "protocol fee divisor must be non-zero",
            ));
        }
        Ok(())
    }

    /// Returns the swap fee tier.
    #[must_use]
    pub const fn fee_tier(&self) -> FeeTier {
        self.fee_tier
    }

    /// Returns the shares locked forever on the first deposit.
    pub const fn minimum_liquidity(&self) -> Liquidity {
        self.minimum_liquidity
    }

    /// Returns the `d` in `root_k * d + root_k_last`.
    #[must_use]
    pub const fn protocol_fee_divisor(&self) -> u32 {
        self.protocol_fee_divisor
    }
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            fee_tier: FeeTier::TIER_0_30_PERCENT,
            minimum_liquidity: Liquidity::new(1_000),
            protocol_fee_divisor: 5,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::BasisPoints;

    #[test]
    fn default_is_valid() {
        let cfg = PairConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.fee_tier().basis_points().get(), 30);
        assert_eq!(cfg.minimum_liquidity(), Liquidity::new(1_000));
        assert_eq!(cfg.protocol_fee_divisor(), 5);
    }

    #[test]
    fn full_fee_rejected() {
        let result = PairConfig::new(
            FeeTier::new(BasisPoints::MAX_PERCENT),
            Liquidity::new(1_000),
            5,
        );
        let Err(AmmError::InvalidConfiguration(_)) = result else {
            panic!("expected InvalidConfiguration");
        };
    }

    #[test]
    fn zero_minimum_liquidity_rejected() {
        assert!(PairConfig::new(FeeTier::default(), Liquidity::ZERO, 5).is_err());
    }

    #[test]
    fn zero_divisor_rejected() {
        assert!(PairConfig::new(FeeTier::default(), Liquidity::new(1_000), 0).is_err());
    }

    #[test]
    fn zero_fee_is_allowed() {
        let Ok(cfg) = PairConfig::new(FeeTier::new(BasisPoints::ZERO), Liquidity::new(1), 1)
        else {
            panic!("expected Ok");
        };
        assert_eq!(cfg.fee_tier().basis_points(), BasisPoints::ZERO);
    }
}
