//! Configuration for a pair factory.

use super::PairConfig;
use crate::domain::Address;
use crate::error::AmmError;

/// Everything needed to stand up a [`PairFactory`](crate::factory::PairFactory).
///
/// The factory identity seeds every pair address it derives, and the
/// fee-to setter is the only caller allowed to turn the protocol fee on.
///
/// # Validation
///
/// - The factory address must be non-zero.
/// - The embedded [`PairConfig`] must be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryConfig {
    address: Address,
    fee_to_setter: Address,
    pair: PairConfig,
}

impl FactoryConfig {
    /// Creates a validated `FactoryConfig`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::ZeroAddress`] if `address` is zero.
    /// - [`AmmError::InvalidConfiguration`] if `pair` is invalid.
    pub fn new(address: Address, fee_to_setter: Address, pair: PairConfig) -> Result<Self, AmmError> {
        let config = Self {
            address,
            fee_to_setter,
            pair,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn validate(&self) -> Result<(), AmmError> {
        if self.address.is_zero() {
            return Err(AmmError::ZeroAddress);
        }
        self.pair.validate()
    }

    /// Returns the factory identity.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the initial fee-to setter.
    #[must_use]
    pub const fn fee_to_setter(&self) -> Address {
        self.fee_to_setter
    }

    /// Returns the parameters applied to each created pair.
    #[must_use]
    pub const fn pair(&self) -> &PairConfig {
        &self.pair
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn valid_config() {
        let Ok(cfg) = FactoryConfig::new(
            Address::from_bytes([0xfa; 32]),
            Address::from_bytes([0x5e; 32]),
            PairConfig::default(),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(cfg.pair(), &PairConfig::default());
        assert_eq!(cfg.fee_to_setter(), Address::from_bytes([0x5e; 32]));
    }

    #[test]
    fn zero_factory_rejected() {
        let result = FactoryConfig::new(Address::ZERO, Address::ZERO, PairConfig::default());
        assert_eq!(result, Err(AmmError::ZeroAddress));
    }
}
