//! Construction from a validated configuration.
//!
//! [`FromConfig`] gives components a uniform way to be built from their
//! configuration struct.  Implementations validate the configuration
//! again before constructing, so a successfully built value always starts
//! in a valid state.
//!
//! There is no blanket implementation: every component-config pairing is
//! written out explicitly.

use crate::error::AmmError;

/// Builds a component from its configuration.
///
/// # Implementors
///
/// - `impl FromConfig<FactoryConfig> for PairFactory`
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] (or a more specific
/// variant) if the configuration is invalid.
pub trait FromConfig<C>: Sized {
    /// Creates a new instance from `config`.
    ///
    /// # Errors
    ///
    /// Any validation error reported by the configuration.
    fn from_config(config: &C) -> Result<Self, AmmError>;
}
