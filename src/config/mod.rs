//! Validated configuration structs.
//!
//! [`PairConfig`] carries the economic parameters of a pair, and
//! [`FactoryConfig`] the identity and governance settings of the factory
//! that creates pairs with it.

mod factory_config;
mod pair_config;

pub use factory_config::FactoryConfig;
pub use pair_config::PairConfig;
