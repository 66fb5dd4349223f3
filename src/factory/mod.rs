//! Pair creation and lookup.
//!
//! [`PairFactory`] keeps one [`Pair`](crate::pair::Pair) per unordered
//! token pair at a deterministic address, and owns the protocol fee
//! settings every pair reads through [`FeeSource`](crate::traits::FeeSource).

mod pair_factory;

pub use pair_factory::{pair_address, FactoryEvent, PairFactory};
