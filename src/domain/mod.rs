//! Fundamental domain value types used throughout the pair engine.
//!
//! Identities, token amounts, share units and fee rates.  All are
//! newtypes with checked arithmetic so overflow surfaces as an error
//! instead of wrapping.

mod address;
mod amount;
mod basis_points;
mod fee_tier;
mod liquidity;
mod token_pair;

pub use address::Address;
pub use amount::{Amount, MAX_RESERVE};
pub use basis_points::{BasisPoints, BPS_DENOMINATOR};
pub use fee_tier::FeeTier;
pub use liquidity::Liquidity;
pub use token_pair::{sort_tokens, TokenPair};
