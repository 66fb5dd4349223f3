//! Arithmetic utilities for the pair engine.
//!
//! - [`CheckedArithmetic`] and [`mul_div`] for overflow-safe operations.
//! - [`isqrt`] for share issuance and the protocol-fee skim.
//! - [`Uq112x112`] for the price accumulators.

mod checked;
mod sqrt;
mod uq112x112;

pub use checked::{mul_div, CheckedArithmetic};
pub use sqrt::isqrt;
pub use uq112x112::{q112, Uq112x112};
