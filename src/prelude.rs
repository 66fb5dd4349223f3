//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use pair_amm::prelude::*;
//! ```

pub use crate::config::{FactoryConfig, PairConfig};
pub use crate::domain::{Address, Amount, BasisPoints, FeeTier, Liquidity, TokenPair};
pub use crate::error::{AmmError, Result};
pub use crate::factory::PairFactory;
pub use crate::math::{CheckedArithmetic, Uq112x112};
pub use crate::oracle::{Observation, PriceObserver};
pub use crate::pair::{Context, Pair, PairEvent, Reserves};
pub use crate::router::{AddLiquidity, RemoveLiquidity, Router, SwapExactInput};
pub use crate::token::InMemoryTokens;
pub use crate::traits::{FeeSource, FlashSwapCallee, FromConfig, TokenLedger};
