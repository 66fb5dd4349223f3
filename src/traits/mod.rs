//! Seams between the pair engine and its collaborators.
//!
//! - [`TokenLedger`]: token balances and transfers, with checkpoints.
//! - [`FeeSource`]: protocol fee recipient.
//! - [`FlashSwapCallee`]: mid-swap callback.
//! - [`FromConfig`]: configuration-driven construction.

mod fee_source;
mod flash_callee;
mod from_config;
mod token_ledger;

pub use fee_source::FeeSource;
pub use flash_callee::FlashSwapCallee;
pub use from_config::FromConfig;
pub use token_ledger::{atomic, Checkpoint, RollbackHook, TokenLedger};
