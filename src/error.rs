//! Unified error type for the pair engine.
//!
//! Every fallible operation in the crate returns [`AmmError`].  Errors are
//! terminal for the call that produced them: a mutating pair or router
//! call that fails leaves no partial effect behind.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, AmmError>;

/// Failure reasons for pair, router, factory and ledger operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmmError {
    /// The caller-supplied deadline is already in the past.
    #[error("transaction expired")]
    Expired,

    /// The caller is not allowed to perform a privileged call.
    #[error("forbidden")]
    Forbidden,

    /// The asset is not one of the pair's two tokens.
    #[error("asset is not part of this pair")]
    InvalidAsset,

    /// The swap recipient is one of the pooled token identities.
    #[error("invalid recipient")]
    InvalidTo,

    /// No output was requested, or the quoted output is below the minimum.
    #[error("insufficient output amount")]
    InsufficientOutputAmount,

    /// Nothing arrived on either side of a swap.
    #[error("insufficient input amount")]
    InsufficientInputAmount,

    /// The requested output would drain a reserve, or reserves are empty.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// A deposit would mint zero shares.
    #[error("insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    /// A withdrawal would return zero of either token.
    #[error("insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    /// Token A amount is below the caller's minimum.
    #[error("insufficient A amount")]
    InsufficientAAmount,

    /// Token B amount is below the caller's minimum.
    #[error("insufficient B amount")]
    InsufficientBAmount,

    /// The resolved deposit exceeds what the caller offered.
    #[error("resolved amount exceeds desired amount")]
    AmountExceedsDesired,

    /// The fee-adjusted constant product decreased across a swap.
    #[error("constant product invariant violated")]
    InvariantViolation,

    /// A quote was requested for a zero amount.
    #[error("insufficient amount")]
    InsufficientAmount,

    /// A mutating call re-entered a pair that is already mid-operation.
    #[error("pair is locked")]
    Locked,

    /// Arithmetic overflow (or a value exceeding its fixed bit width).
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Arithmetic underflow.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A token collaborator refused a transfer.
    #[error("token transfer failed: {0}")]
    TransferFailed(&'static str),

    /// Both sides of a pair are the same token.
    #[error("identical addresses")]
    IdenticalAddresses,

    /// The zero address was used where a real identity is required.
    #[error("zero address")]
    ZeroAddress,

    /// A pair for these tokens already exists.
    #[error("pair already exists")]
    PairExists,

    /// No pair is registered for these tokens.
    #[error("pair not found")]
    PairNotFound,

    /// `initialize` was called on a pair that already has its tokens.
    #[error("pair already initialized")]
    AlreadyInitialized,

    /// The pair has not been initialized with its tokens yet.
    #[error("pair not initialized")]
    NotInitialized,

    /// A holder tried to move more shares or tokens than it owns.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// A spender tried to move more than it was approved for.
    #[error("insufficient allowance")]
    InsufficientAllowance,

    /// A TWAP update came before the observation window elapsed.
    #[error("observation period not elapsed")]
    PeriodNotElapsed,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        assert_eq!(
            AmmError::Overflow("reserve0").to_string(),
            "arithmetic overflow: reserve0"
        );
        assert_eq!(AmmError::Locked.to_string(), "pair is locked");
    }

    #[test]
    fn errors_compare_by_value() {
        assert_eq!(AmmError::Expired, AmmError::Expired);
        assert_ne!(AmmError::InsufficientAAmount, AmmError::InsufficientBAmount);
    }
}
