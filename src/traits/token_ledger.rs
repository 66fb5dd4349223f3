//! The token collaborator a pair settles against.
//!
//! A pair never stores token balances itself.  It infers deposits by
//! comparing [`TokenLedger::balance_of`] with its recorded reserves and
//! pays out with [`TokenLedger::transfer`].  Any error from the ledger
//! aborts the whole pair operation.
//!
//! # Checkpoints
//!
//! Ledgers expose nested checkpoints so a failed operation can undo the
//! transfers it already made.  A checkpoint is either committed (its
//! effects are kept) or rolled back (the ledger returns to the state it
//! had when the checkpoint was taken).  Checkpoints nest like a stack and
//! are resolved innermost first.
//!
//! A committed inner checkpoint is still undone if an enclosing one rolls
//! back.  State kept outside the ledger (a pair's reserves) follows the
//! same rule by registering a [`RollbackHook`] with
//! [`TokenLedger::on_rollback`].
//!
//! The open checkpoint stack is one transaction.  Implementations must
//! keep transactions exclusive: while one caller has checkpoints open, no
//! other caller's transfers or checkpoints may interleave with it.

use crate::domain::{Address, Amount};
use crate::error::AmmError;

/// Undo action for state kept outside the ledger.
pub type RollbackHook = Box<dyn FnOnce() + Send>;

/// Opaque handle to a ledger checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checkpoint(usize);

impl Checkpoint {
    /// Wraps a ledger-specific checkpoint depth.
    #[must_use]
    pub const fn new(depth: usize) -> Self {
        Self(depth)
    }

    /// Returns the checkpoint depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.0
    }
}

/// Balances and transfers for any number of tokens.
pub trait TokenLedger: Send + Sync {
    /// Balance of `holder` in `token`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; typically [`AmmError::TransferFailed`].
    fn balance_of(&self, token: Address, holder: Address) -> Result<Amount, AmmError>;

    /// Moves `amount` of `token` from `from` to `to` on `from`'s authority.
    ///
    /// # Errors
    ///
    /// [`AmmError::InsufficientBalance`] or [`AmmError::TransferFailed`].
    fn transfer(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AmmError>;

    /// Moves `amount` of `token` from `from` to `to` using `spender`'s
    /// allowance.
    ///
    /// # Errors
    ///
    /// [`AmmError::InsufficientAllowance`] in addition to the failures of
    /// [`transfer`](Self::transfer).
    fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AmmError>;

    /// Opens a checkpoint.
    fn checkpoint(&self) -> Checkpoint;

    /// Keeps every change made since `checkpoint`.
    fn commit(&self, checkpoint: Checkpoint);

    /// Discards every change made since `checkpoint` and runs, newest
    /// first, the hooks registered since then.
    fn rollback(&self, checkpoint: Checkpoint);

    /// Registers `hook` with the innermost open checkpoint.
    ///
    /// The hook runs if that checkpoint or any checkpoint enclosing it is
    /// rolled back, and is dropped once the outermost checkpoint commits.
    /// Without an open checkpoint there is nothing to undo and the hook is
    /// dropped immediately.
    fn on_rollback(&self, hook: RollbackHook);
}

/// Runs `body` inside a ledger checkpoint.
///
/// The checkpoint is committed when `body` succeeds and rolled back when
/// it fails, so token movements made by a failing operation never leak.
///
/// # Errors
///
/// Whatever `body` returns.
pub fn atomic<T>(
    tokens: &dyn TokenLedger,
    body: impl FnOnce() -> Result<T, AmmError>,
) -> Result<T, AmmError> {
    let checkpoint = tokens.checkpoint();
    match body() {
        Ok(value) => {
            tokens.commit(checkpoint);
            Ok(value)
        }
        Err(err) => {
            tokens.rollback(checkpoint);
            Err(err)
        }
    }
}
