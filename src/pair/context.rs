//! Per-call environment handed to pair operations.

use core::fmt;

use crate::domain::Address;
use crate::traits::{FeeSource, TokenLedger};

/// Who is calling, when, and against which collaborators.
///
/// `timestamp` is in seconds; the pair keeps it modulo `2^32`.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// Token ledger the pair settles against.
    pub tokens: &'a dyn TokenLedger,
    /// Protocol fee recipient lookup.
    pub fees: &'a dyn FeeSource,
    /// The caller.
    pub sender: Address,
    /// Current time in seconds.
    pub timestamp: u64,
}

impl<'a> Context<'a> {
    /// Builds a context.
    #[must_use]
    pub fn new(
        tokens: &'a dyn TokenLedger,
        fees: &'a dyn FeeSource,
        sender: Address,
        timestamp: u64,
    ) -> Self {
        Self {
            tokens,
            fees,
            sender,
            timestamp,
        }
    }

    /// The same context with a different caller.
    #[must_use]
    pub fn with_sender(self, sender: Address) -> Self {
        Self { sender, ..self }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("sender", &self.sender)
            .field("timestamp", &self.timestamp)
            .field("fee_to", &self.fees.fee_to())
            .finish_non_exhaustive()
    }
}
