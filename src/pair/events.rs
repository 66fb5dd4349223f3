//! Events a pair records.

use crate::domain::{Address, Amount, Liquidity};
use crate::ledger::ShareEvent;

/// Observable record of a completed pair operation.
///
/// Events are journaled only when the operation that produced them
/// succeeds.  Drain them with [`Pair::take_events`](super::Pair::take_events).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairEvent {
    /// Liquidity was added.
    Mint {
        sender: Address,
        amount0: Amount,
        amount1: Amount,
    },
    /// Liquidity was removed and paid to `to`.
    Burn {
        sender: Address,
        amount0: Amount,
        amount1: Amount,
        to: Address,
    },
    /// A swap settled.
    Swap {
        sender: Address,
        amount0_in: Amount,
        amount1_in: Amount,
        amount0_out: Amount,
        amount1_out: Amount,
        to: Address,
    },
    /// Reserves were written.
    Sync { reserve0: Amount, reserve1: Amount },
    /// Shares moved (mints come from, burns go to, the zero address).
    Transfer {
        from: Address,
        to: Address,
        value: Liquidity,
    },
    /// A share allowance was set.
    Approval {
        owner: Address,
        spender: Address,
        value: Liquidity,
    },
}

impl From<ShareEvent> for PairEvent {
    fn from(event: ShareEvent) -> Self {
        match event {
            ShareEvent::Transfer { from, to, value } => Self::Transfer { from, to, value },
            ShareEvent::Approval {
                owner,
                spender,
                value,
            } => Self::Approval {
                owner,
                spender,
                value,
            },
        }
    }
}
