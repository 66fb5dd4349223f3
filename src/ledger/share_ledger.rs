//! Fungible pair shares with ERC-20 style balances and allowances.

use std::collections::HashMap;

use crate::domain::{Address, Liquidity};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;

/// Record of one share-ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareEvent {
    /// Shares moved; mints come from and burns go to [`Address::ZERO`].
    Transfer {
        /// Debited holder.
        from: Address,
        /// Credited holder.
        to: Address,
        /// Shares moved.
        value: Liquidity,
    },
    /// An allowance was set.
    Approval {
        /// Share owner.
        owner: Address,
        /// Approved spender.
        spender: Address,
        /// New allowance.
        value: Liquidity,
    },
}

/// Share supply, balances and allowances of one pair.
///
/// Minting and burning are reserved to the pair.  [`Address::ZERO`] can
/// receive shares (the locked minimum liquidity lives there) but never
/// send or approve them, so those shares stay locked forever.
///
/// An allowance of [`Liquidity::MAX`] is unlimited and never decreases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareLedger {
    total_supply: Liquidity,
    balances: HashMap<Address, Liquidity>,
    allowances: HashMap<(Address, Address), Liquidity>,
}

impl ShareLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total shares in existence.
    pub const fn total_supply(&self) -> Liquidity {
        self.total_supply
    }

    /// Shares held by `holder`.
    pub fn balance_of(&self, holder: Address) -> Liquidity {
        self.balances.get(&holder).copied().unwrap_or(Liquidity::ZERO)
    }

    /// Shares `spender` may still move on behalf of `owner`.
    pub fn allowance(&self, owner: Address, spender: Address) -> Liquidity {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(Liquidity::ZERO)
    }

    pub(crate) fn mint(&mut self, to: Address, value: Liquidity) -> Result<ShareEvent, AmmError> {
        self.total_supply = self.total_supply.safe_add(&value)?;
        let balance = self.balance_of(to).safe_add(&value)?;
        self.balances.insert(to, balance);
        Ok(ShareEvent::Transfer {
            from: Address::ZERO,
            to,
            value,
        })
    }

    pub(crate) fn burn(&mut self, from: Address, value: Liquidity) -> Result<ShareEvent, AmmError> {
        self.debit(from, value)?;
        self.total_supply = self.total_supply.safe_sub(&value)?;
        Ok(ShareEvent::Transfer {
            from,
            to: Address::ZERO,
            value,
        })
    }

    pub(crate) fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        value: Liquidity,
    ) -> Result<ShareEvent, AmmError> {
        if owner.is_zero() {
            return Err(AmmError::ZeroAddress);
        }
        self.allowances.insert((owner, spender), value);
        Ok(ShareEvent::Approval {
            owner,
            spender,
            value,
        })
    }

    pub(crate) fn transfer(
        &mut self,
        from: Address,
        to: Address,
        value: Liquidity,
    ) -> Result<ShareEvent, AmmError> {
        if from.is_zero() {
            return Err(AmmError::ZeroAddress);
        }
        self.debit(from, value)?;
        let balance = self.balance_of(to).safe_add(&value)?;
        self.balances.insert(to, balance);
        Ok(ShareEvent::Transfer { from, to, value })
    }

    pub(crate) fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        value: Liquidity,
    ) -> Result<ShareEvent, AmmError> {
        let allowed = self.allowance(from, spender);
        if allowed != Liquidity::MAX {
            let remaining = allowed
                .checked_sub(&value)
                .ok_or(AmmError::InsufficientAllowance)?;
            self.allowances.insert((from, spender), remaining);
        }
        self.transfer(from, to, value)
    }

    fn debit(&mut self, holder: Address, value: Liquidity) -> Result<(), AmmError> {
        let balance = self
            .balance_of(holder)
            .checked_sub(&value)
            .ok_or(AmmError::InsufficientBalance)?;
        self.balances.insert(holder, balance);
        Ok(())
    }
}
