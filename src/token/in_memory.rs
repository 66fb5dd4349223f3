//! An in-process [`TokenLedger`] for simulations and tests.

use core::fmt;
use std::collections::{HashMap, HashSet};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use tracing::trace;

use crate::domain::{Address, Amount};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;
use crate::traits::{Checkpoint, RollbackHook, TokenLedger};

#[derive(Debug, Default)]
struct Books {
    balances: HashMap<(Address, Address), Amount>,
    allowances: HashMap<(Address, Address, Address), Amount>,
    frozen: HashSet<Address>,
}

impl Books {
    fn balance(&self, token: Address, holder: Address) -> Amount {
        self.balances
            .get(&(token, holder))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn allowance(&self, key: (Address, Address, Address)) -> Amount {
        self.allowances.get(&key).copied().unwrap_or(Amount::ZERO)
    }
}

/// Previous value of one ledger entry.
#[derive(Debug, Clone, Copy)]
enum Undo {
    Balance {
        key: (Address, Address),
        prev: Amount,
    },
    Allowance {
        key: (Address, Address, Address),
        prev: Amount,
    },
    Frozen {
        token: Address,
        was: bool,
    },
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    undo_len: usize,
    hooks_len: usize,
}

#[derive(Default)]
struct Inner {
    books: Books,
    owner: Option<ThreadId>,
    frames: Vec<Frame>,
    undo: Vec<Undo>,
    hooks: Vec<RollbackHook>,
}

impl Inner {
    fn set_balance(&mut self, token: Address, holder: Address, amount: Amount) {
        let key = (token, holder);
        if !self.frames.is_empty() {
            let prev = self.books.balance(token, holder);
            self.undo.push(Undo::Balance { key, prev });
        }
        self.books.balances.insert(key, amount);
    }

    fn set_allowance(&mut self, key: (Address, Address, Address), amount: Amount) {
        if !self.frames.is_empty() {
            let prev = self.books.allowance(key);
            self.undo.push(Undo::Allowance { key, prev });
        }
        self.books.allowances.insert(key, amount);
    }

    fn set_frozen(&mut self, token: Address, frozen: bool) {
        if !self.frames.is_empty() {
            let was = self.books.frozen.contains(&token);
            self.undo.push(Undo::Frozen { token, was });
        }
        if frozen {
            self.books.frozen.insert(token);
        } else {
            self.books.frozen.remove(&token);
        }
    }

    fn move_tokens(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AmmError> {
        if self.books.frozen.contains(&token) {
            return Err(AmmError::TransferFailed("token is frozen"));
        }
        let from_balance = self
            .books
            .balance(token, from)
            .checked_sub(&amount)
            .ok_or(AmmError::InsufficientBalance)?;
        self.set_balance(token, from, from_balance);
        let to_balance = self.books.balance(token, to).safe_add(&amount)?;
        self.set_balance(token, to, to_balance);
        Ok(())
    }

    fn revert(&mut self, entry: Undo) {
        match entry {
            Undo::Balance { key, prev } => {
                self.books.balances.insert(key, prev);
            }
            Undo::Allowance { key, prev } => {
                self.books.allowances.insert(key, prev);
            }
            Undo::Frozen { token, was: true } => {
                self.books.frozen.insert(token);
            }
            Undo::Frozen { token, was: false } => {
                self.books.frozen.remove(&token);
            }
        }
    }
}

impl fmt::Debug for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inner")
            .field("books", &self.books)
            .field("owner", &self.owner)
            .field("depth", &self.frames.len())
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

/// Multi-token balances held in memory.
///
/// Every token is a plain balance map with ERC-20 style allowances.  An
/// allowance of [`Amount::MAX`] is treated as unlimited and never
/// decreases.  A token can be frozen to make all its transfers fail,
/// which is handy for exercising rollback paths.
///
/// While checkpoints are open, every write records the entry's previous
/// value; rolling back replays that log, so a rollback only undoes the
/// writes made inside the transaction.  The first checkpoint makes the
/// calling thread the ledger's owner until the outermost checkpoint is
/// resolved.  Other threads block on any call that touches the ledger
/// until then.
///
/// # Examples
///
/// ```
/// use pair_amm::domain::{Address, Amount};
/// use pair_amm::token::InMemoryTokens;
/// use pair_amm::traits::TokenLedger;
///
/// let tokens = InMemoryTokens::new();
/// let usdc = Address::from_bytes([1u8; 32]);
/// let alice = Address::from_bytes([0xa1; 32]);
/// let bob = Address::from_bytes([0xb0; 32]);
///
/// tokens.mint(usdc, alice, Amount::new(100)).expect("mint");
/// tokens.transfer(usdc, alice, bob, Amount::new(40)).expect("transfer");
/// assert_eq!(tokens.balance_of(usdc, bob).expect("balance"), Amount::new(40));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTokens {
    inner: Mutex<Inner>,
    idle: Condvar,
}

impl InMemoryTokens {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the ledger once no other thread has a transaction open.
    fn enter(&self) -> MutexGuard<'_, Inner> {
        let me = thread::current().id();
        let mut inner = self.lock();
        while inner.owner.is_some_and(|owner| owner != me) {
            inner = self
                .idle
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        inner
    }

    fn release(&self, mut inner: MutexGuard<'_, Inner>) {
        if inner.frames.is_empty() {
            inner.owner = None;
            inner.undo.clear();
            inner.hooks.clear();
            drop(inner);
            self.idle.notify_all();
        }
    }

    /// Creates `amount` of `token` out of thin air for `to`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the balance would exceed `u128`.
    pub fn mint(&self, token: Address, to: Address, amount: Amount) -> Result<(), AmmError> {
        let mut inner = self.enter();
        let balance = inner.books.balance(token, to).safe_add(&amount)?;
        inner.set_balance(token, to, balance);
        Ok(())
    }

    /// Sets the allowance `spender` may move out of `owner`'s `token`.
    pub fn approve(&self, token: Address, owner: Address, spender: Address, amount: Amount) {
        self.enter().set_allowance((token, owner, spender), amount);
    }

    /// Returns the remaining allowance.
    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount {
        self.enter().books.allowance((token, owner, spender))
    }

    /// Freezes or unfreezes every transfer of `token`.
    pub fn set_frozen(&self, token: Address, frozen: bool) {
        self.enter().set_frozen(token, frozen);
    }
}

impl TokenLedger for InMemoryTokens {
    fn balance_of(&self, token: Address, holder: Address) -> Result<Amount, AmmError> {
        Ok(self.enter().books.balance(token, holder))
    }

    fn transfer(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AmmError> {
        self.enter().move_tokens(token, from, to, amount)?;
        trace!(%token, %from, %to, %amount, "token transfer");
        Ok(())
    }

    fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AmmError> {
        let mut inner = self.enter();
        let key = (token, from, spender);
        let allowed = inner.books.allowance(key);
        if allowed < amount {
            return Err(AmmError::InsufficientAllowance);
        }
        inner.move_tokens(token, from, to, amount)?;
        if allowed != Amount::MAX {
            inner.set_allowance(key, allowed.safe_sub(&amount)?);
        }
        trace!(%token, %spender, %from, %to, %amount, "token transfer_from");
        Ok(())
    }

    fn checkpoint(&self) -> Checkpoint {
        let mut inner = self.enter();
        inner.owner = Some(thread::current().id());
        let frame = Frame {
            undo_len: inner.undo.len(),
            hooks_len: inner.hooks.len(),
        };
        inner.frames.push(frame);
        Checkpoint::new(inner.frames.len() - 1)
    }

    fn commit(&self, checkpoint: Checkpoint) {
        let mut inner = self.enter();
        inner.frames.truncate(checkpoint.depth());
        self.release(inner);
    }

    fn rollback(&self, checkpoint: Checkpoint) {
        let mut inner = self.enter();
        let Some(frame) = inner.frames.get(checkpoint.depth()).copied() else {
            return;
        };
        for entry in inner.undo.split_off(frame.undo_len).into_iter().rev() {
            inner.revert(entry);
        }
        let hooks = inner.hooks.split_off(frame.hooks_len);
        drop(inner);
        // hooks run while this thread still owns the ledger
        for hook in hooks.into_iter().rev() {
            hook();
        }
        let mut inner = self.enter();
        inner.frames.truncate(checkpoint.depth());
        trace!(depth = checkpoint.depth(), "ledger rolled back");
        self.release(inner);
    }

    fn on_rollback(&self, hook: RollbackHook) {
        let mut inner = self.enter();
        if !inner.frames.is_empty() {
            inner.hooks.push(hook);
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::traits::atomic;

    const TOKEN: Address = Address::from_bytes([1u8; 32]);
    const ALICE: Address = Address::from_bytes([0xa1; 32]);
    const BOB: Address = Address::from_bytes([0xb0; 32]);

    fn funded() -> InMemoryTokens {
        let tokens = InMemoryTokens::new();
        let Ok(()) = tokens.mint(TOKEN, ALICE, Amount::new(1_000)) else {
            panic!("mint failed");
        };
        tokens
    }

    fn balance(tokens: &InMemoryTokens, holder: Address) -> Amount {
        let Ok(b) = tokens.balance_of(TOKEN, holder) else {
            panic!("balance failed");
        };
        b
    }

    #[test]
    fn transfer_moves_balance() {
        let tokens = funded();
        let Ok(()) = tokens.transfer(TOKEN, ALICE, BOB, Amount::new(300)) else {
            panic!("transfer failed");
        };
        assert_eq!(balance(&tokens, ALICE), Amount::new(700));
        assert_eq!(balance(&tokens, BOB), Amount::new(300));
    }

    #[test]
    fn overdraft_rejected() {
        let tokens = funded();
        assert_eq!(
            tokens.transfer(TOKEN, ALICE, BOB, Amount::new(1_001)),
            Err(AmmError::InsufficientBalance)
        );
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let tokens = funded();
        tokens.approve(TOKEN, ALICE, BOB, Amount::new(500));
        let Ok(()) = tokens.transfer_from(TOKEN, BOB, ALICE, BOB, Amount::new(200)) else {
            panic!("transfer_from failed");
        };
        assert_eq!(tokens.allowance(TOKEN, ALICE, BOB), Amount::new(300));
        assert_eq!(
            tokens.transfer_from(TOKEN, BOB, ALICE, BOB, Amount::new(301)),
            Err(AmmError::InsufficientAllowance)
        );
    }

    #[test]
    fn unlimited_allowance_is_not_spent() {
        let tokens = funded();
        tokens.approve(TOKEN, ALICE, BOB, Amount::MAX);
        let Ok(()) = tokens.transfer_from(TOKEN, BOB, ALICE, BOB, Amount::new(200)) else {
            panic!("transfer_from failed");
        };
        assert_eq!(tokens.allowance(TOKEN, ALICE, BOB), Amount::MAX);
    }

    #[test]
    fn frozen_token_fails() {
        let tokens = funded();
        tokens.set_frozen(TOKEN, true);
        let Err(AmmError::TransferFailed(_)) = tokens.transfer(TOKEN, ALICE, BOB, Amount::new(1))
        else {
            panic!("expected TransferFailed");
        };
        tokens.set_frozen(TOKEN, false);
        assert!(tokens.transfer(TOKEN, ALICE, BOB, Amount::new(1)).is_ok());
    }

    #[test]
    fn atomic_rolls_back_on_error() {
        let tokens = funded();
        let result: Result<(), AmmError> = atomic(&tokens, || {
            tokens.transfer(TOKEN, ALICE, BOB, Amount::new(100))?;
            Err(AmmError::InvariantViolation)
        });
        assert_eq!(result, Err(AmmError::InvariantViolation));
        assert_eq!(balance(&tokens, ALICE), Amount::new(1_000));
        assert_eq!(balance(&tokens, BOB), Amount::ZERO);
    }

    #[test]
    fn nested_checkpoints_resolve_inner_first() {
        let tokens = funded();
        let outer = tokens.checkpoint();
        let Ok(()) = tokens.transfer(TOKEN, ALICE, BOB, Amount::new(100)) else {
            panic!("transfer failed");
        };
        let inner = tokens.checkpoint();
        let Ok(()) = tokens.transfer(TOKEN, ALICE, BOB, Amount::new(50)) else {
            panic!("transfer failed");
        };
        tokens.commit(inner);
        assert_eq!(balance(&tokens, BOB), Amount::new(150));
        tokens.rollback(outer);
        assert_eq!(balance(&tokens, BOB), Amount::ZERO);
    }

    #[test]
    fn rollback_restores_allowance_and_frozen_flag() {
        let tokens = funded();
        tokens.approve(TOKEN, ALICE, BOB, Amount::new(500));
        let checkpoint = tokens.checkpoint();
        let Ok(()) = tokens.transfer_from(TOKEN, BOB, ALICE, BOB, Amount::new(200)) else {
            panic!("transfer_from failed");
        };
        tokens.set_frozen(TOKEN, true);
        tokens.rollback(checkpoint);

        assert_eq!(tokens.allowance(TOKEN, ALICE, BOB), Amount::new(500));
        assert_eq!(balance(&tokens, BOB), Amount::ZERO);
        assert!(tokens.transfer(TOKEN, ALICE, BOB, Amount::new(1)).is_ok());
    }

    #[test]
    fn hooks_follow_the_outermost_checkpoint() {
        let tokens = funded();
        let fired = Arc::new(AtomicUsize::new(0));
        let hook = |fired: &Arc<AtomicUsize>| -> RollbackHook {
            let fired = Arc::clone(fired);
            Box::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        };

        // no transaction: nothing to undo
        tokens.on_rollback(hook(&fired));

        // committed all the way out: dropped
        let only = tokens.checkpoint();
        tokens.on_rollback(hook(&fired));
        tokens.commit(only);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        // committed inner, rolled back outer: fired
        let outer = tokens.checkpoint();
        let inner = tokens.checkpoint();
        tokens.on_rollback(hook(&fired));
        tokens.commit(inner);
        tokens.rollback(outer);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn other_threads_wait_for_the_open_transaction() {
        let tokens = funded();
        let checkpoint = tokens.checkpoint();
        let Ok(()) = tokens.transfer(TOKEN, ALICE, BOB, Amount::new(100)) else {
            panic!("transfer failed");
        };
        std::thread::scope(|scope| {
            scope.spawn(|| {
                let Ok(()) = tokens.transfer(TOKEN, ALICE, BOB, Amount::new(7)) else {
                    panic!("transfer failed");
                };
            });
            tokens.rollback(checkpoint);
        });
        // the rollback undid only its own transfer
        assert_eq!(balance(&tokens, BOB), Amount::new(7));
        assert_eq!(balance(&tokens, ALICE), Amount::new(993));
    }
}
