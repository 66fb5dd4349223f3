//! The constant-product pair.
//!
//! A [`Pair`] pools two tokens, issues shares against them and trades one
//! for the other while keeping `reserve0 * reserve1` from shrinking.  It
//! never holds token balances itself: deposits are inferred by comparing
//! the ledger balance of the pair's address with its recorded reserves.
//!
//! # Concurrency
//!
//! All methods take `&self`.  Reads load an immutable snapshot and never
//! block.  Each mutation opens a ledger checkpoint, which makes it part
//! of the caller's ledger transaction, then runs under a non-reentrant
//! lock on a private copy of the state.  The copy is published only when
//! the operation succeeds, and a rollback hook puts the previous state
//! back if an enclosing checkpoint later rolls back.  A failed flash swap
//! on one pair therefore also undoes whatever its callee did to other
//! pairs.
//!
//! Reads taken while an enclosing transaction is still open can see state
//! that is later rolled back.
//!
//! # Examples
//!
//! ```
//! use pair_amm::domain::{Address, Amount};
//! use pair_amm::factory::PairFactory;
//! use pair_amm::pair::Context;
//! use pair_amm::token::InMemoryTokens;
//!
//! let factory = PairFactory::new(Address::from_bytes([0xfa; 32]), Address::ZERO);
//! let (usdc, weth) = (Address::from_bytes([1; 32]), Address::from_bytes([2; 32]));
//! let pair = factory
//!     .create_pair(usdc, weth)
//!     .and_then(|addr| factory.pair(addr).ok_or(pair_amm::error::AmmError::PairNotFound))
//!     .expect("pair created");
//!
//! let tokens = InMemoryTokens::new();
//! let lp = Address::from_bytes([0xa1; 32]);
//! tokens.mint(usdc, pair.address(), Amount::new(5_000)).expect("fund");
//! tokens.mint(weth, pair.address(), Amount::new(5_000)).expect("fund");
//!
//! let ctx = Context::new(&tokens, &factory, lp, 1_700_000_000);
//! let shares = pair.mint(&ctx, lp).expect("mint");
//! assert_eq!(shares.get(), 4_000);
//! ```

mod context;
mod events;
mod guard;
mod liquidity;
mod reserves;
mod swap;

#[cfg(test)]
mod proptest_properties;

use core::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use primitive_types::U256;
use tracing::{debug, warn};

use crate::config::PairConfig;
use crate::domain::{Address, Amount, Liquidity};
use crate::error::AmmError;
use crate::ledger::ShareLedger;
use crate::traits::atomic;

pub use context::Context;
pub use events::PairEvent;
pub use reserves::{block_timestamp, Reserves};

use guard::ReentrancyGuard;

/// Everything a pair stores.  Replaced wholesale on every mutation; the
/// share ledger is shared between versions until shares change.
#[derive(Debug, Clone, Default)]
pub(crate) struct PairState {
    pub(crate) token0: Address,
    pub(crate) token1: Address,
    pub(crate) reserve0: Amount,
    pub(crate) reserve1: Amount,
    pub(crate) block_timestamp_last: u32,
    pub(crate) price0_cumulative_last: U256,
    pub(crate) price1_cumulative_last: U256,
    pub(crate) k_last: U256,
    pub(crate) shares: Arc<ShareLedger>,
}

impl PairState {
    fn is_initialized(&self) -> bool {
        !self.token0.is_zero()
    }

    /// Share ledger for writing, copied first if an older state still
    /// shares it.
    pub(crate) fn shares_mut(&mut self) -> &mut ShareLedger {
        Arc::make_mut(&mut self.shares)
    }
}

/// A constant-product liquidity pair.
pub struct Pair {
    address: Address,
    factory: Address,
    config: PairConfig,
    state: Arc<ArcSwap<PairState>>,
    lock: AtomicBool,
    journal: Arc<Mutex<Vec<PairEvent>>>,
}

impl Pair {
    /// Creates an uninitialized pair at `address`, owned by `factory`.
    #[must_use]
    pub fn new(address: Address, factory: Address, config: PairConfig) -> Self {
        Self {
            address,
            factory,
            config,
            state: Arc::new(ArcSwap::from_pointee(PairState::default())),
            lock: AtomicBool::new(false),
            journal: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sets the two tokens.  Callable once, by the factory.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Forbidden`] if `caller` is not the factory.
    /// - [`AmmError::AlreadyInitialized`] on a second call.
    /// - [`AmmError::IdenticalAddresses`] / [`AmmError::ZeroAddress`] for
    ///   an invalid token pair.
    /// - [`AmmError::Locked`] if another mutation is in flight.
    pub fn initialize(&self, caller: Address, token0: Address, token1: Address) -> Result<(), AmmError> {
        if caller != self.factory {
            return Err(AmmError::Forbidden);
        }
        let tokens = crate::domain::TokenPair::new(token0, token1)?;
        let _guard = self.acquire("initialize")?;
        let current = self.state.load();
        if current.is_initialized() {
            return Err(AmmError::AlreadyInitialized);
        }
        let mut state = PairState::clone(&current);
        state.token0 = tokens.first();
        state.token1 = tokens.second();
        self.state.store(Arc::new(state));
        debug!(pair = %self.address, token0 = %tokens.first(), token1 = %tokens.second(), "pair initialized");
        Ok(())
    }

    // -- views ---------------------------------------------------------------

    /// The pair's own identity (where its token balances live).
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The factory that created this pair.
    #[must_use]
    pub const fn factory(&self) -> Address {
        self.factory
    }

    /// Economic parameters.
    #[must_use]
    pub const fn config(&self) -> &PairConfig {
        &self.config
    }

    /// Lower-ordered token.
    #[must_use]
    pub fn token0(&self) -> Address {
        self.state.load().token0
    }

    /// Higher-ordered token.
    #[must_use]
    pub fn token1(&self) -> Address {
        self.state.load().token1
    }

    /// Recorded reserves and the timestamp of their last write.
    ///
    /// Reads one published snapshot, so the three values are always
    /// mutually consistent.
    pub fn get_reserves(&self) -> Reserves {
        let state = self.state.load();
        Reserves::new(state.reserve0, state.reserve1, state.block_timestamp_last)
    }

    /// Accumulated `reserve1 / reserve0` price, UQ112x112 times seconds.
    #[must_use]
    pub fn price0_cumulative_last(&self) -> U256 {
        self.state.load().price0_cumulative_last
    }

    /// Accumulated `reserve0 / reserve1` price, UQ112x112 times seconds.
    #[must_use]
    pub fn price1_cumulative_last(&self) -> U256 {
        self.state.load().price1_cumulative_last
    }

    /// `reserve0 * reserve1` after the last mint or burn while the
    /// protocol fee was on; zero otherwise.
    #[must_use]
    pub fn k_last(&self) -> U256 {
        self.state.load().k_last
    }

    /// Total shares outstanding.
    pub fn total_supply(&self) -> Liquidity {
        self.state.load().shares.total_supply()
    }

    /// Shares held by `holder`.
    pub fn balance_of(&self, holder: Address) -> Liquidity {
        self.state.load().shares.balance_of(holder)
    }

    /// Shares `spender` may move for `owner`.
    pub fn allowance(&self, owner: Address, spender: Address) -> Liquidity {
        self.state.load().shares.allowance(owner, spender)
    }

    /// Drains the event journal.
    #[must_use]
    pub fn take_events(&self) -> Vec<PairEvent> {
        core::mem::take(&mut *self.journal())
    }

    // -- share ledger ----------------------------------------------------------

    /// Lets `spender` move up to `value` of the caller's shares.
    ///
    /// # Errors
    ///
    /// [`AmmError::Locked`] mid-operation, [`AmmError::ZeroAddress`] for a
    /// zero caller.
    pub fn approve(&self, ctx: &Context<'_>, spender: Address, value: Liquidity) -> Result<(), AmmError> {
        self.execute(ctx, "approve", |state, events| {
            events.push(state.shares_mut().approve(ctx.sender, spender, value)?.into());
            Ok(())
        })
    }

    /// Moves `value` of the caller's shares to `to`.
    ///
    /// # Errors
    ///
    /// [`AmmError::InsufficientBalance`], [`AmmError::Locked`].
    pub fn transfer(&self, ctx: &Context<'_>, to: Address, value: Liquidity) -> Result<(), AmmError> {
        self.execute(ctx, "transfer", |state, events| {
            events.push(state.shares_mut().transfer(ctx.sender, to, value)?.into());
            Ok(())
        })
    }

    /// Moves `value` of `from`'s shares to `to` on the caller's allowance.
    ///
    /// # Errors
    ///
    /// [`AmmError::InsufficientAllowance`], [`AmmError::InsufficientBalance`],
    /// [`AmmError::Locked`].
    pub fn transfer_from(
        &self,
        ctx: &Context<'_>,
        from: Address,
        to: Address,
        value: Liquidity,
    ) -> Result<(), AmmError> {
        self.execute(ctx, "transfer_from", |state, events| {
            events.push(state.shares_mut().transfer_from(ctx.sender, from, to, value)?.into());
            Ok(())
        })
    }

    // -- internals -----------------------------------------------------------

    fn journal(&self) -> MutexGuard<'_, Vec<PairEvent>> {
        lock_journal(&self.journal)
    }

    fn acquire(&self, op: &'static str) -> Result<ReentrancyGuard<'_>, AmmError> {
        ReentrancyGuard::acquire(&self.lock).inspect_err(|_| {
            warn!(pair = %self.address, op, "rejected re-entrant call");
        })
    }

    /// Current published state.
    pub(crate) fn load_state(&self) -> Arc<PairState> {
        self.state.load_full()
    }

    /// Runs one mutating operation atomically.
    ///
    /// `body` works on a private copy of the state and collects events;
    /// both are published only if it succeeds.  Token movements made by a
    /// failing `body` are rolled back.  The checkpoint is opened before
    /// the lock is taken, so a caller waiting for another thread's ledger
    /// transaction does not hold this pair locked meanwhile.
    fn execute<T>(
        &self,
        ctx: &Context<'_>,
        op: &'static str,
        body: impl FnOnce(&mut PairState, &mut Vec<PairEvent>) -> Result<T, AmmError>,
    ) -> Result<T, AmmError> {
        atomic(ctx.tokens, || {
            let _guard = self.acquire(op)?;
            let previous = self.state.load_full();
            if !previous.is_initialized() {
                return Err(AmmError::NotInitialized);
            }
            let mut state = PairState::clone(&previous);
            let mut events = Vec::new();
            let out = body(&mut state, &mut events)?;
            self.publish(ctx, previous, state, events);
            Ok(out)
        })
    }

    /// Stores `state`, journals `events` and registers their undo with the
    /// open ledger checkpoint.
    fn publish(
        &self,
        ctx: &Context<'_>,
        previous: Arc<PairState>,
        state: PairState,
        events: Vec<PairEvent>,
    ) {
        self.state.store(Arc::new(state));
        let journal_len = {
            let mut journal = self.journal();
            let len = journal.len();
            journal.extend(events);
            len
        };
        let cell = Arc::clone(&self.state);
        let journal = Arc::clone(&self.journal);
        let address = self.address;
        ctx.tokens.on_rollback(Box::new(move || {
            cell.store(previous);
            lock_journal(&journal).truncate(journal_len);
            debug!(pair = %address, "pair state rolled back");
        }));
    }
}

fn lock_journal(journal: &Mutex<Vec<PairEvent>>) -> MutexGuard<'_, Vec<PairEvent>> {
    journal.lock().unwrap_or_else(PoisonError::into_inner)
}

impl fmt::Debug for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.load();
        f.debug_struct("Pair")
            .field("address", &self.address)
            .field("token0", &state.token0)
            .field("token1", &state.token1)
            .field("reserve0", &state.reserve0)
            .field("reserve1", &state.reserve1)
            .field("total_supply", &state.shares.total_supply())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod test_support {
    use super::*;
    use crate::token::InMemoryTokens;

    pub(crate) const FACTORY: Address = Address::from_bytes([0xfa; 32]);
    pub(crate) const PAIR: Address = Address::from_bytes([0x77; 32]);
    pub(crate) const TOKEN0: Address = Address::from_bytes([0x01; 32]);
    pub(crate) const TOKEN1: Address = Address::from_bytes([0x02; 32]);
    pub(crate) const ALICE: Address = Address::from_bytes([0xa1; 32]);
    pub(crate) const BOB: Address = Address::from_bytes([0xb0; 32]);
    pub(crate) const FEE_TO: Address = Address::from_bytes([0xfe; 32]);
    pub(crate) const NO_FEE: Option<Address> = None;

    pub(crate) fn new_pair() -> Pair {
        let pair = Pair::new(PAIR, FACTORY, PairConfig::default());
        let Ok(()) = pair.initialize(FACTORY, TOKEN0, TOKEN1) else {
            panic!("initialize failed");
        };
        pair
    }

    pub(crate) fn fund(tokens: &InMemoryTokens, token: Address, to: Address, amount: u128) {
        let Ok(()) = tokens.mint(token, to, Amount::new(amount)) else {
            panic!("mint failed");
        };
    }

    /// Sends both amounts to the pair and mints shares to `to`.
    pub(crate) fn deposit(
        pair: &Pair,
        tokens: &InMemoryTokens,
        fees: Option<Address>,
        to: Address,
        amount0: u128,
        amount1: u128,
        now: u64,
    ) -> Result<Liquidity, AmmError> {
        fund(tokens, TOKEN0, PAIR, amount0);
        fund(tokens, TOKEN1, PAIR, amount1);
        let ctx = Context::new(tokens, &fees, to, now);
        pair.mint(&ctx, to)
    }
}
