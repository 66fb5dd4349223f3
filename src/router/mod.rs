//! Caller-facing entry points.
//!
//! The pair primitives expect tokens to be sent to the pair before they
//! are called.  [`Router`] does that choreography for the three common
//! operations: it checks the deadline, pulls the caller's tokens or
//! shares through allowances, calls the pair and enforces the caller's
//! slippage bounds.  Each router call is all-or-nothing: if any step
//! fails, token balances and pair state are rolled back.
//!
//! The pure helpers in this module ([`quote`], [`get_amount_out`],
//! [`get_amount_in`], [`resolve_deposit`]) need no state at all.

mod quote;

use core::fmt;

use tracing::debug;

use crate::domain::{Address, Amount, Liquidity};
use crate::error::AmmError;
use crate::factory::PairFactory;
use crate::pair::{Context, Pair};
use crate::traits::{atomic, TokenLedger};

pub use quote::{
    get_amount_in, get_amount_in_with_fee, get_amount_out, get_amount_out_with_fee, pair_for,
    quote, resolve_deposit,
};

/// Arguments of [`Router::add_liquidity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddLiquidity {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: Amount,
    pub amount_b_desired: Amount,
    pub amount_a_min: Amount,
    pub amount_b_min: Amount,
    /// Receiver of the minted shares.
    pub to: Address,
    /// Last timestamp at which the call may execute.
    pub deadline: u64,
}

/// Arguments of [`Router::remove_liquidity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveLiquidity {
    pub token_a: Address,
    pub token_b: Address,
    pub liquidity: Liquidity,
    pub amount_a_min: Amount,
    pub amount_b_min: Amount,
    /// Receiver of both tokens.
    pub to: Address,
    pub deadline: u64,
}

/// Arguments of [`Router::swap_exact_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapExactInput {
    pub amount_in: Amount,
    pub asset_in: Address,
    pub amount_out_min: Amount,
    pub asset_out: Address,
    pub to: Address,
    pub deadline: u64,
}

/// Stateless front end over a factory's pairs.
///
/// The router acts under its own identity: callers approve it on the
/// token ledger (for deposits and swaps) or on the pair's shares (for
/// withdrawals) before calling.
pub struct Router<'a> {
    address: Address,
    factory: &'a PairFactory,
    tokens: &'a dyn TokenLedger,
}

impl<'a> Router<'a> {
    /// Creates a router acting as `address`.
    #[must_use]
    pub fn new(address: Address, factory: &'a PairFactory, tokens: &'a dyn TokenLedger) -> Self {
        Self {
            address,
            factory,
            tokens,
        }
    }

    /// The router's identity.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Deposits into the pair for two tokens at the current ratio,
    /// creating the pair first if it does not exist.
    ///
    /// Returns the amounts actually pulled from `sender` and the shares
    /// minted to `params.to`.  A pair created here stays registered even
    /// if the deposit then fails.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] past the deadline.
    /// - The failures of [`resolve_deposit`] and [`Pair::mint`].
    /// - [`AmmError::InsufficientAllowance`] if the router is not approved.
    pub fn add_liquidity(
        &self,
        sender: Address,
        params: &AddLiquidity,
        now: u64,
    ) -> Result<(Amount, Amount, Liquidity), AmmError> {
        ensure(params.deadline, now)?;
        let pair = self.pair_or_create(params.token_a, params.token_b)?;
        let ctx = self.context(now);
        let outcome = self.transact(|| {
            let (reserve_a, reserve_b) = oriented(&pair, params.token_a);
            let (amount_a, amount_b) = resolve_deposit(
                params.amount_a_desired,
                params.amount_b_desired,
                params.amount_a_min,
                params.amount_b_min,
                reserve_a,
                reserve_b,
            )?;
            self.tokens
                .transfer_from(params.token_a, self.address, sender, pair.address(), amount_a)?;
            self.tokens
                .transfer_from(params.token_b, self.address, sender, pair.address(), amount_b)?;
            let liquidity = pair.mint(&ctx, params.to)?;
            Ok((amount_a, amount_b, liquidity))
        })?;
        debug!(pair = %pair.address(), %sender, amount_a = %outcome.0, amount_b = %outcome.1, liquidity = %outcome.2, "liquidity added");
        Ok(outcome)
    }

    /// Redeems `params.liquidity` of `sender`'s shares.
    ///
    /// Returns the amounts of `token_a` and `token_b` paid to `params.to`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] past the deadline.
    /// - [`AmmError::PairNotFound`] if the pair does not exist.
    /// - [`AmmError::InsufficientAAmount`] / [`AmmError::InsufficientBAmount`]
    ///   below the caller's minimums.
    /// - The failures of [`Pair::transfer_from`] and [`Pair::burn`].
    pub fn remove_liquidity(
        &self,
        sender: Address,
        params: &RemoveLiquidity,
        now: u64,
    ) -> Result<(Amount, Amount), AmmError> {
        ensure(params.deadline, now)?;
        let pair = self
            .factory
            .get_pair(params.token_a, params.token_b)
            .ok_or(AmmError::PairNotFound)?;
        let ctx = self.context(now);
        let outcome = self.transact(|| {
            pair.transfer_from(&ctx, sender, pair.address(), params.liquidity)?;
            let (amount0, amount1) = pair.burn(&ctx, params.to)?;
            let (amount_a, amount_b) = if params.token_a == pair.token0() {
                (amount0, amount1)
            } else {
                (amount1, amount0)
            };
            if amount_a < params.amount_a_min {
                return Err(AmmError::InsufficientAAmount);
            }
            if amount_b < params.amount_b_min {
                return Err(AmmError::InsufficientBAmount);
            }
            Ok((amount_a, amount_b))
        })?;
        debug!(pair = %pair.address(), %sender, amount_a = %outcome.0, amount_b = %outcome.1, "liquidity removed");
        Ok(outcome)
    }

    /// Sells exactly `params.amount_in` of `asset_in` for as much
    /// `asset_out` as the pair gives.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] past the deadline.
    /// - [`AmmError::InvalidAsset`] if the two assets are the same.
    /// - [`AmmError::PairNotFound`] if no pair trades them.
    /// - [`AmmError::InsufficientOutputAmount`] below `amount_out_min`.
    /// - The failures of [`get_amount_out`] and [`Pair::swap`].
    pub fn swap_exact_input(
        &self,
        sender: Address,
        params: &SwapExactInput,
        now: u64,
    ) -> Result<Amount, AmmError> {
        ensure(params.deadline, now)?;
        if params.asset_in == params.asset_out {
            return Err(AmmError::InvalidAsset);
        }
        let pair = self
            .factory
            .get_pair(params.asset_in, params.asset_out)
            .ok_or(AmmError::PairNotFound)?;
        let ctx = self.context(now);
        let amount_out = self.transact(|| {
            let (reserve_in, reserve_out) = oriented(&pair, params.asset_in);
            let amount_out = get_amount_out_with_fee(
                params.amount_in,
                reserve_in,
                reserve_out,
                pair.config().fee_tier(),
            )?;
            if amount_out < params.amount_out_min {
                return Err(AmmError::InsufficientOutputAmount);
            }
            self.tokens.transfer_from(
                params.asset_in,
                self.address,
                sender,
                pair.address(),
                params.amount_in,
            )?;
            let (amount0_out, amount1_out) = if params.asset_in == pair.token0() {
                (Amount::ZERO, amount_out)
            } else {
                (amount_out, Amount::ZERO)
            };
            pair.swap(&ctx, amount0_out, amount1_out, params.to, None)?;
            Ok(amount_out)
        })?;
        debug!(pair = %pair.address(), %sender, amount_in = %params.amount_in, %amount_out, "swapped");
        Ok(amount_out)
    }

    fn context(&self, now: u64) -> Context<'a> {
        Context::new(self.tokens, self.factory, self.address, now)
    }

    fn pair_or_create(&self, token_a: Address, token_b: Address) -> Result<std::sync::Arc<Pair>, AmmError> {
        if let Some(pair) = self.factory.get_pair(token_a, token_b) {
            return Ok(pair);
        }
        match self.factory.create_pair(token_a, token_b) {
            Ok(_) | Err(AmmError::PairExists) => {}
            Err(err) => return Err(err),
        }
        self.factory
            .get_pair(token_a, token_b)
            .ok_or(AmmError::PairNotFound)
    }

    /// Runs `body` as one ledger transaction.
    ///
    /// Pair operations inside it register their undo with the
    /// transaction, so a failure leaves neither token balances nor any
    /// pair changed.  The ledger keeps the transaction exclusive, so no
    /// other caller's operation can commit in the middle of it.
    fn transact<T>(&self, body: impl FnOnce() -> Result<T, AmmError>) -> Result<T, AmmError> {
        atomic(self.tokens, body)
    }
}

impl fmt::Debug for Router<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("address", &self.address)
            .field("factory", &self.factory.address())
            .finish_non_exhaustive()
    }
}

fn ensure(deadline: u64, now: u64) -> Result<(), AmmError> {
    if deadline < now {
        return Err(AmmError::Expired);
    }
    Ok(())
}

/// Reserves of `pair` ordered as `(token_a side, other side)`.
fn oriented(pair: &Pair, token_a: Address) -> (Amount, Amount) {
    let reserves = pair.get_reserves();
    if token_a == pair.token0() {
        (reserves.reserve0(), reserves.reserve1())
    } else {
        (reserves.reserve1(), reserves.reserve0())
    }
}
