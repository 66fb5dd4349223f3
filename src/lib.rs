//! # Pair AMM
//!
//! Constant-product liquidity pairs: share accounting, invariant-checked
//! swaps, a protocol fee skim and a wrapping time-weighted price oracle.
//!
//! Each [`Pair`](pair::Pair) pools two tokens held on an external
//! [`TokenLedger`](traits::TokenLedger).  Liquidity providers send both
//! tokens to the pair and call `mint` for shares; traders send one token
//! and call `swap` for the other.  The pair infers what arrived from its
//! ledger balances, so it works the same whether tokens come from a
//! router, a flash-swap callback or a direct transfer.
//!
//! ## Add liquidity and swap through the router
//!
//! ```rust
//! use pair_amm::domain::{Address, Amount};
//! use pair_amm::factory::PairFactory;
//! use pair_amm::router::{AddLiquidity, Router, SwapExactInput};
//! use pair_amm::token::InMemoryTokens;
//!
//! let usdc = Address::from_bytes([1u8; 32]);
//! let weth = Address::from_bytes([2u8; 32]);
//! let alice = Address::from_bytes([0xa1; 32]);
//!
//! let tokens = InMemoryTokens::new();
//! let factory = PairFactory::new(Address::from_bytes([0xfa; 32]), alice);
//! let router = Router::new(Address::from_bytes([0x70; 32]), &factory, &tokens);
//!
//! for token in [usdc, weth] {
//!     tokens.mint(token, alice, Amount::new(100_000)).expect("funded");
//!     tokens.approve(token, alice, router.address(), Amount::MAX);
//! }
//!
//! let (_, _, shares) = router
//!     .add_liquidity(alice, &AddLiquidity {
//!         token_a: usdc,
//!         token_b: weth,
//!         amount_a_desired: Amount::new(10_000),
//!         amount_b_desired: Amount::new(10_000),
//!         amount_a_min: Amount::ZERO,
//!         amount_b_min: Amount::ZERO,
//!         to: alice,
//!         deadline: 100,
//!     }, 1)
//!     .expect("deposit");
//! assert_eq!(shares.get(), 9_000);
//!
//! let out = router
//!     .swap_exact_input(alice, &SwapExactInput {
//!         amount_in: Amount::new(1_000),
//!         asset_in: usdc,
//!         amount_out_min: Amount::new(900),
//!         asset_out: weth,
//!         to: alice,
//!         deadline: 100,
//!     }, 2)
//!     .expect("swap");
//! assert_eq!(out, Amount::new(906));
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Address`](domain::Address), [`Amount`](domain::Amount), [`Liquidity`](domain::Liquidity), [`FeeTier`](domain::FeeTier) |
//! | [`pair`] | The [`Pair`](pair::Pair): mint, burn, swap, skim, sync and share transfers |
//! | [`ledger`] | [`ShareLedger`](ledger::ShareLedger) share balances and allowances |
//! | [`oracle`] | TWAP readings and the [`PriceObserver`](oracle::PriceObserver) |
//! | [`factory`] | [`PairFactory`](factory::PairFactory) registry and protocol fee settings |
//! | [`router`] | [`Router`](router::Router) entry points and pure quote helpers |
//! | [`traits`] | Collaborator seams: [`TokenLedger`](traits::TokenLedger), [`FeeSource`](traits::FeeSource), [`FlashSwapCallee`](traits::FlashSwapCallee) |
//! | [`token`] | [`InMemoryTokens`](token::InMemoryTokens) ledger |
//! | [`config`] | Validated [`PairConfig`](config::PairConfig) and [`FactoryConfig`](config::FactoryConfig) |
//! | [`math`] | Checked arithmetic, integer square root, UQ112x112 |
//! | [`error`] | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports |
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (`debug` for completed operations,
//! `trace` for oracle accumulation and token movements, `warn` for
//! rejected re-entry).  It never installs a subscriber.

pub mod config;
pub mod domain;
pub mod error;
pub mod factory;
pub mod ledger;
pub mod math;
pub mod oracle;
pub mod pair;
pub mod prelude;
pub mod router;
pub mod token;
pub mod traits;
