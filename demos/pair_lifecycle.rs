//! Pair lifecycle example.
//!
//! Walks one pair through creation, two deposits, a routed swap, a flash
//! swap, protocol fee accrual, a withdrawal and a TWAP read.
//!
//! # Run
//!
//! ```bash
//! cargo run --example pair_lifecycle
//! ```

use std::sync::Arc;

use pair_amm::domain::{Address, Amount, Liquidity};
use pair_amm::error::AmmError;
use pair_amm::factory::PairFactory;
use pair_amm::oracle::PriceObserver;
use pair_amm::pair::{Context, Pair};
use pair_amm::router::{get_amount_in, AddLiquidity, RemoveLiquidity, Router, SwapExactInput};
use pair_amm::token::InMemoryTokens;
use pair_amm::traits::{FlashSwapCallee, TokenLedger};

const FACTORY: Address = Address::from_bytes([0xfa; 32]);
const ROUTER: Address = Address::from_bytes([0x70; 32]);
const SETTER: Address = Address::from_bytes([0x5e; 32]);
const TREASURY: Address = Address::from_bytes([0xfe; 32]);
const USDC: Address = Address::from_bytes([0x01; 32]);
const WETH: Address = Address::from_bytes([0x02; 32]);
const ALICE: Address = Address::from_bytes([0xa1; 32]);
const BOB: Address = Address::from_bytes([0xb0; 32]);

/// Borrows from the pair and pays back in the other token.
struct Arbitrageur {
    repay: Amount,
}

impl FlashSwapCallee for Arbitrageur {
    fn on_flash_swap(
        &self,
        ctx: &Context<'_>,
        pair: &Pair,
        _amount0_out: Amount,
        _amount1_out: Amount,
    ) -> Result<(), AmmError> {
        ctx.tokens
            .transfer(pair.token0(), ctx.sender, pair.address(), self.repay)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Constant-Product Pair Lifecycle ===\n");

    // ── 1. Tokens and factory ───────────────────────────────────────────
    let tokens = InMemoryTokens::new();
    for holder in [ALICE, BOB] {
        for token in [USDC, WETH] {
            tokens.mint(token, holder, Amount::new(10_000_000))?;
            tokens.approve(token, holder, ROUTER, Amount::MAX);
        }
    }
    let factory = PairFactory::new(FACTORY, SETTER);
    factory.set_fee_to(SETTER, Some(TREASURY))?;
    let router = Router::new(ROUTER, &factory, &tokens);

    // ── 2. Liquidity ────────────────────────────────────────────────────
    let add = |who: Address, a: u128, b: u128, now: u64| {
        router.add_liquidity(
            who,
            &AddLiquidity {
                token_a: USDC,
                token_b: WETH,
                amount_a_desired: Amount::new(a),
                amount_b_desired: Amount::new(b),
                amount_a_min: Amount::ZERO,
                amount_b_min: Amount::ZERO,
                to: who,
                deadline: now + 60,
            },
            now,
        )
    };
    let (_, _, alice_shares) = add(ALICE, 1_000_000, 2_000_000, 1_000)?;
    let (_, _, bob_shares) = add(BOB, 500_000, 1_000_000, 1_010)?;
    let pair = factory
        .get_pair(USDC, WETH)
        .ok_or(AmmError::PairNotFound)?;
    println!("Pair {} created", pair.address());
    println!("Alice shares: {alice_shares}, Bob shares: {bob_shares}");
    println!("Locked forever: {}", pair.balance_of(Address::ZERO));

    let mut observer = PriceObserver::new(Arc::clone(&pair), 120, 1_010)?;

    // ── 3. Routed swap ──────────────────────────────────────────────────
    let out = router.swap_exact_input(
        BOB,
        &SwapExactInput {
            amount_in: Amount::new(50_000),
            asset_in: USDC,
            amount_out_min: Amount::new(90_000),
            asset_out: WETH,
            to: BOB,
            deadline: 1_100,
        },
        1_060,
    )?;
    println!("\nBob sold 50000 USDC for {out} WETH");

    // ── 4. Flash swap ───────────────────────────────────────────────────
    let reserves = pair.get_reserves();
    let borrow = Amount::new(10_000);
    let repay = get_amount_in(borrow, reserves.reserve0(), reserves.reserve1())?;
    let ctx = Context::new(&tokens, &factory, BOB, 1_090);
    pair.swap(&ctx, Amount::ZERO, borrow, BOB, Some(&Arbitrageur { repay }))?;
    println!("Bob flash-borrowed {borrow} WETH and repaid {repay} USDC");

    // ── 5. Oracle ───────────────────────────────────────────────────────
    observer.update(1_130)?;
    println!(
        "\nTWAP over 120 s: 1000 USDC = {} WETH",
        observer.consult(USDC, Amount::new(1_000))?
    );

    // ── 6. Withdrawal and protocol fee ──────────────────────────────────
    pair.approve(&Context::new(&tokens, &factory, ALICE, 1_140), ROUTER, Liquidity::MAX)?;
    let (usdc, weth) = router.remove_liquidity(
        ALICE,
        &RemoveLiquidity {
            token_a: USDC,
            token_b: WETH,
            liquidity: alice_shares,
            amount_a_min: Amount::ZERO,
            amount_b_min: Amount::ZERO,
            to: ALICE,
            deadline: 1_200,
        },
        1_140,
    )?;
    println!("\nAlice withdrew {usdc} USDC and {weth} WETH");
    println!("Treasury fee shares: {}", pair.balance_of(TREASURY));

    let reserves = pair.get_reserves();
    println!(
        "Final reserves: {} / {} (total supply {})",
        reserves.reserve0(),
        reserves.reserve1(),
        pair.total_supply()
    );
    println!("\nEvents recorded: {}", pair.take_events().len());

    Ok(())
}
