//! Pair registry and protocol fee governance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use sha3::{Digest, Keccak256};
use tracing::debug;

use crate::config::{FactoryConfig, PairConfig};
use crate::domain::{Address, TokenPair};
use crate::error::AmmError;
use crate::pair::Pair;
use crate::traits::{FeeSource, FromConfig};

/// Something the factory did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryEvent {
    /// A pair was created and registered.
    PairCreated {
        token0: Address,
        token1: Address,
        pair: Address,
        /// Number of pairs after this one was added.
        count: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct FeeSettings {
    fee_to: Option<Address>,
    fee_to_setter: Address,
}

#[derive(Debug, Default)]
struct Registry {
    by_tokens: HashMap<TokenPair, Arc<Pair>>,
    by_address: HashMap<Address, Arc<Pair>>,
    all: Vec<Address>,
}

/// Derives the address of the pair for `tokens` under `factory`:
/// `keccak256(factory || token0 || token1)`.
///
/// The result depends only on its inputs, so anyone can compute where a
/// pair lives without asking the factory.
#[must_use]
pub fn pair_address(factory: Address, tokens: &TokenPair) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update(factory.as_bytes());
    hasher.update(tokens.first().as_bytes());
    hasher.update(tokens.second().as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    Address::from_bytes(bytes)
}

/// Creates pairs, one per unordered token pair, and decides where the
/// protocol fee goes.
///
/// # Examples
///
/// ```
/// use pair_amm::domain::Address;
/// use pair_amm::factory::PairFactory;
///
/// let factory = PairFactory::new(Address::from_bytes([0xfa; 32]), Address::ZERO);
/// let (a, b) = (Address::from_bytes([1; 32]), Address::from_bytes([2; 32]));
///
/// let addr = factory.create_pair(a, b).expect("created");
/// assert_eq!(factory.get_pair(b, a).map(|p| p.address()), Some(addr));
/// assert_eq!(factory.all_pairs_length(), 1);
/// ```
#[derive(Debug)]
pub struct PairFactory {
    address: Address,
    pair_config: PairConfig,
    fees: RwLock<FeeSettings>,
    registry: RwLock<Registry>,
    journal: Mutex<Vec<FactoryEvent>>,
}

impl PairFactory {
    /// Creates a factory whose pairs use [`PairConfig::default`].
    #[must_use]
    pub fn new(address: Address, fee_to_setter: Address) -> Self {
        Self::with_pair_config(address, fee_to_setter, PairConfig::default())
    }

    /// Creates a factory whose pairs use `pair_config`.
    #[must_use]
    pub fn with_pair_config(address: Address, fee_to_setter: Address, pair_config: PairConfig) -> Self {
        Self {
            address,
            pair_config,
            fees: RwLock::new(FeeSettings {
                fee_to: None,
                fee_to_setter,
            }),
            registry: RwLock::new(Registry::default()),
            journal: Mutex::new(Vec::new()),
        }
    }

    /// The factory's identity.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Parameters applied to every created pair.
    #[must_use]
    pub const fn pair_config(&self) -> &PairConfig {
        &self.pair_config
    }

    /// Creates, initializes and registers the pair for two tokens.
    ///
    /// # Errors
    ///
    /// - [`AmmError::IdenticalAddresses`] if the tokens are equal.
    /// - [`AmmError::ZeroAddress`] if the smaller token is zero.
    /// - [`AmmError::PairExists`] if the pair was already created.
    pub fn create_pair(&self, token_a: Address, token_b: Address) -> Result<Address, AmmError> {
        let tokens = TokenPair::new(token_a, token_b)?;
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if registry.by_tokens.contains_key(&tokens) {
            return Err(AmmError::PairExists);
        }
        let address = pair_address(self.address, &tokens);
        let pair = Arc::new(Pair::new(address, self.address, self.pair_config));
        pair.initialize(self.address, tokens.first(), tokens.second())?;

        registry.by_tokens.insert(tokens, Arc::clone(&pair));
        registry.by_address.insert(address, pair);
        registry.all.push(address);
        let count = registry.all.len();
        drop(registry);

        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FactoryEvent::PairCreated {
                token0: tokens.first(),
                token1: tokens.second(),
                pair: address,
                count,
            });
        debug!(
            factory = %self.address,
            token0 = %tokens.first(),
            token1 = %tokens.second(),
            pair = %address,
            count,
            "pair created"
        );
        Ok(address)
    }

    /// The pair for two tokens, in either order.
    #[must_use]
    pub fn get_pair(&self, token_a: Address, token_b: Address) -> Option<Arc<Pair>> {
        let tokens = TokenPair::new(token_a, token_b).ok()?;
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_tokens
            .get(&tokens)
            .cloned()
    }

    /// The pair registered at `address`.
    #[must_use]
    pub fn pair(&self, address: Address) -> Option<Arc<Pair>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_address
            .get(&address)
            .cloned()
    }

    /// Every pair address in creation order.
    #[must_use]
    pub fn all_pairs(&self) -> Vec<Address> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .all
            .clone()
    }

    /// Number of pairs created.
    #[must_use]
    pub fn all_pairs_length(&self) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .all
            .len()
    }

    /// Who may change the fee settings.
    #[must_use]
    pub fn fee_to_setter(&self) -> Address {
        self.fees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fee_to_setter
    }

    /// Turns the protocol fee on (`Some`) or off (`None`).
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Forbidden`] unless `caller` is the setter.
    pub fn set_fee_to(&self, caller: Address, fee_to: Option<Address>) -> Result<(), AmmError> {
        let mut fees = self.fees.write().unwrap_or_else(PoisonError::into_inner);
        if caller != fees.fee_to_setter {
            return Err(AmmError::Forbidden);
        }
        fees.fee_to = fee_to;
        debug!(factory = %self.address, ?fee_to, "fee recipient changed");
        Ok(())
    }

    /// Hands the setter role to `setter`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Forbidden`] unless `caller` is the setter.
    pub fn set_fee_to_setter(&self, caller: Address, setter: Address) -> Result<(), AmmError> {
        let mut fees = self.fees.write().unwrap_or_else(PoisonError::into_inner);
        if caller != fees.fee_to_setter {
            return Err(AmmError::Forbidden);
        }
        fees.fee_to_setter = setter;
        Ok(())
    }

    /// Drains the event journal.
    #[must_use]
    pub fn take_events(&self) -> Vec<FactoryEvent> {
        core::mem::take(&mut *self.journal.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl FeeSource for PairFactory {
    fn fee_to(&self) -> Option<Address> {
        self.fees.read().unwrap_or_else(PoisonError::into_inner).fee_to
    }
}

impl FromConfig<FactoryConfig> for PairFactory {
    fn from_config(config: &FactoryConfig) -> Result<Self, AmmError> {
        config.validate()?;
        Ok(Self::with_pair_config(
            config.address(),
            config.fee_to_setter(),
            *config.pair(),
        ))
    }
}
