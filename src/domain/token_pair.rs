//! Canonically ordered pair of distinct tokens.

use super::Address;
use crate::error::AmmError;

/// Two distinct token identities, sorted so that `first < second`.
///
/// Sorting makes `(A, B)` and `(B, A)` the same pair, which is what lets
/// the factory keep one pool per unordered asset pair.
///
/// # Examples
///
/// ```
/// use pair_amm::domain::{Address, TokenPair};
///
/// let a = Address::from_bytes([1u8; 32]);
/// let b = Address::from_bytes([2u8; 32]);
///
/// let pair = TokenPair::new(b, a).expect("distinct tokens");
/// assert_eq!(pair.first(), a);
/// assert_eq!(pair.second(), b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenPair {
    first: Address,
    second: Address,
}

impl TokenPair {
    /// Sorts two token identities into a pair.
    ///
    /// # Errors
    ///
    /// - [`AmmError::IdenticalAddresses`] if both tokens are the same.
    /// - [`AmmError::ZeroAddress`] if the smaller token is the zero address.
    pub fn new(token_a: Address, token_b: Address) -> Result<Self, AmmError> {
        if token_a == token_b {
            return Err(AmmError::IdenticalAddresses);
        }
        let (first, second) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        if first.is_zero() {
            return Err(AmmError::ZeroAddress);
        }
        Ok(Self { first, second })
    }

    /// Returns the lower-ordered token (`token0`).
    #[must_use]
    pub const fn first(&self) -> Address {
        self.first
    }

    /// Returns the higher-ordered token (`token1`).
    #[must_use]
    pub const fn second(&self) -> Address {
        self.second
    }

    /// Returns `true` if `token` is one of the two.
    #[must_use]
    pub fn contains(&self, token: &Address) -> bool {
        self.first == *token || self.second == *token
    }

    /// Returns the counterpart of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidAsset`] if `token` is not in the pair.
    pub fn other(&self, token: &Address) -> Result<Address, AmmError> {
        if *token == self.first {
            Ok(self.second)
        } else if *token == self.second {
            Ok(self.first)
        } else {
            Err(AmmError::InvalidAsset)
        }
    }
}

/// Sorts two token identities, returning `(token0, token1)`.
///
/// # Errors
///
/// Same as [`TokenPair::new`].
pub fn sort_tokens(token_a: Address, token_b: Address) -> Result<(Address, Address), AmmError> {
    let pair = TokenPair::new(token_a, token_b)?;
    Ok((pair.first(), pair.second()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 32])
    }

    #[test]
    fn sorts_either_order() {
        let Ok(ab) = TokenPair::new(addr(1), addr(2)) else {
            panic!("expected Ok");
        };
        let Ok(ba) = TokenPair::new(addr(2), addr(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(ab, ba);
        assert_eq!(ab.first(), addr(1));
    }

    #[test]
    fn rejects_identical_tokens() {
        assert_eq!(
            TokenPair::new(addr(3), addr(3)),
            Err(AmmError::IdenticalAddresses)
        );
    }

    #[test]
    fn rejects_zero_token() {
        assert_eq!(
            TokenPair::new(addr(3), Address::ZERO),
            Err(AmmError::ZeroAddress)
        );
    }

    #[test]
    fn other_side() {
        let Ok(pair) = TokenPair::new(addr(1), addr(2)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.other(&addr(1)), Ok(addr(2)));
        assert_eq!(pair.other(&addr(9)), Err(AmmError::InvalidAsset));
        assert!(pair.contains(&addr(2)));
    }

    #[test]
    fn sort_tokens_returns_ordered_tuple() {
        assert_eq!(sort_tokens(addr(7), addr(4)), Ok((addr(4), addr(7))));
    }
}
