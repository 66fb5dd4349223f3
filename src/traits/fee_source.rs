//! Protocol fee recipient lookup.

use crate::domain::Address;

/// Answers where protocol fees go, if anywhere.
///
/// A pair resolves this once per mint or burn.  `None` means the protocol
/// fee is off.  [`PairFactory`](crate::factory::PairFactory) is the usual
/// implementor; `Option<Address>` works as a fixed source.
pub trait FeeSource: Send + Sync {
    /// Returns the current fee recipient.
    fn fee_to(&self) -> Option<Address>;
}

impl FeeSource for Option<Address> {
    fn fee_to(&self) -> Option<Address> {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_source() {
        let on = Some(Address::from_bytes([9u8; 32]));
        assert_eq!(on.fee_to(), on);
        assert_eq!(None::<Address>.fee_to(), None);
    }
}
