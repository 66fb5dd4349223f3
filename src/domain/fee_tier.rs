//! Swap fee tiers built on [`BasisPoints`].

use core::fmt;

use primitive_types::U256;

use super::basis_points::BPS_DENOMINATOR;
use super::BasisPoints;
use crate::error::AmmError;

/// The swap fee a pair charges on input amounts.
///
/// The fee enters the pair math as two scaled factors over the
/// basis-point denominator: the full weight `10_000` and the post-fee
/// weight `10_000 - fee`.  For the 30 bp default these are `10_000` and
/// `9_970`, the familiar `1000 / 997` pair scaled by ten.
///
/// # Examples
///
/// ```
/// use pair_amm::domain::FeeTier;
///
/// let tier = FeeTier::TIER_0_30_PERCENT;
/// assert_eq!(tier.basis_points().get(), 30);
/// assert!(tier.is_standard());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeeTier(BasisPoints);

impl FeeTier {
    /// 0.05% fee (5 bp).
    pub const TIER_0_05_PERCENT: Self = Self(BasisPoints::new(5));

    /// 0.30% fee (30 bp), the classic constant-product rate.
    pub const TIER_0_30_PERCENT: Self = Self(BasisPoints::new(30));

    /// 1.00% fee (100 bp).
    pub const TIER_1_00_PERCENT: Self = Self(BasisPoints::new(100));

    /// Creates a new `FeeTier` from arbitrary [`BasisPoints`].
    #[must_use]
    pub const fn new(basis_points: BasisPoints) -> Self {
        Self(basis_points)
    }

    /// Returns the underlying [`BasisPoints`].
    #[must_use]
    pub const fn basis_points(&self) -> BasisPoints {
        self.0
    }

    /// Returns `true` if this tier matches one of the presets.
    #[must_use]
    pub const fn is_standard(&self) -> bool {
        matches!(self.0.get(), 5 | 30 | 100)
    }

    /// The full-weight scale, `10_000`.
    #[must_use]
    pub fn denominator() -> U256 {
        U256::from(BPS_DENOMINATOR)
    }

    /// The post-fee weight, `10_000 - fee_bps`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] if the fee exceeds 100%.
    pub fn retained_weight(&self) -> Result<U256, AmmError> {
        self.0
            .complement()
            .map(|bp| bp.widen())
            .ok_or(AmmError::InvalidConfiguration("fee tier above 100%"))
    }
}

impl Default for FeeTier {
    fn default() -> Self {
        Self::TIER_0_30_PERCENT
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeeTier({})", self.0)
    }
}
