//! # Transfer Fee Curve
//!
//! Fee charged on every GBAR transfer between non-excluded accounts.
//!
//! | Amount (tokens) | Fee |
//! |-----------------|-----|
//! | 0 | 0 |
//! | up to 100 | 1% |
//! | 100 - 1,000,000 | 1 + 0.000024 x amount |
//! | above 1,000,000 | 25 (cap) |
//!
//! The linear tier meets the cap exactly at 1,000,000 tokens.

use serde::{Deserialize, Serialize};

/// Upper bound of the flat 1% tier, in whole tokens
pub const FLAT_TIER_LIMIT: u128 = 100;

/// Linear slope: 24 millionths of the amount
pub const LINEAR_FEE_PER_MILLION: u128 = 24;

/// Fee cap in whole tokens
pub const FEE_CAP: u128 = 25;

/// Maps a transfer amount to its fee
pub trait FeeSchedule: Send + Sync {
    /// Fee for transferring `amount` (smallest units)
    fn fee(&self, amount: u128) -> u128;
}

/// The piecewise GBAR fee curve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeCurve {
    /// Token decimal places the curve is denominated in
    pub decimals: u8,
}

impl FeeCurve {
    /// Curve for a token with `decimals` places
    pub fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    /// One whole token in smallest units
    pub fn one(&self) -> u128 {
        10u128.pow(self.decimals as u32)
    }

    /// Compute the fee for `amount`
    pub fn compute(&self, amount: u128) -> u128 {
        let one = self.one();
        if amount == 0 {
            0
        } else if amount <= FLAT_TIER_LIMIT * one {
            amount / 100
        } else {
            let linear = one.saturating_add(amount.saturating_mul(LINEAR_FEE_PER_MILLION) / 1_000_000);
            linear.min(FEE_CAP * one)
        }
    }
}

impl Default for FeeCurve {
    fn default() -> Self {
        Self::new(goldex_core::GBAR_DECIMALS)
    }
}

impl FeeSchedule for FeeCurve {
    fn fee(&self, amount: u128) -> u128 {
        self.compute(amount)
    }
}

/// Fee for `amount` on the default 6-decimal curve
pub fn compute_fee(amount: u128) -> u128 {
    FeeCurve::default().compute(amount)
}
