//! # GBAR Stabilization
//!
//! Pulls GBAR supply toward 85% of the value of all gold in circulation, at
//! most once per cooldown (28 days, counted from deployment).
//!
//! | Supply vs target | Action |
//! |------------------|--------|
//! | above | burn `min(excess, vault balance)` from the reserve vault |
//! | below | mint the shortfall into the reserve vault |
//! | equal | nothing, the timestamp still advances |
//!
//! Only the reserve vault is touched. Excess GBAR already in circulation
//! cannot be burned; it is reported as `uncovered_excess` and left for a
//! later run.

use crate::conversion::convert;
use crate::gbar::GbarToken;
use crate::oracle::PriceQuote;
use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Minimum time between stabilizations
pub const STABILIZE_COOLDOWN_SECS: i64 = 28 * ONE_DAY_SECS;

/// Whether a stabilization may run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StabilizationPhase {
    /// Locked until `next_allowed_at`
    Cooldown { next_allowed_at: Timestamp },
    /// May run now
    Ready,
}

/// Supply change decided by a stabilization
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyAdjustment {
    /// Supply already on target
    None,
    /// Burn from the vault; `uncovered_excess` stays in circulation
    Burn { amount: u128, uncovered_excess: u128 },
    /// Mint into the vault
    Mint { amount: u128 },
}

/// Result of a stabilization
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stabilized {
    /// GBAR total supply after adjusting
    pub total_supply: u128,
    /// Reserve vault balance after adjusting
    pub vault_balance: u128,
    /// USD per gram used for the target
    pub price_per_gram: u128,
    /// USD value of all gold
    pub total_gold_value: u128,
    /// What was done
    pub adjustment: SupplyAdjustment,
}

/// Decide how to move `total_supply` toward `target`
///
/// Burns are capped by what the vault holds.
pub fn plan_adjustment(total_supply: u128, vault_balance: u128, target: u128) -> SupplyAdjustment {
    if total_supply > target {
        let excess = total_supply - target;
        let amount = excess.min(vault_balance);
        SupplyAdjustment::Burn {
            amount,
            uncovered_excess: excess - amount,
        }
    } else if total_supply < target {
        SupplyAdjustment::Mint {
            amount: target - total_supply,
        }
    } else {
        SupplyAdjustment::None
    }
}

/// Cooldown bookkeeping and the stabilize operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilizationState {
    /// Last stabilization, or deployment time
    pub last_stabilized_at: Timestamp,
    /// Minimum spacing between runs
    pub cooldown_secs: i64,
}

impl StabilizationState {
    /// State for a deployment at `deployed_at`
    pub fn new(deployed_at: Timestamp, cooldown_secs: i64) -> Self {
        Self {
            last_stabilized_at: deployed_at,
            cooldown_secs,
        }
    }

    /// Earliest time the next run is allowed
    pub fn next_allowed_at(&self) -> Timestamp {
        self.last_stabilized_at.saturating_add(self.cooldown_secs)
    }

    pub fn phase(&self, now: Timestamp) -> StabilizationPhase {
        let next_allowed_at = self.next_allowed_at();
        if now >= next_allowed_at {
            StabilizationPhase::Ready
        } else {
            StabilizationPhase::Cooldown { next_allowed_at }
        }
    }

    /// Run a stabilization against `gbar` for `gold_supply` grams at `quote`
    pub fn stabilize(
        &mut self,
        gbar: &mut GbarToken,
        gold_supply: u128,
        quote: &PriceQuote,
        now: Timestamp,
    ) -> Result<Stabilized> {
        if let StabilizationPhase::Cooldown { next_allowed_at } = self.phase(now) {
            return Err(GoldexError::StabilizeTimestampNoPassed { next_allowed_at });
        }
        let vault_balance = gbar.vault_balance();
        if gold_supply == 0 || vault_balance == 0 {
            return Err(GoldexError::StabilizeNotPossible);
        }

        let conversion = convert(gold_supply, quote)?;
        let adjustment = plan_adjustment(gbar.total_supply(), vault_balance, conversion.gbar_equivalent);

        match adjustment {
            SupplyAdjustment::Burn { amount, uncovered_excess } => {
                if amount > 0 {
                    gbar.burn_from_vault(amount)?;
                }
                if uncovered_excess > 0 {
                    tracing::warn!(
                        burned = amount,
                        uncovered_excess,
                        "vault cannot cover GBAR excess; circulating supply stays above target"
                    );
                }
            }
            SupplyAdjustment::Mint { amount } => gbar.mint_to_vault(amount)?,
            SupplyAdjustment::None => {}
        }

        self.last_stabilized_at = now;

        let result = Stabilized {
            total_supply: gbar.total_supply(),
            vault_balance: gbar.vault_balance(),
            price_per_gram: conversion.price_per_gram,
            total_gold_value: conversion.total_gold_value,
            adjustment,
        };
        tracing::info!(
            total_supply = result.total_supply,
            vault_balance = result.vault_balance,
            price_per_gram = result.price_per_gram,
            "GBAR stabilized"
        );
        Ok(result)
    }
}
