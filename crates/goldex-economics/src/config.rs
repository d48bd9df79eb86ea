//! Protocol configuration

use crate::distributor::INTEREST_RATE;
use crate::rewards::REWARD_DURATION_SECS;
use crate::stabilization::STABILIZE_COOLDOWN_SECS;
use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Parameters a protocol instance is deployed with
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Owner of every administrative component
    #[serde(default = "default_owner")]
    pub owner: Address,

    /// Company account
    #[serde(default = "default_company")]
    pub company: Address,

    /// Retrieval guards; defaults to owner and company
    #[serde(default = "default_retrieval_guards")]
    pub retrieval_guards: Vec<Address>,

    /// Guards that must confirm a retrieval
    #[serde(default = "default_confirmations_required")]
    pub confirmations_required: usize,

    /// XAU/USD per troy ounce at deployment, 8 decimals
    #[serde(default = "default_initial_gold_price")]
    pub initial_gold_price: u64,

    /// Minimum time between stabilizations
    #[serde(default = "default_stabilize_cooldown_secs")]
    pub stabilize_cooldown_secs: i64,

    /// Daily staking interest over 100e6
    #[serde(default = "default_interest_rate")]
    pub interest_rate: u64,

    /// Length of a staking reward stream
    #[serde(default = "default_reward_duration_secs")]
    pub reward_duration_secs: i64,

    /// Spacing between fee distributions
    #[serde(default = "default_distribution_period_secs")]
    pub distribution_period_secs: i64,
}

fn default_owner() -> Address {
    Address::derive("goldex/owner")
}

fn default_company() -> Address {
    Address::derive("goldex/company")
}

fn default_retrieval_guards() -> Vec<Address> {
    vec![default_owner(), default_company()]
}

fn default_confirmations_required() -> usize {
    2
}

fn default_initial_gold_price() -> u64 {
    2_000 * 100_000_000 // $2000.00
}

fn default_stabilize_cooldown_secs() -> i64 {
    STABILIZE_COOLDOWN_SECS
}

fn default_interest_rate() -> u64 {
    INTEREST_RATE as u64
}

fn default_reward_duration_secs() -> i64 {
    REWARD_DURATION_SECS
}

fn default_distribution_period_secs() -> i64 {
    ONE_DAY_SECS
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            company: default_company(),
            retrieval_guards: default_retrieval_guards(),
            confirmations_required: default_confirmations_required(),
            initial_gold_price: default_initial_gold_price(),
            stabilize_cooldown_secs: default_stabilize_cooldown_secs(),
            interest_rate: default_interest_rate(),
            reward_duration_secs: default_reward_duration_secs(),
            distribution_period_secs: default_distribution_period_secs(),
        }
    }
}

impl ProtocolConfig {
    /// Check the parameters are deployable
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_zero() || self.company.is_zero() {
            return Err(GoldexError::AddressCannotBeZero);
        }
        if self.initial_gold_price == 0 {
            return Err(GoldexError::PriceCannotBeZero);
        }
        if self.reward_duration_secs <= 0 || self.distribution_period_secs <= 0 || self.stabilize_cooldown_secs < 0 {
            return Err(GoldexError::AmountCannotBeZero);
        }
        // guard list rules are enforced by the retrieval engine itself
        crate::retrieval::RetrievalGuard::new(self.retrieval_guards.clone(), self.confirmations_required)?;
        Ok(())
    }
}
