//! # Gold Price Oracle
//!
//! Holds the XAU/USD price (8 decimals, per troy ounce) that every conversion
//! reads. The price is pushed by the owner, typically after pulling it from an
//! external aggregator shaped like `latestRoundData()`.

use crate::conversion::{convert, GoldConversion};
use crate::ownable::Ownable;
use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Grams per troy ounce, scaled by 10^18 (31.1034768)
pub const OUNCE_TO_GRAM_WEI: u128 = 31_103_476_800_000_000_000;

/// Price snapshot used by conversions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// USD per troy ounce, 8 decimals
    pub price_per_ounce_usd: u128,
    /// Grams per ounce, 18 decimals
    pub ounce_to_gram_wei: u128,
}

impl PriceQuote {
    /// Quote at `price_per_ounce_usd` with the standard ounce constant
    pub fn new(price_per_ounce_usd: u128) -> Result<Self> {
        if price_per_ounce_usd == 0 {
            return Err(GoldexError::PriceCannotBeZero);
        }
        Ok(Self {
            price_per_ounce_usd,
            ounce_to_gram_wei: OUNCE_TO_GRAM_WEI,
        })
    }
}

/// Answer of an aggregator round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundData {
    pub round_id: u128,
    /// Price with 8 decimals; may be non-positive on a broken feed
    pub answer: i128,
    pub started_at: Timestamp,
    pub updated_at: Timestamp,
    pub answered_in_round: u128,
}

/// External price aggregator
pub trait PriceFeed {
    /// Latest round, as returned by `latestRoundData()`
    fn latest_round_data(&self) -> Result<RoundData>;
}

/// Feed returning a fixed answer
#[derive(Clone, Copy, Debug)]
pub struct StaticPriceFeed {
    round: RoundData,
}

impl StaticPriceFeed {
    /// Feed answering `price` (8 decimals) updated at `updated_at`
    pub fn new(price: i128, updated_at: Timestamp) -> Self {
        Self {
            round: RoundData {
                round_id: 1,
                answer: price,
                started_at: updated_at,
                updated_at,
                answered_in_round: 1,
            },
        }
    }
}

impl PriceFeed for StaticPriceFeed {
    fn latest_round_data(&self) -> Result<RoundData> {
        Ok(self.round)
    }
}

/// Owner-maintained gold price oracle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoldPriceOracle {
    ownable: Ownable,
    price: u128,
    ounce_to_gram_wei: u128,
    updated_at: Timestamp,
}

impl GoldPriceOracle {
    /// Deploy with an initial price
    pub fn new(owner: Address, price: u128, now: Timestamp) -> Result<Self> {
        if price == 0 {
            return Err(GoldexError::PriceCannotBeZero);
        }
        Ok(Self {
            ownable: Ownable::new(owner),
            price,
            ounce_to_gram_wei: OUNCE_TO_GRAM_WEI,
            updated_at: now,
        })
    }

    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.ownable.transfer_ownership(caller, new_owner)
    }

    /// Latest price, 8 decimals
    pub fn latest_price(&self) -> u128 {
        self.price
    }

    /// Grams per ounce, 18 decimals
    pub fn ounce_to_gram_in_wei(&self) -> u128 {
        self.ounce_to_gram_wei
    }

    /// When the price was last set
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Current price as a quote
    pub fn quote(&self) -> PriceQuote {
        PriceQuote {
            price_per_ounce_usd: self.price,
            ounce_to_gram_wei: self.ounce_to_gram_wei,
        }
    }

    /// Owner-only price update
    pub fn set_latest_price(&mut self, caller: Address, price: u128, now: Timestamp) -> Result<()> {
        self.ownable.only_owner(caller)?;
        if price == 0 {
            return Err(GoldexError::PriceCannotBeZero);
        }
        tracing::debug!(old = self.price, new = price, "gold price updated");
        self.price = price;
        self.updated_at = now;
        Ok(())
    }

    /// Pull the answer from `feed` and store it
    pub fn refresh_from_feed(
        &mut self,
        caller: Address,
        feed: &dyn PriceFeed,
        now: Timestamp,
    ) -> Result<u128> {
        let round = feed.latest_round_data()?;
        if round.answer <= 0 {
            return Err(GoldexError::PriceCannotBeZero);
        }
        let price = round.answer as u128;
        self.set_latest_price(caller, price, now)?;
        Ok(price)
    }

    /// Conversion of `gold_grams` at the current price
    pub fn gold_gbar_conversion(&self, gold_grams: u128) -> Result<GoldConversion> {
        convert(gold_grams, &self.quote())
    }
}
