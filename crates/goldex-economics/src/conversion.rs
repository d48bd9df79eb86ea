//! # Gold / GBAR Conversion
//!
//! Converts a gram quantity of gold into its USD value and the GBAR amount
//! backed by it (85% of the value).
//!
//! ```text
//! price_per_gram   = price_oz * 10^18 / ounce_to_gram_wei * 10^6 / 10^8
//! total_gold_value = grams * price_per_gram
//! gbar_equivalent  = total_gold_value * 85 / 100
//! ```
//!
//! Every step truncates, in exactly this order. Reordering changes the
//! rounding and breaks parity with recorded values.

use crate::oracle::PriceQuote;
use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Largest gram amount accepted by a conversion (1,000 tonnes)
pub const MAX_GOLD_GRAMS: u128 = 1_000_000_000;

/// Share of gold value backing GBAR, in percent
pub const GBAR_BACKING_PERCENT: u128 = 85;

const WEI: u128 = 1_000_000_000_000_000_000; // 10^18
const PRICE_SCALE: u128 = 100_000_000; // 10^8

/// Result of converting gold grams at a given quote
///
/// All values are GBAR-scaled (6 decimals).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldConversion {
    /// USD per gram
    pub price_per_gram: u128,
    /// USD value of the converted grams
    pub total_gold_value: u128,
    /// GBAR backed by that value (85%)
    pub gbar_equivalent: u128,
}

/// USD price per gram with 6 decimals
pub fn price_per_gram(quote: &PriceQuote) -> Result<u128> {
    let per_gram_8 = quote
        .price_per_ounce_usd
        .checked_mul(WEI)
        .ok_or(GoldexError::ArithmeticOverflow("price_per_gram"))?
        / quote.ounce_to_gram_wei;
    Ok(per_gram_8
        .checked_mul(ONE_GBAR)
        .ok_or(GoldexError::ArithmeticOverflow("price_per_gram"))?
        / PRICE_SCALE)
}

/// Convert `gold_grams` at `quote`
pub fn convert(gold_grams: u128, quote: &PriceQuote) -> Result<GoldConversion> {
    if gold_grams == 0 {
        return Err(GoldexError::AmountCannotBeZero);
    }
    if gold_grams > MAX_GOLD_GRAMS {
        return Err(GoldexError::ExceedsMaxValue {
            value: gold_grams,
            max: MAX_GOLD_GRAMS,
        });
    }

    let price_per_gram = price_per_gram(quote)?;
    let total_gold_value = gold_grams
        .checked_mul(price_per_gram)
        .ok_or(GoldexError::ArithmeticOverflow("convert"))?;
    let gbar_equivalent = total_gold_value
        .checked_mul(GBAR_BACKING_PERCENT)
        .ok_or(GoldexError::ArithmeticOverflow("convert"))?
        / 100;

    Ok(GoldConversion {
        price_per_gram,
        total_gold_value,
        gbar_equivalent,
    })
}
