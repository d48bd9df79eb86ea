//! # Goldex Core
//!
//! Shared building blocks for the Goldex economic core:
//! - `Address` - 20-byte account identifier (EVM style)
//! - `GoldexError` - the named failure conditions every engine reports
//! - `TokenLedger` / `FungibleToken` - balances, allowances, mint and burn
//! - `Clock` - the monotonically non-decreasing time source gating cooldowns
//!
//! ## Units
//!
//! ```text
//! ┌──────────┬──────────┬──────────────────────────────────────────┐
//! │ Asset    │ Decimals │ Smallest unit                            │
//! ├──────────┼──────────┼──────────────────────────────────────────┤
//! │ GOLD     │ 0        │ 1 gram                                   │
//! │ GBAR     │ 6        │ 0.000001 GBAR (micro)                    │
//! │ XAU/USD  │ 8        │ oracle price per troy ounce              │
//! │ oz → g   │ 18       │ 31.1034768 grams per ounce, wei scaled   │
//! └──────────┴──────────┴──────────────────────────────────────────┘
//! ```

pub mod address;
pub mod clock;
pub mod error;
pub mod ledger;

pub use address::*;
pub use clock::*;
pub use error::*;
pub use ledger::*;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Token and time constants
pub mod constants {
    /// GBAR decimal places
    pub const GBAR_DECIMALS: u8 = 6;

    /// One GBAR in its smallest unit
    pub const ONE_GBAR: u128 = 1_000_000; // 10^6

    /// GOLD decimal places (1 unit = 1 gram)
    pub const GOLD_DECIMALS: u8 = 0;

    /// Oracle price decimal places
    pub const PRICE_DECIMALS: u8 = 8;

    /// One day in seconds
    pub const ONE_DAY_SECS: i64 = 24 * 3600;
}

pub use constants::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::address::Address;
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::constants::*;
    pub use crate::error::{GoldexError, Result};
    pub use crate::ledger::{FungibleToken, TokenLedger};
    pub use crate::Timestamp;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_gbar() {
        assert_eq!(ONE_GBAR, 10u128.pow(GBAR_DECIMALS as u32));
    }
}
