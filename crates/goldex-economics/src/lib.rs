//! # Goldex Economics - GOLD/GBAR Stablecoin Core
//!
//! Economic engine of a gold-backed token pair.
//!
//! ## Key Features
//!
//! - **GOLD**: one token per gram of vaulted gold, minted only by the owner
//! - **GBAR**: 85% gold-backed stablecoin charging a capped transfer fee
//! - **Stabilization**: every 28 days GBAR supply is moved toward its target
//! - **Staking**: GOLD stakers earn GBAR streamed from collected fees
//! - **Retrieval guards**: multi-guard approval to freeze a lost or stolen balance
//!
//! ## Token Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         GOLD / GBAR FLOW                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  owner mints GOLD ──► backing GBAR minted into the reserve vault        │
//! │  GBAR transfer ──► receiver gets amount - fee, fee ──► distributor      │
//! │  distributor (daily) ──► min(interest, 50% of fees) ──► stake vault     │
//! │                      └─► other 50% of fees ──► company                  │
//! │  stake vault ──► reward stream ──► stakers claim GBAR                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transfer Fee
//!
//! | Amount (GBAR) | Fee |
//! |---------------|-----|
//! | up to 100 | 1% |
//! | 100 - 1,000,000 | 1 + 0.0024% of amount |
//! | above | 25 (cap) |

pub mod config;
pub mod conversion;
pub mod distributor;
pub mod events;
pub mod fee;
pub mod gbar;
pub mod gold;
pub mod oracle;
pub mod ownable;
pub mod protocol;
pub mod retrieval;
pub mod rewards;
pub mod stabilization;
pub mod staking;
pub mod vault;

// Re-exports
pub use config::ProtocolConfig;
pub use conversion::{convert, GoldConversion};
pub use distributor::{compute_interest, DistributionWindow, FeeDistributor};
pub use events::{EventLog, EventRecord, ProtocolEvent};
pub use fee::{compute_fee, FeeCurve, FeeSchedule};
pub use gbar::{GbarToken, TransferReceipt};
pub use gold::GoldToken;
pub use oracle::{GoldPriceOracle, PriceFeed, PriceQuote, RoundData, StaticPriceFeed};
pub use protocol::{Deployment, Protocol, SharedProtocol};
pub use retrieval::{RetrievalGuard, RetrievalRequestInfo, RetrievalStatus};
pub use rewards::RewardState;
pub use stabilization::{StabilizationPhase, StabilizationState, Stabilized, SupplyAdjustment};
pub use staking::{StakeEntry, StakeVault};
pub use vault::Vault;
