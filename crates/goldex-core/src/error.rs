//! Error types for Goldex operations

use crate::address::Address;
use crate::Timestamp;
use thiserror::Error;

/// Result type alias for Goldex operations
pub type Result<T> = std::result::Result<T, GoldexError>;

/// Errors that can occur in Goldex operations
///
/// Every failure is terminal for the call that raised it: state is left as it
/// was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GoldexError {
    // === Input Validation ===
    #[error("AmountCannotBeZero")]
    AmountCannotBeZero,

    #[error("AddressCannotBeZero")]
    AddressCannotBeZero,

    #[error("ExceedsMaxValue: {value} > {max}")]
    ExceedsMaxValue { value: u128, max: u128 },

    #[error("MintToAddressZero")]
    MintToAddressZero,

    #[error("PriceCannotBeZero")]
    PriceCannotBeZero,

    #[error("InvalidConfirmationThreshold: {required} of {guards} guards")]
    InvalidConfirmationThreshold { required: usize, guards: usize },

    #[error("DuplicateRetrievalGuard({0})")]
    DuplicateRetrievalGuard(Address),

    // === Authorization ===
    #[error("Ownable: caller is not the owner")]
    NotTheOwner,

    #[error("NotTheRetrievalGuard")]
    NotTheRetrievalGuard,

    #[error("NotTheGoldContract")]
    NotTheGoldContract,

    #[error("NotGoldToken")]
    NotGoldToken,

    #[error("NotTheFeeDistributor")]
    NotTheFeeDistributor,

    // === State Consistency ===
    #[error("GBARTokenNotSet")]
    GbarTokenNotSet,

    #[error("GoldStakeVaultNotSet")]
    StakeVaultNotSet,

    #[error("GBARVaultNotSet")]
    GbarVaultNotSet,

    #[error("FeeDistributorNotSet")]
    FeeDistributorNotSet,

    #[error("StabilizeTimestampNoPassed: next stabilization at {next_allowed_at}")]
    StabilizeTimestampNoPassed { next_allowed_at: Timestamp },

    #[error("StabilizeNotPossible")]
    StabilizeNotPossible,

    #[error("RetrievalRequestDoesNotExist({0})")]
    RetrievalRequestDoesNotExist(u64),

    #[error("RetrievalRequestAlreadyConfirmed({0})")]
    RetrievalRequestAlreadyConfirmed(u64),

    #[error("RetrievalRequestAlreadyExecuted({0})")]
    RetrievalRequestAlreadyExecuted(u64),

    #[error("RequestNotConfirmed({0})")]
    RequestNotConfirmed(u64),

    #[error("NotEnoughConfirmations: need {required}, have {received}")]
    NotEnoughConfirmations { required: usize, received: usize },

    #[error("DistributionPeriodNotFinished({0})")]
    DistributionPeriodNotFinished(Timestamp),

    #[error("DistributionNotOpen")]
    DistributionNotOpen,

    #[error("DistributionAlreadyOpen")]
    DistributionAlreadyOpen,

    #[error("EntryDoesNotExist(\"{0}\")")]
    EntryDoesNotExist(Address),

    #[error("CannotWithdrawMoreThanStaked({0})")]
    CannotWithdrawMoreThanStaked(u128),

    // === Resources ===
    #[error("InsufficientBalance")]
    InsufficientBalance,

    #[error("AmountExceedsAllowance")]
    AmountExceedsAllowance,

    #[error("AmountExceedsBalance")]
    AmountExceedsBalance,

    #[error("ERC20: transfer amount exceeds balance")]
    TransferExceedsBalance,

    #[error("ERC20: burn amount exceeds balance")]
    BurnExceedsBalance,

    #[error("ERC20: insufficient allowance")]
    InsufficientAllowance,

    #[error("BlacklistedTransaction")]
    BlacklistedTransaction,

    #[error("AddressNotBlacklisted")]
    AddressNotBlacklisted,

    #[error("CannotRecoverStakeToken")]
    CannotRecoverStakeToken,

    #[error("UnknownToken({0})")]
    UnknownToken(Address),

    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),
}

impl GoldexError {
    /// Numeric error code, grouped by category
    ///
    /// 1xxx input, 2xxx authorization, 3xxx state, 4xxx resources.
    pub fn code(&self) -> u32 {
        match self {
            Self::AmountCannotBeZero => 1001,
            Self::AddressCannotBeZero => 1002,
            Self::ExceedsMaxValue { .. } => 1003,
            Self::MintToAddressZero => 1004,
            Self::PriceCannotBeZero => 1005,
            Self::InvalidConfirmationThreshold { .. } | Self::DuplicateRetrievalGuard(_) => 1006,

            Self::NotTheOwner => 2001,
            Self::NotTheRetrievalGuard => 2002,
            Self::NotTheGoldContract | Self::NotGoldToken => 2003,
            Self::NotTheFeeDistributor => 2004,

            Self::GbarTokenNotSet
            | Self::StakeVaultNotSet
            | Self::GbarVaultNotSet
            | Self::FeeDistributorNotSet => 3001,
            Self::StabilizeTimestampNoPassed { .. } => 3002,
            Self::StabilizeNotPossible => 3003,
            Self::RetrievalRequestDoesNotExist(_) => 3004,
            Self::RetrievalRequestAlreadyConfirmed(_) => 3005,
            Self::RetrievalRequestAlreadyExecuted(_) => 3006,
            Self::RequestNotConfirmed(_) => 3007,
            Self::NotEnoughConfirmations { .. } => 3008,
            Self::DistributionPeriodNotFinished(_) => 3009,
            Self::DistributionNotOpen | Self::DistributionAlreadyOpen => 3010,
            Self::EntryDoesNotExist(_) => 3011,
            Self::CannotWithdrawMoreThanStaked(_) => 3012,

            Self::InsufficientBalance
            | Self::AmountExceedsBalance
            | Self::TransferExceedsBalance
            | Self::BurnExceedsBalance => 4001,
            Self::AmountExceedsAllowance | Self::InsufficientAllowance => 4002,
            Self::BlacklistedTransaction | Self::AddressNotBlacklisted => 4003,
            Self::CannotRecoverStakeToken | Self::UnknownToken(_) => 4004,
            Self::ArithmeticOverflow(_) => 9999,
        }
    }

    /// Whether resubmitting the same call later may succeed
    ///
    /// Only time-gated conditions qualify; the retry itself is always an
    /// external decision.
    pub fn is_time_gated(&self) -> bool {
        matches!(
            self,
            Self::StabilizeTimestampNoPassed { .. } | Self::DistributionPeriodNotFinished(_)
        )
    }
}
