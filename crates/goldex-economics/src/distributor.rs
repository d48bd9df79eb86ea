//! # Fee Distributor
//!
//! Collects GBAR transfer fees and, once per distribution period, pays part of
//! them to the stake vault as staking interest. The other half of what was
//! collected goes to the company.
//!
//! ```text
//! interest      = min(goldValue(totalStaked) * INTEREST_RATE / 100e6, collectedFee * 50 / 100)
//! company_share = collectedFee - collectedFee * 50 / 100
//! ```
//!
//! A payout is two calls. `set_payout_values` fixes both amounts and opens
//! the window once the period has finished; `distribute_rewards` moves the
//! GBAR, starts a reward stream on the vault and closes the window. Stakers
//! can never receive more than the company, so total rewards stay within
//! half of all fees collected. The part of the stakers' half left unpaid
//! stays in the distributor for later periods.

use crate::conversion::convert;
use crate::ownable::Ownable;
use crate::oracle::PriceQuote;
use crate::staking::StakeVault;
use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Daily interest on staked gold value, over `INTEREST_RATE_SCALE` (~5% a year)
pub const INTEREST_RATE: u128 = 13_699;

/// Denominator of the interest rate
pub const INTEREST_RATE_SCALE: u128 = 100_000_000;

/// Share of collected fees that may go to stakers, in percent
pub const MAX_FEE_SHARE_PERCENT: u128 = 50;

/// Distribution window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionWindow {
    /// Earliest time the next payout can be set
    pub period_finish: Timestamp,
    /// Payout values set, rewards not yet distributed
    pub distribute_open: bool,
    /// Interest fixed by `set_payout_values`
    pub pending_interest: u128,
    /// Company share fixed by `set_payout_values`
    #[serde(default)]
    pub pending_company_share: u128,
}

/// Daily interest owed to stakers
///
/// Zero when nothing is staked.
pub fn compute_interest(
    total_staked: u128,
    collected_fee: u128,
    quote: &PriceQuote,
    interest_rate: u128,
) -> Result<u128> {
    if total_staked == 0 {
        return Ok(0);
    }
    let gold_value = convert(total_staked, quote)?.total_gold_value;
    let interest = gold_value
        .checked_mul(interest_rate)
        .ok_or(GoldexError::ArithmeticOverflow("compute_interest"))?
        / INTEREST_RATE_SCALE;
    Ok(interest.min(stakers_share(collected_fee)))
}

/// Most of `collected_fee` that may go to stakers
pub fn stakers_share(collected_fee: u128) -> u128 {
    collected_fee / 100 * MAX_FEE_SHARE_PERCENT + collected_fee % 100 * MAX_FEE_SHARE_PERCENT / 100
}

/// Fee distributor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeeDistributor {
    address: Address,
    ownable: Ownable,
    company: Address,
    interest_rate: u128,
    distribution_period: i64,
    window: DistributionWindow,
}

impl FeeDistributor {
    /// Deploy at `now`; the first payout is possible one period later
    pub fn new(
        address: Address,
        owner: Address,
        company: Address,
        interest_rate: u128,
        distribution_period: i64,
        now: Timestamp,
    ) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            company,
            interest_rate,
            distribution_period,
            window: DistributionWindow {
                period_finish: now + distribution_period,
                distribute_open: false,
                pending_interest: 0,
                pending_company_share: 0,
            },
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.ownable.transfer_ownership(caller, new_owner)
    }

    /// Receiver of the company share
    pub fn company(&self) -> Address {
        self.company
    }

    pub fn interest_rate(&self) -> u128 {
        self.interest_rate
    }

    pub fn window(&self) -> &DistributionWindow {
        &self.window
    }

    pub fn period_finish(&self) -> Timestamp {
        self.window.period_finish
    }

    pub fn distribute_open(&self) -> bool {
        self.window.distribute_open
    }

    /// Fix the interest for the finished period and open the window
    ///
    /// `collected_fee` is the distributor's current GBAR balance.
    pub fn set_payout_values(
        &mut self,
        total_staked: u128,
        collected_fee: u128,
        quote: &PriceQuote,
        now: Timestamp,
    ) -> Result<u128> {
        if self.window.distribute_open {
            return Err(GoldexError::DistributionAlreadyOpen);
        }
        if now < self.window.period_finish {
            return Err(GoldexError::DistributionPeriodNotFinished(self.window.period_finish));
        }

        let interest = compute_interest(total_staked, collected_fee, quote, self.interest_rate)?;
        let company_share = collected_fee - stakers_share(collected_fee);
        self.window.pending_interest = interest;
        self.window.pending_company_share = company_share;
        self.window.distribute_open = true;
        tracing::info!(interest, company_share, total_staked, collected_fee, "payout values set");
        Ok(interest)
    }

    /// Pay the pending interest into `vault`, the company share to the
    /// company, and close the window
    pub fn distribute_rewards<R: FungibleToken>(
        &mut self,
        gbar: &mut R,
        vault: &mut StakeVault,
        now: Timestamp,
    ) -> Result<u128> {
        if !self.window.distribute_open {
            return Err(GoldexError::DistributionNotOpen);
        }
        let interest = self.window.pending_interest;
        let company_share = self.window.pending_company_share;
        if interest > 0 && vault.fee_distributor() != Some(self.address) {
            return Err(GoldexError::NotTheFeeDistributor);
        }
        if gbar.balance_of(&self.address) < interest.saturating_add(company_share) {
            return Err(GoldexError::InsufficientBalance);
        }
        if interest > 0 {
            gbar.transfer(self.address, vault.address(), interest)?;
            vault.notify_reward_amount(self.address, interest, now)?;
        }
        if company_share > 0 {
            gbar.transfer(self.address, self.company, company_share)?;
        }

        self.window.period_finish += self.distribution_period;
        self.window.distribute_open = false;
        self.window.pending_interest = 0;
        self.window.pending_company_share = 0;
        tracing::info!(
            interest,
            company_share,
            period_finish = self.window.period_finish,
            "rewards distributed"
        );
        Ok(interest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = ONE_DAY_SECS;

    fn quote() -> PriceQuote {
        PriceQuote::new(2_000 * 100_000_000).unwrap()
    }

    #[test]
    fn test_interest_capped_by_fees() {
        // 95 g at $64.301493 = 6_108_641_835; daily interest 836_822
        assert_eq!(compute_interest(95, u128::MAX / 100, &quote(), INTEREST_RATE), Ok(836_822));
        assert_eq!(compute_interest(95, 1_000_000, &quote(), INTEREST_RATE), Ok(500_000));
        assert_eq!(compute_interest(0, 1_000_000, &quote(), INTEREST_RATE), Ok(0));
    }

    #[test]
    fn test_period_gate() {
        let mut distributor = FeeDistributor::new(
            Address::derive("fd"),
            Address::repeat_byte(1),
            Address::derive("company"),
            INTEREST_RATE,
            DAY,
            0,
        );
        assert_eq!(distributor.period_finish(), DAY);

        assert_eq!(
            distributor.set_payout_values(100, 1_000, &quote(), DAY - 1),
            Err(GoldexError::DistributionPeriodNotFinished(DAY))
        );
        distributor.set_payout_values(100, 1_000, &quote(), DAY).unwrap();
        assert!(distributor.distribute_open());
        assert_eq!(
            distributor.set_payout_values(100, 1_000, &quote(), DAY),
            Err(GoldexError::DistributionAlreadyOpen)
        );
    }

    fn staked_vault(owner: Address, fd: Address, gbar: &TokenLedger, grams: u128) -> StakeVault {
        let mut vault = StakeVault::new(Address::derive("stake-vault"), owner, Address::derive("gold"), gbar.token_address(), DAY);
        vault.set_fee_distributor(owner, fd).unwrap();
        vault.mint_stake(Address::derive("gold"), grams, Address::repeat_byte(2), 0).unwrap();
        vault
    }

    #[test]
    fn test_stakers_share() {
        assert_eq!(stakers_share(1_000_000), 500_000);
        assert_eq!(stakers_share(1_001), 500);
        assert_eq!(stakers_share(1), 0);
        assert_eq!(stakers_share(u128::MAX), u128::MAX / 2);
    }

    #[test]
    fn test_distribute_rewards() {
        let owner = Address::repeat_byte(1);
        let fd = Address::derive("fd");
        let company = Address::derive("company");
        let mut gbar = TokenLedger::new(Address::derive("gbar"), "GBAR", 6);
        let mut vault = staked_vault(owner, fd, &gbar, 95);

        let mut distributor = FeeDistributor::new(fd, owner, company, INTEREST_RATE, DAY, 0);
        gbar.mint(fd, 10_000_000).unwrap();

        assert_eq!(
            distributor.distribute_rewards(&mut gbar, &mut vault, DAY),
            Err(GoldexError::DistributionNotOpen)
        );

        let interest = distributor.set_payout_values(vault.total_supply(), gbar.balance_of(&fd), &quote(), DAY).unwrap();
        assert_eq!(distributor.distribute_rewards(&mut gbar, &mut vault, DAY), Ok(interest));

        assert_eq!(interest, 836_822);
        assert_eq!(gbar.balance_of(&vault.address()), interest);
        assert_eq!(gbar.balance_of(&company), 5_000_000);
        assert_eq!(gbar.balance_of(&fd), 5_000_000 - interest);
        assert_eq!(distributor.period_finish(), 2 * DAY);
        assert!(!distributor.distribute_open());
        assert_eq!(vault.reward_state().period_finish, 2 * DAY);
        assert_eq!(
            distributor.distribute_rewards(&mut gbar, &mut vault, DAY + 1),
            Err(GoldexError::DistributionNotOpen)
        );
    }

    #[test]
    fn test_one_day_of_fees_paid_out_over_a_month() {
        let owner = Address::repeat_byte(1);
        let fd = Address::derive("fd");
        let company = Address::derive("company");
        let mut gbar = TokenLedger::new(Address::derive("gbar"), "GBAR", 6);
        let mut vault = staked_vault(owner, fd, &gbar, 1_000_000);
        let mut distributor = FeeDistributor::new(fd, owner, company, INTEREST_RATE, DAY, 0);

        // a single 1 GBAR fee, then a month of payouts with nothing new coming in
        let fees = 1_000_000;
        gbar.mint(fd, fees).unwrap();
        let mut paid = 0;
        for day in 1..=30 {
            let collected = gbar.balance_of(&fd);
            distributor.set_payout_values(vault.total_supply(), collected, &quote(), day * DAY).unwrap();
            paid += distributor.distribute_rewards(&mut gbar, &mut vault, day * DAY).unwrap();
        }

        assert_eq!(paid, fees / 2);
        assert_eq!(gbar.balance_of(&company), fees / 2);
        assert_eq!(gbar.balance_of(&fd), 0);
        assert_eq!(gbar.balance_of(&vault.address()), paid);
    }

    #[test]
    fn test_company_share_needs_balance() {
        let owner = Address::repeat_byte(1);
        let fd = Address::derive("fd");
        let mut gbar = TokenLedger::new(Address::derive("gbar"), "GBAR", 6);
        let mut vault = staked_vault(owner, fd, &gbar, 95);
        let mut distributor = FeeDistributor::new(fd, owner, Address::derive("company"), INTEREST_RATE, DAY, 0);

        // payout values claim more than the distributor holds
        distributor.set_payout_values(vault.total_supply(), 1_000, &quote(), DAY).unwrap();
        assert_eq!(
            distributor.distribute_rewards(&mut gbar, &mut vault, DAY),
            Err(GoldexError::InsufficientBalance)
        );
        assert!(distributor.distribute_open());
        assert_eq!(vault.reward_state().reward_rate, 0);
    }
}
