//! # GOLD Stake Vault
//!
//! Holds staked GOLD and pays GBAR rewards streamed in by the fee distributor.
//!
//! | Operation | Caller | Effect |
//! |-----------|--------|--------|
//! | `stake` | anyone | pull GOLD via allowance, open or grow an entry |
//! | `mint_stake` | GOLD token | credit freshly minted GOLD to a beneficiary |
//! | `withdraw_gold` | staker | return GOLD, close the entry at zero |
//! | `claim_rewards` | staker | pay accrued GBAR |
//! | `notify_reward_amount` | fee distributor | start a new reward stream |
//! | `recover_erc20` | owner | sweep any token except GOLD |
//!
//! Every balance change first syncs the caller's rewards so accrual up to that
//! moment is computed on the old balance.

use crate::gold::require_non_zero;
use crate::ownable::Ownable;
use crate::rewards::{self, AccountRewards, RewardState};
use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A staker's position; exists only while `total_staked > 0`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeEntry {
    /// Staker
    pub owner: Address,
    /// Grams staked
    pub total_staked: u128,
    /// First stake of this entry
    pub start_date: Timestamp,
    /// Last balance change
    pub last_updated: Timestamp,
}

/// GOLD stake vault
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakeVault {
    address: Address,
    ownable: Ownable,
    gold_token: Address,
    gbar_token: Address,
    fee_distributor: Option<Address>,
    entries: HashMap<Address, StakeEntry>,
    total_staked: u128,
    total_stakers: u64,
    reward: RewardState,
    accounts: HashMap<Address, AccountRewards>,
}

impl StakeVault {
    pub fn new(address: Address, owner: Address, gold_token: Address, gbar_token: Address, reward_duration: i64) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            gold_token,
            gbar_token,
            fee_distributor: None,
            entries: HashMap::new(),
            total_staked: 0,
            total_stakers: 0,
            reward: RewardState::new(reward_duration),
            accounts: HashMap::new(),
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

    pub fn gold_token(&self) -> Address {
        self.gold_token
    }

    pub fn gbar_token(&self) -> Address {
        self.gbar_token
    }

    pub fn fee_distributor(&self) -> Option<Address> {
        self.fee_distributor
    }

    pub fn set_fee_distributor(&mut self, caller: Address, distributor: Address) -> Result<()> {
        self.ownable.only_owner(caller)?;
        require_non_zero(distributor)?;
        self.fee_distributor = Some(distributor);
        Ok(())
    }

    // === Queries ===

    pub fn total_stakers(&self) -> u64 {
        self.total_stakers
    }

    /// Total grams staked
    pub fn total_supply(&self) -> u128 {
        self.total_staked
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.entries.get(account).map(|e| e.total_staked).unwrap_or(0)
    }

    pub fn get_stake_entry(&self, account: &Address) -> Option<&StakeEntry> {
        self.entries.get(account)
    }

    pub fn reward_state(&self) -> &RewardState {
        &self.reward
    }

    pub fn reward_per_token(&self, now: Timestamp) -> u128 {
        self.reward.reward_per_token(self.total_staked, now)
    }

    /// GBAR accrued by `account` up to `now`
    pub fn earned(&self, account: &Address, now: Timestamp) -> u128 {
        rewards::earned(
            self.balance_of(account),
            self.reward_per_token(now),
            &self.account_rewards(account),
        )
    }

    /// Accrued rewards as of the account's last sync
    pub fn rewards(&self, account: &Address) -> u128 {
        self.account_rewards(account).rewards
    }

    pub fn user_reward_per_token_paid(&self, account: &Address) -> u128 {
        self.account_rewards(account).reward_per_token_paid
    }

    fn account_rewards(&self, account: &Address) -> AccountRewards {
        self.accounts.get(account).copied().unwrap_or_default()
    }

    // === Staking ===

    /// Stake `amount` grams of `caller`'s GOLD
    pub fn stake<G: FungibleToken>(&mut self, caller: Address, gold: &mut G, amount: u128, now: Timestamp) -> Result<()> {
        self.check_gold(gold)?;
        if amount == 0 {
            return Err(GoldexError::AmountCannotBeZero);
        }
        if gold.balance_of(&caller) < amount {
            return Err(GoldexError::InsufficientBalance);
        }
        if gold.allowance(&caller, &self.address) < amount {
            return Err(GoldexError::AmountExceedsAllowance);
        }

        gold.transfer_from(self.address, caller, self.address, amount)?;
        self.sync(caller, now);
        self.credit(caller, amount, now);
        tracing::info!(account = %caller, amount, total_staked = self.total_staked, "GOLD staked");
        Ok(())
    }

    /// Credit GOLD minted straight into the vault; GOLD token only
    pub fn mint_stake(&mut self, caller: Address, amount: u128, beneficiary: Address, now: Timestamp) -> Result<()> {
        if caller != self.gold_token {
            return Err(GoldexError::NotGoldToken);
        }
        if amount == 0 {
            return Err(GoldexError::AmountCannotBeZero);
        }
        if beneficiary.is_zero() {
            return Err(GoldexError::MintToAddressZero);
        }
        self.sync(beneficiary, now);
        self.credit(beneficiary, amount, now);
        tracing::info!(account = %beneficiary, amount, "GOLD stake minted");
        Ok(())
    }

    /// Return `amount` staked grams to `caller`
    pub fn withdraw_gold<G: FungibleToken>(&mut self, caller: Address, gold: &mut G, amount: u128, now: Timestamp) -> Result<()> {
        self.check_gold(gold)?;
        let staked = self
            .entries
            .get(&caller)
            .map(|e| e.total_staked)
            .ok_or(GoldexError::EntryDoesNotExist(caller))?;
        if amount == 0 {
            return Err(GoldexError::AmountCannotBeZero);
        }
        if amount > staked {
            return Err(GoldexError::CannotWithdrawMoreThanStaked(staked));
        }

        gold.transfer(self.address, caller, amount)?;
        self.sync(caller, now);
        self.debit(caller, amount, now);
        tracing::info!(account = %caller, amount, total_staked = self.total_staked, "GOLD withdrawn");
        Ok(())
    }

    /// Pay `caller`'s accrued GBAR; returns the amount paid
    pub fn claim_rewards<R: FungibleToken>(&mut self, caller: Address, gbar: &mut R, now: Timestamp) -> Result<u128> {
        let token = gbar.token_address();
        if token != self.gbar_token {
            return Err(GoldexError::UnknownToken(token));
        }
        let (account, global) = rewards::sync_rewards(
            &self.account_rewards(&caller),
            self.balance_of(&caller),
            &self.reward,
            self.total_staked,
            now,
        );
        let reward = account.rewards;
        if reward > 0 {
            gbar.transfer(self.address, caller, reward)?;
        }
        self.reward = global;
        self.accounts.insert(
            caller,
            AccountRewards {
                rewards: 0,
                ..account
            },
        );
        if reward > 0 {
            tracing::info!(account = %caller, reward, "staking reward paid");
        }
        Ok(reward)
    }

    /// Start a new reward stream of `reward` GBAR; fee distributor only
    pub fn notify_reward_amount(&mut self, caller: Address, reward: u128, now: Timestamp) -> Result<()> {
        if Some(caller) != self.fee_distributor {
            return Err(GoldexError::NotTheFeeDistributor);
        }
        self.reward = rewards::notify_reward_amount(&self.reward, self.total_staked, reward, now)?;
        tracing::debug!(
            reward,
            rate = self.reward.reward_rate,
            period_finish = self.reward.period_finish,
            "reward stream started"
        );
        Ok(())
    }

    /// Owner sweep of a token other than GOLD held by the vault
    pub fn recover_erc20<T: FungibleToken>(&mut self, caller: Address, token: &mut T, amount: u128) -> Result<u128> {
        self.ownable.only_owner(caller)?;
        if token.token_address() == self.gold_token {
            return Err(GoldexError::CannotRecoverStakeToken);
        }
        let owner = self.ownable.owner();
        let received = token.transfer(self.address, owner, amount)?;
        tracing::info!(token = %token.token_address(), amount, "token recovered from stake vault");
        Ok(received)
    }

    fn check_gold<G: FungibleToken>(&self, gold: &G) -> Result<()> {
        let token = gold.token_address();
        if token != self.gold_token {
            return Err(GoldexError::UnknownToken(token));
        }
        Ok(())
    }

    fn sync(&mut self, account: Address, now: Timestamp) {
        let (updated, global) = rewards::sync_rewards(
            &self.account_rewards(&account),
            self.balance_of(&account),
            &self.reward,
            self.total_staked,
            now,
        );
        self.reward = global;
        self.accounts.insert(account, updated);
    }

    fn credit(&mut self, account: Address, amount: u128, now: Timestamp) {
        let stakers = &mut self.total_stakers;
        let entry = self.entries.entry(account).or_insert_with(|| {
            *stakers += 1;
            StakeEntry {
                owner: account,
                total_staked: 0,
                start_date: now,
                last_updated: now,
            }
        });
        entry.total_staked += amount;
        entry.last_updated = now;
        self.total_staked += amount;
    }

    fn debit(&mut self, account: Address, amount: u128, now: Timestamp) {
        let mut closed = false;
        if let Some(entry) = self.entries.get_mut(&account) {
            entry.total_staked -= amount;
            entry.last_updated = now;
            closed = entry.total_staked == 0;
        }
        if closed {
            self.entries.remove(&account);
            self.total_stakers -= 1;
        }
        self.total_staked -= amount;
    }
}
