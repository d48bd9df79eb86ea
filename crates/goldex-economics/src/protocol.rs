//! # Protocol State Store
//!
//! Owns every component of one deployment and runs the operations that cross
//! component boundaries. Callers are explicit; time comes from the injected
//! [`Clock`]. An operation either fully applies and logs its events or fails
//! and leaves the store untouched.
//!
//! ## Deployment wiring
//!
//! ```text
//!   oracle ──► GOLD ──► stake vault ◄── fee distributor
//!                │           ▲               ▲
//!                ▼           │ rewards       │ fees
//!              GBAR ─────────┴───────────────┘
//!                │
//!                ▼
//!          GBAR reserve vault
//! ```
//!
//! The reserve vault, stake vault and distributor are excluded from GBAR
//! fees so internal movements are never charged.

use crate::config::ProtocolConfig;
use crate::conversion::GoldConversion;
use crate::distributor::FeeDistributor;
use crate::events::{EventLog, ProtocolEvent};
use crate::gbar::{GbarToken, TransferReceipt};
use crate::gold::GoldToken;
use crate::oracle::{GoldPriceOracle, PriceFeed};
use crate::retrieval::RetrievalRequestInfo;
use crate::stabilization::{StabilizationState, Stabilized};
use crate::staking::StakeVault;
use crate::vault::Vault;
use goldex_core::prelude::*;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Component addresses of a deployment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub oracle: Address,
    pub gold: Address,
    pub gbar: Address,
    pub gold_vault: Address,
    pub gbar_vault: Address,
    pub stake_vault: Address,
    pub fee_distributor: Address,
}

impl Deployment {
    /// Addresses derived from fixed labels
    pub fn derived() -> Self {
        Self {
            oracle: Address::derive("goldex/gold-price-oracle"),
            gold: Address::derive("goldex/gold"),
            gbar: Address::derive("goldex/gbar"),
            gold_vault: Address::derive("goldex/gold-vault"),
            gbar_vault: Address::derive("goldex/gbar-vault"),
            stake_vault: Address::derive("goldex/gold-stake-vault"),
            fee_distributor: Address::derive("goldex/fee-distributor"),
        }
    }
}

/// One deployed protocol instance
pub struct Protocol {
    clock: Arc<dyn Clock>,
    config: ProtocolConfig,
    deployment: Deployment,
    oracle: GoldPriceOracle,
    gold: GoldToken,
    gbar: GbarToken,
    gold_vault: Vault,
    gbar_vault: Vault,
    stake_vault: StakeVault,
    distributor: FeeDistributor,
    stabilization: StabilizationState,
    events: EventLog,
}

impl Protocol {
    /// Deploy and wire all components at the clock's current time
    pub fn deploy(config: ProtocolConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let now = clock.now();
        let owner = config.owner;
        let d = Deployment::derived();

        let oracle = GoldPriceOracle::new(owner, config.initial_gold_price as u128, now)?;
        let mut gold = GoldToken::new(d.gold, owner, d.oracle);
        let mut gbar = GbarToken::new(
            d.gbar,
            owner,
            d.gold,
            config.retrieval_guards.clone(),
            config.confirmations_required,
        )?;
        let gold_vault = Vault::new(d.gold_vault, d.gold, owner);
        let gbar_vault = Vault::new(d.gbar_vault, d.gbar, owner);
        let mut stake_vault = StakeVault::new(d.stake_vault, owner, d.gold, d.gbar, config.reward_duration_secs);
        let distributor = FeeDistributor::new(
            d.fee_distributor,
            owner,
            config.company,
            config.interest_rate as u128,
            config.distribution_period_secs,
            now,
        );

        gold.set_stake_vault(owner, d.stake_vault)?;
        gold.set_gbar_token(owner, d.gbar)?;
        stake_vault.set_fee_distributor(owner, d.fee_distributor)?;
        gbar.set_fee_distributor(owner, d.fee_distributor)?;
        gbar.set_gbar_vault(owner, d.gbar_vault)?;
        for excluded in [d.stake_vault, d.fee_distributor, d.gbar_vault] {
            gbar.add_fee_exclusion(owner, excluded)?;
        }

        tracing::info!(%owner, now, guards = config.retrieval_guards.len(), "protocol deployed");

        Ok(Self {
            clock,
            stabilization: StabilizationState::new(now, config.stabilize_cooldown_secs),
            config,
            deployment: d,
            oracle,
            gold,
            gbar,
            gold_vault,
            gbar_vault,
            stake_vault,
            distributor,
            events: EventLog::new(),
        })
    }

    // === Accessors ===

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn oracle(&self) -> &GoldPriceOracle {
        &self.oracle
    }

    pub fn gold(&self) -> &GoldToken {
        &self.gold
    }

    pub fn gbar(&self) -> &GbarToken {
        &self.gbar
    }

    pub fn gold_vault(&self) -> &Vault {
        &self.gold_vault
    }

    pub fn gbar_vault(&self) -> &Vault {
        &self.gbar_vault
    }

    pub fn stake_vault(&self) -> &StakeVault {
        &self.stake_vault
    }

    pub fn distributor(&self) -> &FeeDistributor {
        &self.distributor
    }

    pub fn stabilization(&self) -> &StabilizationState {
        &self.stabilization
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    fn emit(&mut self, event: ProtocolEvent) {
        let now = self.clock.now();
        self.events.push(now, event);
    }

    // === Oracle ===

    pub fn set_gold_price(&mut self, caller: Address, price: u128) -> Result<()> {
        let now = self.now();
        self.oracle.set_latest_price(caller, price, now)?;
        self.emit(ProtocolEvent::PriceUpdated { price });
        Ok(())
    }

    /// Pull the price from an external feed
    pub fn refresh_gold_price(&mut self, caller: Address, feed: &dyn PriceFeed) -> Result<u128> {
        let now = self.now();
        let price = self.oracle.refresh_from_feed(caller, feed, now)?;
        self.emit(ProtocolEvent::PriceUpdated { price });
        Ok(price)
    }

    pub fn gold_gbar_conversion(&self, grams: u128) -> Result<GoldConversion> {
        self.oracle.gold_gbar_conversion(grams)
    }

    // === GOLD ===

    pub fn mint_gold(&mut self, caller: Address, to: Address, grams: u128) -> Result<()> {
        self.gold.mint(caller, to, grams)?;
        self.emit(ProtocolEvent::Minted {
            token: self.deployment.gold,
            to,
            amount: grams,
        });
        Ok(())
    }

    /// Mint GOLD to `to` and its GBAR equivalent into the reserve vault
    pub fn mint_gold_and_gbar(&mut self, caller: Address, to: Address, grams: u128) -> Result<GoldConversion> {
        let gbar = self.gold.check_mint_gold_and_gbar(caller, to, grams)?;
        self.check_gbar_link(gbar)?;
        let conversion = self.backing_conversion(grams)?;

        self.gold.mint_unchecked(to, grams)?;
        self.gbar.gold_value_mint(self.deployment.gold, conversion.gbar_equivalent)?;

        self.emit(ProtocolEvent::Minted {
            token: self.deployment.gold,
            to,
            amount: grams,
        });
        self.emit(ProtocolEvent::Minted {
            token: self.deployment.gbar,
            to: self.deployment.gbar_vault,
            amount: conversion.gbar_equivalent,
        });
        Ok(conversion)
    }

    /// Mint GOLD straight into the stake vault credited to `to`, plus backing GBAR
    pub fn stake_mint(&mut self, caller: Address, to: Address, grams: u128) -> Result<GoldConversion> {
        let vault = self.gold.check_stake_mint(caller, to, grams)?;
        if vault != self.stake_vault.address() {
            return Err(GoldexError::UnknownToken(vault));
        }
        let gbar = self.gold.gbar_token().ok_or(GoldexError::GbarTokenNotSet)?;
        self.check_gbar_link(gbar)?;
        let conversion = self.backing_conversion(grams)?;

        let now = self.now();
        self.gold.mint_unchecked(vault, grams)?;
        self.stake_vault.mint_stake(self.deployment.gold, grams, to, now)?;
        self.gbar.gold_value_mint(self.deployment.gold, conversion.gbar_equivalent)?;

        self.emit(ProtocolEvent::Staked { account: to, amount: grams });
        self.emit(ProtocolEvent::Minted {
            token: self.deployment.gbar,
            to: self.deployment.gbar_vault,
            amount: conversion.gbar_equivalent,
        });
        Ok(conversion)
    }

    fn check_gbar_link(&self, gbar: Address) -> Result<()> {
        if gbar != self.deployment.gbar {
            return Err(GoldexError::UnknownToken(gbar));
        }
        if self.gbar.gold_contract() != self.deployment.gold {
            return Err(GoldexError::NotTheGoldContract);
        }
        if self.gbar.gbar_vault().is_none() {
            return Err(GoldexError::GbarVaultNotSet);
        }
        Ok(())
    }

    fn backing_conversion(&self, grams: u128) -> Result<GoldConversion> {
        let conversion = self.oracle.gold_gbar_conversion(grams)?;
        if conversion.gbar_equivalent == 0 {
            return Err(GoldexError::AmountCannotBeZero);
        }
        Ok(conversion)
    }

    pub fn gold_transfer(&mut self, caller: Address, to: Address, amount: u128) -> Result<()> {
        self.gold.transfer(caller, to, amount)?;
        self.emit(ProtocolEvent::Transfer {
            token: self.deployment.gold,
            from: caller,
            to,
            amount,
        });
        Ok(())
    }

    pub fn gold_approve(&mut self, caller: Address, spender: Address, amount: u128) -> Result<()> {
        self.gold.approve(caller, spender, amount)
    }

    // === GBAR ===

    /// Owner mint into the reserve vault
    pub fn mint_gbar(&mut self, caller: Address, amount: u128) -> Result<()> {
        self.gbar.mint(caller, amount)?;
        self.emit(ProtocolEvent::Minted {
            token: self.deployment.gbar,
            to: self.deployment.gbar_vault,
            amount,
        });
        Ok(())
    }

    pub fn gbar_transfer(&mut self, caller: Address, to: Address, amount: u128) -> Result<TransferReceipt> {
        let receipt = self.gbar.transfer_with_fee(caller, to, amount)?;
        self.emit_gbar_transfer(caller, to, receipt);
        Ok(receipt)
    }

    pub fn gbar_transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<TransferReceipt> {
        let receipt = self.gbar.transfer_from_with_fee(caller, from, to, amount)?;
        self.emit_gbar_transfer(from, to, receipt);
        Ok(receipt)
    }

    pub fn gbar_approve(&mut self, caller: Address, spender: Address, amount: u128) -> Result<()> {
        self.gbar.approve(caller, spender, amount)
    }

    fn emit_gbar_transfer(&mut self, from: Address, to: Address, receipt: TransferReceipt) {
        self.emit(ProtocolEvent::Transfer {
            token: self.deployment.gbar,
            from,
            to,
            amount: receipt.received,
        });
        if receipt.fee > 0 {
            self.emit(ProtocolEvent::FeeCollected { from, fee: receipt.fee });
        }
    }

    pub fn add_blacklist(&mut self, caller: Address, account: Address) -> Result<()> {
        self.gbar.add_blacklist(caller, account)?;
        self.emit(ProtocolEvent::Blacklisted { account });
        Ok(())
    }

    pub fn remove_blacklist(&mut self, caller: Address, account: Address) -> Result<()> {
        self.gbar.remove_blacklist(caller, account)?;
        self.emit(ProtocolEvent::Unblacklisted { account });
        Ok(())
    }

    pub fn add_fee_exclusion(&mut self, caller: Address, account: Address) -> Result<()> {
        self.gbar.add_fee_exclusion(caller, account)
    }

    pub fn remove_fee_exclusion(&mut self, caller: Address, account: Address) -> Result<()> {
        self.gbar.remove_fee_exclusion(caller, account)
    }

    /// Owner burn of a blacklisted balance
    pub fn burn_gbar(&mut self, caller: Address, account: Address, amount: u128) -> Result<()> {
        self.gbar.burn(caller, account, amount)?;
        self.emit(ProtocolEvent::Burned {
            token: self.deployment.gbar,
            from: account,
            amount,
        });
        Ok(())
    }

    // === Stabilization ===

    /// Move GBAR supply toward 85% of the circulating gold value
    pub fn stabilize(&mut self) -> Result<Stabilized> {
        let now = self.now();
        let quote = self.oracle.quote();
        let gold_supply = self.gold.total_supply();
        let result = self.stabilization.stabilize(&mut self.gbar, gold_supply, &quote, now)?;
        self.emit(ProtocolEvent::Stabilized {
            total_supply: result.total_supply,
            vault_balance: result.vault_balance,
            price_per_gram: result.price_per_gram,
            total_gold_value: result.total_gold_value,
        });
        Ok(result)
    }

    // === Vaults ===

    pub fn gbar_vault_withdraw_to(&mut self, caller: Address, to: Address, amount: u128) -> Result<u128> {
        let received = self.gbar_vault.withdraw_to(caller, &mut self.gbar, to, amount)?;
        self.emit(ProtocolEvent::Transfer {
            token: self.deployment.gbar,
            from: self.deployment.gbar_vault,
            to,
            amount: received,
        });
        Ok(received)
    }

    pub fn gbar_vault_deposit(&mut self, caller: Address, amount: u128) -> Result<u128> {
        let received = self.gbar_vault.deposit(caller, &mut self.gbar, amount)?;
        self.emit(ProtocolEvent::Transfer {
            token: self.deployment.gbar,
            from: caller,
            to: self.deployment.gbar_vault,
            amount: received,
        });
        Ok(received)
    }

    pub fn gold_vault_withdraw_to(&mut self, caller: Address, to: Address, amount: u128) -> Result<u128> {
        let received = self.gold_vault.withdraw_to(caller, &mut self.gold, to, amount)?;
        self.emit(ProtocolEvent::Transfer {
            token: self.deployment.gold,
            from: self.deployment.gold_vault,
            to,
            amount: received,
        });
        Ok(received)
    }

    pub fn gold_vault_deposit(&mut self, caller: Address, amount: u128) -> Result<u128> {
        let received = self.gold_vault.deposit(caller, &mut self.gold, amount)?;
        self.emit(ProtocolEvent::Transfer {
            token: self.deployment.gold,
            from: caller,
            to: self.deployment.gold_vault,
            amount: received,
        });
        Ok(received)
    }

    // === Staking ===

    pub fn stake(&mut self, caller: Address, amount: u128) -> Result<()> {
        let now = self.now();
        self.stake_vault.stake(caller, &mut self.gold, amount, now)?;
        self.emit(ProtocolEvent::Staked { account: caller, amount });
        Ok(())
    }

    pub fn withdraw_gold(&mut self, caller: Address, amount: u128) -> Result<()> {
        let now = self.now();
        self.stake_vault.withdraw_gold(caller, &mut self.gold, amount, now)?;
        self.emit(ProtocolEvent::Withdrawn { account: caller, amount });
        Ok(())
    }

    pub fn claim_rewards(&mut self, caller: Address) -> Result<u128> {
        let now = self.now();
        let reward = self.stake_vault.claim_rewards(caller, &mut self.gbar, now)?;
        if reward > 0 {
            self.emit(ProtocolEvent::RewardPaid { account: caller, reward });
        }
        Ok(reward)
    }

    /// GBAR accrued by `account` so far
    pub fn earned(&self, account: &Address) -> u128 {
        self.stake_vault.earned(account, self.now())
    }

    /// Owner sweep of a non-stake token from the stake vault
    pub fn recover_erc20(&mut self, caller: Address, token: Address, amount: u128) -> Result<u128> {
        let received = if token == self.deployment.gold {
            self.stake_vault.recover_erc20(caller, &mut self.gold, amount)?
        } else if token == self.deployment.gbar {
            self.stake_vault.recover_erc20(caller, &mut self.gbar, amount)?
        } else {
            return Err(GoldexError::UnknownToken(token));
        };
        self.emit(ProtocolEvent::Transfer {
            token,
            from: self.deployment.stake_vault,
            to: self.stake_vault.owner(),
            amount: received,
        });
        Ok(received)
    }

    // === Fee distribution ===

    /// Fix the day's staking interest; open to any caller
    pub fn set_payout_values(&mut self) -> Result<u128> {
        let now = self.now();
        let collected = self.gbar.balance_of(&self.deployment.fee_distributor);
        let quote = self.oracle.quote();
        let interest = self
            .distributor
            .set_payout_values(self.stake_vault.total_supply(), collected, &quote, now)?;
        self.emit(ProtocolEvent::PayoutValuesSet {
            interest,
            period_finish: self.distributor.period_finish(),
        });
        Ok(interest)
    }

    /// Stream the fixed interest to stakers and pay the company share;
    /// open to any caller
    pub fn distribute_rewards(&mut self) -> Result<u128> {
        let now = self.now();
        let company = self.distributor.company();
        let window = *self.distributor.window();
        let company_share = window.pending_company_share;
        if window.distribute_open {
            let blocked = |account: &Address, amount: u128| amount > 0 && self.gbar.is_blacklisted(account);
            if blocked(&company, company_share)
                || blocked(&self.deployment.stake_vault, window.pending_interest)
                || blocked(&self.deployment.fee_distributor, window.pending_interest.saturating_add(company_share))
            {
                return Err(GoldexError::BlacklistedTransaction);
            }
        }

        let reward = self
            .distributor
            .distribute_rewards(&mut self.gbar, &mut self.stake_vault, now)?;
        if reward > 0 {
            self.emit(ProtocolEvent::RewardAdded { reward });
        }
        if company_share > 0 {
            self.emit(ProtocolEvent::Transfer {
                token: self.deployment.gbar,
                from: self.deployment.fee_distributor,
                to: company,
                amount: company_share,
            });
        }
        Ok(reward)
    }

    // === Retrieval guards ===

    pub fn create_retrieval_request(&mut self, caller: Address, target: Address, amount: u128) -> Result<u64> {
        let id = self.gbar.create_retrieval_request(caller, target, amount)?;
        self.emit(ProtocolEvent::RetrievalRequestCreated { id, target, amount });
        Ok(id)
    }

    pub fn confirm_retrieval_request(&mut self, caller: Address, id: u64) -> Result<usize> {
        let confirmations = self.gbar.confirm_retrieval_request(caller, id)?;
        self.emit(ProtocolEvent::RetrievalRequestConfirmed { id, guard: caller });
        Ok(confirmations)
    }

    pub fn revoke_confirmation(&mut self, caller: Address, id: u64) -> Result<usize> {
        let confirmations = self.gbar.revoke_confirmation(caller, id)?;
        self.emit(ProtocolEvent::RetrievalRequestRevoked { id, guard: caller });
        Ok(confirmations)
    }

    pub fn execute_retrieval_request(&mut self, caller: Address, id: u64) -> Result<Address> {
        let target = self.gbar.execute_retrieval_request(caller, id)?;
        self.emit(ProtocolEvent::RetrievalRequestExecuted { id, target });
        self.emit(ProtocolEvent::Blacklisted { account: target });
        Ok(target)
    }

    pub fn get_retrieval_request(&self, id: u64) -> Result<RetrievalRequestInfo> {
        self.gbar.get_retrieval_request(id)
    }
}

/// Protocol shared across threads; writers are serialized
#[derive(Clone)]
pub struct SharedProtocol {
    inner: Arc<RwLock<Protocol>>,
}

impl SharedProtocol {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            inner: Arc::new(RwLock::new(protocol)),
        }
    }

    /// Run a read-only query
    pub fn read<T>(&self, f: impl FnOnce(&Protocol) -> T) -> T {
        f(&self.inner.read())
    }

    /// Run one operation under the write lock
    pub fn write<T>(&self, f: impl FnOnce(&mut Protocol) -> T) -> T {
        f(&mut self.inner.write())
    }
}
