//! # GOLD Token
//!
//! Gram-denominated token (0 decimals) representing physical gold. Only the
//! owner mints. Minting can also back new GBAR (`mint_gold_and_gbar`) or land
//! straight in the stake vault (`stake_mint`); those flows cross components
//! and are orchestrated by [`crate::protocol::Protocol`], which calls the
//! validation helpers here first.

use crate::ownable::Ownable;
use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Token symbol
pub const GOLD_SYMBOL: &str = "GOLD";

/// GOLD token contract
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoldToken {
    ledger: TokenLedger,
    ownable: Ownable,
    price_oracle: Address,
    gbar_token: Option<Address>,
    stake_vault: Option<Address>,
}

impl GoldToken {
    /// Deploy at `address`, reading prices from `price_oracle`
    pub fn new(address: Address, owner: Address, price_oracle: Address) -> Self {
        Self {
            ledger: TokenLedger::new(address, GOLD_SYMBOL, GOLD_DECIMALS),
            ownable: Ownable::new(owner),
            price_oracle,
            gbar_token: None,
            stake_vault: None,
        }
    }

    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.ownable.transfer_ownership(caller, new_owner)
    }

    pub fn decimals(&self) -> u8 {
        self.ledger.decimals()
    }

    pub fn symbol(&self) -> &str {
        self.ledger.symbol()
    }

    pub fn price_oracle(&self) -> Address {
        self.price_oracle
    }

    pub fn gbar_token(&self) -> Option<Address> {
        self.gbar_token
    }

    pub fn stake_vault(&self) -> Option<Address> {
        self.stake_vault
    }

    pub fn set_price_oracle(&mut self, caller: Address, oracle: Address) -> Result<()> {
        self.ownable.only_owner(caller)?;
        require_non_zero(oracle)?;
        self.price_oracle = oracle;
        Ok(())
    }

    pub fn set_gbar_token(&mut self, caller: Address, gbar: Address) -> Result<()> {
        self.ownable.only_owner(caller)?;
        require_non_zero(gbar)?;
        self.gbar_token = Some(gbar);
        Ok(())
    }

    pub fn set_stake_vault(&mut self, caller: Address, vault: Address) -> Result<()> {
        self.ownable.only_owner(caller)?;
        require_non_zero(vault)?;
        self.stake_vault = Some(vault);
        Ok(())
    }

    /// Owner-only mint
    pub fn mint(&mut self, caller: Address, to: Address, amount: u128) -> Result<()> {
        self.check_mint(caller, to, amount)?;
        self.ledger.mint(to, amount)
    }

    /// Validate a mint that also backs GBAR; returns the linked GBAR token
    pub fn check_mint_gold_and_gbar(&self, caller: Address, to: Address, amount: u128) -> Result<Address> {
        self.check_mint(caller, to, amount)?;
        self.gbar_token.ok_or(GoldexError::GbarTokenNotSet)
    }

    /// Validate a stake mint; returns the linked stake vault
    pub fn check_stake_mint(&self, caller: Address, to: Address, amount: u128) -> Result<Address> {
        self.check_mint(caller, to, amount)?;
        if self.gbar_token.is_none() {
            return Err(GoldexError::GbarTokenNotSet);
        }
        self.stake_vault.ok_or(GoldexError::StakeVaultNotSet)
    }

    /// Mint after the caller has been validated
    pub(crate) fn mint_unchecked(&mut self, to: Address, amount: u128) -> Result<()> {
        self.ledger.mint(to, amount)
    }

    fn check_mint(&self, caller: Address, to: Address, amount: u128) -> Result<()> {
        self.ownable.only_owner(caller)?;
        if amount == 0 {
            return Err(GoldexError::AmountCannotBeZero);
        }
        if to.is_zero() {
            return Err(GoldexError::MintToAddressZero);
        }
        Ok(())
    }
}

impl FungibleToken for GoldToken {
    fn token_address(&self) -> Address {
        self.ledger.token_address()
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.ledger.balance_of(account)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.ledger.allowance(owner, spender)
    }

    fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> Result<()> {
        self.ledger.approve(owner, spender, amount)
    }

    fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<u128> {
        self.ledger.transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<u128> {
        self.ledger.transfer_from(spender, from, to, amount)
    }
}

pub(crate) fn require_non_zero(address: Address) -> Result<()> {
    if address.is_zero() {
        return Err(GoldexError::AddressCannotBeZero);
    }
    Ok(())
}
