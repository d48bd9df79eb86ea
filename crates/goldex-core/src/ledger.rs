//! Fungible token ledger
//!
//! Plain ERC-20 accounting: balances, allowances, total supply, mint and burn.
//! Token components (GOLD, GBAR) wrap a `TokenLedger` and layer their own
//! rules (fees, blacklist) on top through the `FungibleToken` trait.

use crate::address::Address;
use crate::error::{GoldexError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transfer primitives shared by every token in the system
///
/// Vaults and the stake vault move funds through this trait so the same code
/// works for GOLD and for fee-charging GBAR.
pub trait FungibleToken {
    /// Address of the token contract
    fn token_address(&self) -> Address;

    /// Balance held by `account`
    fn balance_of(&self, account: &Address) -> u128;

    /// Remaining amount `spender` may move on behalf of `owner`
    fn allowance(&self, owner: &Address, spender: &Address) -> u128;

    /// Total supply in circulation
    fn total_supply(&self) -> u128;

    /// Set the allowance of `spender` over `owner`'s balance
    fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> Result<()>;

    /// Move `amount` from `from` to `to`, returning what `to` received
    fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<u128>;

    /// Move `amount` from `from` to `to` using `spender`'s allowance
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<u128>;
}

/// In-memory token ledger
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    /// Token contract address
    address: Address,

    /// Token symbol
    symbol: String,

    /// Decimal places
    decimals: u8,

    /// Balances per account (zero balances are pruned)
    balances: HashMap<Address, u128>,

    /// Allowances keyed by (owner, spender)
    allowances: HashMap<(Address, Address), u128>,

    /// Total supply
    total_supply: u128,
}

impl TokenLedger {
    /// Create an empty ledger
    pub fn new(address: Address, symbol: &str, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            decimals,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
        }
    }

    /// Token symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Decimal places
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Create `amount` new tokens for `to`
    pub fn mint(&mut self, to: Address, amount: u128) -> Result<()> {
        if to.is_zero() {
            return Err(GoldexError::MintToAddressZero);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(GoldexError::ArithmeticOverflow("mint"))?;
        self.total_supply = supply;
        self.credit(to, amount);
        Ok(())
    }

    /// Destroy `amount` tokens held by `from`
    pub fn burn(&mut self, from: Address, amount: u128) -> Result<()> {
        if self.balance_of(&from) < amount {
            return Err(GoldexError::BurnExceedsBalance);
        }
        self.debit(from, amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Spend `amount` of `spender`'s allowance over `owner`
    pub fn spend_allowance(&mut self, owner: Address, spender: Address, amount: u128) -> Result<()> {
        let current = self.allowance(&owner, &spender);
        if current < amount {
            return Err(GoldexError::InsufficientAllowance);
        }
        if current != u128::MAX {
            self.allowances.insert((owner, spender), current - amount);
        }
        Ok(())
    }

    /// Move balance without any validation beyond sufficiency
    pub(crate) fn move_balance(&mut self, from: Address, to: Address, amount: u128) -> Result<()> {
        if self.balance_of(&from) < amount {
            return Err(GoldexError::TransferExceedsBalance);
        }
        self.debit(from, amount);
        self.credit(to, amount);
        Ok(())
    }

    fn credit(&mut self, account: Address, amount: u128) {
        if amount == 0 {
            return;
        }
        *self.balances.entry(account).or_insert(0) += amount;
    }

    fn debit(&mut self, account: Address, amount: u128) {
        if amount == 0 {
            return;
        }
        if let Some(balance) = self.balances.get_mut(&account) {
            *balance -= amount;
            if *balance == 0 {
                self.balances.remove(&account);
            }
        }
    }
}

impl FungibleToken for TokenLedger {
    fn token_address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> Result<()> {
        if owner.is_zero() || spender.is_zero() {
            return Err(GoldexError::AddressCannotBeZero);
        }
        self.allowances.insert((owner, spender), amount);
        Ok(())
    }

    fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<u128> {
        if to.is_zero() {
            return Err(GoldexError::AddressCannotBeZero);
        }
        self.move_balance(from, to, amount)?;
        Ok(amount)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<u128> {
        if to.is_zero() {
            return Err(GoldexError::AddressCannotBeZero);
        }
        // Validate both before touching either so a failure leaves no trace
        if self.allowance(&from, &spender) < amount {
            return Err(GoldexError::InsufficientAllowance);
        }
        if self.balance_of(&from) < amount {
            return Err(GoldexError::TransferExceedsBalance);
        }
        self.spend_allowance(from, spender, amount)?;
        self.move_balance(from, to, amount)?;
        Ok(amount)
    }
}
