//! Custody vaults
//!
//! The GBAR reserve vault and the GOLD vault share one shape: an owned account
//! holding a single token, with owner withdrawals and public deposits. The
//! token is passed in at call time so the vault works over any
//! [`FungibleToken`].

use crate::ownable::Ownable;
use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Single-token custody vault
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vault {
    address: Address,
    token: Address,
    ownable: Ownable,
}

impl Vault {
    pub fn new(address: Address, token: Address, owner: Address) -> Self {
        Self {
            address,
            token,
            ownable: Ownable::new(owner),
        }
    }

    /// Vault account
    pub fn address(&self) -> Address {
        self.address
    }

    /// Token held by the vault
    pub fn token(&self) -> Address {
        self.token
    }

    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.ownable.transfer_ownership(caller, new_owner)
    }

    /// Vault balance of its token
    pub fn balance<T: FungibleToken>(&self, token: &T) -> Result<u128> {
        self.check_token(token)?;
        Ok(token.balance_of(&self.address))
    }

    /// Owner withdrawal to `to`; returns what `to` received
    pub fn withdraw_to<T: FungibleToken>(
        &self,
        caller: Address,
        token: &mut T,
        to: Address,
        amount: u128,
    ) -> Result<u128> {
        self.ownable.only_owner(caller)?;
        self.check_token(token)?;
        if amount == 0 {
            return Err(GoldexError::AmountCannotBeZero);
        }
        if to.is_zero() {
            return Err(GoldexError::AddressCannotBeZero);
        }
        if token.balance_of(&self.address) < amount {
            return Err(GoldexError::AmountExceedsBalance);
        }
        let received = token.transfer(self.address, to, amount)?;
        tracing::debug!(vault = %self.address, %to, amount, "vault withdrawal");
        Ok(received)
    }

    /// Pull `amount` from `caller` using the allowance granted to the vault
    pub fn deposit<T: FungibleToken>(&self, caller: Address, token: &mut T, amount: u128) -> Result<u128> {
        self.check_token(token)?;
        if amount == 0 {
            return Err(GoldexError::AmountCannotBeZero);
        }
        if token.allowance(&caller, &self.address) < amount {
            return Err(GoldexError::AmountExceedsAllowance);
        }
        let received = token.transfer_from(self.address, caller, self.address, amount)?;
        tracing::debug!(vault = %self.address, from = %caller, amount, "vault deposit");
        Ok(received)
    }

    fn check_token<T: FungibleToken>(&self, token: &T) -> Result<()> {
        let address = token.token_address();
        if address != self.token {
            return Err(GoldexError::UnknownToken(address));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Vault, TokenLedger, Address) {
        let owner = Address::repeat_byte(1);
        let token = TokenLedger::new(Address::derive("gold"), "GOLD", 0);
        let vault = Vault::new(Address::derive("gold-vault"), token.token_address(), owner);
        (vault, token, owner)
    }

    #[test]
    fn test_withdraw() {
        let (vault, mut token, owner) = setup();
        let alice = Address::repeat_byte(2);
        token.mint(vault.address(), 1_000).unwrap();

        assert_eq!(vault.withdraw_to(owner, &mut token, alice, 400), Ok(400));
        assert_eq!(token.balance_of(&alice), 400);
        assert_eq!(vault.balance(&token), Ok(600));
    }

    #[test]
    fn test_withdraw_errors() {
        let (vault, mut token, owner) = setup();
        let alice = Address::repeat_byte(2);
        token.mint(vault.address(), 1_000).unwrap();

        assert_eq!(vault.withdraw_to(alice, &mut token, alice, 1), Err(GoldexError::NotTheOwner));
        assert_eq!(vault.withdraw_to(owner, &mut token, alice, 1_001), Err(GoldexError::AmountExceedsBalance));
        assert_eq!(vault.withdraw_to(owner, &mut token, alice, 0), Err(GoldexError::AmountCannotBeZero));
        assert_eq!(
            vault.withdraw_to(owner, &mut token, Address::ZERO, 1),
            Err(GoldexError::AddressCannotBeZero)
        );
    }

    #[test]
    fn test_deposit() {
        let (vault, mut token, _) = setup();
        let alice = Address::repeat_byte(2);
        token.mint(alice, 1_000).unwrap();

        assert_eq!(vault.deposit(alice, &mut token, 1_000), Err(GoldexError::AmountExceedsAllowance));

        token.approve(alice, vault.address(), 1_000).unwrap();
        assert_eq!(vault.deposit(alice, &mut token, 1_001), Err(GoldexError::AmountExceedsAllowance));
        assert_eq!(vault.deposit(alice, &mut token, 1_000), Ok(1_000));
        assert_eq!(vault.balance(&token), Ok(1_000));
    }

    #[test]
    fn test_deposit_without_balance() {
        let (vault, mut token, _) = setup();
        let alice = Address::repeat_byte(2);
        token.approve(alice, vault.address(), 1_000).unwrap();

        assert_eq!(vault.deposit(alice, &mut token, 1_000), Err(GoldexError::TransferExceedsBalance));
    }

    #[test]
    fn test_wrong_token() {
        let (vault, _, owner) = setup();
        let mut other = TokenLedger::new(Address::derive("other"), "OTH", 6);
        assert_eq!(
            vault.withdraw_to(owner, &mut other, owner, 1),
            Err(GoldexError::UnknownToken(Address::derive("other")))
        );
    }
}
