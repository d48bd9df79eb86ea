//! Single-owner access control

use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Owner of an administrative component
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    /// Create with an initial owner
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// Current owner
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Fail unless `caller` is the owner
    pub fn only_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(GoldexError::NotTheOwner);
        }
        Ok(())
    }

    /// Hand ownership to `new_owner`
    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(GoldexError::AddressCannotBeZero);
        }
        self.owner = new_owner;
        Ok(())
    }
}
