//! # Retrieval Guards
//!
//! Multi-signature freeze of GBAR held by an account. A fixed set of guards
//! files a request against a target, collects confirmations and, once the
//! threshold is met, executes it. Execution blacklists the target; the owner
//! can then burn the frozen balance.
//!
//! ## Request lifecycle
//!
//! | Status | Confirmations |
//! |--------|---------------|
//! | Pending | none |
//! | PartiallyConfirmed | fewer than required |
//! | FullyConfirmed | at least required |
//!
//! Confirming and revoking move a request between these states. Executing a
//! fully confirmed request sets `executed`, after which it is frozen.

use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Confirmation state of a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalStatus {
    Pending,
    PartiallyConfirmed,
    /// Enough confirmations to execute
    FullyConfirmed,
}

impl RetrievalStatus {
    pub fn from_confirmations(confirmations: usize, required: usize) -> Self {
        match confirmations {
            0 => Self::Pending,
            n if n < required => Self::PartiallyConfirmed,
            _ => Self::FullyConfirmed,
        }
    }
}

/// A retrieval request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalRequest {
    /// Index in the request list
    pub id: u64,
    /// Account whose funds are frozen
    pub target: Address,
    /// GBAR amount to retrieve
    pub amount: u128,
    /// Guards that confirmed
    pub confirmed_by: HashSet<Address>,
    pub status: RetrievalStatus,
    /// Executed, target blacklisted
    pub executed: bool,
}

impl RetrievalRequest {
    /// Number of confirmations collected
    pub fn num_confirmations(&self) -> usize {
        self.confirmed_by.len()
    }

    fn update_status(&mut self, required: usize) {
        self.status = RetrievalStatus::from_confirmations(self.num_confirmations(), required);
    }
}

/// Read-only view returned by `get_request`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalRequestInfo {
    pub target: Address,
    pub amount: u128,
    pub num_confirmations: usize,
    pub status: RetrievalStatus,
    pub executed: bool,
}

/// Guard set and request book
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrievalGuard {
    guards: Vec<Address>,
    required: usize,
    requests: Vec<RetrievalRequest>,
}

impl RetrievalGuard {
    /// Create with `guards`, `required` of which must confirm
    pub fn new(guards: Vec<Address>, required: usize) -> Result<Self> {
        if required == 0 || required > guards.len() {
            return Err(GoldexError::InvalidConfirmationThreshold {
                required,
                guards: guards.len(),
            });
        }
        let mut seen = HashSet::with_capacity(guards.len());
        for guard in &guards {
            if guard.is_zero() {
                return Err(GoldexError::AddressCannotBeZero);
            }
            if !seen.insert(*guard) {
                return Err(GoldexError::DuplicateRetrievalGuard(*guard));
            }
        }
        Ok(Self {
            guards,
            required,
            requests: Vec::new(),
        })
    }

    /// Guard addresses
    pub fn guards(&self) -> &[Address] {
        &self.guards
    }

    pub fn guards_count(&self) -> usize {
        self.guards.len()
    }

    /// Confirmations required to execute
    pub fn num_confirmations_required(&self) -> usize {
        self.required
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    pub fn is_guard(&self, account: &Address) -> bool {
        self.guards.contains(account)
    }

    /// Look up a request
    pub fn get_request(&self, id: u64) -> Result<RetrievalRequestInfo> {
        let request = self.request(id)?;
        Ok(RetrievalRequestInfo {
            target: request.target,
            amount: request.amount,
            num_confirmations: request.num_confirmations(),
            status: request.status,
            executed: request.executed,
        })
    }

    /// Whether `guard` confirmed request `id`
    pub fn is_confirmed_by(&self, id: u64, guard: &Address) -> Result<bool> {
        Ok(self.request(id)?.confirmed_by.contains(guard))
    }

    /// File a new request; returns its id
    pub fn create_request(&mut self, caller: Address, target: Address, amount: u128) -> Result<u64> {
        self.only_guard(caller)?;
        if target.is_zero() {
            return Err(GoldexError::AddressCannotBeZero);
        }
        if amount == 0 {
            return Err(GoldexError::AmountCannotBeZero);
        }

        let id = self.requests.len() as u64;
        self.requests.push(RetrievalRequest {
            id,
            target,
            amount,
            confirmed_by: HashSet::new(),
            status: RetrievalStatus::Pending,
            executed: false,
        });
        tracing::info!(id, %target, amount, guard = %caller, "retrieval request created");
        Ok(id)
    }

    /// Add the caller's confirmation
    pub fn confirm_request(&mut self, caller: Address, id: u64) -> Result<usize> {
        self.only_guard(caller)?;
        let required = self.required;
        let request = self.pending_mut(id)?;
        if !request.confirmed_by.insert(caller) {
            return Err(GoldexError::RetrievalRequestAlreadyConfirmed(id));
        }
        request.update_status(required);
        tracing::debug!(id, guard = %caller, confirmations = request.num_confirmations(), "retrieval confirmed");
        Ok(request.num_confirmations())
    }

    /// Withdraw the caller's confirmation
    pub fn revoke_confirmation(&mut self, caller: Address, id: u64) -> Result<usize> {
        self.only_guard(caller)?;
        let required = self.required;
        let request = self.pending_mut(id)?;
        if !request.confirmed_by.remove(&caller) {
            return Err(GoldexError::RequestNotConfirmed(id));
        }
        request.update_status(required);
        tracing::debug!(id, guard = %caller, confirmations = request.num_confirmations(), "retrieval revoked");
        Ok(request.num_confirmations())
    }

    /// Execute once enough guards confirmed; returns the target and amount
    pub fn execute_request(&mut self, caller: Address, id: u64) -> Result<(Address, u128)> {
        self.only_guard(caller)?;
        let required = self.required;
        let request = self.pending_mut(id)?;
        let received = request.num_confirmations();
        if received < required {
            return Err(GoldexError::NotEnoughConfirmations { required, received });
        }
        request.executed = true;
        tracing::info!(id, target = %request.target, amount = request.amount, "retrieval request executed");
        Ok((request.target, request.amount))
    }

    fn only_guard(&self, caller: Address) -> Result<()> {
        if !self.is_guard(&caller) {
            return Err(GoldexError::NotTheRetrievalGuard);
        }
        Ok(())
    }

    fn request(&self, id: u64) -> Result<&RetrievalRequest> {
        self.requests
            .get(id as usize)
            .ok_or(GoldexError::RetrievalRequestDoesNotExist(id))
    }

    fn pending_mut(&mut self, id: u64) -> Result<&mut RetrievalRequest> {
        let request = self
            .requests
            .get_mut(id as usize)
            .ok_or(GoldexError::RetrievalRequestDoesNotExist(id))?;
        if request.executed {
            return Err(GoldexError::RetrievalRequestAlreadyExecuted(id));
        }
        Ok(request)
    }
}
