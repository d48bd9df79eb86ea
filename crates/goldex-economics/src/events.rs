//! Protocol events
//!
//! Every state-changing protocol operation appends what it did to an
//! [`EventLog`]. Records carry the clock time and serialize as tagged JSON.

use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Something the protocol did
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEvent {
    Transfer {
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    },
    Minted {
        token: Address,
        to: Address,
        amount: u128,
    },
    Burned {
        token: Address,
        from: Address,
        amount: u128,
    },
    FeeCollected {
        from: Address,
        fee: u128,
    },
    Stabilized {
        total_supply: u128,
        vault_balance: u128,
        price_per_gram: u128,
        total_gold_value: u128,
    },
    Staked {
        account: Address,
        amount: u128,
    },
    Withdrawn {
        account: Address,
        amount: u128,
    },
    RewardPaid {
        account: Address,
        reward: u128,
    },
    RewardAdded {
        reward: u128,
    },
    PayoutValuesSet {
        interest: u128,
        period_finish: Timestamp,
    },
    RetrievalRequestCreated {
        id: u64,
        target: Address,
        amount: u128,
    },
    RetrievalRequestConfirmed {
        id: u64,
        guard: Address,
    },
    RetrievalRequestRevoked {
        id: u64,
        guard: Address,
    },
    RetrievalRequestExecuted {
        id: u64,
        target: Address,
    },
    Blacklisted {
        account: Address,
    },
    Unblacklisted {
        account: Address,
    },
    PriceUpdated {
        price: u128,
    },
}

impl ProtocolEvent {
    /// Short name, matching the serialized tag
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::Minted { .. } => "minted",
            Self::Burned { .. } => "burned",
            Self::FeeCollected { .. } => "fee_collected",
            Self::Stabilized { .. } => "stabilized",
            Self::Staked { .. } => "staked",
            Self::Withdrawn { .. } => "withdrawn",
            Self::RewardPaid { .. } => "reward_paid",
            Self::RewardAdded { .. } => "reward_added",
            Self::PayoutValuesSet { .. } => "payout_values_set",
            Self::RetrievalRequestCreated { .. } => "retrieval_request_created",
            Self::RetrievalRequestConfirmed { .. } => "retrieval_request_confirmed",
            Self::RetrievalRequestRevoked { .. } => "retrieval_request_revoked",
            Self::RetrievalRequestExecuted { .. } => "retrieval_request_executed",
            Self::Blacklisted { .. } => "blacklisted",
            Self::Unblacklisted { .. } => "unblacklisted",
            Self::PriceUpdated { .. } => "price_updated",
        }
    }
}

/// Event with the time it was emitted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub event: ProtocolEvent,
}

/// Append-only event log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timestamp: Timestamp, event: ProtocolEvent) {
        self.records.push(EventRecord { timestamp, event });
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&ProtocolEvent> {
        self.records.last().map(|r| &r.event)
    }

    /// Records whose event has the given name
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a EventRecord> + 'a {
        self.records.iter().filter(move |r| r.event.name() == name)
    }

    /// Pretty JSON array of all records
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_json() {
        let mut log = EventLog::new();
        log.push(
            7,
            ProtocolEvent::Staked {
                account: Address::repeat_byte(0xab),
                amount: 500,
            },
        );

        let json: serde_json::Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["type"], "staked");
        assert_eq!(json[0]["timestamp"], 7);
        assert_eq!(json[0]["amount"], 500);
        assert_eq!(json[0]["account"], "0xabababababababababababababababababababab");
    }

    #[test]
    fn test_named_filter() {
        let mut log = EventLog::new();
        log.push(1, ProtocolEvent::PriceUpdated { price: 1 });
        log.push(2, ProtocolEvent::RewardAdded { reward: 5 });
        log.push(3, ProtocolEvent::PriceUpdated { price: 2 });

        assert_eq!(log.named("price_updated").count(), 2);
        assert_eq!(log.last(), Some(&ProtocolEvent::PriceUpdated { price: 2 }));
        for record in log.records() {
            assert_eq!(
                serde_json::to_value(record).unwrap()["type"],
                record.event.name()
            );
        }
    }
}
