//! Interface to the ledger anchoring the channel funds.
//!
//! The adjudicator never reads wall-clock time and never moves funds itself.
//! Both come from a [Ledger]: its timestamps decide when a challenge window
//! is over, its payout primitive releases the anchored funds on settlement.

use crate::{
    abiencode::types::{Address, U256},
    channel::Timestamp,
};
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payout of {amount} to {receiver:?} failed: {reason}")]
pub struct PayoutError {
    pub receiver: Address,
    pub amount: U256,
    pub reason: String,
}

pub trait Ledger {
    /// Confirmed ledger time in seconds. Must never decrease and must not be
    /// adjustable by a single participant.
    fn now(&self) -> Timestamp;

    /// Transfer `amount` from the channel's anchor to `receiver`.
    ///
    /// Called during settlement while the channel record is locked, so
    /// implementations must not call back into the adjudicator for that
    /// channel. Other channels are not affected by a slow payout.
    fn payout(&self, receiver: Address, amount: U256) -> Result<(), PayoutError>;
}

impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn payout(&self, receiver: Address, amount: U256) -> Result<(), PayoutError> {
        (**self).payout(receiver, amount)
    }
}

impl<L: Ledger + ?Sized> Ledger for &L {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn payout(&self, receiver: Address, amount: U256) -> Result<(), PayoutError> {
        (**self).payout(receiver, amount)
    }
}

/// Ledger simulation with a logical clock, for tests and local setups.
///
/// Payouts to receivers registered with
/// [InMemoryLedger::fail_payouts_to()] fail until they are restored.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    clock: AtomicU64,
    credited: DashMap<Address, U256>,
    log: Mutex<Vec<(Address, U256)>>,
    failing: DashSet<Address>,
}

impl InMemoryLedger {
    pub fn new(start: Timestamp) -> Self {
        Self {
            clock: AtomicU64::new(start),
            ..Default::default()
        }
    }

    /// Move the clock forward by `secs`, returns the new time.
    pub fn advance(&self, secs: u64) -> Timestamp {
        let previous = self
            .clock
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(secs))
            })
            .unwrap_or_else(|t| t);
        previous.saturating_add(secs)
    }

    /// Move the clock to `time`. Earlier times are ignored, the clock is
    /// monotonic. Returns the resulting time.
    pub fn set_time(&self, time: Timestamp) -> Timestamp {
        self.clock.fetch_max(time, Ordering::SeqCst).max(time)
    }

    /// Total amount paid to `receiver` so far.
    pub fn balance_of(&self, receiver: &Address) -> U256 {
        self.credited
            .get(receiver)
            .map(|amount| *amount)
            .unwrap_or_default()
    }

    /// Every successful payout, in order.
    pub fn payouts(&self) -> Vec<(Address, U256)> {
        self.log.lock().clone()
    }

    pub fn fail_payouts_to(&self, receiver: Address) {
        self.failing.insert(receiver);
    }

    pub fn restore_payouts_to(&self, receiver: Address) {
        self.failing.remove(&receiver);
    }
}

impl Ledger for InMemoryLedger {
    fn now(&self) -> Timestamp {
        self.clock.load(Ordering::SeqCst)
    }

    fn payout(&self, receiver: Address, amount: U256) -> Result<(), PayoutError> {
        if self.failing.contains(&receiver) {
            return Err(PayoutError {
                receiver,
                amount,
                reason: "receiver rejected by ledger".to_string(),
            });
        }

        let mut credited = self.credited.entry(receiver).or_default();
        *credited = credited.saturating_add(amount);
        drop(credited);
        self.log.lock().push((receiver, amount));
        Ok(())
    }
}
