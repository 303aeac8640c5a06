use super::{Channel, ChannelId, ChannelStatus, Participants, Timestamp, PARTICIPANTS};
use crate::{
    abiencode::types::{Address, U256},
    error::ChannelError,
    ledger::{Ledger, PayoutError},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayoutStatus {
    Pending,
    Paid,
}

/// Final balances of a closed channel and how far their payout got.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub final_balances: [U256; PARTICIPANTS],
    pub payouts: [PayoutStatus; PARTICIPANTS],
    pub settled_at: Timestamp,
}

/// Emitted once per closed channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SettlementRecord {
    pub channel_id: ChannelId,
    pub final_balances: [U256; PARTICIPANTS],
}

/// Result of a settlement attempt that changed the record.
///
/// `payout_error` is set if some payout is still pending. The record is
/// committed regardless, so paid amounts are never paid again.
#[derive(Debug)]
pub(crate) struct SettlementOutcome {
    pub record: SettlementRecord,
    pub payout_error: Option<PayoutError>,
}

impl Settlement {
    fn new(final_balances: [U256; PARTICIPANTS], settled_at: Timestamp) -> Self {
        Self {
            final_balances,
            payouts: [PayoutStatus::Pending; PARTICIPANTS],
            settled_at,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.payouts.iter().all(|p| *p == PayoutStatus::Paid)
    }

    fn any_paid(&self) -> bool {
        self.payouts.iter().any(|p| *p == PayoutStatus::Paid)
    }

    /// Issue every pending payout in participant order, stopping at the
    /// first failure.
    fn pay_pending<L: Ledger + ?Sized>(
        &mut self,
        participants: &Participants,
        ledger: &L,
    ) -> Result<(), PayoutError> {
        for (idx, status) in self.payouts.iter_mut().enumerate() {
            if *status == PayoutStatus::Pending {
                ledger.payout(participants.get(idx), self.final_balances[idx])?;
                *status = PayoutStatus::Paid;
            }
        }
        Ok(())
    }
}

impl Channel {
    /// All checks of [Channel::settle()], without side effects.
    pub fn check_closable(&self, caller: &Address, now: Timestamp) -> Result<(), ChannelError> {
        if self.status == ChannelStatus::Closed {
            return Err(ChannelError::ChannelNotActive(self.status));
        }
        self.ensure_participant(caller)?;
        if let ChannelStatus::Disputed { deadline } = self.status {
            if now < deadline {
                return Err(ChannelError::ChallengeWindowOpen { now, deadline });
            }
        }
        Ok(())
    }

    /// Close the channel and pay out the current balances.
    ///
    /// The record is switched to `Closed` with zeroed balances *before* any
    /// payout is issued. This relies on running inside
    /// [ChannelStore::update][super::ChannelStore::update]:
    /// - if the first payout fails, nothing left the anchor, the error is
    ///   returned and the store drops this draft, leaving the channel as it
    ///   was before the call;
    /// - if a later payout fails, the closed record is kept with the failed
    ///   payout marked pending, to be finished by [Channel::retry_payouts()].
    pub(crate) fn settle<L: Ledger + ?Sized>(
        &mut self,
        caller: &Address,
        now: Timestamp,
        ledger: &L,
    ) -> Result<SettlementOutcome, ChannelError> {
        self.check_closable(caller, now)?;

        let mut settlement = Settlement::new(self.balances, now);
        self.status = ChannelStatus::Closed;
        self.balances = [U256::zero(); PARTICIPANTS];

        let paid = settlement.pay_pending(&self.participants, ledger);
        if let Err(e) = &paid {
            if !settlement.any_paid() {
                return Err(ChannelError::PayoutFailed(e.clone()));
            }
        }

        self.settlement = Some(settlement);
        Ok(SettlementOutcome {
            record: self.settlement_record(&settlement),
            payout_error: paid.err(),
        })
    }

    /// Re-issue the payouts a previous settlement could not complete.
    ///
    /// Payouts that already went through are never repeated.
    pub(crate) fn retry_payouts<L: Ledger + ?Sized>(
        &mut self,
        caller: &Address,
        ledger: &L,
    ) -> Result<SettlementOutcome, ChannelError> {
        let mut settlement = match (self.status, self.settlement) {
            (ChannelStatus::Closed, Some(settlement)) => settlement,
            _ => return Err(ChannelError::ChannelNotActive(self.status)),
        };
        self.ensure_participant(caller)?;

        let paid = settlement.pay_pending(&self.participants, ledger);
        self.settlement = Some(settlement);
        Ok(SettlementOutcome {
            record: self.settlement_record(&settlement),
            payout_error: paid.err(),
        })
    }

    fn settlement_record(&self, settlement: &Settlement) -> SettlementRecord {
        SettlementRecord {
            channel_id: self.id,
            final_balances: settlement.final_balances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{channel::test_utils::*, ledger::InMemoryLedger, sig::Verifier};

    #[test]
    fn cooperative_close_pays_both() {
        let (a, b) = signers();
        let ledger = InMemoryLedger::new(1_000);
        let mut channel = open_channel(&a, &b, 70, 30);

        let outcome = channel.settle(&b.address(), 1_000, &ledger).unwrap();

        assert!(outcome.payout_error.is_none());
        assert_eq!(outcome.record.final_balances, [70.into(), 30.into()]);
        assert_eq!(channel.status(), ChannelStatus::Closed);
        assert_eq!(channel.balances(), [U256::zero(); 2]);
        assert!(channel.settlement().unwrap().is_complete());
        assert_eq!(
            ledger.payouts(),
            vec![(a.address(), 70.into()), (b.address(), 30.into())]
        );
    }

    #[test]
    fn closed_channel_cannot_be_closed_again() {
        let (a, b) = signers();
        let ledger = InMemoryLedger::new(1_000);
        let mut channel = open_channel(&a, &b, 100, 0);
        channel.settle(&a.address(), 1_000, &ledger).unwrap();

        assert!(matches!(
            channel.settle(&a.address(), 2_000, &ledger),
            Err(ChannelError::ChannelNotActive(ChannelStatus::Closed))
        ));
        assert_eq!(ledger.payouts().len(), 2);
    }

    #[test]
    fn disputed_channel_waits_for_deadline() {
        let (a, b) = signers();
        let ledger = InMemoryLedger::new(1_000);
        let mut channel = open_channel(&a, &b, 100, 0);
        let deadline = channel.raise_dispute(b.address(), 1_000).unwrap();

        assert_eq!(
            channel.check_closable(&a.address(), deadline - 1),
            Err(ChannelError::ChallengeWindowOpen {
                now: deadline - 1,
                deadline
            })
        );
        assert!(channel.settle(&a.address(), deadline, &ledger).is_ok());
    }

    #[test]
    fn outsider_cannot_close() {
        let (a, b) = signers();
        let channel = open_channel(&a, &b, 100, 0);
        let outsider = Address([9; 20]);

        assert_eq!(
            channel.check_closable(&outsider, 1_000),
            Err(ChannelError::Unauthorized(outsider))
        );
    }

    #[test]
    fn first_payout_failure_aborts() {
        let (a, b) = signers();
        let ledger = InMemoryLedger::new(1_000);
        ledger.fail_payouts_to(a.address());
        let mut channel = open_channel(&a, &b, 60, 40);

        // The draft is modified, the store is what discards it.
        assert!(matches!(
            channel.settle(&a.address(), 1_000, &ledger),
            Err(ChannelError::PayoutFailed(_))
        ));
        assert!(ledger.payouts().is_empty());
    }

    #[test]
    fn partial_payout_is_kept_and_retried() {
        let (a, b) = signers();
        let verifier = Verifier::new();
        let ledger = InMemoryLedger::new(1_000);
        ledger.fail_payouts_to(b.address());
        let mut channel = open_channel(&a, &b, 100, 0);
        channel
            .apply_update(signed_update(channel.id(), (60, 40), 1, &a, &b), &verifier, 1_000)
            .unwrap();

        let outcome = channel.settle(&a.address(), 1_000, &ledger).unwrap();
        assert!(outcome.payout_error.is_some());
        assert_eq!(channel.status(), ChannelStatus::Closed);
        assert_eq!(
            channel.settlement().unwrap().payouts,
            [PayoutStatus::Paid, PayoutStatus::Pending]
        );

        ledger.restore_payouts_to(b.address());
        let outcome = channel.retry_payouts(&b.address(), &ledger).unwrap();
        assert!(outcome.payout_error.is_none());
        assert!(channel.settlement().unwrap().is_complete());
        assert_eq!(
            ledger.payouts(),
            vec![(a.address(), 60.into()), (b.address(), 40.into())]
        );

        // Nothing pending any more: retrying pays nothing.
        channel.retry_payouts(&a.address(), &ledger).unwrap();
        assert_eq!(ledger.payouts().len(), 2);
    }

    #[test]
    fn retry_requires_closed_channel() {
        let (a, b) = signers();
        let ledger = InMemoryLedger::new(1_000);
        let mut channel = open_channel(&a, &b, 100, 0);

        assert_eq!(
            channel.retry_payouts(&a.address(), &ledger).err(),
            Some(ChannelError::ChannelNotActive(ChannelStatus::Open))
        );
    }
}
