use crate::{
    abiencode::types::Address,
    channel::{
        Channel, ChannelId, ChannelProposal, ChannelStore, SettlementRecord, StateUpdate,
        Timestamp,
    },
    channelwire::StateUpdateMsg,
    config::AdjudicatorConfig,
    error::ChannelError,
    ledger::Ledger,
    messages::ChannelEvent,
    sig::Verifier,
    wire::EventBus,
};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info};

/// Entry point for all channel operations.
///
/// Combines a [ChannelStore] holding the records, a [Ledger] providing time
/// and payouts, and an [EventBus] that is told about every committed change.
/// Each operation runs its checks and its write inside a single
/// [ChannelStore::update], so concurrent calls on the same channel are
/// serialized and a rejected call leaves no trace. Events are emitted while
/// the channel is still locked, so the bus sees every channel's changes in
/// commit order.
///
/// Note: An application will usually have a single store, ledger and bus
/// type, thus using dynamic dispatch here doesn't make much sense.
#[derive(Debug)]
pub struct Adjudicator<S: ChannelStore, L: Ledger, B: EventBus> {
    store: S,
    ledger: L,
    bus: B,
    verifier: Verifier,
    config: AdjudicatorConfig,
    /// Creation counter mixed into channel ids.
    counter: AtomicU64,
}

impl<S: ChannelStore, L: Ledger, B: EventBus> Adjudicator<S, L, B> {
    pub fn new(store: S, ledger: L, bus: B, config: AdjudicatorConfig) -> Self {
        // Continue after the records a durable store already holds.
        let counter = AtomicU64::new(u64::try_from(store.len()).unwrap_or(u64::MAX));
        Self {
            store,
            ledger,
            bus,
            verifier: Verifier::new(),
            config,
            counter,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn config(&self) -> &AdjudicatorConfig {
        &self.config
    }

    /// Register a new channel holding the proposed deposits.
    ///
    /// The channel starts `Open` at nonce 0 with balances equal to the
    /// deposits. Its challenge duration is the proposal's, or the configured
    /// default if the proposal does not set one.
    pub fn open_channel(&self, proposal: ChannelProposal) -> Result<ChannelId, ChannelError> {
        let counter = self.counter.fetch_add(1, Ordering::SeqCst);
        Channel::new(
            proposal,
            self.ledger.now(),
            counter,
            self.config.challenge_period,
        )
        .and_then(|channel| {
            self.store.create_with(channel, |channel| {
                info!(channel = ?channel.id(), "channel opened");
                self.bus.emit(ChannelEvent::Opened {
                    channel_id: channel.id(),
                    participants: channel.participants().as_array(),
                    deposits: channel.balances(),
                    challenge_duration: channel.challenge_duration(),
                });
            })
        })
        .map_err(|e| rejected("open_channel", None, e))
    }

    /// Replace the balances of a channel with a newer, jointly signed state.
    ///
    /// Rejected with [ChannelError::ChannelNotActive] once the channel is
    /// closed or its challenge window has ended, with
    /// [ChannelError::StaleNonce] if the nonce does not increase, with
    /// [ChannelError::ConservationViolation] if the balances do not add up
    /// to the deposits and with [ChannelError::InvalidSignature] unless both
    /// participants signed.
    pub fn apply_update(&self, update: StateUpdate) -> Result<(), ChannelError> {
        let id = update.channel_id;
        self.store
            .update(&id, |channel| {
                channel.apply_update(update, &self.verifier, self.ledger.now())?;
                info!(channel = ?id, nonce = update.nonce, "state update accepted");
                self.bus.emit(ChannelEvent::StateUpdated {
                    channel_id: id,
                    nonce: update.nonce,
                    balances: update.balances,
                });
                Ok(())
            })
            .map_err(|e| rejected("apply_update", Some(id), e))
    }

    /// Same as [Adjudicator::apply_update()], for an update received as a
    /// protobuf message.
    pub fn apply_update_msg(&self, msg: StateUpdateMsg) -> Result<(), ChannelError> {
        let update = StateUpdate::try_from(msg)
            .map_err(|e| rejected("apply_update", None, e.into()))?;
        self.apply_update(update)
    }

    /// Freeze an open channel and start its challenge window.
    ///
    /// Returns the deadline after which the channel can be closed. A channel
    /// can be disputed only once.
    pub fn raise_dispute(
        &self,
        id: ChannelId,
        caller: Address,
    ) -> Result<Timestamp, ChannelError> {
        self.store
            .update(&id, |channel| {
                let deadline = channel.raise_dispute(caller, self.ledger.now())?;
                info!(channel = ?id, ?caller, deadline, "dispute raised");
                self.bus.emit(ChannelEvent::DisputeRaised {
                    channel_id: id,
                    raised_by: caller,
                    deadline,
                });
                Ok(deadline)
            })
            .map_err(|e| rejected("raise_dispute", Some(id), e))
    }

    /// Close the channel and pay both participants their current balance.
    ///
    /// An open channel can be closed at any time, a disputed one only once
    /// its deadline has passed. Payouts happen exactly once:
    /// - if the first payout fails nothing is changed and
    ///   [ChannelError::PayoutFailed] is returned, the call can be repeated;
    /// - if a later payout fails the channel is `Closed` (and the
    ///   [ChannelEvent::Closed] event emitted) but
    ///   [ChannelError::PayoutFailed] is returned. The remaining payout is
    ///   issued by [Adjudicator::retry_payouts()].
    pub fn close_channel(
        &self,
        id: ChannelId,
        caller: Address,
    ) -> Result<SettlementRecord, ChannelError> {
        let outcome = self
            .store
            .update(&id, |channel| {
                let outcome = channel.settle(&caller, self.ledger.now(), &self.ledger)?;
                let final_balances = outcome.record.final_balances;
                info!(channel = ?id, ?caller, ?final_balances, "channel closed");
                self.bus.emit(ChannelEvent::Closed {
                    channel_id: id,
                    final_balances,
                });
                Ok(outcome)
            })
            .map_err(|e| rejected("close_channel", Some(id), e))?;

        match outcome.payout_error {
            None => Ok(outcome.record),
            Some(e) => Err(rejected(
                "close_channel",
                Some(id),
                ChannelError::PayoutFailed(e),
            )),
        }
    }

    /// Issue the payouts a previous [Adjudicator::close_channel()] left
    /// pending. Already completed payouts are never repeated, so this is
    /// safe to call on any closed channel.
    pub fn retry_payouts(
        &self,
        id: ChannelId,
        caller: Address,
    ) -> Result<SettlementRecord, ChannelError> {
        let outcome = self
            .store
            .update(&id, |channel| channel.retry_payouts(&caller, &self.ledger))
            .map_err(|e| rejected("retry_payouts", Some(id), e))?;

        match outcome.payout_error {
            None => {
                info!(channel = ?id, "payouts complete");
                Ok(outcome.record)
            }
            Some(e) => Err(rejected(
                "retry_payouts",
                Some(id),
                ChannelError::PayoutFailed(e),
            )),
        }
    }

    /// Snapshot of the committed record.
    pub fn get_channel(&self, id: ChannelId) -> Result<Channel, ChannelError> {
        self.store.get(&id)
    }

    /// The latest accepted state update, `None` if the channel never left
    /// its opening balances.
    pub fn get_latest_state(&self, id: ChannelId) -> Result<Option<StateUpdate>, ChannelError> {
        Ok(self.store.get(&id)?.latest_state())
    }
}

fn rejected(op: &'static str, channel: Option<ChannelId>, e: ChannelError) -> ChannelError {
    match &e {
        ChannelError::PayoutFailed(_) => error!(op, ?channel, error = %e, "payout failed"),
        _ => debug!(op, ?channel, error = %e, "operation rejected"),
    }
    e
}
