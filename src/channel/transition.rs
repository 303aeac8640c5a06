use super::{verify_authorization, Channel, ChannelStatus, StateUpdate, Timestamp};
use crate::{error::ChannelError, sig::Verifier};

impl Channel {
    /// Whether off-chain updates are still accepted at time `now`.
    ///
    /// A disputed channel keeps accepting newer states until its deadline,
    /// so the freshest state is what gets settled. The dispute itself is
    /// never cleared by an update.
    pub fn accepts_updates(&self, now: Timestamp) -> bool {
        match self.status {
            ChannelStatus::Open => true,
            ChannelStatus::Disputed { deadline } => now < deadline,
            ChannelStatus::Closed => false,
        }
    }

    /// All checks of [Channel::apply_update()], without side effects.
    ///
    /// The order is fixed: lifecycle, nonce, conservation, signatures. The
    /// signature check comes last because it is the expensive one.
    pub fn check_valid_transition(
        &self,
        update: &StateUpdate,
        verifier: &Verifier,
        now: Timestamp,
    ) -> Result<(), ChannelError> {
        debug_assert_eq!(update.channel_id, self.id);
        debug_assert_eq!(
            self.balances[0].checked_add(self.balances[1]),
            Some(self.total_deposited)
        );

        if !self.accepts_updates(now) {
            return Err(ChannelError::ChannelNotActive(self.status));
        }
        if update.nonce <= self.nonce {
            return Err(ChannelError::StaleNonce {
                current: self.nonce,
                proposed: update.nonce,
            });
        }
        if update.balances[0].checked_add(update.balances[1]) != Some(self.total_deposited) {
            return Err(ChannelError::ConservationViolation {
                expected: self.total_deposited,
                proposed: update.balances,
            });
        }
        verify_authorization(verifier, update, &self.participants)
    }

    /// Replace the balances with a newer jointly signed state.
    pub(crate) fn apply_update(
        &mut self,
        update: StateUpdate,
        verifier: &Verifier,
        now: Timestamp,
    ) -> Result<(), ChannelError> {
        self.check_valid_transition(&update, verifier, now)?;

        self.balances = update.balances;
        self.nonce = update.nonce;
        self.latest = Some(update);
        Ok(())
    }
}
