use super::{Channel, ChannelStatus, Timestamp};
use crate::{abiencode::types::Address, error::ChannelError};

impl Channel {
    /// Freeze the channel and start the challenge window.
    ///
    /// This is the only way into [ChannelStatus::Disputed]. It lets a
    /// participant force settlement when the counterparty stops cooperating.
    /// There is no way back to `Open`: once raised, the window always runs
    /// to its end. Returns the deadline.
    pub(crate) fn raise_dispute(
        &mut self,
        caller: Address,
        now: Timestamp,
    ) -> Result<Timestamp, ChannelError> {
        if self.status != ChannelStatus::Open {
            return Err(ChannelError::ChannelNotActive(self.status));
        }
        self.ensure_participant(&caller)?;

        let deadline = now.saturating_add(self.challenge_duration);
        self.status = ChannelStatus::Disputed { deadline };
        Ok(deadline)
    }
}
