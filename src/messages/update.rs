use super::{hash_from_bytes, per_participant, u256_from_bytes, u256_to_bytes, ConversionError};
use crate::{abiencode::types::Signature, channel::StateUpdate, channelwire};

impl TryFrom<channelwire::StateUpdateMsg> for StateUpdate {
    type Error = ConversionError;

    fn try_from(value: channelwire::StateUpdateMsg) -> Result<Self, Self::Error> {
        Ok(Self {
            channel_id: hash_from_bytes(value.channel_id)?,
            balances: per_participant(value.balances, u256_from_bytes)?,
            nonce: value.nonce,
            signatures: per_participant(value.sigs, |sig| {
                Ok(Signature(
                    sig.try_into()
                        .or(Err(ConversionError::ByteLengthMismatch))?,
                ))
            })?,
        })
    }
}

impl From<StateUpdate> for channelwire::StateUpdateMsg {
    fn from(value: StateUpdate) -> Self {
        Self {
            channel_id: value.channel_id.0.to_vec(),
            balances: value.balances.into_iter().map(u256_to_bytes).collect(),
            nonce: value.nonce,
            sigs: value.signatures.iter().map(|s| s.0.to_vec()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{channel::test_utils::*, Hash};

    #[test]
    fn signed_update_survives_the_wire() {
        let (a, b) = signers();
        let update = signed_update(Hash([0x42; 32]), (60, 40), 3, &a, &b);

        let msg: channelwire::StateUpdateMsg = update.into();
        assert_eq!(msg.sigs[0].len(), 65);
        assert_eq!(StateUpdate::try_from(msg), Ok(update));
    }

    #[test]
    fn malformed_messages_are_rejected() {
        let (a, b) = signers();
        let msg: channelwire::StateUpdateMsg =
            signed_update(Hash([0x42; 32]), (60, 40), 3, &a, &b).into();

        let mut short_id = msg.clone();
        short_id.channel_id.pop();
        assert_eq!(
            StateUpdate::try_from(short_id),
            Err(ConversionError::ByteLengthMismatch)
        );

        let mut one_sig = msg.clone();
        one_sig.sigs.pop();
        assert_eq!(
            StateUpdate::try_from(one_sig),
            Err(ConversionError::ParticipantSizeMismatch)
        );

        let mut long_sig = msg;
        long_sig.sigs[1].push(0);
        assert_eq!(
            StateUpdate::try_from(long_sig),
            Err(ConversionError::ByteLengthMismatch)
        );
    }
}
