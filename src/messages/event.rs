use super::{
    address_from_bytes, hash_from_bytes, per_participant, u256_from_bytes, u256_to_bytes,
    ChannelEvent, ConversionError,
};
use crate::{
    abiencode::types::U256,
    channel::PARTICIPANTS,
    channelwire::{
        channel_event_msg::Event, ChannelClosedMsg, ChannelEventMsg, ChannelOpenedMsg,
        DisputeRaisedMsg, StateUpdatedMsg,
    },
};

fn amounts_to_bytes(amounts: [U256; PARTICIPANTS]) -> Vec<Vec<u8>> {
    amounts.into_iter().map(u256_to_bytes).collect()
}

impl From<ChannelEvent> for ChannelEventMsg {
    fn from(value: ChannelEvent) -> Self {
        let event = match value {
            ChannelEvent::Opened {
                channel_id,
                participants,
                deposits,
                challenge_duration,
            } => Event::Opened(ChannelOpenedMsg {
                channel_id: channel_id.0.to_vec(),
                participants: participants.iter().map(|p| p.0.to_vec()).collect(),
                deposits: amounts_to_bytes(deposits),
                challenge_duration,
            }),
            ChannelEvent::StateUpdated {
                channel_id,
                nonce,
                balances,
            } => Event::StateUpdated(StateUpdatedMsg {
                channel_id: channel_id.0.to_vec(),
                nonce,
                balances: amounts_to_bytes(balances),
            }),
            ChannelEvent::DisputeRaised {
                channel_id,
                raised_by,
                deadline,
            } => Event::DisputeRaised(DisputeRaisedMsg {
                channel_id: channel_id.0.to_vec(),
                raised_by: raised_by.0.to_vec(),
                deadline,
            }),
            ChannelEvent::Closed {
                channel_id,
                final_balances,
            } => Event::Closed(ChannelClosedMsg {
                channel_id: channel_id.0.to_vec(),
                final_balances: amounts_to_bytes(final_balances),
            }),
        };
        Self { event: Some(event) }
    }
}

impl TryFrom<ChannelEventMsg> for ChannelEvent {
    type Error = ConversionError;

    fn try_from(value: ChannelEventMsg) -> Result<Self, Self::Error> {
        Ok(match value.event.ok_or(ConversionError::ExpectedSome)? {
            Event::Opened(msg) => ChannelEvent::Opened {
                channel_id: hash_from_bytes(msg.channel_id)?,
                participants: per_participant(msg.participants, address_from_bytes)?,
                deposits: per_participant(msg.deposits, u256_from_bytes)?,
                challenge_duration: msg.challenge_duration,
            },
            Event::StateUpdated(msg) => ChannelEvent::StateUpdated {
                channel_id: hash_from_bytes(msg.channel_id)?,
                nonce: msg.nonce,
                balances: per_participant(msg.balances, u256_from_bytes)?,
            },
            Event::DisputeRaised(msg) => ChannelEvent::DisputeRaised {
                channel_id: hash_from_bytes(msg.channel_id)?,
                raised_by: address_from_bytes(msg.raised_by)?,
                deadline: msg.deadline,
            },
            Event::Closed(msg) => ChannelEvent::Closed {
                channel_id: hash_from_bytes(msg.channel_id)?,
                final_balances: per_participant(msg.final_balances, u256_from_bytes)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abiencode::types::{Address, Hash};

    #[test]
    fn opened_event_layout() {
        let event = ChannelEvent::Opened {
            channel_id: Hash([7; 32]),
            participants: [Address([1; 20]), Address([2; 20])],
            deposits: [100.into(), U256::zero()],
            challenge_duration: 60,
        };

        let msg = ChannelEventMsg::from(event.clone());
        match &msg.event {
            Some(Event::Opened(opened)) => {
                assert_eq!(opened.participants[1], vec![2; 20]);
                assert_eq!(opened.deposits[0][31], 100);
                assert!(opened.deposits[1].iter().all(|b| *b == 0));
            }
            other => panic!("unexpected wire event: {:?}", other),
        }
        assert_eq!(ChannelEvent::try_from(msg), Ok(event));
    }

    #[test]
    fn empty_envelope_is_rejected() {
        assert_eq!(
            ChannelEvent::try_from(ChannelEventMsg { event: None }),
            Err(ConversionError::ExpectedSome)
        );
    }
}
