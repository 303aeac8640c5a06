//! Events published by the adjudicator and their wire representation.

mod event;
mod update;

use crate::{
    abiencode::types::{Address, Hash, U256},
    channel::{ChannelId, Timestamp, PARTICIPANTS},
};

/// Failures while turning a protobuf message back into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("field has the wrong byte length")]
    ByteLengthMismatch,
    #[error("expected one entry per participant")]
    ParticipantSizeMismatch,
    #[error("required field is missing")]
    ExpectedSome,
}

/// State changes of a channel, in the order they were committed.
///
/// Every committed operation emits exactly one event, rejected operations
/// emit nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened {
        channel_id: ChannelId,
        participants: [Address; PARTICIPANTS],
        deposits: [U256; PARTICIPANTS],
        challenge_duration: u64,
    },
    StateUpdated {
        channel_id: ChannelId,
        nonce: u64,
        balances: [U256; PARTICIPANTS],
    },
    DisputeRaised {
        channel_id: ChannelId,
        raised_by: Address,
        deadline: Timestamp,
    },
    Closed {
        channel_id: ChannelId,
        final_balances: [U256; PARTICIPANTS],
    },
}

impl ChannelEvent {
    pub fn channel_id(&self) -> ChannelId {
        match self {
            ChannelEvent::Opened { channel_id, .. }
            | ChannelEvent::StateUpdated { channel_id, .. }
            | ChannelEvent::DisputeRaised { channel_id, .. }
            | ChannelEvent::Closed { channel_id, .. } => *channel_id,
        }
    }
}

fn hash_from_bytes(bytes: Vec<u8>) -> Result<Hash, ConversionError> {
    Ok(Hash(
        bytes
            .try_into()
            .or(Err(ConversionError::ByteLengthMismatch))?,
    ))
}

fn address_from_bytes(bytes: Vec<u8>) -> Result<Address, ConversionError> {
    Ok(Address(
        bytes
            .try_into()
            .or(Err(ConversionError::ByteLengthMismatch))?,
    ))
}

fn u256_to_bytes(value: U256) -> Vec<u8> {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    buf.to_vec()
}

fn u256_from_bytes(bytes: Vec<u8>) -> Result<U256, ConversionError> {
    // from_big_endian would silently accept shorter input.
    if bytes.len() != 32 {
        return Err(ConversionError::ByteLengthMismatch);
    }
    Ok(U256::from_big_endian(&bytes))
}

/// Convert a repeated field with exactly one entry per participant.
fn per_participant<T>(
    items: Vec<Vec<u8>>,
    convert: impl Fn(Vec<u8>) -> Result<T, ConversionError>,
) -> Result<[T; PARTICIPANTS], ConversionError> {
    let [a, b]: [Vec<u8>; PARTICIPANTS] = items
        .try_into()
        .or(Err(ConversionError::ParticipantSizeMismatch))?;
    Ok([convert(a)?, convert(b)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_need_exactly_32_bytes() {
        let value = U256::from(0x1234u64);
        assert_eq!(u256_from_bytes(u256_to_bytes(value)), Ok(value));
        assert_eq!(
            u256_from_bytes(vec![0x12, 0x34]),
            Err(ConversionError::ByteLengthMismatch)
        );
        assert_eq!(
            u256_from_bytes(vec![0; 33]),
            Err(ConversionError::ByteLengthMismatch)
        );
    }

    #[test]
    fn repeated_fields_need_one_entry_per_participant() {
        assert_eq!(
            per_participant(vec![vec![1; 20]], address_from_bytes),
            Err(ConversionError::ParticipantSizeMismatch)
        );
        assert_eq!(
            per_participant(vec![vec![1; 20], vec![2; 20], vec![3; 20]], address_from_bytes),
            Err(ConversionError::ParticipantSizeMismatch)
        );
        assert_eq!(
            per_participant(vec![vec![1; 20], vec![2; 19]], address_from_bytes),
            Err(ConversionError::ByteLengthMismatch)
        );
        assert_eq!(
            per_participant(vec![vec![1; 20], vec![2; 20]], address_from_bytes),
            Ok([Address([1; 20]), Address([2; 20])])
        );
    }
}
