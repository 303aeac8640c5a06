use prost::{bytes::BufMut, DecodeError, EncodeError};

use super::{BytesBus, EventBus};
use crate::{
    channel::StateUpdate,
    channelwire::{ChannelEventMsg, StateUpdateMsg},
    messages::{ChannelEvent, ConversionError},
};

/// Length of the big-endian frame header.
const PREFIX_LEN: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("message of {0} bytes does not fit the u16 length prefix")]
    TooLarge(usize),
    #[error("protobuf encoding failed: {0}")]
    Prost(#[from] EncodeError),
    #[error("frame announces {expected} bytes but carries {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("protobuf decoding failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("malformed message: {0}")]
    Conversion(#[from] ConversionError),
}

/// Encode `msg` and prefix it with its length.
///
/// The prefix is a big-endian `u16` (2 bytes), not the LEB128 varint that
/// `encode_length_delimited` would write, so frames can be split without a
/// protobuf parser.
pub fn encode_frame<T: prost::Message>(msg: T) -> Result<Vec<u8>, EncodingError> {
    let len = msg.encoded_len();
    let prefix = u16::try_from(len).or(Err(EncodingError::TooLarge(len)))?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + len);
    buf.put_slice(&prefix.to_be_bytes());
    msg.encode(&mut buf)?;
    Ok(buf)
}

/// Inverse of [encode_frame()]. The frame must contain exactly one message.
pub fn decode_frame<T: prost::Message + Default>(frame: &[u8]) -> Result<T, EncodingError> {
    if frame.len() < PREFIX_LEN {
        return Err(EncodingError::Truncated {
            expected: PREFIX_LEN,
            actual: frame.len(),
        });
    }
    let (prefix, body) = frame.split_at(PREFIX_LEN);
    let expected = u16::from_be_bytes([prefix[0], prefix[1]]) as usize;
    if body.len() != expected {
        return Err(EncodingError::Truncated {
            expected,
            actual: body.len(),
        });
    }
    Ok(T::decode(body)?)
}

pub fn decode_event(frame: &[u8]) -> Result<ChannelEvent, EncodingError> {
    let msg: ChannelEventMsg = decode_frame(frame)?;
    Ok(msg.try_into()?)
}

/// Frame a signed update for submission over the wire.
pub fn encode_update(update: StateUpdate) -> Result<Vec<u8>, EncodingError> {
    encode_frame(StateUpdateMsg::from(update))
}

pub fn decode_update(frame: &[u8]) -> Result<StateUpdate, EncodingError> {
    let msg: StateUpdateMsg = decode_frame(frame)?;
    Ok(msg.try_into()?)
}

/// [EventBus] publishing every event as a length-prefixed
/// [ChannelEventMsg] on a [BytesBus].
#[derive(Debug)]
pub struct ProtoBufEncodingLayer<B: BytesBus> {
    pub bus: B,
}

impl<B: BytesBus> ProtoBufEncodingLayer<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: BytesBus> EventBus for ProtoBufEncodingLayer<B> {
    fn emit(&self, event: ChannelEvent) {
        let channel = event.channel_id();
        match encode_frame(ChannelEventMsg::from(event)) {
            Ok(buf) => self.bus.publish(&buf),
            // The state change is already committed, all we can do is
            // report that its event got lost.
            Err(e) => tracing::warn!(?channel, error = %e, "dropping channel event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{channelwire::ChannelClosedMsg, Address, Hash};
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct Frames(Mutex<Vec<Vec<u8>>>);

    impl BytesBus for &Frames {
        fn publish(&self, msg: &[u8]) {
            self.0.lock().push(msg.to_vec());
        }
    }

    #[test]
    fn emitted_events_are_length_prefixed() {
        let frames = Frames::default();
        let layer = ProtoBufEncodingLayer::new(&frames);
        let event = ChannelEvent::DisputeRaised {
            channel_id: Hash([0xaa; 32]),
            raised_by: Address([0xbb; 20]),
            deadline: 86_400,
        };

        layer.emit(event.clone());

        let frames = frames.0.lock();
        assert_eq!(frames.len(), 1);
        let len = u16::from_be_bytes([frames[0][0], frames[0][1]]) as usize;
        assert_eq!(len, frames[0].len() - PREFIX_LEN);
        assert_eq!(decode_event(&frames[0]).unwrap(), event);
    }

    #[test]
    fn oversized_messages_are_not_framed() {
        let msg = ChannelClosedMsg {
            channel_id: vec![0; 1 << 16],
            final_balances: vec![],
        };
        assert!(matches!(
            encode_frame(msg),
            Err(EncodingError::TooLarge(len)) if len > u16::MAX as usize
        ));
    }

    #[test]
    fn bad_frames_are_rejected() {
        let frame = encode_frame(ChannelEventMsg::from(ChannelEvent::Closed {
            channel_id: Hash([1; 32]),
            final_balances: [60.into(), 40.into()],
        }))
        .unwrap();

        assert!(matches!(
            decode_event(&frame[..1]),
            Err(EncodingError::Truncated { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            decode_event(&frame[..frame.len() - 1]),
            Err(EncodingError::Truncated { .. })
        ));

        let empty = encode_frame(ChannelEventMsg { event: None }).unwrap();
        assert!(matches!(
            decode_event(&empty),
            Err(EncodingError::Conversion(ConversionError::ExpectedSome))
        ));
    }
}
