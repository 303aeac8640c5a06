//! Protobuf messages for channel events and signed state updates.
//!
//! Declared with the `prost` derive macros instead of being generated from a
//! `.proto` file, so building does not need `protoc`. The equivalent schema:
//!
//! ```text
//! message StateUpdateMsg   { bytes channel_id = 1; repeated bytes balances = 2;
//!                            uint64 nonce = 3; repeated bytes sigs = 4; }
//! message ChannelOpenedMsg { bytes channel_id = 1; repeated bytes participants = 2;
//!                            repeated bytes deposits = 3; uint64 challenge_duration = 4; }
//! message StateUpdatedMsg  { bytes channel_id = 1; uint64 nonce = 2;
//!                            repeated bytes balances = 3; }
//! message DisputeRaisedMsg { bytes channel_id = 1; bytes raised_by = 2; uint64 deadline = 3; }
//! message ChannelClosedMsg { bytes channel_id = 1; repeated bytes final_balances = 2; }
//! message ChannelEventMsg  { oneof event { ChannelOpenedMsg opened = 1;
//!                            StateUpdatedMsg state_updated = 2;
//!                            DisputeRaisedMsg dispute_raised = 3;
//!                            ChannelClosedMsg closed = 4; } }
//! ```
//!
//! Amounts are 32-byte big-endian integers, addresses 20 bytes, signatures
//! 65 bytes (`r || s || v`).

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StateUpdateMsg {
    #[prost(bytes = "vec", tag = "1")]
    pub channel_id: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub balances: Vec<Vec<u8>>,
    #[prost(uint64, tag = "3")]
    pub nonce: u64,
    #[prost(bytes = "vec", repeated, tag = "4")]
    pub sigs: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelOpenedMsg {
    #[prost(bytes = "vec", tag = "1")]
    pub channel_id: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub participants: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub deposits: Vec<Vec<u8>>,
    #[prost(uint64, tag = "4")]
    pub challenge_duration: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StateUpdatedMsg {
    #[prost(bytes = "vec", tag = "1")]
    pub channel_id: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub nonce: u64,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub balances: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DisputeRaisedMsg {
    #[prost(bytes = "vec", tag = "1")]
    pub channel_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub raised_by: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub deadline: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelClosedMsg {
    #[prost(bytes = "vec", tag = "1")]
    pub channel_id: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub final_balances: Vec<Vec<u8>>,
}

/// Envelope for every event published by the adjudicator.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelEventMsg {
    #[prost(oneof = "channel_event_msg::Event", tags = "1, 2, 3, 4")]
    pub event: ::core::option::Option<channel_event_msg::Event>,
}

pub mod channel_event_msg {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Event {
        #[prost(message, tag = "1")]
        Opened(super::ChannelOpenedMsg),
        #[prost(message, tag = "2")]
        StateUpdated(super::StateUpdatedMsg),
        #[prost(message, tag = "3")]
        DisputeRaised(super::DisputeRaisedMsg),
        #[prost(message, tag = "4")]
        Closed(super::ChannelClosedMsg),
    }
}
