//! Error taxonomy reported by every channel operation.

use crate::{
    abiencode,
    channel::{ChannelId, ChannelStatus, Timestamp},
    ledger::PayoutError,
    messages::ConversionError,
    sig, Address, U256,
};

/// Malformed requests, rejected before any channel record is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("participant address is zero")]
    ZeroAddress,
    #[error("participants must be distinct")]
    IdenticalParticipants,
    #[error("participant A must fund the channel")]
    ZeroDeposit,
    #[error("total deposit overflows")]
    DepositOverflow,
    #[error("challenge duration must be positive")]
    ZeroChallengeDuration,
    #[error("channel {0:?} already exists")]
    DuplicateChannel(ChannelId),
    #[error("canonical encoding failed: {0}")]
    Encoding(String),
    #[error("malformed message: {0}")]
    Malformed(#[from] ConversionError),
}

/// Every rejected operation maps to exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("channel not found: {0:?}")]
    ChannelNotFound(ChannelId),

    /// Wrong lifecycle state for the requested operation.
    #[error("operation not allowed while channel is {0}")]
    ChannelNotActive(ChannelStatus),

    #[error("{0:?} is not a participant of the channel")]
    Unauthorized(Address),

    #[error("stale nonce {proposed}, channel is at nonce {current}")]
    StaleNonce { current: u64, proposed: u64 },

    #[error("balances {proposed:?} do not sum up to {expected}")]
    ConservationViolation { expected: U256, proposed: [U256; 2] },

    #[error("state update is not signed by both participants")]
    InvalidSignature,

    #[error("challenge window is open until {deadline}, now is {now}")]
    ChallengeWindowOpen { now: Timestamp, deadline: Timestamp },

    /// The settlement could not pay out. See
    /// [Adjudicator::close_channel()][crate::Adjudicator::close_channel] for
    /// the state the channel is left in.
    #[error("payout failed: {0}")]
    PayoutFailed(PayoutError),
}

impl From<abiencode::Error> for ChannelError {
    fn from(e: abiencode::Error) -> Self {
        Self::InvalidInput(InvalidInput::Encoding(e.to_string()))
    }
}

impl From<sig::Error> for ChannelError {
    fn from(_: sig::Error) -> Self {
        Self::InvalidSignature
    }
}

impl From<ConversionError> for ChannelError {
    fn from(e: ConversionError) -> Self {
        Self::InvalidInput(e.into())
    }
}
