//! Channel records and the engines that mutate them.
//!
//! A [Channel] moves through `Open -> Disputed -> Closed` (or directly
//! `Open -> Closed` on a cooperative close). Every mutation goes through
//! [ChannelStore::update], the engines in the submodules only implement the
//! rules for a single record:
//! - [authorization]: joint signatures over the canonical state
//! - `transition`: nonce ordering and conservation of funds
//! - `dispute`: freezing a channel and starting the challenge window
//! - `settlement`: exactly-once payout of the final balances

pub mod authorization;
mod dispute;
mod settlement;
mod store;
mod transition;

use crate::{
    abiencode::{
        self,
        types::{Address, Hash, Signature, U256},
    },
    error::{ChannelError, InvalidInput},
};
use core::fmt::Display;
use serde::Serialize;

pub use authorization::{verify_authorization, CanonicalState};
pub use settlement::{PayoutStatus, Settlement, SettlementRecord};
pub use store::{ChannelStore, MemoryStore};

pub const PARTICIPANTS: usize = 2;

/// ID (Index) of a participant in the channel.
///
/// `0` is participant A (the funder), `1` is participant B.
pub type PartIdx = usize;

pub type ChannelId = Hash;

/// Ledger time in seconds.
pub type Timestamp = u64;

/// Input of the channel id derivation.
///
/// The creation counter keeps ids unique even if the same pair opens several
/// channels within the same second.
#[derive(Serialize, Debug, Copy, Clone)]
pub struct ChannelParams {
    pub participants: [Address; PARTICIPANTS],
    pub created_at: Timestamp,
    pub counter: u64,
}

impl ChannelParams {
    pub fn channel_id(&self) -> Result<ChannelId, abiencode::Error> {
        abiencode::to_hash(self)
    }
}

/// The two distinct identities owning a channel.
///
/// Balances are positional (A, B), authorization is not: a state update is
/// authorized by the *set* of signers, see [Participants::is_signer_set].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Participants([Address; PARTICIPANTS]);

impl Participants {
    pub fn new(a: Address, b: Address) -> Result<Self, InvalidInput> {
        if a.is_zero() || b.is_zero() {
            Err(InvalidInput::ZeroAddress)
        } else if a == b {
            Err(InvalidInput::IdenticalParticipants)
        } else {
            Ok(Self([a, b]))
        }
    }

    pub fn a(&self) -> Address {
        self.0[0]
    }

    pub fn b(&self) -> Address {
        self.0[1]
    }

    pub fn get(&self, idx: PartIdx) -> Address {
        self.0[idx]
    }

    pub fn as_array(&self) -> [Address; PARTICIPANTS] {
        self.0
    }

    pub fn index_of(&self, addr: &Address) -> Option<PartIdx> {
        self.0.iter().position(|p| p == addr)
    }

    pub fn contains(&self, addr: &Address) -> bool {
        self.index_of(addr).is_some()
    }

    /// Whether `signers` is exactly `{A, B}`, in either order.
    ///
    /// Both participants are distinct, so two distinct signers that are both
    /// participants cover the whole set.
    pub fn is_signer_set(&self, signers: [Address; PARTICIPANTS]) -> bool {
        signers[0] != signers[1] && signers.iter().all(|s| self.contains(s))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    Open,
    /// Frozen until `deadline`, after which either participant can settle.
    Disputed { deadline: Timestamp },
    Closed,
}

impl Display for ChannelStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChannelStatus::Open => f.write_str("open"),
            ChannelStatus::Disputed { deadline } => write!(f, "disputed until {}", deadline),
            ChannelStatus::Closed => f.write_str("closed"),
        }
    }
}

/// A jointly signed balance snapshot, as submitted by a caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StateUpdate {
    pub channel_id: ChannelId,
    pub balances: [U256; PARTICIPANTS],
    pub nonce: u64,
    /// `signatures[0]` is expected from A and `signatures[1]` from B, but
    /// either order is accepted.
    pub signatures: [Signature; PARTICIPANTS],
}

impl StateUpdate {
    pub fn balance_a(&self) -> U256 {
        self.balances[0]
    }

    pub fn balance_b(&self) -> U256 {
        self.balances[1]
    }

    /// The part of the update covered by the signatures.
    pub fn state(&self) -> CanonicalState {
        CanonicalState {
            channel_id: self.channel_id,
            balances: self.balances,
            nonce: self.nonce,
        }
    }
}

/// Request to open a channel.
#[derive(Debug, Copy, Clone)]
pub struct ChannelProposal {
    pub participants: [Address; PARTICIPANTS],
    /// Funds locked by each participant. A must fund, B may co-fund.
    pub deposits: [U256; PARTICIPANTS],
    /// Overrides the configured challenge period for this channel.
    pub challenge_duration: Option<u64>,
}

/// Authoritative record of a channel, owned by a [ChannelStore].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    id: ChannelId,
    participants: Participants,
    balances: [U256; PARTICIPANTS],
    total_deposited: U256,
    nonce: u64,
    status: ChannelStatus,
    challenge_duration: u64,
    created_at: Timestamp,
    latest: Option<StateUpdate>,
    settlement: Option<Settlement>,
}

impl Channel {
    /// Validate a proposal and build the initial (nonce 0) record.
    pub fn new(
        proposal: ChannelProposal,
        created_at: Timestamp,
        counter: u64,
        default_challenge_duration: u64,
    ) -> Result<Self, ChannelError> {
        let [a, b] = proposal.participants;
        let participants = Participants::new(a, b)?;

        let [deposit_a, deposit_b] = proposal.deposits;
        if deposit_a.is_zero() {
            return Err(InvalidInput::ZeroDeposit.into());
        }
        let total_deposited = deposit_a
            .checked_add(deposit_b)
            .ok_or(InvalidInput::DepositOverflow)?;

        let challenge_duration = proposal
            .challenge_duration
            .unwrap_or(default_challenge_duration);
        if challenge_duration == 0 {
            return Err(InvalidInput::ZeroChallengeDuration.into());
        }

        let id = ChannelParams {
            participants: participants.as_array(),
            created_at,
            counter,
        }
        .channel_id()?;

        Ok(Self {
            id,
            participants,
            balances: proposal.deposits,
            total_deposited,
            nonce: 0,
            status: ChannelStatus::Open,
            challenge_duration,
            created_at,
            latest: None,
            settlement: None,
        })
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn participants(&self) -> Participants {
        self.participants
    }

    pub fn balances(&self) -> [U256; PARTICIPANTS] {
        self.balances
    }

    pub fn balance_a(&self) -> U256 {
        self.balances[0]
    }

    pub fn balance_b(&self) -> U256 {
        self.balances[1]
    }

    pub fn total_deposited(&self) -> U256 {
        self.total_deposited
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn status(&self) -> ChannelStatus {
        self.status
    }

    /// Only meaningful while the channel is disputed.
    pub fn dispute_deadline(&self) -> Option<Timestamp> {
        match self.status {
            ChannelStatus::Disputed { deadline } => Some(deadline),
            _ => None,
        }
    }

    pub fn challenge_duration(&self) -> u64 {
        self.challenge_duration
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Latest jointly signed update, `None` while still at the opening
    /// balances.
    pub fn latest_state(&self) -> Option<StateUpdate> {
        self.latest
    }

    /// Present once the channel is closed.
    pub fn settlement(&self) -> Option<Settlement> {
        self.settlement
    }

    fn ensure_participant(&self, caller: &Address) -> Result<PartIdx, ChannelError> {
        self.participants
            .index_of(caller)
            .ok_or(ChannelError::Unauthorized(*caller))
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use crate::sig::Signer;
    use rand::{rngs::StdRng, SeedableRng};

    pub fn signers() -> (Signer, Signer) {
        let mut rng = StdRng::seed_from_u64(0);
        (Signer::new(&mut rng), Signer::new(&mut rng))
    }

    pub fn proposal(a: &Signer, b: &Signer, deposit_a: u64, deposit_b: u64) -> ChannelProposal {
        ChannelProposal {
            participants: [a.address(), b.address()],
            deposits: [deposit_a.into(), deposit_b.into()],
            challenge_duration: None,
        }
    }

    pub fn open_channel(a: &Signer, b: &Signer, deposit_a: u64, deposit_b: u64) -> Channel {
        Channel::new(proposal(a, b, deposit_a, deposit_b), 1_000, 0, 86_400).unwrap()
    }

    pub fn signed_update(
        channel: ChannelId,
        balances: (u64, u64),
        nonce: u64,
        first: &Signer,
        second: &Signer,
    ) -> StateUpdate {
        let state = CanonicalState {
            channel_id: channel,
            balances: [balances.0.into(), balances.1.into()],
            nonce,
        };
        let hash = state.hash().unwrap();
        state.with_signatures([first.sign_eth(hash), second.sign_eth(hash)])
    }
}
