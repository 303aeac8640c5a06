//! Joint authorization of state updates.
//!
//! Both participants sign the Keccak-256 hash of the canonical state (see
//! [CanonicalState]) in the `personal_sign` format. An update is authorized
//! if the two signatures recover to exactly the two participants.

use super::{ChannelId, Participants, StateUpdate, PARTICIPANTS};
use crate::{
    abiencode::{
        self,
        types::{Address, Hash, Signature, U256},
    },
    error::ChannelError,
    sig::Verifier,
};
use serde::Serialize;

/// The signed part of a state update.
///
/// Encoded as four 32-byte slots `(bytes32 id, uint256 a, uint256 b, uint64
/// nonce)`, so a Solidity contract can recompute the same hash with
/// `keccak256(abi.encode(...))`.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct CanonicalState {
    pub channel_id: ChannelId,
    pub balances: [U256; PARTICIPANTS],
    pub nonce: u64,
}

impl CanonicalState {
    /// Message hash the participants have to sign.
    pub fn hash(&self) -> Result<Hash, ChannelError> {
        Ok(abiencode::to_hash(self)?)
    }

    pub fn with_signatures(self, signatures: [Signature; PARTICIPANTS]) -> StateUpdate {
        StateUpdate {
            channel_id: self.channel_id,
            balances: self.balances,
            nonce: self.nonce,
            signatures,
        }
    }
}

/// Check that `update` is signed by both participants, in either order.
///
/// Each signature is recovered independently. A signature that cannot be
/// recovered, a signer that is not a participant, or the same participant in
/// both slots all fail with [ChannelError::InvalidSignature].
pub fn verify_authorization(
    verifier: &Verifier,
    update: &StateUpdate,
    participants: &Participants,
) -> Result<(), ChannelError> {
    let hash = update.state().hash()?;

    let mut signers = [Address::default(); PARTICIPANTS];
    for (signer, sig) in signers.iter_mut().zip(update.signatures) {
        *signer = verifier.recover_signer(hash, sig)?;
    }

    if participants.is_signer_set(signers) {
        Ok(())
    } else {
        Err(ChannelError::InvalidSignature)
    }
}
