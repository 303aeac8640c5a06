//! Creation and verification of (Ethereum) recoverable signatures.
//!
//! The adjudicator only ever *verifies* signatures through a [Verifier]. The
//! [Signer] is the client-side counterpart: wallets and tests use it to
//! produce the signatures that are later submitted with a state update.

use crate::abiencode::types::Hash;
use sha3::{Digest, Keccak256};

#[cfg(feature = "k256")]
mod k256;
#[cfg(all(feature = "k256", not(feature = "secp256k1")))]
pub use self::k256::{Signer, Verifier};

#[cfg(feature = "secp256k1")]
mod secp256k1;
#[cfg(feature = "secp256k1")]
pub use self::secp256k1::{Signer, Verifier};

#[cfg(not(any(feature = "k256", feature = "secp256k1")))]
compile_error!("enable at least one signature backend: `k256` or `secp256k1`");

#[cfg(test)]
mod tests;

/// Offset added to the recovery id, kept for compatibility with `ecrecover`.
const ETH_V_OFFSET: u8 = 27;

/// Errors returned while recovering the signer of a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// `v` is neither 27 nor 28.
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),
    /// `r`/`s` are not valid scalars or no public key matches the signature.
    #[error("public key recovery failed")]
    RecoveryFailed,
}

/// Add the `\x19Ethereum Signed Message\n<length>` prefix to hash.
///
/// This is the format expected by the Solidity contracts.
fn hash_to_eth_signed_msg_hash(hash: Hash) -> Hash {
    // Packed encoding => We can't use the serializer
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n32");
    hasher.update(hash.0);
    Hash(hasher.finalize().into())
}

/// Convert the Ethereum `v` byte back to the raw recovery id (0 or 1).
fn recovery_id(v: u8) -> Result<u8, Error> {
    match v.checked_sub(ETH_V_OFFSET) {
        Some(id @ (0 | 1)) => Ok(id),
        _ => Err(Error::InvalidRecoveryId(v)),
    }
}
