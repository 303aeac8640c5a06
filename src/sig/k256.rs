//! Signer using the k256 Rust crate (implementation of ecdsa in Rust).

use super::{hash_to_eth_signed_msg_hash, recovery_id, Error, ETH_V_OFFSET};
use crate::abiencode::types::{Address, Hash, Signature};
use k256::{
    ecdsa::{
        recoverable,
        signature::{hazmat::PrehashSigner, Signature as k256Signature},
        SigningKey, VerifyingKey,
    },
    elliptic_curve::sec1::ToEncodedPoint,
};
use sha3::{Digest, Keccak256};

impl From<VerifyingKey> for Address {
    fn from(key: VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);

        // Throw away the first byte (0x04, uncompressed point tag), which is
        // not part of the public key.
        let hash: [u8; 32] = Keccak256::digest(&point.as_bytes()[1..]).into();

        let mut addr = Address([0; 20]);
        addr.0.copy_from_slice(&hash[32 - 20..]);
        addr
    }
}

#[derive(Debug)]
pub struct Signer {
    key: SigningKey,
    addr: Address,
}

impl Signer {
    pub fn new<R: rand::Rng + rand::CryptoRng>(rng: &mut R) -> Self {
        loop {
            // Only zero and values >= the curve order are rejected, so this
            // practically never loops.
            let bytes: [u8; 32] = rng.gen();
            if let Ok(key) = SigningKey::from_bytes(&bytes) {
                let addr = key.verifying_key().into();
                return Self { key, addr };
            }
        }
    }

    pub fn address(&self) -> Address {
        self.addr
    }

    pub fn sign_eth(&self, msg: Hash) -> Signature {
        // "\x19Ethereum Signed Message:\n32" format
        let hash = hash_to_eth_signed_msg_hash(msg);

        let sig: recoverable::Signature = self
            .key
            .sign_prehash(&hash.0)
            .expect("Unreachable: signing a 32 byte prehash cannot fail");

        // This Signature type already has the format we need: 65 bytes
        // containing r, s and v in this order. We still have to add 27 to v.
        let mut sig_bytes: [u8; 65] = sig.as_bytes().try_into().expect(
            "Unreachable: Signature size doesn't match, something big must have changed in the dependency",
        );
        debug_assert!(sig_bytes[32] & 0x80 == 0);
        sig_bytes[64] += ETH_V_OFFSET;

        Signature(sig_bytes)
    }
}

/// Recovers signers, stateless for this backend.
#[derive(Debug, Default, Clone)]
pub struct Verifier;

impl Verifier {
    pub fn new() -> Self {
        Self
    }

    pub fn recover_signer(&self, msg: Hash, eth_sig: Signature) -> Result<Address, Error> {
        let hash = hash_to_eth_signed_msg_hash(msg);

        let mut sig_bytes: [u8; 65] = eth_sig.0;
        sig_bytes[64] = recovery_id(sig_bytes[64])?;

        let sig =
            recoverable::Signature::from_bytes(&sig_bytes).map_err(|_| Error::RecoveryFailed)?;
        let verifying_key = sig
            .recover_verifying_key_from_digest_bytes(&hash.0.into())
            .map_err(|_| Error::RecoveryFailed)?;
        Ok(verifying_key.into())
    }
}
