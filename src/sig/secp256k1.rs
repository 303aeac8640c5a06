//! Signer using the libsecp256k1 bindings.

use super::{hash_to_eth_signed_msg_hash, recovery_id, Error, ETH_V_OFFSET};
use crate::abiencode::types::{Address, Hash, Signature};
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Secp256k1, SecretKey, VerifyOnly,
};

#[derive(Debug)]
pub struct Signer {
    secp: Secp256k1<All>,
    sk: SecretKey,
    addr: Address,
}

impl Signer {
    pub fn new<R: rand::Rng + rand::CryptoRng>(rng: &mut R) -> Self {
        let secp = Secp256k1::new();
        let sk = loop {
            let bytes: [u8; 32] = rng.gen();
            if let Ok(sk) = SecretKey::from_slice(&bytes) {
                break sk;
            }
        };
        let addr = PublicKey::from_secret_key(&secp, &sk).into();
        Self { secp, sk, addr }
    }

    pub fn address(&self) -> Address {
        self.addr
    }

    /// Sign a hash using a Ethereum 65-byte recoverable signature.
    ///
    /// Note that this differs from transaction signatures, as it does not
    /// include the chain id in `v` (EIP-155).
    pub fn sign_eth(&self, msg: Hash) -> Signature {
        let hash = hash_to_eth_signed_msg_hash(msg);

        // Recoverable, otherwise the verifier could not find the address.
        let sig = self
            .secp
            .sign_ecdsa_recoverable(&Message::from(hash), &self.sk);
        let (v, rs) = sig.serialize_compact();

        // EIP-2: only canonical (low s) signatures are accepted on-chain. The
        // library already produces those, fail early if that ever changes.
        debug_assert!(rs[32] & 0x80 == 0);

        Signature::new(&rs, ETH_V_OFFSET + v.to_i32() as u8)
    }
}

#[derive(Debug, Clone)]
pub struct Verifier {
    secp: Secp256k1<VerifyOnly>,
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Verifier {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }

    /// Recover the signer's address.
    ///
    /// `msg` is the hash given to [Signer::sign_eth()], without the
    /// `Ethereum Signed Message` prefix.
    pub fn recover_signer(&self, msg: Hash, eth_sig: Signature) -> Result<Address, Error> {
        let hash = hash_to_eth_signed_msg_hash(msg);

        let recid = RecoveryId::from_i32(recovery_id(eth_sig.0[64])?.into())
            .map_err(|_| Error::RecoveryFailed)?;
        let sig = RecoverableSignature::from_compact(&eth_sig.0[..64], recid)
            .map_err(|_| Error::RecoveryFailed)?;

        let pk = self
            .secp
            .recover_ecdsa(&Message::from(hash), &sig)
            .map_err(|_| Error::RecoveryFailed)?;
        Ok(pk.into())
    }
}
