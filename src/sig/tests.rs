use super::Error;
use crate::abiencode::{self, types::Hash};
use rand::{rngs::StdRng, SeedableRng};

fn data() -> Hash {
    abiencode::to_hash(&(0xa1a2a3a4u32, 7u64)).unwrap()
}

macro_rules! make_a_to_b {
    ($name:ident, $signer:ty, $verifier:ty) => {
        #[test]
        fn $name() {
            // Do not use that on any real device, this is just for testing.
            let mut rng = StdRng::seed_from_u64(0);
            let signer = <$signer>::new(&mut rng);
            let msg = data();
            let sig = signer.sign_eth(msg);

            assert!(sig.0[64] == 27 || sig.0[64] == 28);

            let verifier = <$verifier>::new();
            let address = verifier.recover_signer(msg, sig).unwrap();

            assert_eq!(address, signer.address());
        }
    };
}

macro_rules! make_rejections {
    ($name:ident, $signer:ty, $verifier:ty) => {
        #[test]
        fn $name() {
            let mut rng = StdRng::seed_from_u64(1);
            let signer = <$signer>::new(&mut rng);
            let verifier = <$verifier>::new();
            let msg = data();
            let sig = signer.sign_eth(msg);

            // A different message recovers some other key, never the signer.
            let other = abiencode::to_hash(&(0xa1a2a3a4u32, 8u64)).unwrap();
            match verifier.recover_signer(other, sig) {
                Ok(addr) => assert_ne!(addr, signer.address()),
                Err(e) => assert_eq!(e, Error::RecoveryFailed),
            }

            let mut bad_v = sig;
            bad_v.0[64] = 29;
            assert_eq!(
                verifier.recover_signer(msg, bad_v),
                Err(Error::InvalidRecoveryId(29))
            );

            let mut zero_v = sig;
            zero_v.0[64] = 0;
            assert_eq!(
                verifier.recover_signer(msg, zero_v),
                Err(Error::InvalidRecoveryId(0))
            );

            let mut zero_rs = sig;
            zero_rs.0[..64].fill(0);
            assert_eq!(
                verifier.recover_signer(msg, zero_rs),
                Err(Error::RecoveryFailed)
            );
        }
    };
}

#[test]
fn seeded_signers_are_deterministic() {
    let a = super::Signer::new(&mut StdRng::seed_from_u64(42));
    let b = super::Signer::new(&mut StdRng::seed_from_u64(42));
    let c = super::Signer::new(&mut StdRng::seed_from_u64(43));

    assert_eq!(a.address(), b.address());
    assert_ne!(a.address(), c.address());
}

#[cfg(feature = "secp256k1")]
make_a_to_b!(
    secp256k1_to_secp256k1,
    super::secp256k1::Signer,
    super::secp256k1::Verifier
);

#[cfg(feature = "k256")]
make_a_to_b!(k256_to_k256, super::k256::Signer, super::k256::Verifier);

#[cfg(all(feature = "secp256k1", feature = "k256"))]
make_a_to_b!(
    secp256k1_to_k256,
    super::secp256k1::Signer,
    super::k256::Verifier
);

#[cfg(all(feature = "secp256k1", feature = "k256"))]
make_a_to_b!(
    k256_to_secp256k1,
    super::k256::Signer,
    super::secp256k1::Verifier
);

#[cfg(feature = "k256")]
make_rejections!(k256_rejects, super::k256::Signer, super::k256::Verifier);

#[cfg(feature = "secp256k1")]
make_rejections!(
    secp256k1_rejects,
    super::secp256k1::Signer,
    super::secp256k1::Verifier
);
