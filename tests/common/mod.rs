#![allow(dead_code)]

use perun_adjudicator::{
    channel::{CanonicalState, ChannelId, ChannelProposal, MemoryStore, StateUpdate},
    ledger::InMemoryLedger,
    sig::Signer,
    wire::EventLog,
    Adjudicator, AdjudicatorConfig,
};
use rand::{rngs::StdRng, SeedableRng};

pub type TestAdjudicator = Adjudicator<MemoryStore, InMemoryLedger, EventLog>;

pub const START: u64 = 1_700_000_000;

pub struct Parties {
    pub alice: Signer,
    pub bob: Signer,
}

pub fn parties() -> Parties {
    // Do not use fixed seeds for real keys, this is just for testing.
    let mut rng = StdRng::seed_from_u64(1337);
    Parties {
        alice: Signer::new(&mut rng),
        bob: Signer::new(&mut rng),
    }
}

pub fn adjudicator() -> TestAdjudicator {
    Adjudicator::new(
        MemoryStore::new(),
        InMemoryLedger::new(START),
        EventLog::new(),
        AdjudicatorConfig::default(),
    )
}

pub fn proposal(p: &Parties, deposit_a: u64, deposit_b: u64) -> ChannelProposal {
    ChannelProposal {
        participants: [p.alice.address(), p.bob.address()],
        deposits: [deposit_a.into(), deposit_b.into()],
        challenge_duration: None,
    }
}

pub fn sign(
    channel_id: ChannelId,
    balances: (u64, u64),
    nonce: u64,
    signers: [&Signer; 2],
) -> StateUpdate {
    let state = CanonicalState {
        channel_id,
        balances: [balances.0.into(), balances.1.into()],
        nonce,
    };
    let hash = state.hash().unwrap();
    state.with_signatures([signers[0].sign_eth(hash), signers[1].sign_eth(hash)])
}

/// Install a log subscriber once, honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
