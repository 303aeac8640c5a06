//! Walkthrough of a channel from opening to a disputed close.
//!
//! Run with `RUST_LOG=debug` to also see rejected operations.

use perun_adjudicator::{
    channel::{CanonicalState, ChannelProposal, MemoryStore},
    ledger::InMemoryLedger,
    sig::Signer,
    wire::{decode_event, decode_update, encode_update, BytesBus, ProtoBufEncodingLayer},
    Adjudicator, AdjudicatorConfig, Signature,
};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

const PARTICIPANTS: [&str; 2] = ["Alice", "Bob"];

/// Event sink standing in for a watcher connection. Prints every frame.
#[derive(Debug)]
struct PrintBus;

impl BytesBus for PrintBus {
    fn publish(&self, msg: &[u8]) {
        println!("Adjudicator->Watcher: {}", hex::encode(msg));
        println!("    {:?}", decode_event(msg));
    }
}

/// Helper macro to print significant places in the protocol.
macro_rules! print_bold {
    ($($arg:tt)*) => {
        print!("\x1b[1m");
        print!($($arg)*);
        println!("\x1b[0m");
    };
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Fixed seed so the output is reproducible, never do this with real keys.
    let mut rng = StdRng::seed_from_u64(0);
    let alice = Signer::new(&mut rng);
    let bob = Signer::new(&mut rng);

    let adj = Adjudicator::new(
        MemoryStore::new(),
        InMemoryLedger::new(1_700_000_000),
        ProtoBufEncodingLayer::new(PrintBus),
        AdjudicatorConfig::with_challenge_period(3_600),
    );

    print_bold!("{} opens a channel with 100 and {}", PARTICIPANTS[0], PARTICIPANTS[1]);
    let id = adj
        .open_channel(ChannelProposal {
            participants: [alice.address(), bob.address()],
            deposits: [100.into(), 0.into()],
            challenge_duration: None,
        })
        .unwrap();

    print_bold!("{} pays 40, signs and sends the state to {}", PARTICIPANTS[0], PARTICIPANTS[1]);
    let (tx, rx) = mpsc::channel::<Vec<u8>>();
    let state = CanonicalState {
        channel_id: id,
        balances: [60.into(), 40.into()],
        nonce: 1,
    };
    let half_signed = state.with_signatures([alice.sign_eth(state.hash().unwrap()), Signature::default()]);
    tx.send(encode_update(half_signed).unwrap()).unwrap();

    print_bold!("{} countersigns and submits", PARTICIPANTS[1]);
    let mut update = decode_update(&rx.recv().unwrap()).unwrap();
    update.signatures[1] = bob.sign_eth(update.state().hash().unwrap());
    adj.apply_update(update).unwrap();

    print_bold!("{} tries to replay the old state", PARTICIPANTS[0]);
    let replay = CanonicalState {
        channel_id: id,
        balances: [100.into(), 0.into()],
        nonce: 1,
    };
    let hash = replay.hash().unwrap();
    let replay = replay.with_signatures([alice.sign_eth(hash), bob.sign_eth(hash)]);
    println!("    {:?}", adj.apply_update(replay));

    print_bold!("{} stops responding, {} raises a dispute", PARTICIPANTS[0], PARTICIPANTS[1]);
    let deadline = adj.raise_dispute(id, bob.address()).unwrap();
    println!("    closing too early: {:?}", adj.close_channel(id, bob.address()));

    print_bold!("Challenge window over, {} settles", PARTICIPANTS[1]);
    adj.ledger().set_time(deadline);
    let record = adj.close_channel(id, bob.address()).unwrap();
    println!("    {:?}", record);
    for (name, signer) in PARTICIPANTS.iter().zip([&alice, &bob]) {
        println!("    {} received {}", name, adj.ledger().balance_of(&signer.address()));
    }
}
