//! Adjudicator for two-party payment channels.
//!
//! Two participants lock deposits in a channel, exchange jointly signed
//! balance updates off-chain and eventually settle. The [Adjudicator] is the
//! authority that accepts a newer state, runs the challenge window when one
//! side stops cooperating, and pays out the final balances exactly once.

mod abiencode {
    mod error;
    mod hashing;
    mod ser;

    pub mod types;

    pub use error::Error;
    pub use hashing::to_hash;
    pub use ser::{to_writer, Writer};

    #[cfg(test)]
    mod tests;
}
pub mod sig;

mod adjudicator;
pub mod channel;
pub mod channelwire;
pub mod config;
mod error;
pub mod ledger;
pub mod messages;
pub mod wire;

pub use abiencode::types::{Address, Hash, Signature, U256};
pub use adjudicator::Adjudicator;
pub use config::AdjudicatorConfig;
pub use error::{ChannelError, InvalidInput};
