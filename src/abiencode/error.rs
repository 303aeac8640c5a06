//! Error type and Return values used by the canonical encoder.

use serde::ser;

/// Represents all possible errors that can happen during Serialization.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The value contains a type that has no static 32-byte slot
    /// representation.
    ///
    /// Floating point numbers, strings, sequences and maps would either need
    /// a dynamic (offset + tail) layout or a lossy conversion. Neither is
    /// allowed in a message that two parties must hash to the same value, so
    /// they are rejected.
    #[error("type is not representable in canonical encoding: {0}")]
    TypeNotRepresentable(&'static str),
    /// Fixed-size bytes longer than a single slot.
    #[error("byte string of length {0} does not fit into a 32 byte slot")]
    BytesTooLong(usize),
    /// Raised through [ser::Error::custom()] by hand-written `Serialize`
    /// implementations.
    #[error("{0}")]
    Custom(String),
}

impl ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: core::fmt::Display,
    {
        Error::Custom(msg.to_string())
    }
}

/// Alias for `Result` using the [Error] returned by the Serializer.
pub type Result<T> = core::result::Result<T, Error>;
