use super::{to_writer, types::Hash, Error, Writer};

use serde::Serialize;
use sha3::{Digest, Keccak256};

/// Feeds every encoded slot directly into the hasher, so the encoding is
/// never materialized.
#[derive(Default)]
pub struct Keccak256Writer {
    hasher: Keccak256,
}

impl Writer for Keccak256Writer {
    fn write(&mut self, slot: &[u8]) {
        self.hasher.update(slot);
    }
}

impl Keccak256Writer {
    pub fn finalize(self) -> Hash {
        Hash(self.hasher.finalize().into())
    }
}

pub fn to_hash<T>(value: &T) -> Result<Hash, Error>
where
    T: Serialize + ?Sized,
{
    let mut writer = Keccak256Writer::default();
    to_writer(value, &mut writer)?;
    Ok(writer.finalize())
}
