//! Keyed storage of channel records.

use super::{Channel, ChannelId};
use crate::error::{ChannelError, InvalidInput};
use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::Mutex;
use std::sync::Arc;

/// Single source of truth for channel records.
///
/// Implementations do no business validation. They guarantee unique ids and
/// that [ChannelStore::update] is an atomic read-modify-write with respect to
/// every other operation on the same id, while operations on different ids
/// never wait for each other. Durable implementations (backed by the ledger
/// or a database) plug in here; [MemoryStore] is the in-process one.
pub trait ChannelStore {
    /// Insert a new record. Fails if the id is already taken.
    fn create(&self, channel: Channel) -> Result<ChannelId, ChannelError> {
        self.create_with(channel, |_| ())
    }

    /// Like [ChannelStore::create], running `on_commit` once the record is
    /// stored but before any other operation can see it.
    fn create_with<F>(&self, channel: Channel, on_commit: F) -> Result<ChannelId, ChannelError>
    where
        F: FnOnce(&Channel);

    /// Snapshot of the most recently committed record.
    fn get(&self, id: &ChannelId) -> Result<Channel, ChannelError>;

    /// Run `mutation` on the record with exclusive access.
    ///
    /// The mutation works on a draft: its changes are committed only if it
    /// returns `Ok`, an `Err` leaves the stored record untouched. Once the
    /// mutation returned `Ok` the commit cannot fail, so the mutation may
    /// report its effects (events) as its last step.
    fn update<R, F>(&self, id: &ChannelId, mutation: F) -> Result<R, ChannelError>
    where
        F: FnOnce(&mut Channel) -> Result<R, ChannelError>;

    fn exists(&self, id: &ChannelId) -> bool;

    /// Number of records, including closed channels.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [ChannelStore] on top of a sharded concurrent map.
///
/// Each record sits behind its own lock. The map's shard lock is only held
/// to look the record up, so a long running mutation (a slow payout) blocks
/// its own channel and nothing else. Mutations must never call back into the
/// store for the channel they are mutating.
#[derive(Debug, Default)]
pub struct MemoryStore {
    channels: DashMap<ChannelId, Arc<Mutex<Channel>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, id: &ChannelId) -> Result<Arc<Mutex<Channel>>, ChannelError> {
        self.channels
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(ChannelError::ChannelNotFound(*id))
    }
}

impl ChannelStore for MemoryStore {
    fn create_with<F>(&self, channel: Channel, on_commit: F) -> Result<ChannelId, ChannelError>
    where
        F: FnOnce(&Channel),
    {
        let id = channel.id();
        let record = Arc::new(Mutex::new(channel));
        // Locked before it is published, nobody gets in ahead of on_commit.
        let guard = record.lock();
        match self.channels.entry(id) {
            Entry::Occupied(_) => return Err(InvalidInput::DuplicateChannel(id).into()),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&record));
            }
        }
        on_commit(&*guard);
        Ok(id)
    }

    fn get(&self, id: &ChannelId) -> Result<Channel, ChannelError> {
        let record = self.record(id)?;
        let channel = record.lock().clone();
        Ok(channel)
    }

    fn update<R, F>(&self, id: &ChannelId, mutation: F) -> Result<R, ChannelError>
    where
        F: FnOnce(&mut Channel) -> Result<R, ChannelError>,
    {
        let record = self.record(id)?;
        let mut current = record.lock();

        let mut draft = current.clone();
        let result = mutation(&mut draft)?;
        *current = draft;
        Ok(result)
    }

    fn exists(&self, id: &ChannelId) -> bool {
        self.channels.contains_key(id)
    }

    fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{channel::test_utils::*, channel::ChannelStatus, Hash};

    #[test]
    fn create_and_get() {
        let (a, b) = signers();
        let store = MemoryStore::new();
        let channel = open_channel(&a, &b, 100, 0);

        assert!(store.is_empty());
        let id = store.create(channel.clone()).unwrap();

        assert_eq!(id, channel.id());
        assert!(store.exists(&id));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id), Ok(channel));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let (a, b) = signers();
        let store = MemoryStore::new();
        let channel = open_channel(&a, &b, 100, 0);
        let id = store.create(channel.clone()).unwrap();

        assert_eq!(
            store.create(channel),
            Err(InvalidInput::DuplicateChannel(id).into())
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_ids() {
        let store = MemoryStore::new();
        let id = Hash([3; 32]);

        assert!(!store.exists(&id));
        assert_eq!(store.get(&id), Err(ChannelError::ChannelNotFound(id)));
        assert_eq!(
            store.update(&id, |_| Ok(())),
            Err(ChannelError::ChannelNotFound(id))
        );
    }

    #[test]
    fn failed_mutation_is_not_committed() {
        let (a, b) = signers();
        let store = MemoryStore::new();
        let id = store.create(open_channel(&a, &b, 100, 0)).unwrap();

        let result: Result<(), _> = store.update(&id, |channel| {
            channel.status = ChannelStatus::Closed;
            Err(ChannelError::InvalidSignature)
        });
        assert_eq!(result, Err(ChannelError::InvalidSignature));
        assert_eq!(store.get(&id).unwrap().status(), ChannelStatus::Open);

        store
            .update(&id, |channel| {
                channel.status = ChannelStatus::Closed;
                Ok(())
            })
            .unwrap();
        assert_eq!(store.get(&id).unwrap().status(), ChannelStatus::Closed);
    }

    #[test]
    fn create_hook_sees_the_stored_record() {
        let (a, b) = signers();
        let store = MemoryStore::new();
        let channel = open_channel(&a, &b, 100, 0);
        let mut seen = None;

        let id = store
            .create_with(channel.clone(), |stored| seen = Some(stored.id()))
            .unwrap();
        assert_eq!(seen, Some(id));

        let mut called = false;
        assert!(store.create_with(channel, |_| called = true).is_err());
        assert!(!called);
    }

    #[test]
    fn long_mutation_does_not_block_other_channels() {
        let (a, b) = signers();
        let store = std::sync::Arc::new(MemoryStore::new());
        // Enough channels that some share a shard with the first one.
        let ids: Vec<ChannelId> = (0..64)
            .map(|counter| {
                let channel =
                    Channel::new(proposal(&a, &b, 100, 0), 1_000, counter, 86_400).unwrap();
                store.create(channel).unwrap()
            })
            .collect();

        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let slow = {
            let (store, id) = (store.clone(), ids[0]);
            std::thread::spawn(move || {
                store.update(&id, |_| {
                    started_tx.send(()).unwrap();
                    std::thread::sleep(std::time::Duration::from_millis(500));
                    Ok(())
                })
            })
        };
        started_rx.recv().unwrap();

        let begin = std::time::Instant::now();
        for id in &ids[1..] {
            store.get(id).unwrap();
            store.update(id, |_| Ok(())).unwrap();
        }
        assert!(begin.elapsed() < std::time::Duration::from_millis(250));

        slow.join().unwrap().unwrap();
    }
}
