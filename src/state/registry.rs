//! Connection registry: which live connection speaks for which user.
//!
//! The registry is the only shared mutable presence state in the daemon.
//! Every access goes through [`ConnectionRegistry`]'s methods, each of which
//! holds the internal lock for its whole duration, so concurrent connection
//! tasks always observe a consistent mapping.
//!
//! Semantics:
//! - At most one entry per user id. The first registration wins; later
//!   announcements for a present user are no-ops.
//! - At most one entry per connection handle.
//! - Removal is by connection handle, never by user id, so a stale second
//!   connection for a user can never evict the registered one.
//! - Snapshots list entries in registration order.

use super::conn_id::ConnectionId;
use parking_lot::Mutex;
use presence_proto::PresenceEntry;
use std::collections::{BTreeMap, HashMap};

/// One registered (user, connection) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub user_id: String,
    pub handle: ConnectionId,
}

impl ConnectionEntry {
    pub fn new(user_id: impl Into<String>, handle: impl Into<ConnectionId>) -> Self {
        Self {
            user_id: user_id.into(),
            handle: handle.into(),
        }
    }
}

impl From<&ConnectionEntry> for PresenceEntry {
    fn from(entry: &ConnectionEntry) -> Self {
        PresenceEntry::new(entry.user_id.clone(), entry.handle.clone())
    }
}

/// Result of [`ConnectionRegistry::add`].
#[derive(Debug, Clone)]
pub struct AddOutcome {
    /// Whether a new entry was created.
    pub inserted: bool,
    /// Registry contents right after the call.
    pub snapshot: Vec<ConnectionEntry>,
}

/// Result of [`ConnectionRegistry::remove`].
#[derive(Debug, Clone)]
pub struct RemoveOutcome {
    /// The entry that was removed, if the handle was registered.
    pub removed: Option<ConnectionEntry>,
    /// Registry contents right after the call.
    pub snapshot: Vec<ConnectionEntry>,
}

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    /// Registration order.
    order: BTreeMap<u64, ConnectionEntry>,
    by_user: HashMap<String, u64>,
    by_handle: HashMap<ConnectionId, u64>,
}

impl Inner {
    fn snapshot(&self) -> Vec<ConnectionEntry> {
        self.order.values().cloned().collect()
    }

    fn check_invariants(&self) {
        debug_assert_eq!(self.by_user.len(), self.order.len(), "user index out of sync");
        debug_assert_eq!(self.by_handle.len(), self.order.len(), "handle index out of sync");
    }
}

/// Process-wide user → connection mapping.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: Mutex<Inner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` for `user_id` unless the user (or the handle) is
    /// already registered, in which case the existing entry is kept.
    pub fn add(&self, user_id: &str, handle: &str) -> AddOutcome {
        let mut inner = self.inner.lock();

        let inserted =
            if inner.by_user.contains_key(user_id) || inner.by_handle.contains_key(handle) {
                false
            } else {
                let seq = inner.next_seq;
                inner.next_seq += 1;
                inner.order.insert(seq, ConnectionEntry::new(user_id, handle));
                inner.by_user.insert(user_id.to_string(), seq);
                inner.by_handle.insert(handle.to_string(), seq);
                true
            };

        inner.check_invariants();
        AddOutcome {
            inserted,
            snapshot: inner.snapshot(),
        }
    }

    /// Remove the entry registered for `handle`, if any.
    pub fn remove(&self, handle: &str) -> RemoveOutcome {
        let mut inner = self.inner.lock();

        let removed = inner.by_handle.remove(handle).and_then(|seq| {
            let entry = inner.order.remove(&seq)?;
            inner.by_user.remove(&entry.user_id);
            Some(entry)
        });

        inner.check_invariants();
        RemoveOutcome {
            removed,
            snapshot: inner.snapshot(),
        }
    }

    /// The connection registered for `user_id`.
    pub fn lookup(&self, user_id: &str) -> Option<ConnectionId> {
        let inner = self.inner.lock();
        let seq = inner.by_user.get(user_id)?;
        inner.order.get(seq).map(|entry| entry.handle.clone())
    }

    /// All entries in registration order.
    pub fn snapshot(&self) -> Vec<ConnectionEntry> {
        self.inner.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
