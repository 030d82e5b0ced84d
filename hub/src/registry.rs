use crate::connection::{Connection, ConnectionId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use events::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Index from user to that user's open connections.
///
/// `DashMap` shards are reader/writer locked, so lookups for different
/// broadcasts run in parallel while register and unregister serialize per shard.
/// Entries are `Weak`: the registry routes to a connection but never keeps it alive.
pub struct ConnectionRegistry {
    users: DashMap<UserId, HashMap<ConnectionId, Weak<Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Add a connection under its user. Returns `false` if it was already present.
    pub fn insert(&self, connection: &Arc<Connection>) -> bool {
        self.users
            .entry(connection.user_id())
            .or_default()
            .insert(connection.id(), Arc::downgrade(connection))
            .is_none()
    }

    /// Remove a connection, dropping the user's entry once its set is empty.
    /// Returns `false` if the connection was not present.
    pub fn remove(&self, connection: &Connection) -> bool {
        match self.users.entry(connection.user_id()) {
            Entry::Occupied(mut entry) => {
                let removed = entry.get_mut().remove(&connection.id()).is_some();
                if entry.get().is_empty() {
                    entry.remove();
                }
                removed
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Snapshot of a user's live connections. The shard lock is released before
    /// returning, so callers may unregister while iterating the result.
    pub fn connections_of(&self, user_id: &UserId) -> Vec<Arc<Connection>> {
        self.users
            .get(user_id)
            .map(|set| set.values().filter_map(Weak::upgrade).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, connection: &Connection) -> bool {
        self.users
            .get(&connection.user_id())
            .is_some_and(|set| set.contains_key(&connection.id()))
    }

    /// Number of users with at least one open connection.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn connection_count(&self) -> usize {
        self.users.iter().map(|entry| entry.value().len()).sum()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
