use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::channel::Tx;

/// a registered client's outbound channel and liveness flag.
pub struct ClientHandle {
    pub tx: Tx,
    pub alive: Arc<AtomicBool>,
}

/// an entry in the alias table: who owns it, and whether it is ready to accept connections.
pub struct AliasEntry {
    pub owner: String,
    pub accepting: bool,
}

/// the client table and alias table. Holds no internal lock: callers (the
/// [`crate::server::Server`]) serialise access with a single mutex, matching
/// the "conceptually single-threaded per connection" scheduling model.
#[derive(Default)]
pub struct Registry {
    clients: HashMap<String, ClientHandle>,
    aliases: HashMap<String, AliasEntry>,
}

impl Registry {
    pub fn add_client(&mut self, id: String, handle: ClientHandle) {
        self.clients.insert(id, handle);
    }

    pub fn remove_client(&mut self, id: &str) {
        self.clients.remove(id);
    }

    pub fn get_client(&self, id: &str) -> Option<&ClientHandle> {
        self.clients.get(id)
    }

    pub fn client_ids(&self) -> impl Iterator<Item = &String> {
        self.clients.keys()
    }

    /// # Test
    ///
    /// ```
    /// use signaling_server::registry::{Registry, ClientHandle};
    /// use signaling_server::channel::Tx;
    /// use tokio::sync::mpsc::unbounded_channel;
    /// use std::sync::{atomic::AtomicBool, Arc};
    ///
    /// let mut registry = Registry::default();
    /// let (sender, _render) = unbounded_channel();
    /// registry.add_client("127.0.0.0".into(), ClientHandle { tx: Tx(sender), alive: Arc::new(AtomicBool::new(true)) });
    ///
    /// assert!(registry.bind_alias("127.0.0.0:0", "127.0.0.0"));
    /// assert!(!registry.bind_alias("127.0.0.0:0", "127.0.0.0"));
    /// ```
    pub fn bind_alias(&mut self, alias: &str, owner: &str) -> bool {
        if self.aliases.contains_key(alias) {
            return false;
        }

        self.aliases.insert(
            alias.to_string(),
            AliasEntry { owner: owner.to_string(), accepting: false },
        );

        true
    }

    pub fn connection_alias(&mut self, alias: &str, owner: &str) {
        self.aliases.insert(
            alias.to_string(),
            AliasEntry { owner: owner.to_string(), accepting: false },
        );
    }

    pub fn set_accepting(&mut self, alias: &str, owner: &str) {
        if let Some(entry) = self.aliases.get_mut(alias) {
            if entry.owner == owner {
                entry.accepting = true;
            }
        }
    }

    pub fn unbind_alias(&mut self, alias: &str, owner: &str) -> bool {
        match self.aliases.get(alias) {
            Some(entry) if entry.owner == owner => {
                self.aliases.remove(alias);
                true
            }
            _ => false,
        }
    }

    pub fn lookup_alias(&self, alias: &str) -> Option<&AliasEntry> {
        self.aliases.get(alias)
    }

    pub fn remove_alias(&mut self, alias: &str) {
        self.aliases.remove(alias);
    }

    /// all aliases currently owned by `owner`, snapshotted for the disconnect sweep.
    pub fn aliases_for(&self, owner: &str) -> HashSet<String> {
        self.aliases
            .iter()
            .filter(|(_, entry)| entry.owner == owner)
            .map(|(alias, _)| alias.clone())
            .collect()
    }
}
