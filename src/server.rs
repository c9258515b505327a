use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use addressing::{Alias, Id, SubnetTable};
use codec::message::{
    Accept, Accepting, Acknowledgement, Alias as AliasMsg, Answer, Bind, Candidate, Connect, Goodbye, Greeting,
    Knock, Offer, Outbound, Shutdown,
};
use parking_lot::Mutex;

use crate::channel::{ChannelSignal, Tx};
use crate::registry::{ClientHandle, Registry};

/// the process-wide address space and session registry.
///
/// Handlers run to completion under `registry`'s lock; no handler awaits
/// anything while holding it (outbound sends happen after the lock is
/// dropped), matching the single coarse mutex discipline the dispatcher is
/// built around.
pub struct Server {
    addresses: SubnetTable,
    registry: Mutex<Registry>,
}

impl Default for Server {
    fn default() -> Self {
        Self { addresses: SubnetTable::default(), registry: Mutex::new(Registry::default()) }
    }
}

fn send(tx: &Tx, text: String) {
    if tx.send(ChannelSignal::Outbound(text)).is_err() {
        log::warn!("dropped outbound message: receiver gone");
    }
}

impl Server {
    /// KNOCK: allocate an id, acknowledge it, greet every existing peer, then register.
    pub fn knock(&self, tx: Tx, alive: Arc<AtomicBool>, request: Knock) -> Option<String> {
        let id = match self.addresses.create_ip(&request.subnet) {
            Ok(id) => id,
            Err(_) => {
                send(&tx, codec::encode(&Acknowledgement { id: "-1".into(), rejected: true }).unwrap());
                return None;
            }
        };

        let id = id.to_string();
        send(&tx, codec::encode(&Acknowledgement { id: id.clone(), rejected: false }).unwrap());

        let mut registry = self.registry.lock();
        for existing in registry.client_ids() {
            let greeting = Greeting { offerer_id: existing.clone(), answerer_id: id.clone() };
            if let Some(handle) = registry.get_client(existing) {
                send(&handle.tx, codec::encode(&greeting).unwrap());
            }
        }

        registry.add_client(id.clone(), ClientHandle { tx, alive });

        log::info!("knock: {id} joined subnet {}", request.subnet);
        Some(id)
    }

    /// OFFER/ANSWER/CANDIDATE: pure relay, silently dropped if the target is gone.
    pub fn relay_offer(&self, request: Offer) {
        self.relay(&request.answerer_id, &request);
    }

    pub fn relay_answer(&self, request: Answer) {
        self.relay(&request.offerer_id, &request);
    }

    pub fn relay_candidate(&self, request: Candidate) {
        self.relay(&request.answerer_id, &request);
    }

    fn relay<T: Outbound>(&self, target: &str, payload: &T) {
        let registry = self.registry.lock();
        if let Some(handle) = registry.get_client(target) {
            send(&handle.tx, codec::encode(payload).unwrap());
        }
    }

    /// BIND: claim the alias's port, publish the alias, or reject to the binder alone.
    pub fn bind(&self, request: Bind) {
        let mut registry = self.registry.lock();

        if !registry.bind_alias(&request.alias, &request.id) {
            if let Some(handle) = registry.get_client(&request.id) {
                let msg = AliasMsg {
                    id: request.id.clone(),
                    alias: request.alias.clone(),
                    set: false,
                    client_connection_id: None,
                    is_connection_alias: None,
                };
                send(&handle.tx, codec::encode(&msg).unwrap());
            }
            return;
        }

        let alias = match request.alias.parse::<Alias>() {
            Ok(alias) => alias,
            Err(_) => {
                registry.remove_alias(&request.alias);
                return;
            }
        };

        if self.addresses.claim_port(&alias).is_err() {
            registry.remove_alias(&request.alias);
            if let Some(handle) = registry.get_client(&request.id) {
                let msg = AliasMsg {
                    id: request.id.clone(),
                    alias: request.alias.clone(),
                    set: false,
                    client_connection_id: None,
                    is_connection_alias: None,
                };
                send(&handle.tx, codec::encode(&msg).unwrap());
            }
            return;
        }

        self.broadcast_locked(
            &registry,
            &AliasMsg {
                id: request.id,
                alias: request.alias,
                set: true,
                client_connection_id: None,
                is_connection_alias: None,
            },
            None,
        );
    }

    /// ACCEPTING: silent flip of the alias's accepting flag, logged on mismatch.
    pub fn accepting(&self, request: Accepting) {
        let mut registry = self.registry.lock();
        match registry.lookup_alias(&request.alias) {
            Some(entry) if entry.owner == request.id => registry.set_accepting(&request.alias, &request.id),
            _ => log::warn!("accepting rejected: {} does not own {}", request.id, request.alias),
        }
    }

    /// SHUTDOWN: release a bound alias, or restore/reject to the caller alone.
    pub fn shutdown(&self, request: Shutdown) {
        let mut registry = self.registry.lock();

        if registry.unbind_alias(&request.alias, &request.id) {
            if let Ok(alias) = request.alias.parse::<Alias>() {
                self.addresses.release_port(&alias);
            }

            self.broadcast_locked(
                &registry,
                &AliasMsg {
                    id: request.id,
                    alias: request.alias,
                    set: false,
                    client_connection_id: None,
                    is_connection_alias: None,
                },
                None,
            );
        } else if let Some(handle) = registry.get_client(&request.id) {
            let msg = AliasMsg {
                id: request.id.clone(),
                alias: request.alias,
                set: true,
                client_connection_id: None,
                is_connection_alias: None,
            };
            send(&handle.tx, codec::encode(&msg).unwrap());
        }
    }

    /// CONNECT: allocate a connection alias and run the five-message handshake.
    pub fn connect(&self, request: Connect) {
        let initiator = match request.id.parse::<Id>() {
            Ok(id) => id,
            Err(_) => return,
        };

        let client_alias = match self.addresses.create_port(&initiator) {
            Ok(alias) => alias,
            Err(err) => {
                log::warn!("connect: failed to allocate connection alias for {}: {err}", request.id);
                return;
            }
        };

        let mut registry = self.registry.lock();

        let remote = registry
            .lookup_alias(&request.remote_alias)
            .filter(|entry| entry.accepting)
            .map(|entry| entry.owner.clone());

        let Some(remote_owner) = remote else {
            self.addresses.release_port(&client_alias);

            if let Some(handle) = registry.get_client(&request.id) {
                let msg = AliasMsg {
                    id: request.id,
                    alias: client_alias.to_string(),
                    set: false,
                    client_connection_id: Some(request.client_connection_id),
                    is_connection_alias: None,
                };
                send(&handle.tx, codec::encode(&msg).unwrap());
            }

            return;
        };

        registry.connection_alias(&client_alias.to_string(), &request.id);

        if let Some(handle) = registry.get_client(&request.id) {
            let msg = AliasMsg {
                id: request.id.clone(),
                alias: client_alias.to_string(),
                set: true,
                client_connection_id: Some(request.client_connection_id.clone()),
                is_connection_alias: Some(true),
            };
            send(&handle.tx, codec::encode(&msg).unwrap());
        }

        if let Some(handle) = registry.get_client(&remote_owner) {
            let msg = AliasMsg {
                id: request.id.clone(),
                alias: client_alias.to_string(),
                set: true,
                client_connection_id: None,
                is_connection_alias: None,
            };
            send(&handle.tx, codec::encode(&msg).unwrap());

            let accept = Accept { bound_alias: request.remote_alias.clone(), client_alias: client_alias.to_string() };
            send(&handle.tx, codec::encode(&accept).unwrap());
        }

        if let Some(handle) = registry.get_client(&request.id) {
            let msg = AliasMsg {
                id: remote_owner,
                alias: request.remote_alias,
                set: true,
                client_connection_id: Some(request.client_connection_id),
                is_connection_alias: None,
            };
            send(&handle.tx, codec::encode(&msg).unwrap());
        }
    }

    /// run on transport close: tear down everything the client owned, in order.
    pub fn goodbye(&self, id: &str) {
        let mut registry = self.registry.lock();
        registry.remove_client(id);

        if let Ok(client_id) = id.parse::<Id>() {
            self.addresses.release_ip(&client_id);
        }

        for alias in registry.aliases_for(id) {
            registry.remove_alias(&alias);

            if let Ok(parsed) = alias.parse::<Alias>() {
                self.addresses.release_port(&parsed);
            }

            self.broadcast_locked(
                &registry,
                &AliasMsg {
                    id: id.to_string(),
                    alias,
                    set: false,
                    client_connection_id: None,
                    is_connection_alias: None,
                },
                None,
            );
        }

        self.broadcast_locked(&registry, &Goodbye { id: id.to_string() }, None);
        log::info!("goodbye: {id} disconnected");
    }

    /// fan-out helper: send to every registered client except `except`.
    fn broadcast_locked<T: Outbound>(&self, registry: &Registry, payload: &T, except: Option<&str>) {
        let text = codec::encode(payload).unwrap();
        for id in registry.client_ids() {
            if Some(id.as_str()) == except {
                continue;
            }

            if let Some(handle) = registry.get_client(id) {
                send(&handle.tx, text.clone());
            }
        }
    }

    pub fn registry(&self) -> &Mutex<Registry> {
        &self.registry
    }
}
