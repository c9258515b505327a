//! A signaling and rendezvous server for a peer-to-peer overlay network.
//!
//! Clients speak a small JSON protocol over WebSocket (see [`codec`]) to
//! claim a virtual address ([`addressing`]), publish aliases other peers can
//! connect to, and relay session descriptions and ICE candidates to one
//! another. The server never inspects or relays media itself; it only
//! brokers the handshake.

pub mod channel;
pub mod config;
pub mod connection;
pub mod error;
pub mod liveness;
pub mod registry;
pub mod server;

pub use channel::{ChannelSignal, Rx, Tx};
pub use config::Config;
pub use connection::Connection;
pub use error::Error;
pub use server::Server;
