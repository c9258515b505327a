use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

/// command-line and environment configuration for the signaling server.
///
/// There is no configuration file: a rendezvous server with no persistence
/// and no auth has nothing worth putting in one, so this follows the plain
/// `clap`-with-`env`-fallbacks style rather than a file-backed config.
#[derive(Parser, Debug)]
#[command(name = "signaling-server", version, author)]
pub struct Config {
    /// address and port to accept websocket connections on.
    #[arg(long, default_value = "127.0.0.1:7000", env = "SIGNALING_LISTEN")]
    pub listen: SocketAddr,

    /// seconds between liveness ticks; a client that misses two consecutive
    /// pongs (one full interval with no pong) is forcibly disconnected.
    #[arg(long, default_value_t = 30, env = "SIGNALING_LIVENESS_INTERVAL_SECS")]
    pub liveness_interval_secs: u64,
}

impl Config {
    /// # Test
    ///
    /// ```
    /// use signaling_server::Config;
    /// use clap::Parser;
    ///
    /// let config = Config::parse_from(["signaling-server"]);
    /// assert_eq!(config.listen.to_string(), "127.0.0.1:7000");
    /// assert_eq!(config.liveness_interval(), std::time::Duration::from_secs(30));
    /// ```
    pub fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_secs)
    }
}
