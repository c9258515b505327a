use anyhow::{anyhow, Result};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// signals receiver channel, owned by a single connection's poll loop.
pub type Rx = UnboundedReceiver<ChannelSignal>;

/// inner channel signals sent to a connection from elsewhere in the server.
#[derive(Debug, PartialEq, Eq)]
pub enum ChannelSignal {
    Outbound(String),
    Ping,
    Close,
}

/// signals sender channel, cloned into the registry and the liveness keeper.
pub struct Tx(pub UnboundedSender<ChannelSignal>);

impl Tx {
    /// send a signal to the owning connection.
    ///
    /// # Test
    ///
    /// ```
    /// use signaling_server::{Tx, ChannelSignal};
    /// use tokio::sync::mpsc::unbounded_channel;
    ///
    /// let (sender, mut render) = unbounded_channel();
    /// let tx = Tx(sender);
    ///
    /// tx.send(ChannelSignal::Close).unwrap();
    /// assert_eq!(render.blocking_recv(), Some(ChannelSignal::Close));
    /// ```
    pub fn send(&self, signal: ChannelSignal) -> Result<()> {
        self.0.send(signal).map_err(|_| anyhow!("channel send error"))
    }
}

impl Clone for Tx {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
