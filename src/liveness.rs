use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

use crate::channel::ChannelSignal;
use crate::server::Server;

/// Every `period`, ping each live client; a client that did not answer the
/// previous ping (its `alive` flag is still `false`) is forced closed, which
/// triggers the goodbye procedure once its connection task unwinds.
///
/// # Test
///
/// ```
/// use signaling_server::liveness::keep_alive;
/// use signaling_server::server::Server;
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tokio::runtime::Runtime;
///
/// Runtime::new().unwrap().block_on(async {
///     let server = Arc::new(Server::default());
///     let handle = tokio::spawn(keep_alive(server, Duration::from_millis(10)));
///     handle.abort();
/// });
/// ```
pub async fn keep_alive(server: Arc<Server>, period: Duration) {
    let mut ticker = interval(period);

    loop {
        ticker.tick().await;

        let registry = server.registry().lock();
        let mut to_close = Vec::new();

        for id in registry.client_ids() {
            let Some(handle) = registry.get_client(id) else { continue };

            if handle.alive.swap(false, Ordering::SeqCst) {
                if handle.tx.send(ChannelSignal::Ping).is_err() {
                    to_close.push(id.clone());
                }
            } else {
                to_close.push(id.clone());
            }
        }

        for id in &to_close {
            if let Some(handle) = registry.get_client(id) {
                let _ = handle.tx.send(ChannelSignal::Close);
            }
        }
    }
}
