use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;

use signaling_server::{connection::Connection, liveness::keep_alive, server::Server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder().format_module_path(false).init();

    let config = Config::parse();
    let server = Arc::new(Server::default());
    let listener = TcpListener::bind(config.listen).await?;

    log::info!("signaling server listening on {}", config.listen);

    tokio::spawn(keep_alive(server.clone(), config.liveness_interval()));

    while let Ok((stream, address)) = listener.accept().await {
        let server = server.clone();

        tokio::spawn(async move {
            if let Err(err) = Connection::launch(stream, server).await {
                log::warn!("connection from {address} ended: {err}");
            }
        });
    }

    Ok(())
}
