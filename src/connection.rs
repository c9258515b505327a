use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::unbounded_channel;
use tokio_tungstenite::{accept_async, WebSocketStream};
use tokio_tungstenite::tungstenite::Message;

use codec::message::Operation;

use crate::channel::{ChannelSignal, Rx, Tx};
use crate::error::Error as ServerError;
use crate::server::Server;

/// thin wrapper over the accepted websocket stream.
pub struct Socket {
    inner: WebSocketStream<TcpStream>,
}

impl Socket {
    pub fn new(inner: WebSocketStream<TcpStream>) -> Self {
        Self { inner }
    }

    pub async fn send(&mut self, message: Message) -> Result<()> {
        self.inner.send(message).await?;
        Ok(())
    }

    pub async fn read(&mut self) -> Option<Message> {
        match self.inner.next().await {
            Some(Ok(message)) => Some(message),
            _ => None,
        }
    }

    pub async fn close(&mut self) -> Result<()> {
        self.inner.close(None).await?;
        Ok(())
    }
}

/// one accepted peer: its socket, its outbound signal channel, and the id it
/// was assigned once it completed KNOCK (`None` before then).
pub struct Connection {
    server: Arc<Server>,
    socket: Socket,
    rx: Rx,
    tx: Tx,
    alive: Arc<AtomicBool>,
    id: Option<String>,
}

impl Connection {
    pub async fn accept(stream: TcpStream, server: Arc<Server>) -> Result<Self> {
        let socket = Socket::new(accept_async(stream).await?);
        let (sender, rx) = unbounded_channel();

        Ok(Self {
            server,
            socket,
            rx,
            tx: Tx(sender),
            alive: Arc::new(AtomicBool::new(true)),
            id: None,
        })
    }

    async fn handle_signal(&mut self, signal: ChannelSignal) -> Result<bool> {
        match signal {
            ChannelSignal::Outbound(body) => self.socket.send(Message::Text(body.into())).await?,
            ChannelSignal::Ping => self.socket.send(Message::Ping(bytes::Bytes::new().to_vec())).await?,
            ChannelSignal::Close => {
                self.socket.close().await?;
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// decode and dispatch one inbound frame. An unknown opcode or malformed
    /// payload is fatal for this connection: the caller breaks its poll loop
    /// and runs the goodbye procedure rather than leaving the socket open.
    async fn handle_text(&mut self, text: String) -> Result<(), ServerError> {
        let operation = codec::decode(&text)?;

        match operation {
            Operation::Knock(request) => {
                self.id = self.server.knock(self.tx.clone(), self.alive.clone(), request);
            }
            Operation::Offer(request) => self.server.relay_offer(request),
            Operation::Answer(request) => self.server.relay_answer(request),
            Operation::Candidate(request) => self.server.relay_candidate(request),
            Operation::Bind(request) => self.server.bind(request),
            Operation::Accepting(request) => self.server.accepting(request),
            Operation::Shutdown(request) => self.server.shutdown(request),
            Operation::Connect(request) => self.server.connect(request),
        }

        Ok(())
    }

    pub async fn poll(&mut self) -> Result<()> {
        loop {
            tokio::select! {
                signal = self.rx.recv() => {
                    match signal {
                        Some(signal) => if !self.handle_signal(signal).await? { break },
                        None => break,
                    }
                }
                frame = self.socket.read() => {
                    match frame {
                        Some(Message::Text(text)) => {
                            if let Err(err) = self.handle_text(text.to_string()).await {
                                log::warn!("connection fault from {:?}: {err}", self.id);
                                break;
                            }
                        }
                        Some(Message::Pong(_)) => self.alive.store(true, Ordering::SeqCst),
                        Some(Message::Close(_)) | None => break,
                        Some(_) => {}
                    }
                }
            }
        }

        if let Some(id) = &self.id {
            self.server.goodbye(id);
        }

        Ok(())
    }

    pub async fn launch(stream: TcpStream, server: Arc<Server>) -> Result<()> {
        Connection::accept(stream, server).await?.poll().await
    }
}
