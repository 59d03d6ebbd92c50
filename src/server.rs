//! Single-threaded datagram event loop.
//!
//! One datagram is decoded, routed, and answered before the next one is
//! read. With discovery enabled the loop waits on both sockets, but still
//! handles whichever datagram arrives first to completion.

use crate::config::ServerConfig;
use crate::controller::{MatchController, Step};
use crate::protocol::{Command, Message, RECV_BUFFER};
use crate::transport::{Transport, bind_discovery_socket, bind_game_socket};
use anyhow::{Context, Result};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, error, info, instrument, warn};

/// Which socket a datagram arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Game,
    Discovery,
}

/// The game server: transport plus match controller.
pub struct Server<T> {
    transport: T,
    discovery: Option<T>,
    controller: MatchController,
}

impl Server<UdpSocket> {
    /// Binds the sockets described by `config` and builds the controller.
    #[instrument(skip(config), fields(addr = %config.bind_addr()))]
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let transport = bind_game_socket(config.bind_addr())
            .await
            .with_context(|| format!("Unable to bind {}", config.bind_addr()))?;

        let discovery = if *config.discovery().enabled() {
            let group = *config.discovery().group();
            let port = *config.discovery().port();
            let socket = bind_discovery_socket(group, port)
                .await
                .with_context(|| format!("Unable to join discovery group {group}:{port}"))?;
            Some(socket)
        } else {
            None
        };

        Ok(Self::new(
            transport,
            discovery,
            MatchController::from_config(config),
        ))
    }
}

impl<T: Transport> Server<T> {
    /// Assembles a server from its parts.
    pub fn new(transport: T, discovery: Option<T>, controller: MatchController) -> Self {
        Self {
            transport,
            discovery,
            controller,
        }
    }

    /// Local address of the game socket.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Read access to the controller.
    pub fn controller(&self) -> &MatchController {
        &self.controller
    }

    /// Serves until `shutdown` resolves.
    ///
    /// Receive and send failures are logged and the loop carries on.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);
        let mut game_buf = [0u8; RECV_BUFFER];
        let mut discovery_buf = [0u8; RECV_BUFFER];
        info!(addr = ?self.transport.local_addr().ok(), "Server running");

        loop {
            let (source, received) = tokio::select! {
                _ = &mut shutdown => break,
                r = self.transport.recv_from(&mut game_buf) => (Source::Game, r),
                r = recv_optional(self.discovery.as_ref(), &mut discovery_buf) => (Source::Discovery, r),
            };

            let (len, peer) = match received {
                Ok(received) => received,
                Err(e) => {
                    error!(?source, error = %e, "Unable to receive message, retrying");
                    continue;
                }
            };

            let bytes = match source {
                Source::Game => &game_buf[..len],
                Source::Discovery => &discovery_buf[..len],
            };
            self.handle_datagram(source, peer, bytes).await;
        }

        info!(
            resident = self.controller.registry().len(),
            "Server stopped, sessions left resident"
        );
        Ok(())
    }

    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    async fn handle_datagram(&mut self, source: Source, peer: SocketAddr, bytes: &[u8]) {
        let msg = match Message::decode(bytes) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable datagram");
                return;
            }
        };
        debug!(msg = %msg, "Received message");

        if source == Source::Discovery && msg.command != Command::NewServer {
            debug!(command = %msg.command, "Ignoring non-discovery message on multicast group");
            return;
        }

        match self.controller.handle(peer, &msg) {
            Step::Reply(reply) => match self.transport.send_to(&reply.encode(), peer).await {
                Ok(_) => debug!(msg = %reply, "Sent message"),
                Err(e) => error!(error = %e, "Unable to send response message"),
            },
            Step::Drop(reason) => warn!(%reason, "Dropping message"),
        }
    }
}

async fn recv_optional<T: Transport>(
    transport: Option<&T>,
    buf: &mut [u8],
) -> io::Result<(usize, SocketAddr)> {
    match transport {
        Some(transport) => transport.recv_from(buf).await,
        None => std::future::pending().await,
    }
}
