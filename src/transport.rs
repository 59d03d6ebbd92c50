//! Datagram transport seam.

use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{info, instrument};

/// A single connectionless channel shared by every session.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one datagram to `peer`.
    async fn send_to(&self, bytes: &[u8], peer: SocketAddr) -> io::Result<usize>;

    /// Waits for the next datagram.
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    /// Local address of the channel.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

#[async_trait]
impl Transport for UdpSocket {
    async fn send_to(&self, bytes: &[u8], peer: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, bytes, peer).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        UdpSocket::local_addr(self)
    }
}

/// Binds the game socket.
#[instrument]
pub async fn bind_game_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let socket = UdpSocket::bind(addr).await?;
    info!(addr = %socket.local_addr()?, "Game socket bound");
    Ok(socket)
}

/// Binds a socket on `port` and joins the multicast `group`.
///
/// The port is shared, so several servers on one host can listen to the
/// same group.
#[instrument]
pub async fn bind_discovery_socket(group: Ipv4Addr, port: u16) -> io::Result<UdpSocket> {
    let socket = reusable_udp_socket(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))?;
    socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;
    let socket = UdpSocket::from_std(socket.into())?;
    info!(%group, port, "Joined discovery group");
    Ok(socket)
}

/// Creates a non-blocking UDP socket with `SO_REUSEADDR` set, bound to `addr`.
pub fn reusable_udp_socket(addr: SocketAddr) -> io::Result<Socket> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reusable_sockets_share_a_port() {
        let first = reusable_udp_socket(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
        let addr = first.local_addr().unwrap().as_socket().unwrap();
        let second = reusable_udp_socket(addr).unwrap();
        assert_eq!(second.local_addr().unwrap().as_socket(), Some(addr));

        let socket = UdpSocket::from_std(second.into()).unwrap();
        assert_eq!(Transport::local_addr(&socket).unwrap(), addr);
    }
}
