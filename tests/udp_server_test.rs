//! End-to-end tests over loopback UDP.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use ttt_server::{
    Command, FirstAvailable, MESSAGE_LEN, MatchController, Message, NullPresenter, Registry,
    Response, Server,
};

const WAIT: Duration = Duration::from_millis(300);

async fn start_server() -> (SocketAddr, oneshot::Sender<()>, JoinHandle<anyhow::Result<()>>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let controller = MatchController::new(
        Registry::new(4),
        Box::new(FirstAvailable),
        Box::new(NullPresenter),
    );
    let server = Server::new(socket, None, controller);
    let addr = server.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run(async {
        let _ = rx.await;
    }));
    (addr, tx, handle)
}

async fn exchange(client: &UdpSocket, server: SocketAddr, msg: Message) -> Message {
    client.send_to(&msg.encode(), server).await.unwrap();
    let mut buf = [0u8; 64];
    let (len, from) = tokio::time::timeout(WAIT, client.recv_from(&mut buf))
        .await
        .expect("reply in time")
        .unwrap();
    assert_eq!(from, server);
    assert_eq!(len, MESSAGE_LEN);
    Message::decode(&buf[..len]).unwrap()
}

async fn expect_silence(client: &UdpSocket) {
    let mut buf = [0u8; 64];
    assert!(
        tokio::time::timeout(WAIT, client.recv_from(&mut buf))
            .await
            .is_err(),
        "server should not reply"
    );
}

#[tokio::test]
async fn test_full_game_over_udp() {
    let (addr, shutdown, handle) = start_server().await;
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let reply = exchange(
        &client,
        addr,
        Message::new(Command::NewGame, Response::Success, 0, 0, 0),
    )
    .await;
    assert_eq!(reply.response, Response::Success);
    assert_eq!(reply.position, 1);
    let game = reply.game_id;

    let reply = exchange(
        &client,
        addr,
        Message::new(Command::Move, Response::Success, 9, 0, game),
    )
    .await;
    assert_eq!((reply.response, reply.position), (Response::Success, 2));

    let reply = exchange(
        &client,
        addr,
        Message::new(Command::Move, Response::Success, 8, reply.turn, game),
    )
    .await;
    assert_eq!((reply.response, reply.position), (Response::GameOver, 3));

    // The session is gone, so further moves are unroutable.
    client
        .send_to(
            &Message::new(Command::Move, Response::Success, 7, 4, game).encode(),
            addr,
        )
        .await
        .unwrap();
    expect_silence(&client).await;

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_malformed_datagram_is_ignored() {
    let (addr, shutdown, handle) = start_server().await;
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    client.send_to(&[2, 1, 0], addr).await.unwrap();
    expect_silence(&client).await;

    // The loop is still serving afterwards.
    let reply = exchange(
        &client,
        addr,
        Message::new(Command::NewGame, Response::Success, 0, 0, 0),
    )
    .await;
    assert_eq!(reply.response, Response::Success);

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_clients_are_told_apart_by_address() {
    let (addr, shutdown, handle) = start_server().await;
    let a = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let b = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let new_game = Message::new(Command::NewGame, Response::Success, 0, 0, 0);

    let ra = exchange(&a, addr, new_game).await;
    let rb = exchange(&b, addr, new_game).await;
    assert_ne!(ra.game_id, rb.game_id);

    let again = exchange(&a, addr, new_game).await;
    assert_eq!(again.response, Response::Busy);
    assert_eq!(again.game_id, ra.game_id);

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
