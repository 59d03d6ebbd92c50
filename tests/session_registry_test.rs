//! Tests for the session registry and its id pool.

use std::collections::HashSet;
use std::net::SocketAddr;
use ttt_server::{Board, MAX_ID, Registry, RegistryError};

fn peer(port: u16) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, 1], port))
}

#[test]
fn test_ids_are_sequential_and_unique() {
    let mut registry = Registry::default();
    let ids: Vec<u8> = (0..5)
        .map(|i| *registry.allocate(peer(1000 + i)).unwrap().game_id())
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    assert_eq!(registry.len(), 5);
}

#[test]
fn test_fresh_session_state() {
    let mut registry = Registry::default();
    let session = registry.allocate(peer(1)).unwrap();
    assert_eq!(*session.peer(), peer(1));
    assert_eq!(*session.board(), Board::new());
    assert_eq!(*session.turn(), 0);
}

#[test]
fn test_released_id_reused_before_growth() {
    let mut registry = Registry::default();
    for i in 0..4 {
        registry.allocate(peer(i)).unwrap();
    }
    registry.release(2).unwrap();
    registry.release(1).unwrap();

    assert_eq!(*registry.allocate(peer(10)).unwrap().game_id(), 1);
    assert_eq!(*registry.allocate(peer(11)).unwrap().game_id(), 2);
    assert_eq!(*registry.allocate(peer(12)).unwrap().game_id(), 4);
}

#[test]
fn test_full_registry_refuses_without_overwriting() {
    let mut registry = Registry::new(MAX_ID);
    for i in 0..MAX_ID {
        registry.allocate(peer(i as u16)).unwrap();
    }
    assert!(registry.is_full());

    assert_eq!(
        registry.allocate(peer(9999)).unwrap_err(),
        RegistryError::Full
    );
    assert_eq!(registry.len(), MAX_ID);
    assert!(registry.find_by_peer(peer(9999)).is_none());
    let ids: HashSet<u8> = registry.sessions().map(|s| *s.game_id()).collect();
    assert_eq!(ids.len(), MAX_ID);
    for id in 0..MAX_ID {
        assert_eq!(*registry.get(id as u8).unwrap().peer(), peer(id as u16));
    }
}

#[test]
fn test_small_capacity() {
    let mut registry = Registry::new(2);
    registry.allocate(peer(1)).unwrap();
    registry.allocate(peer(2)).unwrap();
    assert_eq!(registry.allocate(peer(3)).unwrap_err(), RegistryError::Full);

    registry.release(0);
    assert!(!registry.is_full());
    assert_eq!(*registry.allocate(peer(3)).unwrap().game_id(), 0);
}

#[test]
fn test_one_session_per_peer() {
    let mut registry = Registry::default();
    registry.allocate(peer(1)).unwrap();
    assert_eq!(
        registry.allocate(peer(1)).unwrap_err(),
        RegistryError::PeerActive { game_id: 0 }
    );
    assert_eq!(
        registry.adopt(peer(1), 7, Board::new(), 0).unwrap_err(),
        RegistryError::PeerActive { game_id: 0 }
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_find_by_peer() {
    let mut registry = Registry::default();
    registry.allocate(peer(1)).unwrap();
    registry.allocate(peer(2)).unwrap();

    assert_eq!(*registry.find_by_peer(peer(2)).unwrap().game_id(), 1);
    assert!(registry.find_by_peer(peer(3)).is_none());
}

#[test]
fn test_release_is_idempotent() {
    let mut registry = Registry::default();
    registry.allocate(peer(1)).unwrap();
    registry.allocate(peer(2)).unwrap();

    let released = registry.release(0).unwrap();
    assert_eq!(*released.peer(), peer(1));
    assert!(registry.release(0).is_none());
    assert!(registry.find_by_peer(peer(1)).is_none());

    // A double release must not put the id in the pool twice.
    assert_eq!(*registry.allocate(peer(3)).unwrap().game_id(), 0);
    assert_eq!(*registry.allocate(peer(4)).unwrap().game_id(), 2);
}

#[test]
fn test_adopt_keeps_requested_id() {
    let mut registry = Registry::default();
    let board: Board = "X2345678O".parse().unwrap();
    let session = registry.adopt(peer(1), 17, board.clone(), 2).unwrap();
    assert_eq!(*session.game_id(), 17);
    assert_eq!(*session.board(), board);
    assert_eq!(*session.turn(), 2);

    // Ids skipped over by the resumed game are still handed out lowest first.
    assert_eq!(*registry.allocate(peer(2)).unwrap().game_id(), 0);
}

#[test]
fn test_adopt_reuses_freed_id() {
    let mut registry = Registry::default();
    registry.allocate(peer(1)).unwrap();
    registry.allocate(peer(2)).unwrap();
    registry.release(0);

    let session = registry.adopt(peer(3), 0, Board::new(), 0).unwrap();
    assert_eq!(*session.game_id(), 0);
    assert_eq!(*registry.allocate(peer(4)).unwrap().game_id(), 2);
}

#[test]
fn test_adopt_taken_id_falls_back_to_lowest_free() {
    let mut registry = Registry::default();
    registry.allocate(peer(1)).unwrap();
    registry.allocate(peer(2)).unwrap();

    let session = registry.adopt(peer(3), 1, Board::new(), 0).unwrap();
    assert_eq!(*session.game_id(), 2);
    assert_eq!(*registry.get(1).unwrap().peer(), peer(2));
}

#[test]
fn test_adopt_beyond_capacity_falls_back() {
    let mut registry = Registry::new(4);
    let session = registry.adopt(peer(1), 200, Board::new(), 0).unwrap();
    assert_eq!(*session.game_id(), 0);
}

#[test]
fn test_adopt_when_full() {
    let mut registry = Registry::new(1);
    registry.allocate(peer(1)).unwrap();
    assert_eq!(
        registry.adopt(peer(2), 0, Board::new(), 0).unwrap_err(),
        RegistryError::Full
    );
}
