//! Tests for the fixed-layout wire codec.

use ttt_server::{Board, CodecError, Command, MESSAGE_LEN, Message, PROTOCOL_VERSION, Response};

#[test]
fn test_message_is_fifteen_bytes() {
    assert_eq!(MESSAGE_LEN, 15);
}

#[test]
fn test_encode_field_offsets() {
    let board: Board = "X2O456789".parse().unwrap();
    let msg = Message::new(Command::ResumeGame, Response::Success, 7, 3, 42).with_board(&board);
    let bytes = msg.encode();

    assert_eq!(bytes[0], PROTOCOL_VERSION);
    assert_eq!(bytes[1], 2);
    assert_eq!(bytes[2], 0);
    assert_eq!(bytes[3], 7);
    assert_eq!(bytes[4], 3);
    assert_eq!(bytes[5], 42);
    assert_eq!(&bytes[6..], b"X2O456789");
}

#[test]
fn test_server_reply_has_zero_board() {
    let bytes = Message::new(Command::Move, Response::GameOver, 3, 4, 1).encode();
    assert_eq!(&bytes[6..], &[0u8; 9]);
}

#[test]
fn test_decode_reads_every_field() {
    let mut bytes = [0u8; MESSAGE_LEN];
    bytes[..6].copy_from_slice(&[2, 0, 5, 9, 8, 200]);
    bytes[6..].copy_from_slice(b"123456789");

    let msg = Message::decode(&bytes).unwrap();
    assert_eq!(msg.version, 2);
    assert_eq!(msg.command, Command::Move);
    assert_eq!(msg.response, Response::GameOverAck);
    assert_eq!(msg.position, 9);
    assert_eq!(msg.turn, 8);
    assert_eq!(msg.game_id, 200);
    assert_eq!(&msg.board, b"123456789");
}

#[test]
fn test_decode_then_encode_preserves_bytes() {
    let mut bytes = [0u8; MESSAGE_LEN];
    bytes[..6].copy_from_slice(&[2, 1, 0, 0, 0, 0]);
    let msg = Message::decode(&bytes).unwrap();
    assert_eq!(msg.encode(), bytes);
}

#[test]
fn test_decode_rejects_wrong_length() {
    assert_eq!(
        Message::decode(&[2, 1, 0]),
        Err(CodecError::Length { actual: 3 })
    );
    assert_eq!(
        Message::decode(&[0u8; 16]),
        Err(CodecError::Length { actual: 16 })
    );
    assert_eq!(Message::decode(&[]), Err(CodecError::Length { actual: 0 }));
}

#[test]
fn test_foreign_version_still_decodes() {
    let bytes = Message::new(Command::NewGame, Response::Success, 0, 0, 0)
        .with_version(1)
        .encode();
    let msg = Message::decode(&bytes).unwrap();
    assert_eq!(msg.version, 1);
    assert_eq!(msg.command, Command::NewGame);
}

#[test]
fn test_decode_rejects_unknown_codes() {
    let mut bytes = Message::new(Command::Move, Response::Success, 1, 0, 0).encode();
    bytes[1] = 4;
    assert_eq!(Message::decode(&bytes), Err(CodecError::UnknownCommand(4)));

    bytes[1] = 0;
    bytes[2] = 10;
    assert_eq!(Message::decode(&bytes), Err(CodecError::UnknownResponse(10)));
}
