//! Fixed-layout wire protocol.
//!
//! Every datagram is exactly [`MESSAGE_LEN`] bytes:
//!
//! | offset | field    |
//! |--------|----------|
//! | 0      | version  |
//! | 1      | command  |
//! | 2      | response |
//! | 3      | move     |
//! | 4      | turn     |
//! | 5      | game id  |
//! | 6..15  | board    |

use std::time::Duration;
use tracing::instrument;
use ttt_board::{Board, CELLS};

/// Protocol version spoken by this server.
pub const PROTOCOL_VERSION: u8 = 2;

/// Size of an encoded message.
pub const MESSAGE_LEN: usize = 6 + CELLS;

/// Receive buffer size; anything longer than [`MESSAGE_LEN`] is rejected.
pub const RECV_BUFFER: usize = 100;

/// Idle time after which a client is considered gone.
///
/// Defined by the protocol but not enforced: sessions stay resident until
/// they finish or the process exits.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(60);

/// Multicast group used for server discovery.
pub const DISCOVERY_GROUP: std::net::Ipv4Addr = std::net::Ipv4Addr::new(239, 0, 0, 1);

/// Multicast port used for server discovery.
pub const DISCOVERY_PORT: u16 = 1818;

/// Connection command codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::FromRepr, strum::Display, strum::EnumIter,
)]
#[repr(u8)]
pub enum Command {
    /// A move for an existing game.
    #[strum(to_string = "MOVE")]
    Move = 0,
    /// Start a new game.
    #[strum(to_string = "NGAME")]
    NewGame = 1,
    /// Resume a game from a client-held snapshot.
    #[strum(to_string = "RGAME")]
    ResumeGame = 2,
    /// Server discovery request.
    #[strum(to_string = "NSERV")]
    NewServer = 3,
}

/// Response codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::FromRepr, strum::Display, strum::EnumIter,
)]
#[repr(u8)]
pub enum Response {
    /// No error.
    #[strum(to_string = "SUCC")]
    Success = 0,
    /// The move targets an occupied or nonexistent cell.
    #[strum(to_string = "EINVMOVE")]
    InvalidMove = 1,
    /// The client's turn counter disagrees with the server's.
    #[strum(to_string = "EOSYNC")]
    OutOfSync = 2,
    /// The request cannot be honoured.
    #[strum(to_string = "EINVREQ")]
    InvalidRequest = 3,
    /// The game ended on the sender's move.
    #[strum(to_string = "GAMEOVR")]
    GameOver = 4,
    /// The game ended on the peer's move and this acknowledges it.
    #[strum(to_string = "GAMOVRACK")]
    GameOverAck = 5,
    /// Incompatible protocol version.
    #[strum(to_string = "ENOVERSION")]
    BadVersion = 6,
    /// The server cannot take the game.
    #[strum(to_string = "EBUSYGAME")]
    Busy = 7,
    /// The game id does not belong to the sender.
    #[strum(to_string = "EGIDWRONG")]
    WrongGameId = 8,
    /// The server has room for another game.
    #[strum(to_string = "SPOTAVAIL")]
    SpotAvailable = 9,
}

/// Error decoding a datagram.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum CodecError {
    /// Datagram is not exactly [`MESSAGE_LEN`] bytes.
    #[display("Expected {} bytes, got {}", MESSAGE_LEN, actual)]
    Length {
        /// Received length.
        actual: usize,
    },
    /// Command byte is outside the vocabulary.
    #[display("Unknown command code {}", _0)]
    UnknownCommand(u8),
    /// Response byte is outside the vocabulary.
    #[display("Unknown response code {}", _0)]
    UnknownResponse(u8),
}

impl std::error::Error for CodecError {}

/// One protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    /// Protocol version.
    pub version: u8,
    /// Command code.
    pub command: Command,
    /// Response code.
    pub response: Response,
    /// 1-based cell, 0 when the message carries no move.
    pub position: u8,
    /// Half-move counter.
    pub turn: u8,
    /// Game id.
    pub game_id: u8,
    /// Raw board bytes; only meaningful in resume requests.
    pub board: [u8; CELLS],
}

impl Message {
    /// Creates a message at the current protocol version with an empty
    /// (all-zero) board field.
    pub fn new(command: Command, response: Response, position: u8, turn: u8, game_id: u8) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            command,
            response,
            position,
            turn,
            game_id,
            board: [0; CELLS],
        }
    }

    /// Attaches a board snapshot.
    pub fn with_board(mut self, board: &Board) -> Self {
        self.board = board.to_bytes();
        self
    }

    /// Overrides the version byte.
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Encodes into the fixed wire layout.
    pub fn encode(&self) -> [u8; MESSAGE_LEN] {
        let mut bytes = [0u8; MESSAGE_LEN];
        bytes[0] = self.version;
        bytes[1] = self.command as u8;
        bytes[2] = self.response as u8;
        bytes[3] = self.position;
        bytes[4] = self.turn;
        bytes[5] = self.game_id;
        bytes[6..].copy_from_slice(&self.board);
        bytes
    }

    /// Decodes a datagram.
    ///
    /// A foreign version still decodes; deciding what to do with it is up to
    /// the caller.
    #[instrument(level = "trace", skip(bytes), fields(len = bytes.len()))]
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != MESSAGE_LEN {
            return Err(CodecError::Length {
                actual: bytes.len(),
            });
        }
        let command = Command::from_repr(bytes[1]).ok_or(CodecError::UnknownCommand(bytes[1]))?;
        let response =
            Response::from_repr(bytes[2]).ok_or(CodecError::UnknownResponse(bytes[2]))?;
        let mut board = [0u8; CELLS];
        board.copy_from_slice(&bytes[6..]);
        Ok(Self {
            version: bytes[0],
            command,
            response,
            position: bytes[3],
            turn: bytes[4],
            game_id: bytes[5],
            board,
        })
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "v{} {} {} move={} turn={} game={}",
            self.version, self.command, self.response, self.position, self.turn, self.game_id
        )
    }
}
