//! Authoritative tic-tac-toe server over a fixed-layout UDP protocol.
//!
//! The server plays `X` against any number of remote clients, one game per
//! client address, and speaks 15-byte datagrams.
//!
//! # Architecture
//!
//! - **Protocol**: wire layout and the command/response vocabulary
//! - **Registry**: active sessions and the game-id pool
//! - **Controller**: the state machine that turns a message into a reply
//! - **Server**: the single-threaded receive/handle/send loop
//! - **Board engine**: the `ttt_board` crate
//!
//! # Example
//!
//! ```
//! use std::net::SocketAddr;
//! use ttt_server::{
//!     Command, FirstAvailable, MatchController, Message, NullPresenter, Registry, Response,
//! };
//!
//! let mut controller = MatchController::new(
//!     Registry::default(),
//!     Box::new(FirstAvailable),
//!     Box::new(NullPresenter),
//! );
//! let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
//! let step = controller.handle(peer, &Message::new(Command::NewGame, Response::Success, 0, 0, 0));
//! assert_eq!(step.reply().unwrap().response, Response::Success);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;
mod config;
mod controller;
mod presenter;
mod protocol;
mod registry;
mod server;
mod strategy;
mod transport;

// Crate-level exports - Configuration
pub use cli::Cli;
pub use config::{ConfigError, DiscoveryConfig, ServerConfig};

// Crate-level exports - Protocol
pub use protocol::{
    CodecError, Command, DISCOVERY_GROUP, DISCOVERY_PORT, MESSAGE_LEN, Message, PROTOCOL_VERSION,
    RECV_BUFFER, Response, SESSION_TIMEOUT,
};

// Crate-level exports - Sessions and state machine
pub use controller::{DropReason, MatchController, Step};
pub use registry::{GameId, MAX_ID, Registry, RegistryError, Session};

// Crate-level exports - Collaborators
pub use presenter::{
    LogPresenter, NullPresenter, Presenter, RenderMode, TerminalPresenter, presenter_for,
};
pub use strategy::{FirstAvailable, MoveStrategy, RandomStrategy};
pub use transport::{Transport, bind_discovery_socket, bind_game_socket, reusable_udp_socket};

// Crate-level exports - Server
pub use server::Server;

// Crate-level exports - Board engine
pub use ttt_board::{Board, BoardError, Cell, Outcome, Player};
