//! Match controller: the protocol state machine.
//!
//! Each inbound message is resolved against the registry to exactly one
//! [`Step`]. The controller borrows a session only for the duration of one
//! call to [`MatchController::handle`].

use crate::config::ServerConfig;
use crate::presenter::{Presenter, presenter_for};
use crate::protocol::{Command, Message, PROTOCOL_VERSION, Response};
use crate::registry::{GameId, Registry, RegistryError};
use crate::strategy::{MoveStrategy, RandomStrategy};
use std::net::SocketAddr;
use tracing::{debug, error, info, instrument, warn};
use ttt_board::{Board, Outcome, Player, apply_move, check_result};

/// Why a message got no reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum DropReason {
    /// No session for the peer and the command needs one.
    #[display("no session for peer")]
    Unroutable,
    /// A move arrived carrying a response code the server does not act on.
    #[display("unhandled response code {}", _0)]
    UnhandledResponse(Response),
    /// The move strategy produced no playable cell.
    #[display("no server move available")]
    NoServerMove,
}

/// Outcome of handling one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Send this message back to the peer.
    Reply(Message),
    /// Send nothing.
    Drop(DropReason),
}

impl Step {
    /// The reply, if any.
    pub fn reply(&self) -> Option<&Message> {
        match self {
            Step::Reply(msg) => Some(msg),
            Step::Drop(_) => None,
        }
    }
}

/// Drives sessions through their lifecycle.
pub struct MatchController {
    registry: Registry,
    strategy: Box<dyn MoveStrategy>,
    presenter: Box<dyn Presenter>,
    strict_turns: bool,
}

impl MatchController {
    /// Creates a controller over an existing registry.
    pub fn new(
        registry: Registry,
        strategy: Box<dyn MoveStrategy>,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        info!(strategy = strategy.name(), "Creating match controller");
        Self {
            registry,
            strategy,
            presenter,
            strict_turns: false,
        }
    }

    /// Builds the controller described by `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Registry::new(*config.max_sessions()),
            Box::new(RandomStrategy::new(*config.seed())),
            presenter_for(*config.render()),
        )
        .with_strict_turns(*config.strict_turns())
    }

    /// Answers `EOSYNC` when a move's turn differs from the session's.
    pub fn with_strict_turns(mut self, strict_turns: bool) -> Self {
        self.strict_turns = strict_turns;
        self
    }

    /// Read access to the sessions.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolves one inbound message from `peer`.
    #[instrument(skip(self, msg), fields(msg = %msg))]
    pub fn handle(&mut self, peer: SocketAddr, msg: &Message) -> Step {
        let existing = self.registry.find_by_peer(peer).map(|s| *s.game_id());

        if msg.version != PROTOCOL_VERSION {
            warn!(version = msg.version, "Incompatible protocol version");
            return reply(Response::BadVersion, 0, msg.turn, existing.unwrap_or(0));
        }

        match (existing, msg.command) {
            (Some(game_id), Command::NewGame | Command::ResumeGame) => {
                warn!(game_id, "Existing client requested another game, rejecting");
                let turn = self.registry.get(game_id).map_or(0, |s| *s.turn());
                reply(Response::Busy, 0, turn, game_id)
            }
            (None, Command::NewGame) => self.new_game(peer),
            (None, Command::ResumeGame) => self.resume_game(peer, msg),
            (Some(game_id), Command::Move) => self.play_move(game_id, msg),
            (None, Command::Move) => {
                warn!("Move from unknown peer");
                Step::Drop(DropReason::Unroutable)
            }
            (_, Command::NewServer) => self.announce(existing),
        }
    }

    fn new_game(&mut self, peer: SocketAddr) -> Step {
        let session = match self.registry.allocate(peer) {
            Ok(session) => session,
            Err(e) => return busy(e),
        };
        let game_id = *session.game_id();

        let Some(position) = self.strategy.choose(session.board()) else {
            error!(game_id, "No opening move on a fresh board");
            self.registry.release(game_id);
            return Step::Drop(DropReason::NoServerMove);
        };
        if !apply_move(session.board_mut(), Player::X, position) {
            error!(game_id, position, "Strategy chose an unplayable opening cell");
            self.registry.release(game_id);
            return Step::Drop(DropReason::NoServerMove);
        }
        self.presenter.render(game_id, session.board());

        info!(game_id, position, "Started new game");
        reply(Response::Success, position, *session.turn(), game_id)
    }

    fn resume_game(&mut self, peer: SocketAddr, msg: &Message) -> Step {
        let board = match Board::from_bytes(&msg.board) {
            Ok(board) => board,
            Err(e) => {
                warn!(error = %e, "Malformed resume snapshot");
                return reply(Response::InvalidRequest, 0, msg.turn, msg.game_id);
            }
        };
        if board.has_winning_line() || check_result(&mut board.clone()).is_decided() {
            warn!(board = %board, "Resume snapshot is already finished");
            return reply(Response::InvalidRequest, 0, msg.turn, msg.game_id);
        }
        let (xs, os) = (board.count(Player::X), board.count(Player::O));
        if xs != os && xs != os + 1 {
            warn!(board = %board, xs, os, "Resume snapshot has impossible mark counts");
            return reply(Response::InvalidRequest, 0, msg.turn, msg.game_id);
        }

        let session = match self.registry.adopt(peer, msg.game_id, board, msg.turn) {
            Ok(session) => session,
            Err(e) => return busy(e),
        };
        let game_id = *session.game_id();
        self.presenter.render(game_id, session.board());

        info!(game_id, requested = msg.game_id, turn = msg.turn, "Resumed game");
        reply(Response::Success, 0, *session.turn(), game_id)
    }

    fn play_move(&mut self, game_id: GameId, msg: &Message) -> Step {
        let Some(session) = self.registry.get_mut(game_id) else {
            return Step::Drop(DropReason::Unroutable);
        };

        if msg.game_id != game_id {
            warn!(expected = game_id, got = msg.game_id, "Mismatched game id");
            return reply(Response::WrongGameId, 0, *session.turn(), game_id);
        }

        if !matches!(
            msg.response,
            Response::Success | Response::GameOver | Response::GameOverAck
        ) {
            return Step::Drop(DropReason::UnhandledResponse(msg.response));
        }

        if self.strict_turns && msg.turn != *session.turn() {
            warn!(expected = *session.turn(), got = msg.turn, "Turn out of sync");
            return reply(Response::OutOfSync, 0, *session.turn(), game_id);
        }

        // Work on a copy so a dropped step leaves the session as it was.
        let mut board = session.board().clone();
        let mut turn = *session.turn();

        if !apply_move(&mut board, Player::O, msg.position) {
            warn!(game_id, position = msg.position, "Invalid move");
            return reply(Response::InvalidMove, 0, turn, game_id);
        }
        turn = turn.wrapping_add(1);
        let outcome = check_result(&mut board);

        if outcome.is_decided() {
            self.presenter.render(game_id, &board);
            log_finish(game_id, outcome);
            self.registry.release(game_id);
            return reply(Response::GameOverAck, 0, turn, game_id);
        }

        let Some(position) = self.strategy.choose(&board) else {
            error!(game_id, "Undecided board without an empty cell");
            return Step::Drop(DropReason::NoServerMove);
        };
        if !apply_move(&mut board, Player::X, position) {
            error!(game_id, position, "Strategy chose an occupied cell");
            return Step::Drop(DropReason::NoServerMove);
        }
        turn = turn.wrapping_add(1);
        let outcome = check_result(&mut board);
        self.presenter.render(game_id, &board);

        if outcome.is_decided() {
            log_finish(game_id, outcome);
            self.registry.release(game_id);
            return reply(Response::GameOver, position, turn, game_id);
        }

        session.commit(board, turn);
        debug!(game_id, position, turn, "Sending move to client");
        reply(Response::Success, position, turn, game_id)
    }

    fn announce(&self, existing: Option<GameId>) -> Step {
        let response = if self.registry.is_full() {
            Response::Busy
        } else {
            Response::SpotAvailable
        };
        debug!(%response, active = self.registry.len(), "Answering discovery");
        Step::Reply(Message::new(
            Command::NewServer,
            response,
            0,
            0,
            existing.unwrap_or(0),
        ))
    }
}

fn reply(response: Response, position: u8, turn: u8, game_id: GameId) -> Step {
    Step::Reply(Message::new(Command::Move, response, position, turn, game_id))
}

fn busy(err: RegistryError) -> Step {
    let game_id = match err {
        RegistryError::PeerActive { game_id } => game_id,
        RegistryError::Full => 0,
    };
    warn!(error = %err, "Server busy");
    reply(Response::Busy, 0, 0, game_id)
}

fn log_finish(game_id: GameId, outcome: Outcome) {
    match outcome {
        Outcome::Winner(Player::X) => info!(game_id, "Server won"),
        Outcome::Winner(Player::O) => info!(game_id, "Server lost"),
        Outcome::Tie => info!(game_id, "Game tied"),
        Outcome::Undecided => {}
    }
}
