//! Session registry: owns every active game and its id.

use derive_getters::Getters;
use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;
use tracing::{debug, info, instrument, warn};
use ttt_board::Board;

/// Game id as carried on the wire.
pub type GameId = u8;

/// Size of the id pool; every id fits in one byte.
pub const MAX_ID: usize = 256;

/// One in-progress match against one remote client.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Session {
    /// Wire handle of this match.
    game_id: GameId,
    /// Client that owns the match.
    peer: SocketAddr,
    /// Authoritative board.
    board: Board,
    /// Half-move counter.
    turn: u8,
}

impl Session {
    fn new(game_id: GameId, peer: SocketAddr, board: Board, turn: u8) -> Self {
        Self {
            game_id,
            peer,
            board,
            turn,
        }
    }

    /// Mutable access to the board.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Replaces the board and turn after a completed exchange.
    pub fn commit(&mut self, board: Board, turn: u8) {
        self.board = board;
        self.turn = turn;
    }
}

/// Registry refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum RegistryError {
    /// Every id is in use.
    #[display("All game ids are in use")]
    Full,
    /// The peer already owns a session.
    #[display("Peer already owns game {}", game_id)]
    PeerActive {
        /// Id of the peer's existing session.
        game_id: GameId,
    },
}

impl std::error::Error for RegistryError {}

/// Set of active sessions, indexed by id and by peer address.
///
/// Ids come from `0..capacity`. Freed ids below the high-water mark are
/// reused lowest first before the mark grows.
#[derive(Debug)]
pub struct Registry {
    sessions: HashMap<GameId, Session>,
    by_peer: HashMap<SocketAddr, GameId>,
    free: BTreeSet<GameId>,
    high_water: usize,
    capacity: usize,
}

impl Registry {
    /// Creates an empty registry holding at most `capacity` sessions
    /// (clamped to `1..=MAX_ID`).
    #[instrument]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_ID);
        info!(capacity, "Creating session registry");
        Self {
            sessions: HashMap::new(),
            by_peer: HashMap::new(),
            free: BTreeSet::new(),
            high_water: 0,
            capacity,
        }
    }

    /// Maximum number of concurrent sessions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is active.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Whether every id is in use.
    pub fn is_full(&self) -> bool {
        self.free.is_empty() && self.high_water >= self.capacity
    }

    /// Creates a fresh session for `peer` under the lowest free id.
    #[instrument(skip(self))]
    pub fn allocate(&mut self, peer: SocketAddr) -> Result<&mut Session, RegistryError> {
        self.ensure_peer_free(peer)?;
        let game_id = self.next_free().ok_or_else(|| {
            warn!(active = self.sessions.len(), "Registry full");
            RegistryError::Full
        })?;
        debug!(game_id, "Allocated game id");
        Ok(self.insert(Session::new(game_id, peer, Board::new(), 0)))
    }

    /// Re-creates a session from a client snapshot.
    ///
    /// Keeps the client's `requested` id when it is free, otherwise takes the
    /// lowest free id.
    #[instrument(skip(self, board), fields(board = %board))]
    pub fn adopt(
        &mut self,
        peer: SocketAddr,
        requested: GameId,
        board: Board,
        turn: u8,
    ) -> Result<&mut Session, RegistryError> {
        self.ensure_peer_free(peer)?;
        let game_id = match self.claim(requested) {
            Some(id) => id,
            None => self.next_free().ok_or(RegistryError::Full)?,
        };
        if game_id != requested {
            info!(requested, game_id, "Requested id unavailable, reassigned");
        }
        Ok(self.insert(Session::new(game_id, peer, board, turn)))
    }

    /// Looks up the session owned by `peer`.
    pub fn find_by_peer(&self, peer: SocketAddr) -> Option<&Session> {
        self.by_peer.get(&peer).and_then(|id| self.sessions.get(id))
    }

    /// Looks up a session by id.
    pub fn get(&self, game_id: GameId) -> Option<&Session> {
        self.sessions.get(&game_id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, game_id: GameId) -> Option<&mut Session> {
        self.sessions.get_mut(&game_id)
    }

    /// Iterates over the active sessions in no particular order.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Removes a session and frees its id.
    ///
    /// Releasing an id that is not active returns `None` and changes nothing.
    #[instrument(skip(self))]
    pub fn release(&mut self, game_id: GameId) -> Option<Session> {
        let session = self.sessions.remove(&game_id)?;
        self.by_peer.remove(&session.peer);
        self.free.insert(game_id);
        debug!(peer = %session.peer, "Released game id");
        Some(session)
    }

    fn ensure_peer_free(&self, peer: SocketAddr) -> Result<(), RegistryError> {
        match self.by_peer.get(&peer) {
            Some(&game_id) => Err(RegistryError::PeerActive { game_id }),
            None => Ok(()),
        }
    }

    fn next_free(&mut self) -> Option<GameId> {
        if let Some(id) = self.free.pop_first() {
            return Some(id);
        }
        if self.high_water < self.capacity {
            let id = self.high_water as GameId;
            self.high_water += 1;
            return Some(id);
        }
        None
    }

    /// Takes a specific id out of the pool if nobody holds it.
    fn claim(&mut self, id: GameId) -> Option<GameId> {
        let slot = id as usize;
        if slot < self.high_water {
            return self.free.remove(&id).then_some(id);
        }
        if slot < self.capacity {
            self.free
                .extend((self.high_water..slot).map(|gap| gap as GameId));
            self.high_water = slot + 1;
            return Some(id);
        }
        None
    }

    fn insert(&mut self, session: Session) -> &mut Session {
        let game_id = session.game_id;
        self.by_peer.insert(session.peer, game_id);
        self.sessions.entry(game_id).or_insert(session)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(MAX_ID)
    }
}
