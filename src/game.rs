//! The match coordinator: seats, turn order, shot resolution and win detection
//! for a single two-player match.
//!
//! `Match` is plain synchronous state. Every operation runs to completion and
//! queues its outgoing messages on the players' connection handles, so a single
//! owner (see `server::run_coordinator`) can drive it without locks.

use log::{debug, info, warn};

use crate::board::{Board, Cell};
use crate::common::{MatchError, ShotResult};
use crate::config::MatchConfig;
use crate::player::{Connection, ConnectionId, Player, PlayerId};
use crate::protocol::{ClientMessage, ServerMessage};

/// Seats per match.
pub const MAX_PLAYERS: usize = 2;

/// Lifecycle of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Fewer than two players have joined.
    WaitingForPlayers,
    /// Both players are seated and shots are accepted.
    InProgress,
    /// `winner` reached the hit threshold first.
    Finished { winner: PlayerId },
    /// A player left after the start; the match takes no new players.
    Abandoned,
}

/// State of the one match the server hosts: seats, boards, turn and phase.
pub struct Match {
    config: MatchConfig,
    players: Vec<Player>,
    current_turn: usize,
    phase: MatchPhase,
}

impl Default for Match {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl Match {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            players: Vec::with_capacity(MAX_PLAYERS),
            current_turn: 0,
            phase: MatchPhase::WaitingForPlayers,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Seated players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Index into `players()` of the player holding the turn.
    pub fn current_turn(&self) -> usize {
        self.current_turn
    }

    pub fn player(&self, conn: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.connection.id() == conn)
    }

    fn index_of(&self, conn: ConnectionId) -> Option<usize> {
        self.players.iter().position(|p| p.connection.id() == conn)
    }

    /// Seat a new connection. On rejection the connection has already been sent
    /// an `error` and the caller is expected to close it.
    pub fn admit(&mut self, connection: Connection) -> Result<PlayerId, MatchError> {
        let rejection = if self.phase == MatchPhase::Abandoned {
            Some(MatchError::MatchClosed)
        } else if self.players.len() >= MAX_PLAYERS {
            Some(MatchError::LobbyFull)
        } else {
            None
        };
        if let Some(err) = rejection {
            warn!("Rejecting {}: {:?}", connection.id(), err);
            connection.deliver(ServerMessage::error(&err));
            return Err(err);
        }

        let id = PlayerId(self.players.len() as u8 + 1);
        info!("{} joined as player {}", connection.id(), id);
        connection.deliver(ServerMessage::joined(id));
        self.players.push(Player::new(id, connection));

        if self.players.len() == MAX_PLAYERS {
            self.phase = MatchPhase::InProgress;
            info!("Both players present, match started");
            self.broadcast(&ServerMessage::started());
            self.send_to(self.current_turn, ServerMessage::your_turn());
        }
        Ok(id)
    }

    /// Apply one client message. Rejections are reported to the sender with
    /// an `error` message and returned.
    pub fn handle(&mut self, conn: ConnectionId, msg: ClientMessage) -> Result<(), MatchError> {
        let result = match msg {
            ClientMessage::Start | ClientMessage::ConfirmShips => {
                if self.index_of(conn).is_some() {
                    debug!("{} sent {:?}", conn, msg);
                    Ok(())
                } else {
                    Err(MatchError::UnknownConnection)
                }
            }
            ClientMessage::SetBoard { board } => self.set_board(conn, board),
            ClientMessage::Move { x, y } => self.attack(conn, x, y).map(|_| ()),
        };
        if let Err(err) = &result {
            self.report(conn, err);
        }
        result
    }

    /// Send `err` to the connection it concerns, if that connection is seated.
    pub fn report(&self, conn: ConnectionId, err: &MatchError) {
        match self.index_of(conn) {
            Some(idx) => {
                debug!("Rejected message from player {}: {}", self.players[idx].id, err);
                self.send_to(idx, ServerMessage::error(err));
            }
            None => warn!("Dropping rejection for unknown {}: {}", conn, err),
        }
    }

    /// Replace the sender's board.
    pub fn set_board(&mut self, conn: ConnectionId, board: Board) -> Result<(), MatchError> {
        let idx = self.index_of(conn).ok_or(MatchError::UnknownConnection)?;
        let strict = self.config.strictness;
        if strict.lock_board_after_start && self.phase != MatchPhase::WaitingForPlayers {
            return Err(MatchError::BoardLocked);
        }
        if strict.validate_fleet && !board.holds_standard_fleet() {
            return Err(MatchError::InvalidFleet);
        }
        let player = &mut self.players[idx];
        player.board = board;
        debug!(
            "Player {} submitted a board with {} ship cells",
            player.id,
            player.board.ship_cells()
        );
        Ok(())
    }

    /// Resolve a shot by the sender at `(x, y)` on the opponent board.
    pub fn attack(
        &mut self,
        conn: ConnectionId,
        x: usize,
        y: usize,
    ) -> Result<ShotResult, MatchError> {
        let idx = self.index_of(conn).ok_or(MatchError::UnknownConnection)?;
        match self.phase {
            MatchPhase::WaitingForPlayers => return Err(MatchError::NotStarted),
            MatchPhase::Abandoned => return Err(MatchError::MatchClosed),
            MatchPhase::Finished { .. } if self.config.strictness.lock_after_win => {
                return Err(MatchError::MatchOver)
            }
            MatchPhase::InProgress | MatchPhase::Finished { .. } => {}
        }
        if idx != self.current_turn {
            return Err(MatchError::OutOfTurn);
        }

        let attacker = self.current_turn;
        let opponent = 1 - attacker;
        let shooter = self.players[attacker].id;
        if self.config.strictness.reject_repeat_shots
            && self.players[opponent].board.cell(x, y)? == Cell::Hit
        {
            return Err(MatchError::AlreadyHit);
        }

        let result = self.players[opponent].board.strike(x, y)?;
        match result {
            ShotResult::Hit => {
                self.players[attacker].hits += 1;
                let hits = self.players[attacker].hits;
                debug!("Player {} hit ({}, {}), {} hits", shooter, x, y, hits);
                self.broadcast(&ServerMessage::Hit {
                    x,
                    y,
                    player: shooter,
                });
                if hits == self.config.win_threshold {
                    info!("Player {} won with {} hits", shooter, hits);
                    if self.phase == MatchPhase::InProgress {
                        self.phase = MatchPhase::Finished { winner: shooter };
                    }
                    self.broadcast(&ServerMessage::winner(shooter));
                }
            }
            ShotResult::Miss => {
                debug!("Player {} missed ({}, {})", shooter, x, y);
                self.broadcast(&ServerMessage::Miss {
                    x,
                    y,
                    player: shooter,
                });
                self.current_turn = opponent;
                self.send_to(self.current_turn, ServerMessage::your_turn());
            }
        }
        Ok(result)
    }

    /// Drop the player behind `conn` and tell whoever remains. Unknown
    /// connections (such as rejected ones) are ignored.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Option<Player> {
        let idx = self.index_of(conn)?;
        let player = self.players.remove(idx);
        info!("Player {} ({}) disconnected", player.id, conn);
        if matches!(
            self.phase,
            MatchPhase::InProgress | MatchPhase::Finished { .. }
        ) {
            self.phase = MatchPhase::Abandoned;
        }
        self.broadcast(&ServerMessage::opponent_left());
        Some(player)
    }

    /// Broadcast a free-form `broadcast` message.
    pub fn announce(&self, text: &str) -> usize {
        self.broadcast(&ServerMessage::announcement(text))
    }

    /// Deliver `msg` to the player at `idx`.
    pub fn send_to(&self, idx: usize, msg: ServerMessage) -> bool {
        match self.players.get(idx) {
            Some(player) => player.connection.deliver(msg),
            None => false,
        }
    }

    /// Deliver `msg` to every player whose connection is still open; returns
    /// how many received it.
    pub fn broadcast(&self, msg: &ServerMessage) -> usize {
        let mut delivered = 0;
        for player in self.players.iter().filter(|p| p.connection.is_open()) {
            if player.connection.deliver(msg.clone()) {
                delivered += 1;
            }
        }
        delivered
    }
}
