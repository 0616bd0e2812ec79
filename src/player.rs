use core::fmt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::board::Board;
use crate::protocol::ServerMessage;

/// Seat number shown to players: 1 for the first arrival, 2 for the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a transport connection, unique for the life of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Outbound handle to a connection. The socket itself stays with the
/// connection task; the coordinator only queues messages for it.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    outbox: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(id: ConnectionId, outbox: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { id, outbox }
    }

    /// A handle together with the receiving end its connection task drains.
    pub fn channel(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(id, tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// False once the connection task dropped its receiver.
    pub fn is_open(&self) -> bool {
        !self.outbox.is_closed()
    }

    /// Queue `msg`; returns false when the connection is gone.
    pub fn deliver(&self, msg: ServerMessage) -> bool {
        self.outbox.send(msg).is_ok()
    }
}

/// A seated participant.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub connection: Connection,
    /// Last submitted layout; empty until the first `setBoard`.
    pub board: Board,
    /// Successful shots this player has landed on the opponent.
    pub hits: u32,
}

impl Player {
    pub fn new(id: PlayerId, connection: Connection) -> Self {
        Self {
            id,
            connection,
            board: Board::new(),
            hits: 0,
        }
    }
}
