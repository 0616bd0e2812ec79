//! JSON messages exchanged with browser clients. Every frame is one object
//! whose `type` field selects the variant.

use crate::board::Board;
use crate::common::MatchError;
use crate::player::PlayerId;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Messages sent by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Rejection notice for the offending connection.
    Error { message: String },
    /// Join confirmation or disconnect notice.
    Info { message: String },
    /// Both players are present.
    Start { message: String },
    /// The addressee may fire.
    Turn { message: String },
    /// A shot landed; the shooter keeps the turn.
    Hit { x: usize, y: usize, player: PlayerId },
    /// A shot missed; the turn passes.
    Miss { x: usize, y: usize, player: PlayerId },
    /// A player reached the hit threshold.
    Win { message: String },
    /// Free-form announcement shown verbatim by clients.
    Broadcast { message: String },
}

impl ServerMessage {
    pub fn error(err: &MatchError) -> Self {
        ServerMessage::Error {
            message: err.to_string(),
        }
    }

    pub fn joined(id: PlayerId) -> Self {
        ServerMessage::Info {
            message: format!("Você entrou no jogo como Jogador {}", id),
        }
    }

    pub fn started() -> Self {
        ServerMessage::Start {
            message: "O jogo começou!".to_string(),
        }
    }

    pub fn your_turn() -> Self {
        ServerMessage::Turn {
            message: "Sua vez de jogar!".to_string(),
        }
    }

    pub fn winner(id: PlayerId) -> Self {
        ServerMessage::Win {
            message: format!("Jogador {} venceu!", id),
        }
    }

    pub fn opponent_left() -> Self {
        ServerMessage::Info {
            message: "Jogador desconectado. Jogo finalizado.".to_string(),
        }
    }

    pub fn announcement(text: impl Into<String>) -> Self {
        ServerMessage::Broadcast {
            message: text.into(),
        }
    }

    pub fn to_frame(&self) -> anyhow::Result<String> {
        encode(self)
    }

    pub fn from_frame(frame: &str) -> Result<Self, MatchError> {
        decode(frame)
    }
}

/// Messages sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// The player opened the placement screen.
    #[serde(rename = "start")]
    Start,
    /// Full ship layout, `board[y][x]`.
    #[serde(rename = "setBoard")]
    SetBoard { board: Board },
    /// The player confirmed the layout locally.
    #[serde(rename = "confirm-ships")]
    ConfirmShips,
    /// Fire at `(x, y)` on the opponent board.
    #[serde(rename = "move")]
    Move { x: usize, y: usize },
}

impl ClientMessage {
    pub fn to_frame(&self) -> anyhow::Result<String> {
        encode(self)
    }

    pub fn from_frame(frame: &str) -> Result<Self, MatchError> {
        decode(frame)
    }
}

fn encode<T: Serialize>(msg: &T) -> anyhow::Result<String> {
    serde_json::to_string(msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))
}

fn decode<T: DeserializeOwned>(frame: &str) -> Result<T, MatchError> {
    serde_json::from_str(frame).map_err(|e| MatchError::Malformed(e.to_string()))
}
