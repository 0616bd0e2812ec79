//! Common types for the match coordinator: rejection reasons and shot outcomes.

/// Outcome of a shot against the opponent board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotResult {
    /// The shot landed on a ship segment.
    Hit,
    /// The shot landed on water or on an already hit segment.
    Miss,
}

/// Reasons the coordinator rejects a connection or a message.
///
/// `Display` yields the notice sent to the offending player inside an
/// `error` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Both seats are taken.
    LobbyFull,
    /// The match was abandoned after a disconnect and takes no new players.
    MatchClosed,
    /// A move arrived from the player not holding the turn.
    OutOfTurn,
    /// A move arrived before both players joined.
    NotStarted,
    /// A move arrived after a win while moves are locked.
    MatchOver,
    /// A shot targeted a cell that was already hit.
    AlreadyHit,
    /// A board arrived after the match started while boards are locked.
    BoardLocked,
    /// A submitted board does not hold the standard fleet.
    InvalidFleet,
    /// A coordinate lies outside the board.
    OutOfBounds { x: usize, y: usize },
    /// The frame could not be decoded.
    Malformed(String),
    /// No player is registered for the connection.
    UnknownConnection,
}

impl core::fmt::Display for MatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MatchError::LobbyFull => write!(f, "O jogo já está em andamento."),
            MatchError::MatchClosed => write!(f, "O jogo foi encerrado."),
            MatchError::OutOfTurn => write!(f, "Não é seu turno!"),
            MatchError::NotStarted => write!(f, "O jogo ainda não começou."),
            MatchError::MatchOver => write!(f, "O jogo já terminou."),
            MatchError::AlreadyHit => write!(f, "Posição já atacada."),
            MatchError::BoardLocked => {
                write!(f, "Não é possível alterar o tabuleiro após o início do jogo.")
            }
            MatchError::InvalidFleet => write!(f, "Tabuleiro inválido."),
            MatchError::OutOfBounds { x, y } => {
                write!(f, "Coordenada fora do tabuleiro: ({}, {}).", x, y)
            }
            MatchError::Malformed(reason) => write!(f, "Mensagem inválida: {}", reason),
            MatchError::UnknownConnection => write!(f, "Conexão desconhecida."),
        }
    }
}

impl std::error::Error for MatchError {}
