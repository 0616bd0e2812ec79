/// Side length of every board.
pub const BOARD_SIZE: usize = 10;

/// Successful hits a player needs to win.
pub const WIN_THRESHOLD: u32 = 5;

/// Address the server listens on unless told otherwise.
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Largest text frame accepted from a client (a full board is well under 1 KiB).
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// A ship as offered by the placement screen of the browser client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipDef {
    name: &'static str,
    length: usize,
}

impl ShipDef {
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

pub const NUM_SHIPS: usize = 5;
pub const FLEET: [ShipDef; NUM_SHIPS] = [
    ShipDef::new("carrier", 5),
    ShipDef::new("battleship", 4),
    ShipDef::new("cruiser", 3),
    ShipDef::new("destroyer", 2),
    ShipDef::new("submarine", 1),
];

/// Total number of ship segments in the standard fleet.
pub const FLEET_CELLS: usize = 5 + 4 + 3 + 2 + 1;

/// Optional hardening of the match rules. Everything is off by default, which
/// keeps the permissive behavior browser clients already rely on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Strictness {
    /// Reject moves once a player has won.
    pub lock_after_win: bool,
    /// Reject shots at a cell that was already hit instead of counting a miss.
    pub reject_repeat_shots: bool,
    /// Reject `setBoard` once the match has started.
    pub lock_board_after_start: bool,
    /// Require submitted boards to hold exactly the standard fleet.
    pub validate_fleet: bool,
}

/// Rules for a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub win_threshold: u32,
    pub strictness: Strictness,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            win_threshold: WIN_THRESHOLD,
            strictness: Strictness::default(),
        }
    }
}
