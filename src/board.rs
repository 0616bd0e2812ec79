//! Player boards as submitted by clients: a square grid of cell states.

use crate::common::{MatchError, ShotResult};
use crate::config::{ShipDef, BOARD_SIZE, FLEET, FLEET_CELLS};
use core::fmt;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// State of a single cell. On the wire a cell is the number `0`, `1` or `2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Cell {
    #[default]
    Empty,
    Ship,
    Hit,
}

impl TryFrom<u8> for Cell {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            1 => Ok(Cell::Ship),
            2 => Ok(Cell::Hit),
            other => Err(format!("unknown cell state {}", other)),
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => 0,
            Cell::Ship => 1,
            Cell::Hit => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A board indexed as `rows[y][x]`, matching the layout the browser sends.
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    rows: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// A board with no ships.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.rows
    }

    fn check_bounds(x: usize, y: usize) -> Result<(), MatchError> {
        if x >= BOARD_SIZE || y >= BOARD_SIZE {
            return Err(MatchError::OutOfBounds { x, y });
        }
        Ok(())
    }

    pub fn cell(&self, x: usize, y: usize) -> Result<Cell, MatchError> {
        Self::check_bounds(x, y)?;
        Ok(self.rows[y][x])
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) -> Result<(), MatchError> {
        Self::check_bounds(x, y)?;
        self.rows[y][x] = cell;
        Ok(())
    }

    /// Resolve a shot at `(x, y)`. Only a ship segment counts as a hit and
    /// turns into `Hit`; water and already hit segments are misses.
    pub fn strike(&mut self, x: usize, y: usize) -> Result<ShotResult, MatchError> {
        match self.cell(x, y)? {
            Cell::Ship => {
                self.rows[y][x] = Cell::Hit;
                Ok(ShotResult::Hit)
            }
            Cell::Empty | Cell::Hit => Ok(ShotResult::Miss),
        }
    }

    /// Number of cells in the given state.
    pub fn count(&self, state: Cell) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&cell| cell == state)
            .count()
    }

    /// Ship segments not yet hit.
    pub fn ship_cells(&self) -> usize {
        self.count(Cell::Ship)
    }

    /// True when the board is untouched and carries exactly the standard
    /// fleet's number of segments. Ship shapes are not checked.
    pub fn holds_standard_fleet(&self) -> bool {
        self.count(Cell::Hit) == 0 && self.ship_cells() == FLEET_CELLS
    }

    /// Place `def` with its bow at `(x, y)`.
    pub fn place(
        &mut self,
        def: ShipDef,
        x: usize,
        y: usize,
        orientation: Orientation,
    ) -> Result<(), MatchError> {
        let cells = Self::footprint(def, x, y, orientation)?;
        for &(cx, cy) in cells.iter() {
            if self.rows[cy][cx] != Cell::Empty {
                return Err(MatchError::InvalidFleet);
            }
        }
        for (cx, cy) in cells {
            self.rows[cy][cx] = Cell::Ship;
        }
        Ok(())
    }

    fn footprint(
        def: ShipDef,
        x: usize,
        y: usize,
        orientation: Orientation,
    ) -> Result<Vec<(usize, usize)>, MatchError> {
        let cells: Vec<(usize, usize)> = (0..def.length())
            .map(|i| match orientation {
                Orientation::Horizontal => (x + i, y),
                Orientation::Vertical => (x, y + i),
            })
            .collect();
        for &(cx, cy) in cells.iter() {
            Self::check_bounds(cx, cy)?;
        }
        Ok(cells)
    }

    /// Returns a random non-overlapping `(x, y, Orientation)` for `def`.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        def: ShipDef,
    ) -> Option<(usize, usize, Orientation)> {
        for _ in 0..100 {
            let orient = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let max_x = if orient == Orientation::Horizontal {
                BOARD_SIZE - def.length()
            } else {
                BOARD_SIZE - 1
            };
            let max_y = if orient == Orientation::Vertical {
                BOARD_SIZE - def.length()
            } else {
                BOARD_SIZE - 1
            };
            let x = rng.random_range(0..=max_x);
            let y = rng.random_range(0..=max_y);
            let Ok(cells) = Self::footprint(def, x, y, orient) else {
                continue;
            };
            if cells.iter().all(|&(cx, cy)| self.rows[cy][cx] == Cell::Empty) {
                return Some((x, y, orient));
            }
        }
        None
    }

    /// A board carrying the whole standard fleet at random positions.
    pub fn random_fleet<R: Rng>(rng: &mut R) -> Result<Self, MatchError> {
        let mut board = Self::new();
        for def in FLEET {
            let (x, y, orient) = board
                .random_placement(rng, def)
                .ok_or(MatchError::InvalidFleet)?;
            board.place(def, x, y, orient)?;
        }
        Ok(board)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{")?;
        for row in self.rows.iter() {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => '.',
                    Cell::Ship => '#',
                    Cell::Hit => 'X',
                })
                .collect();
            writeln!(f, "  {}", line)?;
        }
        write!(f, "}}")
    }
}
