//! Board state representation and basic operations

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | ' ' | '-' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' | '0' => Some(Cell::O),
            _ => None,
        }
    }
}

/// A player in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

/// The three-in-a-row lines: rows, columns, diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// The board contents alone, stripped of turn bookkeeping.
///
/// This is the key the learning core uses to index its value table: two
/// game states that differ only in turn count or winner bookkeeping map
/// to the same snapshot. Equality and hashing are structural over the
/// fixed-size cell array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSnapshot([Cell; 9]);

impl BoardSnapshot {
    pub fn cells(&self) -> &[Cell; 9] {
        &self.0
    }

    /// Positions of all empty cells, in ascending order.
    ///
    /// This is a pure function of the snapshot: the set of legal actions
    /// is fixed per state. Empty only for full boards, which the learning
    /// core never queries.
    pub fn legal_moves(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                write!(f, "{}", self.0[row * 3 + col].to_char())?;
            }
            if row < 2 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Complete board state including cells and whose turn it is
///
/// This type implements `Copy` for efficiency since it's only 10 bytes
/// (9 bytes for cells + 1 byte for player enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: [Cell; 9],
    pub to_move: Player,
}

impl BoardState {
    /// Create a new empty board with X to move
    pub fn new() -> Self {
        Self::new_with_player(Player::X)
    }

    /// Create a new empty board with a specified player to move first.
    pub fn new_with_player(first_player: Player) -> Self {
        BoardState {
            cells: [Cell::Empty; 9],
            to_move: first_player,
        }
    }

    /// The snapshot of this state the learning core keys on.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot(self.cells)
    }

    /// Get legal moves (empty cell positions)
    pub fn legal_moves(&self) -> Vec<usize> {
        self.snapshot().legal_moves()
    }

    /// Apply a move for the player to move, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of bounds, occupied, or
    /// the game is already decided.
    pub fn make_move(&self, position: usize) -> Result<BoardState, crate::Error> {
        if position >= 9 {
            return Err(crate::Error::InvalidPosition { position });
        }
        if self.is_terminal() {
            return Err(crate::Error::GameOver);
        }
        if self.cells[position] != Cell::Empty {
            return Err(crate::Error::InvalidMove { position });
        }

        let mut cells = self.cells;
        cells[position] = self.to_move.to_cell();

        Ok(BoardState {
            cells,
            to_move: self.to_move.opponent(),
        })
    }

    /// The winner, if any line is completed.
    pub fn winner(&self) -> Option<Player> {
        for line in &LINES {
            let [a, b, c] = *line;
            if self.cells[a] != Cell::Empty
                && self.cells[a] == self.cells[b]
                && self.cells[b] == self.cells[c]
            {
                return match self.cells[a] {
                    Cell::X => Some(Player::X),
                    Cell::O => Some(Player::O),
                    Cell::Empty => None,
                };
            }
        }
        None
    }

    /// Check whether every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != Cell::Empty)
    }

    /// A state is terminal when won or drawn.
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            write!(f, " ")?;
            for col in 0..3 {
                let c = self.cells[row * 3 + col].to_char();
                let c = if c == '.' { ' ' } else { c };
                write!(f, "{c}")?;
                if col < 2 {
                    write!(f, " | ")?;
                }
            }
            writeln!(f)?;
            if row < 2 {
                writeln!(f, "-----------")?;
            }
        }
        Ok(())
    }
}

/// Reward for the move that led from `prior` to `next`, from the
/// perspective of the player who just moved.
///
/// +1 for completing a winning line, -1 for a state won by the opponent,
/// 0 for a draw or any non-terminal transition.
pub fn reward(prior: &BoardState, next: &BoardState) -> f64 {
    let mover = prior.to_move;
    match next.winner() {
        Some(winner) if winner == mover => 1.0,
        Some(_) => -1.0,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_has_nine_legal_moves() {
        let board = BoardState::new();
        assert_eq!(board.legal_moves(), (0..9).collect::<Vec<_>>());
        assert!(!board.is_terminal());
    }

    #[test]
    fn test_make_move_alternates_players() {
        let board = BoardState::new();
        let next = board.make_move(4).unwrap();
        assert_eq!(next.cells[4], Cell::X);
        assert_eq!(next.to_move, Player::O);
    }

    #[test]
    fn test_occupied_cell_is_rejected() {
        let board = BoardState::new().make_move(4).unwrap();
        assert!(matches!(
            board.make_move(4),
            Err(crate::Error::InvalidMove { position: 4 })
        ));
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let board = BoardState::new();
        assert!(matches!(
            board.make_move(9),
            Err(crate::Error::InvalidPosition { position: 9 })
        ));
    }

    #[test]
    fn test_row_win_detected() {
        let mut board = BoardState::new();
        for position in [0, 3, 1, 4, 2] {
            board = board.make_move(position).unwrap();
        }
        assert_eq!(board.winner(), Some(Player::X));
        assert!(board.is_terminal());
    }

    #[test]
    fn test_draw_is_terminal_without_winner() {
        let mut board = BoardState::new();
        for position in [0, 1, 2, 4, 3, 5, 7, 6, 8] {
            board = board.make_move(position).unwrap();
        }
        assert!(board.is_full());
        assert_eq!(board.winner(), None);
        assert!(board.is_terminal());
    }

    #[test]
    fn test_snapshot_ignores_turn_bookkeeping() {
        // Same cells reached through different histories compare equal.
        let a = BoardState::new()
            .make_move(0)
            .unwrap()
            .make_move(4)
            .unwrap();
        let b = BoardState {
            cells: a.cells,
            to_move: Player::X,
        };
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_reward_perspectives() {
        let mut board = BoardState::new();
        for position in [0, 3, 1, 4] {
            board = board.make_move(position).unwrap();
        }
        let won = board.make_move(2).unwrap();
        // X just completed the top row.
        assert_eq!(reward(&board, &won), 1.0);
        // Non-terminal transitions carry no reward.
        let early = BoardState::new();
        let after = early.make_move(0).unwrap();
        assert_eq!(reward(&early, &after), 0.0);
    }
}
