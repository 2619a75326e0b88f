//! Tile board
//!
//! A fixed grid of typed cells. Multi-cell structures (holes, accelerators,
//! preset balls) are resolved once at parse time: the primary cell carries its
//! attribute and the companion cells are marked so nothing re-reads them.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{BOARD_HEIGHT, BOARD_WIDTH, COLOUR_COUNT};

/// Accelerator push direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Parse a layout direction digit (1 up, 2 right, 3 down, 4 left)
    pub fn from_digit(d: u8) -> Option<Self> {
        match d {
            1 => Some(Direction::Up),
            2 => Some(Direction::Right),
            3 => Some(Direction::Down),
            4 => Some(Direction::Left),
            _ => None,
        }
    }

    /// Unit vector in board space (y grows downward)
    pub fn unit(self) -> glam::Vec2 {
        match self {
            Direction::Up => glam::Vec2::NEG_Y,
            Direction::Right => glam::Vec2::X,
            Direction::Down => glam::Vec2::Y,
            Direction::Left => glam::Vec2::NEG_X,
        }
    }
}

/// Cell type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Empty,
    /// Coloured wall; recolours balls that bounce off it
    Wall(u8),
    /// Neutral wall
    Unbreakable,
    /// Spawner
    Entrypoint,
    /// Top-left cell of a 2x2 hole accepting `colour`
    Hole { colour: u8 },
    /// Lower row of a hole (not drawn, not colliding)
    HoleOccupied,
    /// Accelerator pushing in `dir`
    Accelerator { dir: Direction },
    /// Ball placed by the level at load time
    PresetBall { colour: u8 },
    /// Right half of any two-wide tile (not drawn, not colliding)
    OccupiedCompanion,
}

impl TileType {
    /// Walls reflect balls
    pub fn is_wall(self) -> bool {
        matches!(self, TileType::Wall(_) | TileType::Unbreakable)
    }

    /// Primary cell of a two-wide structure; whatever sits right of it is its companion
    pub fn is_two_wide(self) -> bool {
        matches!(
            self,
            TileType::Hole { .. } | TileType::Accelerator { .. } | TileType::PresetBall { .. }
        )
    }
}

/// Read-only tile queries used by the physics step
pub trait BoardView {
    /// Tile at (col, row), or `None` outside the board
    fn tile(&self, col: i32, row: i32) -> Option<TileType>;
}

/// The level grid plus its spawn registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major cells
    cells: Vec<TileType>,
    /// Spawner cells in row-major order
    spawners: Vec<IVec2>,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

impl Board {
    /// An all-empty board
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![TileType::Empty; width * height],
            spawners: Vec::new(),
        }
    }

    /// Parse a standard-size layout
    pub fn parse(layout: &str) -> Self {
        Self::parse_sized(layout, BOARD_WIDTH, BOARD_HEIGHT)
    }

    /// Parse a character layout into a `width` x `height` board.
    ///
    /// Never fails: rows past `height` and columns past `width` are ignored,
    /// missing cells are empty, and malformed structures degrade to inert
    /// cells with a warning.
    pub fn parse_sized(layout: &str, width: usize, height: usize) -> Self {
        let mut board = Self::empty(width, height);
        // Cells already claimed by a structure above or to the left
        let mut claimed = vec![false; width * height];

        for (row, line) in layout.lines().take(height).enumerate() {
            let chars: Vec<char> = line.chars().collect();
            let mut col = 0;
            while col < width {
                let idx = row * width + col;
                if claimed[idx] {
                    col += 1;
                    continue;
                }
                let ch = chars.get(col).copied().unwrap_or(' ');
                let attr = chars.get(col + 1).and_then(|c| c.to_digit(10)).map(|d| d as u8);
                let has_room = col + 1 < width;

                let tile = match ch {
                    ' ' | '.' => TileType::Empty,
                    'X' => TileType::Unbreakable,
                    'S' => TileType::Entrypoint,
                    '0'..='9' => {
                        let d = ch as u8 - b'0';
                        if (d as usize) < COLOUR_COUNT {
                            TileType::Wall(d)
                        } else {
                            log::warn!("Wall colour {} at ({}, {}) out of range", d, col, row);
                            TileType::Empty
                        }
                    }
                    'H' => match attr.filter(|&c| has_room && (c as usize) < COLOUR_COUNT) {
                        Some(colour) => TileType::Hole { colour },
                        None => {
                            log::warn!("Malformed hole at ({}, {}), treating as empty", col, row);
                            TileType::Empty
                        }
                    },
                    'B' => match attr.filter(|&c| has_room && (c as usize) < COLOUR_COUNT) {
                        Some(colour) => TileType::PresetBall { colour },
                        None => {
                            log::warn!("Malformed preset ball at ({}, {})", col, row);
                            TileType::Empty
                        }
                    },
                    'A' => match attr.filter(|_| has_room).and_then(Direction::from_digit) {
                        Some(dir) => TileType::Accelerator { dir },
                        None => {
                            log::warn!("Malformed accelerator at ({}, {})", col, row);
                            TileType::Empty
                        }
                    },
                    other => {
                        log::warn!("Unknown tile {:?} at ({}, {})", other, col, row);
                        TileType::Empty
                    }
                };

                board.cells[idx] = tile;
                if tile == TileType::Entrypoint {
                    board.spawners.push(IVec2::new(col as i32, row as i32));
                }

                if tile.is_two_wide() {
                    board.cells[idx + 1] = TileType::OccupiedCompanion;
                    claimed[idx + 1] = true;
                    if matches!(tile, TileType::Hole { .. }) && row + 1 < height {
                        for below in [idx + width, idx + width + 1] {
                            board.cells[below] = TileType::HoleOccupied;
                            claimed[below] = true;
                        }
                    }
                    col += 2;
                } else {
                    col += 1;
                }
            }
        }

        board
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Overwrite one cell (level editing and tests)
    pub fn set(&mut self, col: usize, row: usize, tile: TileType) {
        if col >= self.width || row >= self.height {
            log::warn!("Ignoring set outside board at ({}, {})", col, row);
            return;
        }
        let idx = row * self.width + col;
        let pos = IVec2::new(col as i32, row as i32);
        if self.cells[idx] == TileType::Entrypoint {
            self.spawners.retain(|&s| s != pos);
        }
        self.cells[idx] = tile;
        if tile == TileType::Entrypoint {
            self.spawners.push(pos);
            self.spawners.sort_by_key(|s| (s.y, s.x));
        }
    }

    /// Place a hole with its companion cells
    pub fn place_hole(&mut self, col: usize, row: usize, colour: u8) {
        self.set(col, row, TileType::Hole { colour });
        self.set(col + 1, row, TileType::OccupiedCompanion);
        self.set(col, row + 1, TileType::HoleOccupied);
        self.set(col + 1, row + 1, TileType::HoleOccupied);
    }

    /// Spawner cells, row-major
    pub fn spawners(&self) -> &[IVec2] {
        &self.spawners
    }

    /// Preset balls as (cell, colour), row-major
    pub fn preset_balls(&self) -> Vec<(IVec2, u8)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, tile)| match *tile {
                TileType::PresetBall { colour } => Some((
                    IVec2::new((idx % self.width) as i32, (idx / self.width) as i32),
                    colour,
                )),
                _ => None,
            })
            .collect()
    }
}

impl BoardView for Board {
    fn tile(&self, col: i32, row: i32) -> Option<TileType> {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return None;
        }
        Some(self.cells[row as usize * self.width + col as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_tiles() {
        let board = Board::parse_sized("X 1\nS 0\n", 3, 2);
        assert_eq!(board.tile(0, 0), Some(TileType::Unbreakable));
        assert_eq!(board.tile(1, 0), Some(TileType::Empty));
        assert_eq!(board.tile(2, 0), Some(TileType::Wall(1)));
        assert_eq!(board.tile(0, 1), Some(TileType::Entrypoint));
        assert_eq!(board.tile(2, 1), Some(TileType::Wall(0)));
        assert_eq!(board.spawners(), &[IVec2::new(0, 1)]);
    }

    #[test]
    fn test_hole_companions_are_not_walls() {
        // The colour digit after H must not become a wall, nor the row below
        let board = Board::parse_sized("XH2X\nX22X\nXXXX\n", 4, 3);
        assert_eq!(board.tile(1, 0), Some(TileType::Hole { colour: 2 }));
        assert_eq!(board.tile(2, 0), Some(TileType::OccupiedCompanion));
        assert_eq!(board.tile(1, 1), Some(TileType::HoleOccupied));
        assert_eq!(board.tile(2, 1), Some(TileType::HoleOccupied));
        assert_eq!(board.tile(3, 0), Some(TileType::Unbreakable));
    }

    #[test]
    fn test_accelerator_and_preset_ball() {
        let board = Board::parse_sized("A3B4\n", 4, 1);
        assert_eq!(
            board.tile(0, 0),
            Some(TileType::Accelerator { dir: Direction::Down })
        );
        assert_eq!(board.tile(1, 0), Some(TileType::OccupiedCompanion));
        assert_eq!(board.tile(2, 0), Some(TileType::PresetBall { colour: 4 }));
        assert_eq!(board.preset_balls(), vec![(IVec2::new(2, 0), 4)]);
    }

    #[test]
    fn test_malformed_structures_degrade_to_empty() {
        // Hole in last column, accelerator with a bad direction, unknown glyph
        let board = Board::parse_sized("A9?H\n", 4, 1);
        assert_eq!(board.tile(0, 0), Some(TileType::Empty));
        assert_eq!(board.tile(1, 0), Some(TileType::Empty));
        assert_eq!(board.tile(2, 0), Some(TileType::Empty));
        assert_eq!(board.tile(3, 0), Some(TileType::Empty));
    }

    #[test]
    fn test_out_of_bounds_lookup_is_none() {
        let board = Board::default();
        assert_eq!(board.tile(-1, 0), None);
        assert_eq!(board.tile(0, BOARD_HEIGHT as i32), None);
        assert_eq!(board.tile(BOARD_WIDTH as i32 - 1, 0), Some(TileType::Empty));
    }

    #[test]
    fn test_short_layout_pads_empty() {
        let board = Board::parse("X\n");
        assert_eq!(board.width(), BOARD_WIDTH);
        assert_eq!(board.tile(0, 0), Some(TileType::Unbreakable));
        assert_eq!(board.tile(5, 10), Some(TileType::Empty));
    }

    #[test]
    fn test_set_tracks_spawners() {
        let mut board = Board::empty(4, 4);
        board.set(3, 2, TileType::Entrypoint);
        board.set(1, 0, TileType::Entrypoint);
        assert_eq!(board.spawners(), &[IVec2::new(1, 0), IVec2::new(3, 2)]);
        board.set(1, 0, TileType::Empty);
        assert_eq!(board.spawners(), &[IVec2::new(3, 2)]);
    }
}
