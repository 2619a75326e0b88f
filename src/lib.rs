//! Inkball - bouncing balls, drawn lines, coloured holes
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board, balls, lines, capture scoring)
//! - `settings`: Data-driven level configuration (JSON)

pub mod settings;
pub mod sim;

pub use settings::{LevelError, LevelSettings, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Size of one board cell in pixels
    pub const CELL_SIZE: f32 = 32.0;
    /// Board dimensions in cells
    pub const BOARD_WIDTH: usize = 18;
    pub const BOARD_HEIGHT: usize = 18;

    /// Frames per second; one physics step per frame
    pub const FPS: u32 = 30;

    /// Ball defaults (radius is half the 24px sprite)
    pub const BALL_RADIUS: f32 = 12.0;
    /// Magnitude of each velocity axis when a ball is spawned (pixels/frame)
    pub const SPAWN_SPEED: f32 = 2.0;

    /// Velocity added per frame while a ball touches an accelerator
    pub const ACCELERATOR_BOOST: f32 = 0.2;

    /// Hole capture / attraction radii (cell units, from hole centre)
    pub const CAPTURE_RADIUS: f32 = 0.3;
    pub const ATTRACTION_RADIUS: f32 = 1.0;
    pub const STRONG_ATTRACTION_RADIUS: f32 = 0.6;
    /// Fraction of the vector-to-hole added to velocity inside each radius
    pub const ATTRACTION_PULL: f32 = 0.5;
    pub const STRONG_ATTRACTION_PULL: f32 = 1.0;

    /// Extra pixels beyond the ball radius at which a line segment deflects it
    pub const LINE_SLACK: f32 = 5.0;
    /// Pointer distance (pixels) within which an erase removes a line
    pub const ERASE_RADIUS: f32 = 5.0;

    /// Number of ball/wall colours; colour 0 is the wildcard
    pub const COLOUR_COUNT: usize = 5;
    pub const WILDCARD: u8 = 0;

    /// Number of queued balls shown in the upcoming strip
    pub const UPCOMING_SHOWN: usize = 5;
}

/// Colour names in index order (index 0 is the grey wildcard)
pub const COLOURS: [&str; consts::COLOUR_COUNT] = ["grey", "orange", "blue", "green", "yellow"];

/// Look up a colour index by name (case-insensitive)
pub fn colour_index(name: &str) -> Option<u8> {
    COLOURS
        .iter()
        .position(|c| c.eq_ignore_ascii_case(name))
        .map(|i| i as u8)
}

/// Name of a colour index, or `None` past the palette
pub fn colour_name(colour: u8) -> Option<&'static str> {
    COLOURS.get(colour as usize).copied()
}

/// Convert a board position (cell units) to pixels
#[inline]
pub fn cells_to_pixels(pos: Vec2) -> Vec2 {
    pos * consts::CELL_SIZE
}

/// Convert a pixel position to board cell units
#[inline]
pub fn pixels_to_cells(pos: Vec2) -> Vec2 {
    pos / consts::CELL_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colour_lookup() {
        assert_eq!(colour_index("grey"), Some(0));
        assert_eq!(colour_index("Yellow"), Some(4));
        assert_eq!(colour_index("purple"), None);
        assert_eq!(colour_name(2), Some("blue"));
        assert_eq!(colour_name(9), None);
    }

    #[test]
    fn test_unit_conversion() {
        let p = Vec2::new(3.5, 2.0);
        assert_eq!(cells_to_pixels(p), Vec2::new(112.0, 64.0));
        assert_eq!(pixels_to_cells(cells_to_pixels(p)), p);
    }
}
