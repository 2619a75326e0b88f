//! Ball entity and its per-frame physics step
//!
//! Positions are in board cell units and mark the top-left of the ball
//! sprite; velocities are in pixels per frame.

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::{BoardView, TileType};
use super::collision::{
    Bounce, HoleZone, colours_match, flip_toward, hole_zone, reflect_velocity, segment_normal,
};
use super::ledger::{BallId, CaptureKind, ScoreSink};
use super::line::LineSet;
use crate::consts::*;
use crate::{cells_to_pixels, pixels_to_cells};

/// Ball lifecycle
///
/// A wrong capture has no state of its own: the ball goes straight back to
/// `Queued` and rejoins the back of the ledger queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// Waiting in the queue; spawns when released
    Queued,
    /// On the board
    Active,
    /// Sunk in a matching hole (terminal)
    CapturedCorrect,
}

/// Edge of the ball's bounding box probed against the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// Probe order; both axes are evaluated every frame
    pub const PROBE_ORDER: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// Probe point relative to the ball's top-left, in pixels
    fn offset(self, radius: f32) -> Vec2 {
        match self {
            Edge::Top => Vec2::new(radius, 0.0),
            Edge::Bottom => Vec2::new(radius, radius * 2.0),
            Edge::Left => Vec2::new(0.0, radius),
            Edge::Right => Vec2::new(radius * 2.0, radius),
        }
    }

    fn bounce(self) -> Bounce {
        match self {
            Edge::Top | Edge::Left => Bounce::Positive,
            Edge::Bottom | Edge::Right => Bounce::Negative,
        }
    }
}

/// What happened to a ball during one step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Capture result and the score change it caused
    pub captured: Option<(CaptureKind, i64)>,
    /// Id of the line the ball bounced off (and consumed)
    pub line_consumed: Option<u32>,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    /// Top-left of the sprite, cell units
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    /// Colour index; 0 is the wildcard
    pub colour: u8,
    pub state: BallState,
    /// Visual size factor for the renderer (1.0 = full size)
    pub scale: f32,
    radius: f32,
    spawn_offset: f32,
}

impl Ball {
    pub fn new(id: BallId, colour: u8) -> Self {
        Self::with_radius(id, colour, BALL_RADIUS)
    }

    /// Ball with a sprite-derived radius (pixels)
    pub fn with_radius(id: BallId, colour: u8, radius: f32) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            colour,
            state: BallState::Queued,
            scale: 1.0,
            radius,
            spawn_offset: 0.5 - radius / CELL_SIZE,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Offset that centres the sprite in a cell
    pub fn spawn_offset(&self) -> f32 {
        self.spawn_offset
    }

    /// Sprite centre in board pixels
    pub fn pixel_center(&self) -> Vec2 {
        cells_to_pixels(self.pos) + Vec2::splat(self.radius)
    }

    /// Position used for hole distance checks, cell units
    pub fn offset_center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.spawn_offset)
    }

    pub fn is_active(&self) -> bool {
        self.state == BallState::Active
    }

    /// Place the ball on `cell` with a random diagonal impulse
    pub fn spawn_at<R: Rng>(&mut self, cell: IVec2, rng: &mut R) {
        self.pos = cell.as_vec2() + Vec2::splat(self.spawn_offset);
        let vx = if rng.random_range(0..2) == 0 { -SPAWN_SPEED } else { SPAWN_SPEED };
        let vy = if rng.random_range(0..2) == 0 { -SPAWN_SPEED } else { SPAWN_SPEED };
        self.vel = Vec2::new(vx, vy);
        self.scale = 1.0;
        self.state = BallState::Active;
    }

    /// Spawn from a uniformly chosen spawner; false if there are none
    pub fn spawn<R: Rng>(&mut self, spawners: &[IVec2], rng: &mut R) -> bool {
        if spawners.is_empty() {
            log::warn!("Ball {} cannot spawn: no spawners on the board", self.id);
            return false;
        }
        let cell = spawners[rng.random_range(0..spawners.len())];
        self.spawn_at(cell, rng);
        true
    }

    /// Advance one frame: move, bounce off walls, feel holes, bounce off lines.
    ///
    /// Only the translation is skipped while `paused`; every check still runs.
    pub fn step<B, S>(
        &mut self,
        board: &B,
        lines: &mut LineSet,
        sink: &mut S,
        paused: bool,
    ) -> StepReport
    where
        B: BoardView + ?Sized,
        S: ScoreSink + ?Sized,
    {
        let mut report = StepReport::default();
        if !self.is_active() {
            return report;
        }

        if !paused {
            self.integrate();
        }

        self.probe_edges(board);

        report.captured = self.check_hole(board, sink);
        // A sinking ball still takes out a line it touches
        report.line_consumed = self.check_lines(lines);
        report
    }

    /// position += velocity / cellSize
    pub fn integrate(&mut self) {
        self.pos += pixels_to_cells(self.vel);
    }

    /// Board cell under one edge probe
    fn probe_cell(&self, edge: Edge) -> IVec2 {
        let p = self.pos + pixels_to_cells(edge.offset(self.radius));
        // Truncates toward zero
        IVec2::new(p.x as i32, p.y as i32)
    }

    /// Wall reflection, recolouring and accelerators at the four edges
    pub fn probe_edges<B: BoardView + ?Sized>(&mut self, board: &B) {
        let mut boosted: Vec<IVec2> = Vec::with_capacity(Edge::PROBE_ORDER.len());

        for edge in Edge::PROBE_ORDER {
            let cell = self.probe_cell(edge);
            let Some(tile) = board.tile(cell.x, cell.y) else {
                log::debug!("Ball {} probe {:?} outside board at {}", self.id, edge, cell);
                continue;
            };

            let solid = match tile {
                TileType::Unbreakable => true,
                // A digit right of a two-wide primary is its attribute, not a wall
                TileType::Wall(_) => !board
                    .tile(cell.x - 1, cell.y)
                    .is_some_and(TileType::is_two_wide),
                _ => false,
            };

            if solid {
                match edge {
                    Edge::Top | Edge::Bottom => self.vel.y = flip_toward(self.vel.y, edge.bounce()),
                    Edge::Left | Edge::Right => self.vel.x = flip_toward(self.vel.x, edge.bounce()),
                }
                if let TileType::Wall(colour) = tile {
                    self.colour = colour;
                }
            }

            if let TileType::Accelerator { dir } = tile {
                // One push per accelerator cell per frame, however many edges touch it
                if !boosted.contains(&cell) {
                    boosted.push(cell);
                    self.vel += dir.unit() * ACCELERATOR_BOOST;
                }
            }
        }
    }

    /// Hole attraction and capture. Returns the capture, if one happened.
    pub fn check_hole<B, S>(&mut self, board: &B, sink: &mut S) -> Option<(CaptureKind, i64)>
    where
        B: BoardView + ?Sized,
        S: ScoreSink + ?Sized,
    {
        // Resolve the hole's top-left cell from whichever of its four cells we're on
        let mut cell = IVec2::new(self.pos.x as i32, self.pos.y as i32);
        let mut tile = board.tile(cell.x, cell.y);
        if tile == Some(TileType::HoleOccupied) {
            cell.y -= 1;
            tile = board.tile(cell.x, cell.y);
        }
        if tile == Some(TileType::OccupiedCompanion) {
            cell.x -= 1;
            tile = board.tile(cell.x, cell.y);
        }

        let Some(TileType::Hole { colour: hole_colour }) = tile else {
            self.scale = 1.0;
            return None;
        };

        let hole_center = cell.as_vec2() + Vec2::ONE;
        match hole_zone(hole_center, self.offset_center()) {
            HoleZone::Capture => {
                let kind = if colours_match(self.colour, hole_colour) {
                    CaptureKind::Correct
                } else {
                    CaptureKind::Wrong
                };
                let delta = sink.record_capture(self.id, self.colour, kind);
                self.state = match kind {
                    CaptureKind::Correct => BallState::CapturedCorrect,
                    CaptureKind::Wrong => BallState::Queued,
                };
                self.scale = 1.0;
                Some((kind, delta))
            }
            HoleZone::Attract { pull, distance } => {
                self.vel += pull;
                self.scale = distance;
                None
            }
            HoleZone::Outside => {
                self.scale = 1.0;
                None
            }
        }
    }

    /// Reflect off the first nearby line and consume it
    pub fn check_lines(&mut self, lines: &mut LineSet) -> Option<u32> {
        let threshold = self.radius.trunc() + LINE_SLACK;
        let (id, segment) = lines.find_near(self.pixel_center(), threshold)?;
        let normal = segment_normal(segment.start, segment.end);
        self.vel = reflect_velocity(self.vel, normal);
        lines.remove(id);
        log::debug!("Ball {} bounced off line {}", self.id, id);
        Some(id)
    }
}
