//! Game state and level lifecycle
//!
//! Everything the frame loop mutates lives here: the loaded board, the ball
//! arena, the active lines, the capture ledger, clocks and the seeded RNG.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallState};
use super::board::Board;
use super::ledger::{BallId, CaptureKind, CaptureLedger, ScoreTable};
use super::line::{LineSet, Segment};
use crate::cells_to_pixels;
use crate::consts::*;

/// A level ready to play
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Level {
    pub board: Board,
    /// Colours of the queued balls, in release order
    pub balls: Vec<u8>,
    /// Seconds between releases
    pub spawn_interval: u32,
    /// Seconds; `None` = unlimited
    pub time_limit: Option<u32>,
    pub scores: ScoreTable,
}

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Balls in play
    Playing,
    /// The clock ran out before every ball was sunk; play is frozen
    TimeUp,
    /// Every ball sunk; remaining time is being converted to score
    LevelComplete,
    /// Last level complete
    Finished,
}

/// Something that happened during a tick, for audio/UI layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { index: usize },
    BallSpawned { ball: BallId },
    Captured { ball: BallId, kind: CaptureKind, delta: i64 },
    LineConsumed { ball: BallId, line: u32 },
    TimeUp,
    LevelCleared { index: usize },
    CampaignFinished,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    levels: Vec<Level>,
    /// Index of the level being played
    pub level_index: usize,
    pub board: Board,
    /// Ball arena; a ball's id is its index
    pub balls: Vec<Ball>,
    pub lines: LineSet,
    pub ledger: CaptureLedger,
    pub paused: bool,
    pub phase: GamePhase,
    /// Frames of level clock elapsed
    pub frame_counter: u32,
    /// Frames counted toward ball releases
    pub spawn_frames: u32,
    /// Frames since the level was completed
    pub(crate) completion_frames: u32,
    /// Balls placed by the layout, released from the start
    preset_count: u32,
    /// Score carried into the current level
    carried_score: u64,
    /// Line being drawn and the last pointer position
    pub(crate) drawing: Option<(u32, Vec2)>,
    /// Events from the last tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a game over `levels`, starting at the first
    pub fn new(levels: Vec<Level>, seed: u64) -> Self {
        let levels = if levels.is_empty() {
            log::warn!("No levels supplied, starting on an empty board");
            vec![Level::default()]
        } else {
            levels
        };

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            levels,
            level_index: 0,
            board: Board::default(),
            balls: Vec::new(),
            lines: LineSet::new(),
            ledger: CaptureLedger::default(),
            paused: false,
            phase: GamePhase::Playing,
            frame_counter: 0,
            spawn_frames: 0,
            completion_frames: 0,
            preset_count: 0,
            carried_score: 0,
            drawing: None,
            events: Vec::new(),
        };
        state.load_level(0);
        state
    }

    /// Replace the current level with `index`, keeping the carried score
    pub fn load_level(&mut self, index: usize) {
        let index = index.min(self.levels.len() - 1);
        let level = &self.levels[index];

        self.level_index = index;
        self.board = level.board.clone();
        self.balls.clear();

        // Layout balls first, already on the board
        let presets = self.board.preset_balls();
        for (cell, colour) in &presets {
            let mut ball = Ball::new(self.balls.len() as BallId, *colour);
            ball.spawn_at(*cell, &mut self.rng);
            self.balls.push(ball);
        }
        for &colour in &level.balls {
            self.balls.push(Ball::new(self.balls.len() as BallId, colour));
        }

        self.preset_count = presets.len() as u32;
        self.ledger = CaptureLedger::new(level.scores.clone(), self.balls.iter().map(|b| b.id))
            .with_score(self.carried_score);
        self.lines.clear();
        self.drawing = None;
        self.paused = false;
        self.phase = GamePhase::Playing;
        self.frame_counter = 0;
        self.spawn_frames = 0;
        self.completion_frames = 0;

        log::info!(
            "Level {}: {} balls ({} preset), {} spawners, time limit {:?}",
            index + 1,
            self.balls.len(),
            self.preset_count,
            self.board.spawners().len(),
            level.time_limit
        );
        self.events.push(GameEvent::LevelStarted { index });
    }

    /// Replay the current level from the score it started with
    pub fn restart_level(&mut self) {
        self.load_level(self.level_index);
    }

    /// Start over from the first level with no score
    pub fn restart_campaign(&mut self) {
        self.carried_score = 0;
        self.load_level(0);
    }

    /// Move on after a completed level; false if it was the last
    pub fn advance_level(&mut self) -> bool {
        if self.is_last_level() {
            return false;
        }
        self.carried_score = self.ledger.score();
        self.load_level(self.level_index + 1);
        true
    }

    pub fn level(&self) -> &Level {
        &self.levels[self.level_index]
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_last_level(&self) -> bool {
        self.level_index + 1 >= self.levels.len()
    }

    pub fn score(&self) -> u64 {
        self.ledger.score()
    }

    /// Level over: every ball sunk (bonus countdown or campaign end)
    pub fn level_over(&self) -> bool {
        matches!(self.phase, GamePhase::LevelComplete | GamePhase::Finished)
    }

    pub fn all_captured(&self) -> bool {
        self.balls
            .iter()
            .all(|b| b.state == BallState::CapturedCorrect)
    }

    /// Level clock in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.frame_counter as f32 / FPS as f32
    }

    /// Seconds left on a limited clock
    pub fn remaining_secs(&self) -> Option<f32> {
        self.level()
            .time_limit
            .map(|limit| limit as f32 - self.elapsed_secs())
    }

    /// Number of releases so far, preset balls included
    pub fn released(&self) -> u32 {
        let interval = self.level().spawn_interval.max(1);
        (self.spawn_frames / FPS) / interval + self.preset_count
    }

    /// Balls in the playable window this frame
    pub fn playable(&self) -> Vec<BallId> {
        self.ledger.playable(self.released())
    }

    pub fn any_queued(&self) -> bool {
        self.balls.iter().any(|b| b.state == BallState::Queued)
    }

    /// Colours of the next queued balls, in release order
    pub fn upcoming(&self) -> Vec<u8> {
        self.ledger
            .queue()
            .filter_map(|id| self.balls.get(id as usize))
            .filter(|b| b.state == BallState::Queued)
            .take(UPCOMING_SHOWN)
            .map(|b| b.colour)
            .collect()
    }

    /// Seconds until the next release, if anything is waiting
    pub fn next_release_secs(&self) -> Option<f32> {
        if !self.any_queued() {
            return None;
        }
        let interval = self.level().spawn_interval.max(1) as f32;
        let spawn_secs = self.spawn_frames as f32 / FPS as f32;
        Some(interval - spawn_secs % interval)
    }

    /// Serializable view for rendering and the HUD
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            level: self.level_index + 1,
            phase: self.phase,
            paused: self.paused,
            score: self.score(),
            correct: self.ledger.correct_count(),
            wrong: self.ledger.wrong_count(),
            time_remaining: self.remaining_secs().map(|t| t.max(0.0)),
            next_release: self.next_release_secs(),
            upcoming: self.upcoming(),
            balls: self
                .balls
                .iter()
                .map(|b| BallView {
                    id: b.id,
                    state: b.state,
                    pos: cells_to_pixels(b.pos),
                    vel: b.vel,
                    colour: b.colour,
                    size: b.radius() * 2.0 * b.scale,
                })
                .collect(),
            lines: self.lines.iter().map(|l| l.segments.clone()).collect(),
        }
    }
}

/// A ball as the renderer sees it; only `Active` balls are drawn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallView {
    pub id: BallId,
    pub state: BallState,
    /// Top-left of the sprite in board pixels
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    pub colour: u8,
    /// Drawn diameter in pixels
    pub size: f32,
}

/// Per-frame output for the rendering / HUD layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub level: usize,
    pub phase: GamePhase,
    pub paused: bool,
    pub score: u64,
    pub correct: u32,
    pub wrong: u32,
    pub time_remaining: Option<f32>,
    pub next_release: Option<f32>,
    pub upcoming: Vec<u8>,
    pub balls: Vec<BallView>,
    pub lines: Vec<Vec<Segment>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(layout: &str, balls: &[u8]) -> Level {
        Level {
            board: Board::parse(layout),
            balls: balls.to_vec(),
            spawn_interval: 2,
            time_limit: Some(60),
            scores: ScoreTable {
                increase: [10; COLOUR_COUNT],
                decrease: [5; COLOUR_COUNT],
            },
        }
    }

    #[test]
    fn test_new_loads_first_level() {
        let state = GameState::new(vec![level("S\n", &[1, 2])], 12345);
        assert_eq!(state.level_index, 0);
        assert_eq!(state.balls.len(), 2);
        assert!(state.balls.iter().all(|b| b.state == BallState::Queued));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.events, vec![GameEvent::LevelStarted { index: 0 }]);
    }

    #[test]
    fn test_preset_balls_spawn_at_load() {
        let state = GameState::new(vec![level("S B3\n", &[1])], 1);
        assert_eq!(state.balls.len(), 2);
        let preset = &state.balls[0];
        assert_eq!(preset.colour, 3);
        assert!(preset.is_active());
        assert_eq!(preset.pos, Vec2::new(2.0, 0.0) + Vec2::splat(preset.spawn_offset()));
        // Preset balls count as released immediately
        assert_eq!(state.released(), 1);
        assert_eq!(state.playable(), vec![0]);
        assert_eq!(state.upcoming(), vec![1]);
    }

    #[test]
    fn test_release_schedule() {
        let mut state = GameState::new(vec![level("S\n", &[1, 2, 3])], 1);
        assert_eq!(state.released(), 0);
        state.spawn_frames = 2 * FPS;
        assert_eq!(state.released(), 1);
        state.spawn_frames = 4 * FPS + 10;
        assert_eq!(state.released(), 2);
        let next = state.next_release_secs().unwrap();
        assert!((next - (2.0 - 10.0 / FPS as f32)).abs() < 1e-4);
    }

    #[test]
    fn test_empty_level_list_is_inert() {
        let state = GameState::new(Vec::new(), 1);
        assert_eq!(state.level_count(), 1);
        assert!(state.balls.is_empty());
        assert!(state.all_captured());
    }

    #[test]
    fn test_advance_carries_score() {
        let mut state = GameState::new(vec![level("S\n", &[1]), level("S\n", &[2])], 1);
        state.ledger.add_bonus(40);
        assert!(state.advance_level());
        assert_eq!(state.level_index, 1);
        assert_eq!(state.score(), 40);
        assert!(!state.advance_level());

        state.ledger.add_bonus(5);
        state.restart_level();
        assert_eq!(state.score(), 40);

        state.restart_campaign();
        assert_eq!(state.level_index, 0);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(vec![level("S B0\n", &[1, 4])], 9);
        let snap = state.snapshot();
        assert_eq!(snap.balls.len(), 3);
        let preset = &snap.balls[0];
        assert_eq!(preset.state, BallState::Active);
        assert_eq!(preset.vel, state.balls[0].vel);
        assert_eq!(preset.pos, Vec2::new(2.0 * CELL_SIZE + 4.0, 4.0));
        assert!(snap.balls[1..].iter().all(|b| b.state == BallState::Queued));
        assert_eq!(snap.upcoming, vec![1, 4]);
        assert_eq!(snap.time_remaining, Some(60.0));
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"score\":0"));
    }
}
