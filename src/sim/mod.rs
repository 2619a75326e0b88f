//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One frame per tick at a fixed rate
//! - Seeded RNG only
//! - Stable iteration order (ledger order, line insertion order)
//! - No rendering or platform dependencies

pub mod ball;
pub mod board;
pub mod collision;
pub mod ledger;
pub mod line;
pub mod state;
pub mod tick;

pub use ball::{Ball, BallState, Edge, StepReport};
pub use board::{Board, BoardView, Direction, TileType};
pub use ledger::{BallId, CaptureKind, CaptureLedger, ScoreSink, ScoreTable};
pub use line::{Line, LineSet, Segment};
pub use state::{BallView, GameEvent, GamePhase, GameState, Level, Snapshot};
pub use tick::{LineInput, TickInput, tick};
