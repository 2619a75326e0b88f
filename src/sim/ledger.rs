//! Capture scoring and ball ordering
//!
//! The ledger owns the release order of balls. Captured balls leave the
//! playable window: correct captures move to a finished partition, wrong
//! captures go to the back of the queue to be released again. Still-queued
//! balls keep their relative order.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::COLOUR_COUNT;

/// Ball handle (index into the ball arena)
pub type BallId = u32;

/// How a capture resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureKind {
    /// Colours matched; the ball is done
    Correct,
    /// Wrong hole; the ball is re-queued
    Wrong,
}

/// Receives capture results from the physics step
pub trait ScoreSink {
    /// Record a capture of `ball` (current colour `colour`) and return the
    /// score change actually applied
    fn record_capture(&mut self, ball: BallId, colour: u8, kind: CaptureKind) -> i64;
}

/// Per-colour score changes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub increase: [u32; COLOUR_COUNT],
    pub decrease: [u32; COLOUR_COUNT],
}

impl ScoreTable {
    pub fn increase_for(&self, colour: u8) -> u32 {
        self.increase.get(colour as usize).copied().unwrap_or(0)
    }

    pub fn decrease_for(&self, colour: u8) -> u32 {
        self.decrease.get(colour as usize).copied().unwrap_or(0)
    }
}

/// Score, capture counters and the ball ordering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureLedger {
    table: ScoreTable,
    /// Uncaptured balls in release order; wrong captures rejoin at the back
    queue: VecDeque<BallId>,
    /// Correctly captured balls in capture order
    finished: Vec<BallId>,
    correct: u32,
    wrong: u32,
    score: u64,
}

impl CaptureLedger {
    pub fn new(table: ScoreTable, order: impl IntoIterator<Item = BallId>) -> Self {
        Self {
            table,
            queue: order.into_iter().collect(),
            finished: Vec::new(),
            correct: 0,
            wrong: 0,
            score: 0,
        }
    }

    /// Start from a carried-over score
    pub fn with_score(mut self, score: u64) -> Self {
        self.score = score;
        self
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Bonus points outside of captures (end-of-level time bonus)
    pub fn add_bonus(&mut self, points: u64) {
        self.score += points;
    }

    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong
    }

    pub fn table(&self) -> &ScoreTable {
        &self.table
    }

    /// Balls not yet correctly captured, in release order
    pub fn queue(&self) -> impl Iterator<Item = BallId> + '_ {
        self.queue.iter().copied()
    }

    /// Correctly captured balls, in capture order
    pub fn finished(&self) -> &[BallId] {
        &self.finished
    }

    /// Full ordering: queue first, then finished balls
    pub fn order(&self) -> impl Iterator<Item = BallId> + '_ {
        self.queue().chain(self.finished.iter().copied())
    }

    /// Size of the playable window given how many releases have happened
    pub fn window_len(&self, released: u32) -> usize {
        let open = released.saturating_sub(self.correct + self.wrong) as usize;
        open.min(self.queue.len())
    }

    /// Snapshot of the balls currently in play (or due to spawn)
    pub fn playable(&self, released: u32) -> Vec<BallId> {
        self.queue.iter().take(self.window_len(released)).copied().collect()
    }

    /// Move a captured ball out of the playable window
    fn relocate(&mut self, ball: BallId, kind: CaptureKind) {
        let Some(idx) = self.queue.iter().position(|&b| b == ball) else {
            log::warn!("Captured ball {} is not in the queue", ball);
            return;
        };
        self.queue.remove(idx);
        match kind {
            CaptureKind::Correct => self.finished.push(ball),
            CaptureKind::Wrong => self.queue.push_back(ball),
        }
    }
}

impl ScoreSink for CaptureLedger {
    fn record_capture(&mut self, ball: BallId, colour: u8, kind: CaptureKind) -> i64 {
        let before = self.score;
        match kind {
            CaptureKind::Correct => {
                self.score += self.table.increase_for(colour) as u64;
                self.correct += 1;
            }
            CaptureKind::Wrong => {
                self.score = self.score.saturating_sub(self.table.decrease_for(colour) as u64);
                self.wrong += 1;
            }
        }
        self.relocate(ball, kind);
        log::debug!(
            "Ball {} captured ({:?}), score {} -> {}",
            ball,
            kind,
            before,
            self.score
        );
        self.score as i64 - before as i64
    }
}
