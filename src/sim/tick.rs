//! Fixed timestep simulation tick
//!
//! One call advances the game by one frame at `FPS`.

use glam::Vec2;

use super::ball::BallState;
use super::ledger::BallId;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Line editing command, points in board pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineInput {
    /// Start a new line at a point
    Begin(Vec2),
    /// Extend the line being drawn to a point
    Extend(Vec2),
    /// Finish the line being drawn
    End,
    /// Remove the first line passing near a point
    EraseAt(Vec2),
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pause toggle
    pub pause: bool,
    /// Restart the level (or the campaign once it is over)
    pub restart: bool,
    /// Line edits, applied in order
    pub lines: Vec<LineInput>,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    // Restart is ignored during the bonus countdown of a level that has a successor
    if input.restart {
        if !state.level_over() {
            state.restart_level();
            return;
        }
        if state.is_last_level() {
            state.restart_campaign();
            return;
        }
    }

    // No toggling once the clock has run out or the level is over
    if input.pause && state.phase == GamePhase::Playing {
        state.paused = !state.paused;
    }

    for &cmd in &input.lines {
        apply_line_input(state, cmd);
    }

    // Level clock
    if !state.paused && !state.level_over() {
        state.frame_counter += 1;
    }

    check_time_up(state);

    // Snapshot the window first: captures reorder the ledger mid-loop
    let playable = state.playable();
    for id in playable {
        step_ball(state, id);
    }

    if state.any_queued() && !state.paused {
        state.spawn_frames += 1;
    }

    if !state.level_over() && state.all_captured() {
        state.phase = GamePhase::LevelComplete;
        state.paused = false;
        state.completion_frames = 0;
        state.drawing = None;
        log::info!(
            "Level {} cleared, score {}",
            state.level_index + 1,
            state.score()
        );
        state.events.push(GameEvent::LevelCleared {
            index: state.level_index,
        });
    }

    if state.phase == GamePhase::LevelComplete {
        count_down_bonus(state);
    }
}

fn apply_line_input(state: &mut GameState, cmd: LineInput) {
    let blocked = state.paused || state.level_over();
    match cmd {
        LineInput::Begin(point) => {
            if blocked {
                return;
            }
            let id = state.lines.begin();
            state.drawing = Some((id, point));
        }
        LineInput::Extend(point) => {
            if blocked {
                return;
            }
            let Some((id, last)) = state.drawing else {
                return;
            };
            // The line may have been consumed by a ball mid-stroke
            state.drawing = state
                .lines
                .append_segment(id, last, point)
                .then_some((id, point));
        }
        LineInput::End => {
            if let Some((id, _)) = state.drawing.take() {
                if state.lines.get(id).is_some_and(|l| l.segments.is_empty()) {
                    state.lines.remove(id);
                }
            }
        }
        LineInput::EraseAt(point) => {
            if blocked {
                return;
            }
            if let Some(line) = state.lines.remove_near(point, ERASE_RADIUS) {
                if state.drawing.is_some_and(|(id, _)| id == line.id) {
                    state.drawing = None;
                }
                log::debug!("Erased line {}", line.id);
            }
        }
    }
}

fn check_time_up(state: &mut GameState) {
    if state.phase == GamePhase::Playing {
        let expired = state.remaining_secs().is_some_and(|t| t <= 0.0);
        if expired && !state.all_captured() {
            state.phase = GamePhase::TimeUp;
            log::info!("Time up on level {}", state.level_index + 1);
            state.events.push(GameEvent::TimeUp);
        }
    }
    if state.phase == GamePhase::TimeUp {
        state.paused = true;
    }
}

/// Spawn a ball entering the window, then run its physics step
fn step_ball(state: &mut GameState, id: BallId) {
    let Some(ball) = state.balls.get_mut(id as usize) else {
        log::warn!("Ledger references unknown ball {}", id);
        return;
    };

    if ball.state == BallState::Queued {
        if !ball.spawn(state.board.spawners(), &mut state.rng) {
            return;
        }
        state.events.push(GameEvent::BallSpawned { ball: id });
    }

    let report = ball.step(&state.board, &mut state.lines, &mut state.ledger, state.paused);

    if let Some((kind, delta)) = report.captured {
        state.events.push(GameEvent::Captured {
            ball: id,
            kind,
            delta,
        });
    }
    if let Some(line) = report.line_consumed {
        if state.drawing.is_some_and(|(drawing, _)| drawing == line) {
            state.drawing = None;
        }
        state.events.push(GameEvent::LineConsumed { ball: id, line });
    }
}

/// Convert leftover time to score, then move on
fn count_down_bonus(state: &mut GameState) {
    state.paused = false;
    // Measured once, before this frame's bonus is taken
    let time_left = state.remaining_secs().is_some_and(|t| t > 0.0);

    if time_left {
        if state.completion_frames % 2 == 0 {
            state.ledger.add_bonus(1);
            state.frame_counter += FPS;
        }
        state.completion_frames += 1;
        return;
    }

    if !state.advance_level() {
        state.phase = GamePhase::Finished;
        log::info!("Campaign finished, final score {}", state.score());
        state.events.push(GameEvent::CampaignFinished);
    }
}
