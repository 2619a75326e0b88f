//! Player-drawn lines
//!
//! A line is a polyline in board pixel space built one segment at a time.
//! It deflects at most one ball and is then removed whole.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::distance_to_segment;

/// One straight piece of a line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Distance from `point`, `None` if the segment has no length
    pub fn distance_to(&self, point: Vec2) -> Option<f32> {
        distance_to_segment(point, self.start, self.end)
    }
}

/// An ordered polyline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub id: u32,
    pub segments: Vec<Segment>,
}

impl Line {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            segments: Vec::new(),
        }
    }

    /// Extend the polyline
    pub fn append_segment(&mut self, start: Vec2, end: Vec2) {
        self.segments.push(Segment::new(start, end));
    }

    /// First segment (insertion order) within `threshold` of `point`
    pub fn nearest_segment(&self, point: Vec2, threshold: f32) -> Option<Segment> {
        self.segments
            .iter()
            .find(|s| s.distance_to(point).is_some_and(|d| d <= threshold))
            .copied()
    }
}

/// The set of lines currently on the board
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineSet {
    lines: Vec<Line>,
    next_id: u32,
}

impl LineSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new, empty line and return its id
    pub fn begin(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.lines.push(Line::new(id));
        id
    }

    /// Append a segment to the line with `id`; false if it no longer exists
    pub fn append_segment(&mut self, id: u32, start: Vec2, end: Vec2) -> bool {
        match self.lines.iter_mut().find(|l| l.id == id) {
            Some(line) => {
                line.append_segment(start, end);
                true
            }
            None => false,
        }
    }

    /// First line (insertion order) with a segment within `threshold` of `point`
    pub fn find_near(&self, point: Vec2, threshold: f32) -> Option<(u32, Segment)> {
        self.lines
            .iter()
            .find_map(|l| l.nearest_segment(point, threshold).map(|s| (l.id, s)))
    }

    /// Remove a whole line
    pub fn remove(&mut self, id: u32) -> Option<Line> {
        let idx = self.lines.iter().position(|l| l.id == id)?;
        Some(self.lines.remove(idx))
    }

    /// Remove the first line passing within `threshold` of `point`
    pub fn remove_near(&mut self, point: Vec2, threshold: f32) -> Option<Line> {
        let (id, _) = self.find_near(point, threshold)?;
        self.remove(id)
    }

    pub fn get(&self, id: u32) -> Option<&Line> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
