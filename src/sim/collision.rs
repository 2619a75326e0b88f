//! Collision geometry
//!
//! Pure helpers shared by the physics step and line editing: closest point on
//! a segment, reflection off a segment normal, the wall flip rule, and the
//! hole capture/attraction zones.

use glam::Vec2;

use crate::consts::*;

/// Segments shorter than this (squared length, pixels) are never near anything
const DEGENERATE_LEN_SQ: f32 = 0.0001;

/// Closest point on segment `a`-`b` to `p`, or `None` for a degenerate segment
///
/// The projection scalar is clamped to [0, 1] so the point stays on the segment.
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Option<Vec2> {
    let line_vec = b - a;
    let line_len_sq = line_vec.length_squared();
    if line_len_sq < DEGENERATE_LEN_SQ {
        return None;
    }
    let t = ((p - a).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    Some(a + line_vec * t)
}

/// Distance from `p` to segment `a`-`b` (`None` when degenerate)
#[inline]
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> Option<f32> {
    closest_point_on_segment(p, a, b).map(|c| c.distance(p))
}

/// Unit normal of segment `a`-`b` (direction rotated 90°)
pub fn segment_normal(a: Vec2, b: Vec2) -> Vec2 {
    let dir = b - a;
    Vec2::new(-dir.y, dir.x).normalize_or_zero()
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Direction a velocity component should have after bouncing off a probed edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounce {
    /// Wall is on the top/left edge; the ball must leave moving down/right
    Positive,
    /// Wall is on the bottom/right edge; the ball must leave moving up/left
    Negative,
}

impl Bounce {
    #[inline]
    fn sign(self) -> f32 {
        match self {
            Bounce::Positive => 1.0,
            Bounce::Negative => -1.0,
        }
    }
}

/// Flip `v` iff it points into the wall, i.e. `|v| * dir == -v`
///
/// A component already moving away from the wall is returned unchanged.
#[inline]
pub fn flip_toward(v: f32, bounce: Bounce) -> f32 {
    if v.abs() * bounce.sign() == -v { -v } else { v }
}

/// What a hole does to a ball at a given distance from its centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoleZone {
    /// Close enough to fall in
    Capture,
    /// Pulled toward the centre; `pull` is the velocity to add
    Attract { pull: Vec2, distance: f32 },
    /// Out of range
    Outside,
}

/// Classify a ball's offset centre against a hole centre (cell units)
pub fn hole_zone(hole_center: Vec2, ball_center: Vec2) -> HoleZone {
    let to_hole = hole_center - ball_center;
    let distance = to_hole.length();

    if distance <= CAPTURE_RADIUS {
        HoleZone::Capture
    } else if distance <= ATTRACTION_RADIUS {
        let mut pull = to_hole * ATTRACTION_PULL;
        if distance <= STRONG_ATTRACTION_RADIUS {
            pull += to_hole * STRONG_ATTRACTION_PULL;
        }
        HoleZone::Attract { pull, distance }
    } else {
        HoleZone::Outside
    }
}

/// Whether a ball of `ball_colour` scores in a hole of `hole_colour`
#[inline]
pub fn colours_match(ball_colour: u8, hole_colour: u8) -> bool {
    ball_colour == hole_colour || ball_colour == WILDCARD || hole_colour == WILDCARD
}
