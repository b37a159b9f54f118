//! Collision detection between agents and obstacle columns
//!
//! The agent hull is the ellipse inscribed in its sprite box, which forgives
//! near misses at the sprite corners the way a pixel mask would. Columns are
//! solid axis-aligned rectangles.

use glam::Vec2;

use super::state::{Agent, Obstacle};
use crate::consts::{AGENT_HEIGHT, AGENT_WIDTH};

/// Axis-aligned rectangle spanning `min..max` on both axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }
}

/// Check an ellipse against an axis-aligned rectangle.
///
/// Scales space by the ellipse radii so the ellipse becomes a unit circle,
/// then clamps the circle center onto the rectangle and compares the
/// remaining distance against the unit radius. Touching exactly does not
/// count as overlap.
pub fn ellipse_rect_overlap(center: Vec2, radii: Vec2, rect: &Rect) -> bool {
    let scaled_center = center / radii;
    let closest = scaled_center.clamp(rect.min / radii, rect.max / radii);
    scaled_center.distance_squared(closest) < 1.0
}

/// Check an agent against both columns of an obstacle.
pub fn agent_hits_obstacle(agent: &Agent, obstacle: &Obstacle) -> bool {
    let radii = Vec2::new(AGENT_WIDTH / 2.0, AGENT_HEIGHT / 2.0);
    let center = agent.pos + radii;

    ellipse_rect_overlap(center, radii, &obstacle.top_rect())
        || ellipse_rect_overlap(center, radii, &obstacle.bottom_rect())
}
