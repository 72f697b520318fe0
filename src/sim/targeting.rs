//! Target acquisition and steering
//!
//! Followers hold targets by id. A held target is kept while it is still in
//! the store with health left, even if something closer shows up; only a
//! missing or dead target triggers a new nearest-neighbour scan.

use glam::Vec2;

use super::state::{EntityId, Shape};

/// Fraction of the target direction blended into a homing velocity each frame
pub const HOMING_STRENGTH: f32 = 0.02;

/// Nearest live shape strictly closer than `max_range`
///
/// Ties go to the shape that comes first in the store.
pub fn nearest_shape(shapes: &[Shape], from: Vec2, max_range: f32) -> Option<EntityId> {
    let mut best = None;
    let mut best_dist = max_range;
    for shape in shapes.iter().filter(|s| s.is_alive()) {
        let d = from.distance(shape.pos);
        if d < best_dist {
            best_dist = d;
            best = Some(shape.id);
        }
    }
    best
}

/// Keep `current` while it is alive, otherwise scan for a new target
pub fn retain_or_acquire(
    shapes: &[Shape],
    current: Option<EntityId>,
    from: Vec2,
    max_range: f32,
) -> Option<EntityId> {
    match current {
        Some(id) if shapes.iter().any(|s| s.id == id && s.is_alive()) => Some(id),
        _ => nearest_shape(shapes, from, max_range),
    }
}

/// Position of a live target
pub fn target_pos(shapes: &[Shape], id: Option<EntityId>) -> Option<Vec2> {
    let id = id?;
    shapes
        .iter()
        .find(|s| s.id == id && s.is_alive())
        .map(|s| s.pos)
}

/// Curve a velocity toward `target` without changing its speed
pub fn steer_homing(vel: Vec2, pos: Vec2, target: Vec2, strength: f32) -> Vec2 {
    let speed = vel.length();
    let to_target = (target - pos).normalize_or_zero();
    let blended = vel + to_target * strength * speed;
    blended.normalize_or_zero() * speed
}

/// Best shape for autofarm: high XP, close by
pub fn farm_target(shapes: &[Shape], from: Vec2) -> Option<EntityId> {
    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;
    for shape in shapes.iter().filter(|s| s.is_alive()) {
        let score = shape.kind.xp() * 5.0 - from.distance(shape.pos) as f64;
        if score > best_score {
            best_score = score;
            best = Some(shape.id);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ShapeKind;

    fn shape(id: EntityId, kind: ShapeKind, pos: Vec2) -> Shape {
        Shape::new(id, kind, pos)
    }

    #[test]
    fn test_nearest_respects_range() {
        let shapes = vec![
            shape(1, ShapeKind::Square, Vec2::new(100.0, 0.0)),
            shape(2, ShapeKind::Square, Vec2::new(50.0, 0.0)),
        ];
        assert_eq!(nearest_shape(&shapes, Vec2::ZERO, 500.0), Some(2));
        assert_eq!(nearest_shape(&shapes, Vec2::ZERO, 50.0), None);
    }

    #[test]
    fn test_first_found_wins_ties() {
        let shapes = vec![
            shape(4, ShapeKind::Square, Vec2::new(0.0, 30.0)),
            shape(3, ShapeKind::Square, Vec2::new(30.0, 0.0)),
        ];
        assert_eq!(nearest_shape(&shapes, Vec2::ZERO, 500.0), Some(4));
    }

    #[test]
    fn test_held_target_is_kept_over_closer_one() {
        let mut shapes = vec![
            shape(1, ShapeKind::Square, Vec2::new(300.0, 0.0)),
            shape(2, ShapeKind::Square, Vec2::new(10.0, 0.0)),
        ];
        assert_eq!(retain_or_acquire(&shapes, Some(1), Vec2::ZERO, 500.0), Some(1));

        // Dead target is dropped
        shapes[0].health = 0.0;
        assert_eq!(retain_or_acquire(&shapes, Some(1), Vec2::ZERO, 500.0), Some(2));

        // Removed target is dropped
        shapes.remove(0);
        assert_eq!(retain_or_acquire(&shapes, Some(1), Vec2::ZERO, 500.0), Some(2));
    }

    #[test]
    fn test_homing_preserves_speed() {
        let vel = Vec2::new(8.0, 0.0);
        let steered = steer_homing(vel, Vec2::ZERO, Vec2::new(0.0, 100.0), HOMING_STRENGTH);
        assert!((steered.length() - 8.0).abs() < 1e-4);
        assert!(steered.y > 0.0);
        assert!(steered.x > 7.9);
    }

    #[test]
    fn test_farm_prefers_valuable_targets() {
        let shapes = vec![
            shape(1, ShapeKind::Square, Vec2::new(50.0, 0.0)),
            shape(2, ShapeKind::Pentagon, Vec2::new(400.0, 0.0)),
        ];
        assert_eq!(farm_target(&shapes, Vec2::ZERO), Some(2));
    }
}
