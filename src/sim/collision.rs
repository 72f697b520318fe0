//! Collision geometry
//!
//! Circle overlap, beam and tether distance tests, world-edge bounces and the
//! linear falloff every area effect shares. Pure functions only; the combat
//! module decides what a hit means.

use glam::Vec2;

use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

/// Strict circle-circle overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Distance from `point` to the ray starting at `origin` along `dir`
///
/// Points behind the origin measure to the origin itself.
pub fn point_ray_distance(point: Vec2, origin: Vec2, dir: Vec2) -> f32 {
    let dir = dir.normalize_or_zero();
    if dir == Vec2::ZERO {
        return point.distance(origin);
    }
    let t = (point - origin).dot(dir).max(0.0);
    point.distance(origin + dir * t)
}

/// Distance from `point` to the segment `a`-`b`
pub fn point_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Linear falloff for area damage: full at the centre, zero at `radius`
///
/// Targets are only hit while `distance < radius + target_radius`, so a large
/// target can sit past the nominal radius; the factor is floored at zero there
/// instead of healing it.
#[inline]
pub fn falloff_damage(damage: f32, distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    damage * (1.0 - distance / radius).max(0.0)
}

/// Containment test for area effects (strict at the edge)
#[inline]
pub fn in_blast(center: Vec2, radius: f32, target: Vec2, target_radius: f32) -> bool {
    center.distance(target) < radius + target_radius
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce a circle off the world edges
///
/// Returns the inward normal of the edge that was hit, after pushing the
/// position back inside and reflecting the velocity. `None` when the circle is
/// fully inside.
pub fn bounce_off_world(pos: &mut Vec2, vel: &mut Vec2, radius: f32) -> Option<Vec2> {
    let normal = if pos.x - radius < 0.0 {
        pos.x = radius;
        Vec2::X
    } else if pos.x + radius > WORLD_WIDTH {
        pos.x = WORLD_WIDTH - radius;
        Vec2::NEG_X
    } else if pos.y - radius < 0.0 {
        pos.y = radius;
        Vec2::Y
    } else if pos.y + radius > WORLD_HEIGHT {
        pos.y = WORLD_HEIGHT - radius;
        Vec2::NEG_Y
    } else {
        return None;
    };
    *vel = reflect_velocity(*vel, normal);
    Some(normal)
}

/// Whether a point lies outside the world rectangle
#[inline]
pub fn out_of_world(pos: Vec2) -> bool {
    pos.x < 0.0 || pos.y < 0.0 || pos.x > WORLD_WIDTH || pos.y > WORLD_HEIGHT
}
