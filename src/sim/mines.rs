//! Mine logic: smart-mine steering, trigger detonation, tether damage

use super::collision::point_segment_distance;
use super::state::GameState;
use super::targeting::{retain_or_acquire, target_pos};

/// Smart mines chase shapes within this range
pub const SMART_MINE_RANGE: f32 = 300.0;
pub const SMART_MINE_SPEED: f32 = 2.0;
/// Damage per frame to shapes lying on a tether
pub const TETHER_DAMAGE: f32 = 0.5;

impl GameState {
    /// Steer, detonate and apply tethers, once per frame
    pub(crate) fn update_mines(&mut self) {
        self.steer_smart_mines();
        self.detonate_mines();
        self.apply_tethers();
    }

    fn steer_smart_mines(&mut self) {
        for mine in self.mines.iter_mut().filter(|m| m.smart) {
            mine.target = retain_or_acquire(&self.shapes, mine.target, mine.pos, SMART_MINE_RANGE);
            match target_pos(&self.shapes, mine.target) {
                Some(to) => {
                    mine.vel = (to - mine.pos).normalize_or_zero() * SMART_MINE_SPEED;
                    mine.pos += mine.vel;
                }
                None => mine.vel = glam::Vec2::ZERO,
            }
        }
    }

    /// Any shape inside a trigger radius sets the mine off
    fn detonate_mines(&mut self) {
        let shapes = &self.shapes;
        let mut blasts = Vec::new();
        self.mines.retain(|mine| {
            let triggered = shapes
                .iter()
                .any(|s| s.is_alive() && mine.pos.distance(s.pos) < mine.trigger_radius + s.radius);
            if triggered {
                blasts.push((mine.pos, mine.explosion_radius, mine.damage));
            }
            !triggered
        });
        for (pos, radius, damage) in blasts {
            self.area_damage(pos, radius, damage, None);
            self.burst(pos, 50, 0xff5733, 10.0);
        }
    }

    /// Shapes on the line between two linked mines take steady damage
    fn apply_tethers(&mut self) {
        let segments: Vec<_> = self
            .mines
            .iter()
            .filter_map(|mine| {
                let other = self.mines.iter().find(|m| Some(m.id) == mine.tether_to)?;
                Some((mine.pos, other.pos))
            })
            .collect();
        for (a, b) in segments {
            for shape in self.shapes.iter_mut().filter(|s| s.is_alive()) {
                if point_segment_distance(shape.pos, a, b) < shape.radius {
                    shape.health -= TETHER_DAMAGE;
                    shape.hit_cooldown = 2;
                }
            }
        }
    }
}
