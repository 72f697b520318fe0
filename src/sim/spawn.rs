//! Shape and boss spawning

use glam::Vec2;
use rand::Rng;

use super::state::{EntityId, GameState, MinionTarget, Shape, ShapeKind};
use crate::consts::*;
use crate::{clamp_to_world, zoom_for_level};

impl GameState {
    /// Cap on live non-boss shapes
    pub fn shape_cap(&self) -> usize {
        MAX_SHAPES_BASE + self.player.stats.spawn_rate as usize * SHAPES_PER_SPAWN_RATE_POINT
    }

    /// Chance per frame that a new shape appears
    pub fn spawn_probability(&self) -> f64 {
        BASE_SPAWN_PROBABILITY + self.player.stats.spawn_rate as f64 * SPAWN_PROBABILITY_PER_POINT
    }

    /// Insert one shape
    ///
    /// Without a kind, one of the basic shapes is picked (occasionally upgraded
    /// to the miniboss). Without a position, the shape appears just past a
    /// random edge of the player's view.
    pub fn spawn_shape(&mut self, kind: Option<ShapeKind>, pos: Option<Vec2>) -> EntityId {
        let kind = kind.unwrap_or_else(|| {
            let basic = ShapeKind::BASIC[self.rng.random_range(0..ShapeKind::BASIC.len())];
            if self.rng.random_bool(MINIBOSS_SPAWN_CHANCE) {
                ShapeKind::AlphaPentagon
            } else {
                basic
            }
        });
        let pos = match pos {
            Some(p) => p,
            None => self.offscreen_point(kind.radius()),
        };

        let id = self.next_entity_id();
        let mut shape = Shape::new(id, kind, pos);
        shape.last_action_ms = self.now_ms;
        shape.angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        shape.rotation_speed = if kind.is_boss() {
            0.005
        } else {
            (self.rng.random::<f32>() - 0.5) * 0.02
        };
        match kind {
            ShapeKind::AlphaPentagon => {
                shape.vel = Vec2::new(
                    (self.rng.random::<f32>() - 0.5) * 2.0,
                    (self.rng.random::<f32>() - 0.5) * 2.0,
                );
            }
            ShapeKind::SpawnerMinion => shape.target = Some(MinionTarget::Player),
            _ => {}
        }
        self.shapes.push(shape);
        id
    }

    /// A point just outside the current view, clamped into the world
    fn offscreen_point(&mut self, radius: f32) -> Vec2 {
        let zoom = zoom_for_level(self.player.level);
        let half = self.viewport / (2.0 * zoom) + Vec2::splat(SPAWN_MARGIN);
        let center = self.player.pos;

        let pos = if self.rng.random_bool(0.5) {
            let side = if self.rng.random_bool(0.5) { -1.0 } else { 1.0 };
            Vec2::new(
                center.x + side * half.x,
                center.y + self.rng.random_range(-half.y..=half.y),
            )
        } else {
            let side = if self.rng.random_bool(0.5) { -1.0 } else { 1.0 };
            Vec2::new(
                center.x + self.rng.random_range(-half.x..=half.x),
                center.y + side * half.y,
            )
        };
        clamp_to_world(pos, radius)
    }

    /// Count down the boss timer and release a boss when the slot is free
    pub(crate) fn update_boss_timer(&mut self, dt_ms: f64) {
        self.boss_timer_ms -= dt_ms;
        if self.boss_timer_ms <= 0.0 && self.boss.is_none() {
            self.spawn_boss(None);
            self.boss_timer_ms = self.settings.boss_interval_ms;
        }
    }

    /// Spawn a boss (random archetype unless given) and track it
    pub fn spawn_boss(&mut self, kind: Option<ShapeKind>) -> EntityId {
        let kind = kind.filter(|k| k.is_boss()).unwrap_or_else(|| {
            ShapeKind::BOSSES[self.rng.random_range(0..ShapeKind::BOSSES.len())]
        });
        let id = self.spawn_shape(Some(kind), None);
        self.boss = Some(id);
        log::info!("{kind:?} entered the arena");
        id
    }

    /// Random spawn attempt, run once per frame
    pub(crate) fn maybe_spawn(&mut self) {
        let live = self.shapes.iter().filter(|s| !s.kind.is_boss()).count();
        if live < self.shape_cap() && self.rng.random_bool(self.spawn_probability().min(1.0)) {
            self.spawn_shape(None, None);
        }
    }

    /// Scatter the base population across the world
    pub fn populate(&mut self) {
        for _ in 0..MAX_SHAPES_BASE {
            let pos = Vec2::new(
                self.rng.random_range(0.0..WORLD_WIDTH),
                self.rng.random_range(0.0..WORLD_HEIGHT),
            );
            let kind = ShapeKind::BASIC[self.rng.random_range(0..ShapeKind::BASIC.len())];
            self.spawn_shape(Some(kind), Some(clamp_to_world(pos, kind.radius())));
        }
    }
}
