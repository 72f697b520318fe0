//! Per-kind behaviour for shapes, bosses and the player's followers
//!
//! Everything here is a per-frame integrator: positions move by velocity
//! once per call regardless of frame time, while fire and spawn timers
//! compare wall-clock timestamps.

use glam::Vec2;

use super::classes::Ability;
use super::progression::ActionError;
use super::state::{Drone, GameState, MinionTarget, Owner, Projectile, ShapeKind, Structure};
use super::targeting::{retain_or_acquire, target_pos};
use crate::consts::*;
use crate::{clamp_to_world, direction, heading, zoom_for_level};

/// Drones
pub const DRONE_DAMAGE: f32 = 8.0;
pub const DRONE_HEALTH: f32 = 10.0;
pub const DRONE_SPEED: f32 = 3.5;
pub const DRONE_CONTACT_RADIUS: f32 = 10.0;
pub const DRONE_RANGE: f32 = 500.0;
/// Idle drones drift to a stop inside this distance of the player
pub const DRONE_IDLE_DISTANCE: f32 = 100.0;

/// Turrets
pub const TURRET_ORBIT_RADIUS: f32 = 100.0;
pub const TURRET_ORBIT_SPEED: f32 = 0.01;
pub const TURRET_RANGE: f32 = 400.0;
pub const TURRET_FIRE_MS: f64 = 500.0;
pub const TURRET_DAMAGE: f32 = 10.0;
pub const TURRET_SHOT_SPEED: f32 = 7.0;

/// Clones (and mobile turrets) hold this distance from the player
pub const FOLLOW_DISTANCE: f32 = 80.0;
pub const CLONE_RANGE: f32 = 500.0;
pub const CLONE_FIRE_MS: f64 = 500.0;
pub const CLONE_DAMAGE: f32 = 5.0;
pub const CLONE_SHOT_SPEED: f32 = 8.0;
pub const CLONE_RADIUS: f32 = 12.0;

/// Architect structures
pub const MAX_STRUCTURES: usize = 3;
pub const STRUCTURE_HEALTH: f32 = 200.0;
pub const STRUCTURE_DAMAGE: f32 = 15.0;
pub const STRUCTURE_RANGE: f32 = 400.0;
pub const STRUCTURE_FIRE_MS: f64 = 400.0;

/// Chaser boss shots
const BOSS_FIRE_MS: f64 = 1000.0;
const BOSS_SHOT_SPEED: f32 = 6.0;
const BOSS_SHOT_DAMAGE: f32 = 40.0;
const BOSS_SHOT_RADIUS: f32 = 15.0;
/// Spawner boss minion interval
const MINION_SPAWN_MS: f64 = 2000.0;

impl GameState {
    /// Boss archetypes: chase the player, then shoot, spawn minions or cycle
    /// the shield
    pub(crate) fn update_boss(&mut self, dt_ms: f64) {
        let Some(id) = self.boss else {
            return;
        };
        let now = self.now_ms;
        let player_pos = self.player.pos;
        let Some(boss) = self.shapes.iter_mut().find(|s| s.id == id) else {
            // Removed without going through the death sweep
            self.boss = None;
            return;
        };

        let to_player = (player_pos - boss.pos).normalize_or_zero();
        boss.pos += to_player * boss.kind.speed();
        let (kind, pos) = (boss.kind, boss.pos);

        match kind {
            ShapeKind::ChaserBoss if now - boss.last_action_ms > BOSS_FIRE_MS => {
                boss.last_action_ms = now;
                let shot_id = self.next_entity_id();
                self.projectiles.push(Projectile::bullet(
                    shot_id,
                    Owner::Enemy,
                    pos,
                    to_player * BOSS_SHOT_SPEED,
                    BOSS_SHOT_DAMAGE,
                    BOSS_SHOT_RADIUS,
                    now,
                ));
            }
            ShapeKind::SpawnerBoss if now - boss.last_action_ms > MINION_SPAWN_MS => {
                boss.last_action_ms = now;
                self.spawn_shape(Some(ShapeKind::SpawnerMinion), Some(pos));
            }
            ShapeKind::GuardianBoss => {
                if let Some(shield) = boss.shield.as_mut() {
                    shield.advance(dt_ms);
                }
            }
            _ => {}
        }
    }

    /// Rotation, hit flash, slowing, drift and minion pursuit for every shape
    pub(crate) fn update_shapes(&mut self) {
        let now = self.now_ms;
        let player_pos = self.player.pos;
        for shape in self.shapes.iter_mut() {
            shape.angle += shape.rotation_speed;
            shape.hit_cooldown = shape.hit_cooldown.saturating_sub(1);
            if now < shape.slowed_until_ms {
                shape.vel *= 0.95;
            }

            if let Some(MinionTarget::Player) = shape.target {
                let delta = player_pos - shape.pos;
                if delta.length() > 1.0 {
                    shape.vel = delta.normalize() * shape.kind.speed();
                }
            }
            shape.pos += shape.vel;
        }
    }

    /// Spawn, steer and move drones
    pub(crate) fn update_drones(&mut self) {
        if self.player.tank_class.has(Ability::Drones)
            && self.drones.len() < self.player.max_drones
            && self.now_ms - self.player.last_drone_spawn_ms
                > self.player.tank_class.profile().drone_spawn_ms
        {
            self.player.last_drone_spawn_ms = self.now_ms;
            let id = self.next_entity_id();
            self.drones.push(Drone {
                id,
                pos: self.player.pos,
                vel: Vec2::ZERO,
                health: DRONE_HEALTH,
                target: None,
            });
        }

        let player_pos = self.player.pos;
        for drone in self.drones.iter_mut() {
            drone.target = retain_or_acquire(&self.shapes, drone.target, drone.pos, DRONE_RANGE);
            match target_pos(&self.shapes, drone.target) {
                Some(to) => drone.vel = (to - drone.pos).normalize_or_zero() * DRONE_SPEED,
                None => {
                    let home = player_pos - drone.pos;
                    if home.length() > DRONE_IDLE_DISTANCE {
                        drone.vel = home.normalize() * DRONE_SPEED;
                    } else {
                        drone.vel *= 0.9;
                    }
                }
            }
            drone.pos += drone.vel;
        }
    }

    /// Turrets orbit (or flank, for mobile classes) and shoot at targets
    pub(crate) fn update_turrets(&mut self) {
        let now = self.now_ms;
        let player = &self.player;
        let mobile = player.tank_class.has(Ability::MobileTurrets);
        let mut shots = Vec::new();

        for turret in self.turrets.iter_mut() {
            if mobile {
                let flank = player.angle + turret.side * std::f32::consts::FRAC_PI_2;
                let goal = player.pos + direction(flank) * FOLLOW_DISTANCE;
                turret.pos += (goal - turret.pos) * 0.05;
            } else {
                turret.orbit_angle += TURRET_ORBIT_SPEED;
                turret.pos = player.pos + direction(turret.orbit_angle) * TURRET_ORBIT_RADIUS;
            }

            turret.target =
                retain_or_acquire(&self.shapes, turret.target, turret.pos, TURRET_RANGE);
            if let Some(to) = target_pos(&self.shapes, turret.target) {
                turret.angle = heading(turret.pos, to);
                if now - turret.last_shot_ms > TURRET_FIRE_MS {
                    turret.last_shot_ms = now;
                    shots.push((turret.pos, turret.angle));
                }
            }
        }

        for (pos, angle) in shots {
            self.follower_shot(
                Owner::Player,
                pos,
                angle,
                TURRET_DAMAGE,
                TURRET_SHOT_SPEED,
                PROJECTILE_RADIUS * 0.8,
            );
        }
    }

    /// Clones ease into flank positions and mirror the player's fire
    pub(crate) fn update_clones(&mut self) {
        let now = self.now_ms;
        let (player_pos, player_angle) = (self.player.pos, self.player.angle);
        let mut shots = Vec::new();

        for clone in self.player.clones.iter_mut() {
            let goal = player_pos + direction(player_angle + clone.offset_angle) * FOLLOW_DISTANCE;
            clone.pos += (goal - clone.pos) * 0.1;

            clone.target = retain_or_acquire(&self.shapes, clone.target, clone.pos, CLONE_RANGE);
            match target_pos(&self.shapes, clone.target) {
                Some(to) => {
                    clone.angle = heading(clone.pos, to);
                    if now - clone.last_shot_ms > CLONE_FIRE_MS {
                        clone.last_shot_ms = now;
                        shots.push((clone.pos, clone.angle));
                    }
                }
                None => clone.angle = player_angle,
            }
        }

        for (pos, angle) in shots {
            self.follower_shot(
                Owner::Clone,
                pos,
                angle,
                CLONE_DAMAGE,
                CLONE_SHOT_SPEED,
                CLONE_RADIUS * 0.4,
            );
        }
    }

    /// Structures hold position and shoot whatever is in range
    pub(crate) fn update_structures(&mut self) {
        let now = self.now_ms;
        let mut shots = Vec::new();
        self.structures.retain(|s| s.health > 0.0);
        for structure in self.structures.iter_mut() {
            structure.target =
                retain_or_acquire(&self.shapes, structure.target, structure.pos, STRUCTURE_RANGE);
            if let Some(to) = target_pos(&self.shapes, structure.target) {
                structure.angle = heading(structure.pos, to);
                if now - structure.last_shot_ms > STRUCTURE_FIRE_MS {
                    structure.last_shot_ms = now;
                    shots.push((structure.pos, structure.angle));
                }
            }
        }

        for (pos, angle) in shots {
            self.follower_shot(
                Owner::Player,
                pos,
                angle,
                STRUCTURE_DAMAGE,
                PROJECTILE_BASE_SPEED,
                PROJECTILE_RADIUS,
            );
        }
    }

    /// Build a structure at a screen position (architect classes)
    ///
    /// `screen` is relative to the top-left of a viewport of size `viewport`
    /// centred on the player.
    pub fn place_structure(&mut self, screen: Vec2, viewport: Vec2) -> Result<(), ActionError> {
        if !self.player.tank_class.has(Ability::Architect) {
            return Err(ActionError::NotArchitect);
        }
        if self.structures.len() >= MAX_STRUCTURES {
            log::debug!("Structure limit of {MAX_STRUCTURES} reached");
            return Err(ActionError::StructureCap);
        }
        let zoom = zoom_for_level(self.player.level);
        let world = self.player.pos + (screen - viewport / 2.0) / zoom;
        let id = self.next_entity_id();
        self.structures.push(Structure {
            id,
            pos: clamp_to_world(world, 0.0),
            angle: 0.0,
            health: STRUCTURE_HEALTH,
            target: None,
            last_shot_ms: f64::NEG_INFINITY,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::classes::TankClass;
    use crate::sim::state::{SHIELD_DOWN_MS, SHIELD_UP_MS};

    #[test]
    fn test_chaser_boss_fires_on_interval() {
        let mut state = GameState::new(1);
        let id = state.spawn_boss(Some(ShapeKind::ChaserBoss));
        let start = state.shape(id).unwrap().pos;
        state.now_ms = 1500.0;
        state.update_boss(16.0);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].owner, Owner::Enemy);
        let moved = state.shape(id).unwrap().pos;
        assert!(moved.distance(state.player.pos) < start.distance(state.player.pos));

        state.now_ms += 500.0;
        state.update_boss(16.0);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_spawner_boss_makes_minions() {
        let mut state = GameState::new(1);
        state.spawn_boss(Some(ShapeKind::SpawnerBoss));
        state.now_ms = 2500.0;
        state.update_boss(16.0);
        let minion = state
            .shapes
            .iter()
            .find(|s| s.kind == ShapeKind::SpawnerMinion)
            .expect("minion spawned");
        assert_eq!(minion.target, Some(MinionTarget::Player));

        let before = minion.pos.distance(state.player.pos);
        state.update_shapes();
        let minion = state
            .shapes
            .iter()
            .find(|s| s.kind == ShapeKind::SpawnerMinion)
            .unwrap();
        let after = minion.pos.distance(state.player.pos);
        assert!((before - after - ShapeKind::SpawnerMinion.speed()).abs() < 1e-2);
    }

    #[test]
    fn test_guardian_shield_cycle() {
        let mut state = GameState::new(1);
        let id = state.spawn_boss(Some(ShapeKind::GuardianBoss));
        state.update_boss(SHIELD_UP_MS);
        assert!(!state.shape(id).unwrap().is_shielded());
        state.update_boss(SHIELD_DOWN_MS);
        assert!(state.shape(id).unwrap().is_shielded());
    }

    #[test]
    fn test_missing_boss_clears_slot() {
        let mut state = GameState::new(1);
        state.boss = Some(999);
        state.update_boss(16.0);
        assert_eq!(state.boss, None);
    }

    #[test]
    fn test_minions_walk_to_player() {
        let mut state = GameState::new(1);
        let start = state.player.pos + Vec2::new(100.0, 0.0);
        let id = state.spawn_shape(Some(ShapeKind::SpawnerMinion), Some(start));
        state.update_shapes();
        let minion = state.shape(id).unwrap();
        assert!((minion.pos.x - (start.x - ShapeKind::SpawnerMinion.speed())).abs() < 1e-3);
    }

    #[test]
    fn test_slowed_shapes_lose_speed() {
        let mut state = GameState::new(1);
        let id = state.spawn_shape(Some(ShapeKind::AlphaPentagon), Some(Vec2::new(500.0, 500.0)));
        state.shapes[0].vel = Vec2::new(1.0, 0.0);
        state.shapes[0].slowed_until_ms = 1000.0;
        state.now_ms = 500.0;
        state.update_shapes();
        assert!((state.shape(id).unwrap().vel.x - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_drones_spawn_up_to_cap() {
        let mut state = GameState::new(1);
        state.set_class(TankClass::DroneHybrid);
        for i in 0..20 {
            state.now_ms = 2000.0 * i as f64;
            state.update_drones();
        }
        assert_eq!(state.drones.len(), state.player.max_drones);
    }

    #[test]
    fn test_idle_drone_returns_to_player() {
        let mut state = GameState::new(1);
        state.set_class(TankClass::OverlordSupremo);
        let far = state.player.pos + Vec2::new(400.0, 0.0);
        state.drones.push(Drone {
            id: 77,
            pos: far,
            vel: Vec2::ZERO,
            health: DRONE_HEALTH,
            target: None,
        });
        state.player.last_drone_spawn_ms = state.now_ms;
        state.update_drones();
        let drone = state.drones.iter().find(|d| d.id == 77).unwrap();
        assert!((drone.pos.x - (far.x - DRONE_SPEED)).abs() < 1e-3);
    }

    #[test]
    fn test_turret_fires_at_target() {
        let mut state = GameState::new(1);
        state.set_class(TankClass::LivingFortress);
        let near = state.player.pos + Vec2::new(250.0, 0.0);
        state.spawn_shape(Some(ShapeKind::Pentagon), Some(near));
        state.now_ms = 1000.0;
        state.update_turrets();
        assert!(!state.projectiles.is_empty());
        assert!(state.projectiles.iter().all(|p| p.damage == TURRET_DAMAGE));
    }

    #[test]
    fn test_clones_face_player_heading_without_target() {
        let mut state = GameState::new(1);
        state.set_class(TankClass::SupremeConsciousness);
        state.player.angle = 1.0;
        state.update_clones();
        assert!(state.player.clones.iter().all(|c| c.angle == 1.0));
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_structure_placement_rules() {
        let mut state = GameState::new(1);
        let viewport = Vec2::new(800.0, 600.0);
        assert_eq!(
            state.place_structure(Vec2::new(400.0, 300.0), viewport),
            Err(ActionError::NotArchitect)
        );

        state.set_class(TankClass::SupremeArchitect);
        state.place_structure(Vec2::new(500.0, 300.0), viewport).unwrap();
        assert_eq!(state.structures[0].pos, state.player.pos + Vec2::new(100.0, 0.0));
        for _ in 1..MAX_STRUCTURES {
            state.place_structure(Vec2::new(400.0, 300.0), viewport).unwrap();
        }
        assert_eq!(
            state.place_structure(Vec2::new(400.0, 300.0), viewport),
            Err(ActionError::StructureCap)
        );
    }
}
