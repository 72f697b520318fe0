//! Collision and damage resolution
//!
//! Runs once per frame as a fixed sequence of passes. Each pass sees the
//! stores as the previous pass left them:
//! 1. defensive shots annihilate enemy shots and send them back
//! 2. lasers and waves (each shape damaged once per beam / ring)
//! 3. bullets against shapes, shields, explosions
//! 4. enemy shots against the player
//! 5. drones ramming shapes
//!
//! The death sweep and body collisions are separate pipeline phases.

use glam::Vec2;
use rand::Rng;

use super::ai::{DRONE_CONTACT_RADIUS, DRONE_DAMAGE, DRONE_HEALTH};
use super::classes::Ability;
use super::collision::{circles_overlap, falloff_damage, in_blast, point_ray_distance};
use super::state::{DelayedExplosion, Drone, EntityId, GameState, Owner, Projectile, ProjectileKind};
use crate::consts::*;
use crate::heading;

/// How long a slowing hit lasts
pub const SLOW_DURATION_MS: f64 = 1000.0;
/// Chain reactions: follow-up blast scaling and delay
pub const CHAIN_RADIUS_MULT: f32 = 1.5;
pub const CHAIN_DAMAGE_MULT: f32 = 1.2;
pub const CHAIN_DELAY_MS: f64 = 300.0;
/// Spirit of Peace takes this much less damage
pub const DAMAGE_REDUCTION: f32 = 0.3;
/// Channelers turn this share of damage taken into XP
pub const CHANNELER_XP_RATIO: f32 = 0.5;
/// Damage reflection shards
pub const REFLECTION_SHARDS: usize = 8;
pub const REFLECTION_DAMAGE_MOD: f32 = 0.25;

/// An impact blast waiting to be applied
#[derive(Debug, Clone, Copy)]
struct Blast {
    pos: Vec2,
    radius: f32,
    damage: f32,
    /// The shape hit directly already took full damage
    skip: Option<EntityId>,
    chain: bool,
}

impl GameState {
    /// Every projectile pass, in order
    pub(crate) fn resolve_collisions(&mut self) {
        self.reflect_enemy_shots();
        self.resolve_beams();
        self.resolve_projectile_hits();
        self.resolve_shots_at_player();
        self.resolve_drone_hits();
    }

    /// Defensive player shots cancel against enemy shots, which turn around
    fn reflect_enemy_shots(&mut self) {
        let n = self.projectiles.len();
        let mut spent = vec![false; n];
        for i in 0..n {
            let shield = &self.projectiles[i];
            if !(shield.defensive && shield.owner == Owner::Player) {
                continue;
            }
            let (pos, radius) = (shield.pos, shield.radius);
            let hit = (0..n).find(|&j| {
                let other = &self.projectiles[j];
                j != i
                    && !spent[j]
                    && other.owner == Owner::Enemy
                    && !other.reflected
                    && circles_overlap(pos, radius, other.pos, other.radius)
            });
            if let Some(j) = hit {
                spent[i] = true;
                self.projectiles[j].reflect(Owner::Player);
            }
        }
        retain_unspent(&mut self.projectiles, &spent);
    }

    /// Lasers hit everything along their ray, waves everything inside their
    /// ring. Neither hits the same shape twice or touches shielded shapes.
    fn resolve_beams(&mut self) {
        let mut sparks = Vec::new();
        for p in self.projectiles.iter_mut() {
            if !p.owner.is_friendly() || p.kind == ProjectileKind::Bullet {
                continue;
            }
            for shape in self.shapes.iter_mut() {
                if !shape.is_alive() || shape.is_shielded() || p.pierced.contains(&shape.id) {
                    continue;
                }
                let reach = shape.radius + p.radius;
                let hit = match p.kind {
                    ProjectileKind::Laser => point_ray_distance(shape.pos, p.pos, p.vel) < reach,
                    _ => p.pos.distance(shape.pos) < reach,
                };
                if hit {
                    shape.take_damage(p.damage);
                    p.pierced.push(shape.id);
                    sparks.push(shape.pos);
                }
            }
        }
        for pos in sparks {
            self.burst(pos, 5, 0xffa500, 5.0);
        }
    }

    /// Bullets against shapes
    fn resolve_projectile_hits(&mut self) {
        let now = self.now_ms;
        let mut spent = vec![false; self.projectiles.len()];
        let mut blasts = Vec::new();
        let mut sparks = Vec::new();

        for (pi, p) in self.projectiles.iter_mut().enumerate() {
            if !p.owner.is_friendly() || p.passes_through() {
                continue;
            }
            for shape in self.shapes.iter_mut() {
                if !shape.is_alive() || !circles_overlap(p.pos, p.radius, shape.pos, shape.radius) {
                    continue;
                }
                if shape.is_shielded() {
                    p.reflect(Owner::Enemy);
                    break;
                }

                shape.take_damage(p.damage);
                if p.slows {
                    shape.slowed_until_ms = now + SLOW_DURATION_MS;
                }
                spent[pi] = true;
                sparks.push((p.pos, if p.invisible { 20 } else { 3 }));
                if let Some(radius) = p.explosion_radius {
                    blasts.push(Blast {
                        pos: p.pos,
                        radius,
                        damage: p.damage,
                        skip: Some(shape.id),
                        chain: p.chain,
                    });
                }
                break;
            }
        }
        retain_unspent(&mut self.projectiles, &spent);

        for (pos, count) in sparks {
            self.burst(pos, count, 0xffa500, 5.0);
        }
        for blast in blasts {
            if blast.chain {
                self.delayed_explosions.push(DelayedExplosion {
                    pos: blast.pos,
                    radius: blast.radius * CHAIN_RADIUS_MULT,
                    damage: blast.damage * CHAIN_DAMAGE_MULT,
                    remaining_ms: CHAIN_DELAY_MS,
                });
            }
            self.area_damage(blast.pos, blast.radius, blast.damage, blast.skip);
            self.burst(blast.pos, 40, 0xff5733, 8.0);
        }
    }

    /// Enemy shots that reach the player
    fn resolve_shots_at_player(&mut self) {
        let (pos, radius) = (self.player.pos, self.player.radius);
        let mut hits = Vec::new();
        self.projectiles.retain(|p| {
            let hit = p.owner == Owner::Enemy && circles_overlap(p.pos, p.radius, pos, radius);
            if hit {
                hits.push(p.damage);
            }
            !hit
        });
        for damage in hits {
            self.damage_player(damage, None);
        }
    }

    /// Drones ram the first shape they touch and are used up
    fn resolve_drone_hits(&mut self) {
        let splitting = self.player.tank_class.has(Ability::DroneSplitting);
        let mut survivors = Vec::with_capacity(self.drones.len());
        let mut spawned = Vec::new();
        let drones = std::mem::take(&mut self.drones);
        let mut count = drones.len();

        for drone in drones {
            let hit = self.shapes.iter_mut().find(|s| {
                s.is_alive() && drone.pos.distance(s.pos) < DRONE_CONTACT_RADIUS + s.radius
            });
            let Some(shape) = hit else {
                survivors.push(drone);
                continue;
            };
            shape.take_damage(DRONE_DAMAGE);
            if splitting && count < self.player.max_drones.saturating_sub(1) {
                spawned.push(drone.pos);
                spawned.push(drone.pos);
                count += 2;
            }
            count -= 1;
            self.burst(drone.pos, 5, 0xa78bfa, 5.0);
        }

        for pos in spawned {
            let id = self.next_entity_id();
            let vel = Vec2::new(self.rng.random::<f32>() - 0.5, self.rng.random::<f32>() - 0.5);
            survivors.push(Drone {
                id,
                pos,
                vel,
                health: DRONE_HEALTH,
                target: None,
            });
        }
        self.drones = survivors;
    }

    /// Falloff damage to every unshielded shape inside the blast
    pub(crate) fn area_damage(
        &mut self,
        center: Vec2,
        radius: f32,
        damage: f32,
        skip: Option<EntityId>,
    ) {
        for shape in self.shapes.iter_mut() {
            if Some(shape.id) == skip || shape.is_shielded() {
                continue;
            }
            if in_blast(center, radius, shape.pos, shape.radius) {
                let d = center.distance(shape.pos);
                shape.take_damage(falloff_damage(damage, d, radius));
            }
        }
    }

    /// Count down scheduled blasts and set off the ones that are due
    pub(crate) fn update_delayed_explosions(&mut self, dt_ms: f64) {
        let mut due = Vec::new();
        self.delayed_explosions.retain_mut(|e| {
            e.remaining_ms -= dt_ms;
            if e.remaining_ms <= 0.0 {
                due.push((e.pos, e.radius, e.damage));
                false
            } else {
                true
            }
        });
        for (pos, radius, damage) in due {
            self.area_damage(pos, radius, damage, None);
            self.burst(pos, 60, 0xff5733, 12.0);
        }
    }

    /// Remove dead shapes and pay out their XP
    pub(crate) fn death_sweep(&mut self) {
        let (dead, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut self.shapes)
            .into_iter()
            .partition(|s| !s.is_alive());
        self.shapes = alive;
        for shape in &dead {
            self.award_kill(shape);
        }
    }

    /// Shapes touching the player hurt it and are destroyed on the spot
    pub(crate) fn body_collisions(&mut self) {
        let (pos, radius) = (self.player.pos, self.player.radius);
        let (touched, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.shapes)
            .into_iter()
            .partition(|s| circles_overlap(pos, radius, s.pos, s.radius));
        self.shapes = kept;

        for mut shape in touched {
            self.damage_player(shape.kind.body_damage(), Some(shape.pos));
            let away = (self.player.pos - shape.pos).normalize_or_zero();
            self.player.vel += away * BODY_KNOCKBACK;

            shape.health -= BODY_COLLISION_DAMAGE;
            if !shape.is_alive() {
                self.award_kill(&shape);
            }
            if self.boss == Some(shape.id) {
                self.boss = None;
            }
        }
    }

    /// Single entry for all damage the player takes. `attacker` is set for
    /// body hits and aims damage-reflection shards.
    pub fn damage_player(&mut self, amount: f32, attacker: Option<Vec2>) {
        let class = self.player.tank_class;
        let mut damage = amount.max(0.0);
        if class.has(Ability::DamageReduction) {
            damage *= 1.0 - DAMAGE_REDUCTION;
        }

        if let Some(source) = attacker.filter(|_| class.has(Ability::DamageReflection)) {
            let toward = heading(self.player.pos, source);
            for _ in 0..REFLECTION_SHARDS {
                let angle =
                    toward + (self.rng.random::<f32>() - 0.5) * std::f32::consts::FRAC_PI_2;
                let pos = self.player.pos;
                self.follower_shot(
                    Owner::Player,
                    pos,
                    angle,
                    damage * REFLECTION_DAMAGE_MOD,
                    7.0,
                    4.0,
                );
            }
        }

        self.player.health = (self.player.health - damage).max(0.0);
        if class.has(Ability::Channeler) {
            self.player.xp += (damage * CHANNELER_XP_RATIO) as f64;
        }
        self.player.last_damage_ms = self.now_ms;
        let particles = if attacker.is_some() { 15 } else { 10 };
        self.burst(self.player.pos, particles, 0xff4d4d, 5.0);

        if self.player.health <= 0.0 && !self.game_over {
            self.game_over = true;
            self.burst(self.player.pos, 50, 0x00bfff, 5.0);
            log::info!(
                "Run over at level {} as {:?}, score {}",
                self.player.level,
                class,
                self.score
            );
        }
    }

    /// Gravity aura pulls enemy shots in and swallows them at the hull
    pub(crate) fn gravity_pull(&mut self, p: &mut Projectile, dt_ms: f64) -> bool {
        const AURA_RADIUS: f32 = 300.0;
        const PULL_STRENGTH: f32 = 15.0;
        if !self.player.gravity_aura_active || p.owner != Owner::Enemy {
            return true;
        }
        let delta = self.player.pos - p.pos;
        let dist = delta.length();
        if dist >= AURA_RADIUS {
            return true;
        }
        let force = (1.0 - dist / AURA_RADIUS) * PULL_STRENGTH;
        p.vel += delta.normalize_or_zero() * force * (dt_ms / 1000.0) as f32;
        if dist < self.player.radius {
            self.burst(p.pos, 5, 0x805ad5, 4.0);
            return false;
        }
        true
    }
}

fn retain_unspent(projectiles: &mut Vec<Projectile>, spent: &[bool]) {
    let mut i = 0;
    projectiles.retain(|_| {
        let keep = !spent[i];
        i += 1;
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::classes::TankClass;
    use crate::sim::state::{Shape, ShapeKind};

    fn bullet(state: &mut GameState, pos: Vec2, vel: Vec2, damage: f32) -> EntityId {
        let id = state.next_entity_id();
        let p = Projectile::bullet(id, Owner::Player, pos, vel, damage, PROJECTILE_RADIUS, 0.0);
        state.projectiles.push(p);
        id
    }

    fn place(state: &mut GameState, kind: ShapeKind, pos: Vec2) -> EntityId {
        let id = state.next_entity_id();
        state.shapes.push(Shape::new(id, kind, pos));
        id
    }

    #[test]
    fn test_bullet_kills_square() {
        let mut state = GameState::new(1);
        let pos = Vec2::new(1000.0, 1000.0);
        place(&mut state, ShapeKind::Square, pos);
        bullet(&mut state, pos, Vec2::X, 15.0);

        state.resolve_collisions();
        assert!(state.projectiles.is_empty());
        assert_eq!(state.shapes[0].health, -5.0);
        assert_eq!(state.shapes[0].hit_cooldown, HIT_FLASH_FRAMES);

        state.death_sweep();
        assert!(state.shapes.is_empty());
        assert_eq!(state.player.xp, 10.0);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_shield_reflects_player_shot() {
        let mut state = GameState::new(1);
        let pos = Vec2::new(1000.0, 1000.0);
        let boss = place(&mut state, ShapeKind::GuardianBoss, pos);
        state.boss = Some(boss);
        bullet(&mut state, pos - Vec2::new(50.0, 0.0), Vec2::new(8.0, 0.0), 15.0);

        state.resolve_collisions();
        let shape = state.shape(boss).unwrap();
        assert_eq!(shape.health, shape.max_health);
        let p = &state.projectiles[0];
        assert_eq!(p.owner, Owner::Enemy);
        assert_eq!(p.vel, Vec2::new(-8.0, 0.0));
        assert!(p.reflected);
    }

    #[test]
    fn test_explosion_falloff_spares_far_shapes() {
        let mut state = GameState::new(1);
        let pos = Vec2::new(1000.0, 1000.0);
        place(&mut state, ShapeKind::Pentagon, pos);
        let near = place(&mut state, ShapeKind::Pentagon, pos + Vec2::new(40.0, 0.0));
        let far = place(&mut state, ShapeKind::Pentagon, pos + Vec2::new(300.0, 0.0));
        let id = bullet(&mut state, pos, Vec2::X, 20.0);
        state.projectiles[0].explosion_radius = Some(80.0);
        assert_eq!(state.projectiles[0].id, id);

        state.resolve_collisions();
        assert_eq!(state.shapes[0].health, 30.0);
        assert!((state.shape(near).unwrap().health - 40.0).abs() < 1e-4);
        assert_eq!(state.shape(far).unwrap().health, 50.0);
    }

    #[test]
    fn test_chain_reaction_schedules_follow_up() {
        let mut state = GameState::new(1);
        let pos = Vec2::new(1000.0, 1000.0);
        place(&mut state, ShapeKind::AlphaPentagon, pos);
        bullet(&mut state, pos, Vec2::X, 50.0);
        state.projectiles[0].explosion_radius = Some(100.0);
        state.projectiles[0].chain = true;

        state.resolve_collisions();
        assert_eq!(state.delayed_explosions.len(), 1);
        assert_eq!(state.delayed_explosions[0].radius, 150.0);

        state.update_delayed_explosions(CHAIN_DELAY_MS);
        assert!(state.delayed_explosions.is_empty());
        // 50 direct, then 60 at the centre of the follow-up
        assert!((state.shapes[0].health - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_laser_hits_each_shape_once() {
        let mut state = GameState::new(1);
        let origin = Vec2::new(1000.0, 1000.0);
        let a = place(&mut state, ShapeKind::Pentagon, origin + Vec2::new(200.0, 5.0));
        let b = place(&mut state, ShapeKind::Pentagon, origin + Vec2::new(600.0, -5.0));
        let id = state.next_entity_id();
        let mut beam =
            Projectile::bullet(id, Owner::Player, origin, Vec2::X, 10.0, BARREL_WIDTH, 0.0);
        beam.kind = ProjectileKind::Laser;
        state.projectiles.push(beam);

        state.resolve_collisions();
        state.resolve_collisions();
        assert_eq!(state.shape(a).unwrap().health, 40.0);
        assert_eq!(state.shape(b).unwrap().health, 40.0);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_defensive_shot_returns_enemy_fire() {
        let mut state = GameState::new(1);
        let pos = Vec2::new(500.0, 500.0);
        let shield = bullet(&mut state, pos, Vec2::X, 10.0);
        state.projectiles[0].defensive = true;
        let id = state.next_entity_id();
        let enemy =
            Projectile::bullet(id, Owner::Enemy, pos, Vec2::new(-6.0, 0.0), 40.0, 15.0, 0.0);
        state.projectiles.push(enemy);

        state.resolve_collisions();
        assert!(state.projectiles.iter().all(|p| p.id != shield));
        assert_eq!(state.projectiles[0].owner, Owner::Player);
        assert_eq!(state.projectiles[0].vel, Vec2::new(6.0, 0.0));
    }

    #[test]
    fn test_enemy_shot_hurts_player() {
        let mut state = GameState::new(1);
        let id = state.next_entity_id();
        let pos = state.player.pos;
        state
            .projectiles
            .push(Projectile::bullet(id, Owner::Enemy, pos, Vec2::ZERO, 40.0, 15.0, 0.0));
        state.resolve_collisions();
        assert!(state.projectiles.is_empty());
        assert_eq!(state.player.health, 60.0);
    }

    #[test]
    fn test_damage_modifiers() {
        let mut state = GameState::new(1);
        state.set_class(TankClass::SpiritOfPeace);
        state.damage_player(10.0, None);
        assert!((state.player.health - 93.0).abs() < 1e-4);

        let mut state = GameState::new(1);
        state.set_class(TankClass::Channeler);
        state.damage_player(10.0, None);
        assert_eq!(state.player.xp, 5.0);

        let mut state = GameState::new(1);
        state.set_class(TankClass::CrystalColossus);
        let from = state.player.pos + Vec2::new(30.0, 0.0);
        state.damage_player(40.0, Some(from));
        assert_eq!(state.projectiles.len(), REFLECTION_SHARDS);
        assert!(state.projectiles.iter().all(|p| p.vel.x > 0.0 && p.damage == 10.0));
    }

    #[test]
    fn test_body_collision_kills_and_pays_once() {
        let mut state = GameState::new(1);
        let pos = state.player.pos + Vec2::new(15.0, 0.0);
        place(&mut state, ShapeKind::Triangle, pos);

        state.death_sweep();
        state.body_collisions();
        assert!(state.shapes.is_empty());
        assert_eq!(state.player.xp, 25.0);
        assert_eq!(state.player.health, PLAYER_START_HEALTH - 12.0);
        assert!(state.player.vel.x < 0.0);
    }

    #[test]
    fn test_body_collision_clears_boss_without_reward() {
        let mut state = GameState::new(1);
        let pos = state.player.pos + Vec2::new(50.0, 0.0);
        let boss = place(&mut state, ShapeKind::ChaserBoss, pos);
        state.boss = Some(boss);

        state.body_collisions();
        assert!(state.shapes.is_empty());
        assert_eq!(state.boss, None);
        assert_eq!(state.player.xp, 0.0);
    }

    #[test]
    fn test_health_floors_at_zero_and_ends_run() {
        let mut state = GameState::new(1);
        state.damage_player(500.0, None);
        assert_eq!(state.player.health, 0.0);
        assert!(state.game_over);
    }

    #[test]
    fn test_splitting_drones_replace_themselves() {
        let mut state = GameState::new(1);
        state.set_class(TankClass::CosmicOvermind);
        let pos = Vec2::new(800.0, 800.0);
        place(&mut state, ShapeKind::Pentagon, pos);
        let id = state.next_entity_id();
        state.drones.push(Drone {
            id,
            pos,
            vel: Vec2::ZERO,
            health: DRONE_HEALTH,
            target: None,
        });

        state.resolve_collisions();
        assert_eq!(state.drones.len(), 2);
        assert!(state.drones.iter().all(|d| d.id != id));
        assert_eq!(state.shapes[0].health, 50.0 - DRONE_DAMAGE);
    }
}
