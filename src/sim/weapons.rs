//! Firing
//!
//! The trigger reads the class profile once and interprets its
//! [`FirePattern`]. Followers (drones, turrets, clones, structures) use
//! [`GameState::follower_shot`] from their own update loops.

use glam::Vec2;
use rand::Rng;

use super::classes::{AMMO_EXPLOSION_RADIUS, Ability, AmmoModifiers, FirePattern};
use super::state::{GameState, Growth, Mine, Owner, Projectile, ProjectileKind};
use super::targeting::nearest_shape;
use crate::consts::*;
use crate::direction;

/// Mine numbers
pub const MINE_DAMAGE: f32 = 100.0;
pub const MINE_RADIUS: f32 = 8.0;
pub const MINE_TRIGGER_RADIUS: f32 = 40.0;
pub const MINE_EXPLOSION_RADIUS: f32 = 120.0;
/// Mines further apart than this are never tethered
pub const TETHER_RANGE: f32 = 150.0;
/// Seeker shots lock onto shapes within this range when fired
pub const SEEKER_RANGE: f32 = 400.0;
/// Starting radius of a wave ring
pub const WAVE_START_RADIUS: f32 = 0.0;

/// Everything a single player shot needs besides its position and angle
#[derive(Debug, Clone, Copy)]
struct Shot {
    damage: f32,
    speed: f32,
    radius: f32,
}

impl GameState {
    /// Pull the trigger if the class fires and the cooldown has elapsed.
    /// Returns whether anything was emitted.
    pub(crate) fn try_fire(&mut self) -> bool {
        let class = self.player.tank_class;
        if !class.fires_from_trigger() {
            return false;
        }
        let profile = class.profile();
        if self.now_ms - self.player.last_shot_ms < profile.fire_rate_ms {
            return false;
        }
        self.player.last_shot_ms = self.now_ms;

        let angle = self.player.angle;
        if profile.recoil > 0.0 {
            self.player.vel -= direction(angle) * profile.recoil;
            self.player.recoil_offset = 10.0;
        }

        let ammo = self
            .player
            .current_ammo
            .map(|a| a.modifiers())
            .unwrap_or_default();
        let base = Shot {
            damage: profile.damage * ammo.damage,
            speed: PROJECTILE_BASE_SPEED * profile.speed_mod * ammo.speed,
            radius: PROJECTILE_RADIUS * ammo.radius,
        };
        let muzzle = self.player.muzzle(angle);
        let side = direction(angle).perp();

        match profile.pattern {
            FirePattern::Single { radius } => {
                let shot = Shot {
                    radius: radius.map_or(base.radius, |r| r * ammo.radius),
                    ..base
                };
                self.player_bullet(muzzle, angle, shot, ammo);
            }
            FirePattern::Twin { spacing, radius } => {
                let shot = Shot {
                    radius: radius.map_or(base.radius, |r| r * ammo.radius),
                    ..base
                };
                for s in [-1.0_f32, 1.0] {
                    self.player_bullet(muzzle + side * spacing * s, angle, shot, ammo);
                }
            }
            FirePattern::Spread { offsets } => {
                for &offset in offsets {
                    let a = angle + offset;
                    self.player_bullet(self.player.muzzle(a), a, base, ammo);
                }
            }
            FirePattern::Ring { count } => {
                for i in 0..count {
                    let a = angle + i as f32 * std::f32::consts::TAU / count as f32;
                    self.player_bullet(self.player.muzzle(a), a, base, ammo);
                }
            }
            FirePattern::Wall {
                half_width,
                spacing,
                radius,
                speed_mod,
                damage_mod,
            } => {
                let shot = Shot {
                    damage: base.damage * damage_mod,
                    speed: base.speed * speed_mod,
                    radius: radius * ammo.radius,
                };
                for i in -half_width..=half_width {
                    let pos = muzzle + side * spacing * i as f32;
                    self.player_bullet(pos, angle, shot, ammo);
                }
            }
            FirePattern::Mine => self.lay_mine(),
            FirePattern::Laser => {
                let id = self.next_entity_id();
                let mut beam = Projectile::bullet(
                    id,
                    Owner::Player,
                    self.player.pos,
                    direction(angle) * base.speed,
                    base.damage,
                    BARREL_WIDTH,
                    self.now_ms,
                );
                beam.kind = ProjectileKind::Laser;
                self.projectiles.push(beam);
                self.burst(muzzle, 5, 0x66ffff, 4.0);
            }
            FirePattern::Wave => {
                let id = self.next_entity_id();
                let mut wave = Projectile::bullet(
                    id,
                    Owner::Player,
                    self.player.pos,
                    Vec2::ZERO,
                    base.damage,
                    WAVE_START_RADIUS,
                    self.now_ms,
                );
                wave.kind = ProjectileKind::Wave;
                self.projectiles.push(wave);
            }
        }
        true
    }

    /// Emit one player bullet with every behaviour the class grants
    fn player_bullet(&mut self, pos: Vec2, angle: f32, shot: Shot, ammo: AmmoModifiers) {
        let class = self.player.tank_class;
        let profile = class.profile();

        let jitter = if profile.inaccuracy > 0.0 {
            (self.rng.random::<f32>() - 0.5) * profile.inaccuracy
        } else {
            0.0
        };
        let vel = direction(angle + jitter) * shot.speed;

        let id = self.next_entity_id();
        let mut p = Projectile::bullet(
            id,
            Owner::Player,
            pos,
            vel,
            shot.damage,
            shot.radius,
            self.now_ms,
        );
        p.bounces_left = profile.max_bounces;
        p.explosion_radius = match profile.explosion_radius {
            Some(r) => Some(r),
            None if ammo.explosive => Some(AMMO_EXPLOSION_RADIUS),
            None => None,
        };
        p.chain = class.has(Ability::ChainReaction);
        p.defensive = class.has(Ability::Reflector);
        p.slows = class.has(Ability::Slowing);
        p.invisible = class.has(Ability::InvisibleProjectiles);
        if class.has(Ability::GrowingProjectiles) {
            p.growth = Some(Growth {
                initial_damage: shot.damage,
                initial_speed: shot.speed,
            });
        }
        if class.has(Ability::Seeker) {
            p.target = nearest_shape(&self.shapes, pos, SEEKER_RANGE);
        }
        self.projectiles.push(p);
    }

    /// Drop a mine under the player, tethered to the nearest mine that has
    /// no tether of its own
    fn lay_mine(&mut self) {
        let class = self.player.tank_class;
        let pos = self.player.pos;

        let tether_to = if class.has(Ability::TetherMines) {
            self.mines
                .iter()
                .filter(|m| m.tether_to.is_none())
                .map(|m| (m.id, m.pos.distance(pos)))
                .filter(|&(_, d)| d < TETHER_RANGE)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(id, _)| id)
        } else {
            None
        };

        let id = self.next_entity_id();
        self.mines.push(Mine {
            id,
            pos,
            radius: MINE_RADIUS,
            damage: MINE_DAMAGE,
            trigger_radius: MINE_TRIGGER_RADIUS,
            explosion_radius: MINE_EXPLOSION_RADIUS,
            smart: class.has(Ability::SmartMines),
            target: None,
            vel: Vec2::ZERO,
            tether_to,
        });
    }

    /// Plain shot for turrets, clones and structures
    pub(crate) fn follower_shot(
        &mut self,
        owner: Owner,
        pos: Vec2,
        angle: f32,
        damage: f32,
        speed: f32,
        radius: f32,
    ) {
        let id = self.next_entity_id();
        let p = Projectile::bullet(
            id,
            owner,
            pos,
            direction(angle) * speed,
            damage,
            radius,
            self.now_ms,
        );
        self.projectiles.push(p);
    }
}
