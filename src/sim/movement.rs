//! Player steering and projectile / effect integration
//!
//! Positions advance by their velocity once per frame. Lifetimes and the
//! gravity aura use wall-clock time.

use glam::Vec2;

use super::collision::{bounce_off_world, out_of_world};
use super::state::{GameState, Projectile, ProjectileKind};
use super::targeting::{HOMING_STRENGTH, farm_target, steer_homing, target_pos};
use super::tick::Controls;
use crate::consts::*;
use crate::{clamp_to_world, heading};

/// Autofarm keeps this much clearance beyond touching distance
pub const FARM_STANDOFF: f32 = 150.0;
/// Autofarm backs off once this far inside the standoff
pub const FARM_DODGE_BAND: f32 = 50.0;

/// Wave ring growth per frame and final radius
pub const WAVE_EXPANSION_SPEED: f32 = 5.0;
pub const WAVE_MAX_RADIUS: f32 = 400.0;

/// Growing projectile rates, per approximate frame alive
pub const GROWTH_DAMAGE_RATE: f32 = 0.1;
pub const GROWTH_RADIUS_RATE: f32 = 0.05;
pub const GROWTH_SPEED_RATE: f32 = 0.01;
const FRAME_MS: f64 = 16.0;

impl GameState {
    /// Steer, integrate, aim and (maybe) fire
    pub(crate) fn update_player(&mut self, controls: &Controls, dt_ms: f64) {
        if self.player.recoil_offset > 0.0 {
            self.player.recoil_offset *= 0.9;
        }

        let farm = if controls.autofarm() {
            farm_target(&self.shapes, self.player.pos)
                .and_then(|id| self.live_shape(id))
                .map(|s| (s.pos, s.radius))
        } else {
            None
        };

        let player = &mut self.player;
        let target_vel = match farm {
            Some((to, radius)) => {
                let delta = to - player.pos;
                let dist = delta.length();
                let standoff = player.radius + radius + FARM_STANDOFF;
                let dir = delta.normalize_or_zero();
                if dist > standoff {
                    dir * PLAYER_MAX_SPEED
                } else if dist < standoff - FARM_DODGE_BAND {
                    -dir * PLAYER_MAX_SPEED
                } else {
                    Vec2::ZERO
                }
            }
            None => controls.move_axis().normalize_or_zero() * PLAYER_MAX_SPEED,
        };

        player.vel += (target_vel - player.vel) * PLAYER_ACCELERATION;
        player.pos = clamp_to_world(player.pos + player.vel, player.radius);
        player.angle = match farm {
            Some((to, _)) => heading(player.pos, to),
            None => heading(self.viewport / 2.0, controls.pointer),
        };

        self.gain_passive_xp(dt_ms);

        if controls.pointer_down || controls.autofire() || farm.is_some() {
            self.try_fire();
        }
    }

    /// Advance every projectile and drop the ones that expired, left the
    /// world or were swallowed by the gravity aura
    pub(crate) fn update_projectiles(&mut self, dt_ms: f64) {
        let mut projectiles = std::mem::take(&mut self.projectiles);
        projectiles.retain_mut(|p| self.advance_projectile(p, dt_ms));
        projectiles.append(&mut self.projectiles);
        self.projectiles = projectiles;
    }

    /// Returns whether the projectile survives the frame
    fn advance_projectile(&mut self, p: &mut Projectile, dt_ms: f64) -> bool {
        let now = self.now_ms;
        match p.kind {
            ProjectileKind::Laser => return p.age_ms(now) <= LASER_LIFETIME_MS,
            ProjectileKind::Wave => {
                p.radius += WAVE_EXPANSION_SPEED;
                return p.radius <= WAVE_MAX_RADIUS;
            }
            ProjectileKind::Bullet => {}
        }

        if let Some(growth) = p.growth {
            let frames = (p.age_ms(now) / FRAME_MS) as f32;
            p.damage = growth.initial_damage + frames * GROWTH_DAMAGE_RATE;
            p.radius += GROWTH_RADIUS_RATE;
            let speed = growth.initial_speed * (1.0 + frames * GROWTH_SPEED_RATE);
            p.vel = p.vel.normalize_or_zero() * speed;
        }

        if !self.gravity_pull(p, dt_ms) {
            return false;
        }

        if let Some(to) = target_pos(&self.shapes, p.target) {
            p.vel = steer_homing(p.vel, p.pos, to, HOMING_STRENGTH);
        }

        p.pos += p.vel;
        if p.age_ms(now) > PROJECTILE_LIFETIME_MS {
            return false;
        }

        // A corner exit costs one bounce per axis
        while out_of_world(p.pos) {
            if p.bounces_left == 0 {
                return false;
            }
            bounce_off_world(&mut p.pos, &mut p.vel, 0.0);
            p.bounces_left -= 1;
        }
        true
    }

    /// Particles drift and burn out, floating texts rise and fade
    pub(crate) fn update_effects(&mut self) {
        self.particles.retain_mut(|p| {
            p.pos += p.vel;
            p.life = p.life.saturating_sub(1);
            p.life > 0
        });
        self.floating_texts.retain_mut(|t| {
            t.pos.y -= 0.5;
            t.alpha -= 0.01;
            t.alpha > 0.0
        });
    }
}
