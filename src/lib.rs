//! Arena Evolution - simulation core of a top-down arena shooter
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (entities, firing, collisions, progression)
//! - `settings`: Run configuration (game mode, particle budget, boss timer)
//!
//! Rendering, input capture and menus live outside this crate. They feed a
//! [`sim::Controls`] into [`sim::tick`] once per animation frame and read the
//! entity stores back out (see [`sim::FrameView`]).

pub mod settings;
pub mod sim;

pub use settings::{GameMode, Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// World dimensions
    pub const WORLD_WIDTH: f32 = 6000.0;
    pub const WORLD_HEIGHT: f32 = 6000.0;

    /// Player body
    pub const PLAYER_RADIUS: f32 = 20.0;
    /// Player top speed (units per frame)
    pub const PLAYER_MAX_SPEED: f32 = 4.0;
    pub const PLAYER_START_HEALTH: f32 = 100.0;
    /// Fraction of the velocity gap closed each frame
    pub const PLAYER_ACCELERATION: f32 = 0.1;

    /// Projectile defaults
    pub const PROJECTILE_RADIUS: f32 = 5.0;
    pub const PROJECTILE_BASE_SPEED: f32 = 8.0;
    pub const PROJECTILE_LIFETIME_MS: f64 = 2500.0;
    pub const LASER_LIFETIME_MS: f64 = 200.0;
    pub const BARREL_WIDTH: f32 = 18.0;
    pub const BARREL_LENGTH: f32 = 45.0;

    /// Fallbacks used when a class table entry is unusable
    pub const DEFAULT_FIRE_RATE_MS: f64 = 200.0;
    pub const DEFAULT_DAMAGE: f32 = 10.0;
    pub const DEFAULT_SPEED_MOD: f32 = 1.0;

    /// Health regeneration
    pub const HEALTH_REGEN_DELAY_MS: f64 = 5000.0;
    /// Fraction of max health restored per second
    pub const HEALTH_REGEN_RATE: f32 = 0.02;
    pub const LEVEL_UP_HEALTH_BONUS: f32 = 5.0;
    pub const STAT_POINTS_PER_LEVEL: u32 = 2;

    /// Shape population
    pub const MAX_SHAPES_BASE: usize = 150;
    pub const SHAPES_PER_SPAWN_RATE_POINT: usize = 5;
    pub const BASE_SPAWN_PROBABILITY: f64 = 0.02;
    pub const SPAWN_PROBABILITY_PER_POINT: f64 = 0.0002;
    pub const MINIBOSS_SPAWN_CHANCE: f64 = 0.005;
    pub const SPAWN_MARGIN: f32 = 100.0;

    /// Boss countdown (3 minutes)
    pub const BOSS_SPAWN_TIME_MS: f64 = 180_000.0;

    /// Frames a shape flashes after taking a hit
    pub const HIT_FLASH_FRAMES: u32 = 5;
    /// Body collision damage dealt to a shape (instant kill for non-bosses)
    pub const BODY_COLLISION_DAMAGE: f32 = 1000.0;
    pub const BODY_KNOCKBACK: f32 = 2.0;
}

/// Angle of the vector pointing from `from` to `to`
#[inline]
pub fn heading(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for an angle
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Clamp a point into the world rectangle, keeping `margin` from every edge
#[inline]
pub fn clamp_to_world(pos: Vec2, margin: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(margin, consts::WORLD_WIDTH - margin),
        pos.y.clamp(margin, consts::WORLD_HEIGHT - margin),
    )
}

/// Zoom factor the camera uses at a given player level
#[inline]
pub fn zoom_for_level(level: u32) -> f32 {
    (1.0 - level.saturating_sub(1) as f32 * 0.0025).max(0.1)
}
