//! Game state and entity stores
//!
//! Everything the simulation mutates lives in [`GameState`]. Entities refer to
//! each other by [`EntityId`] only; a reference is re-validated against the
//! owning store every time it is used.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::classes::{AmmoType, TankClass};
use crate::consts::*;
use crate::settings::Settings;

/// Entity identifier, unique within one [`GameState`]
pub type EntityId = u32;

/// Spendable stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatKind {
    XpGain,
    SpawnRate,
    PassiveXpBoost,
}

impl StatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::XpGain => "xpGain",
            StatKind::SpawnRate => "spawnRate",
            StatKind::PassiveXpBoost => "passiveXpBoost",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "xpGain" | "xp_gain" => Some(StatKind::XpGain),
            "spawnRate" | "spawn_rate" => Some(StatKind::SpawnRate),
            "passiveXpBoost" | "passive_xp_boost" => Some(StatKind::PassiveXpBoost),
            _ => None,
        }
    }
}

/// Points invested in each stat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub xp_gain: u32,
    pub spawn_rate: u32,
    pub passive_xp_boost: u32,
}

impl Stats {
    pub fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::XpGain => self.xp_gain,
            StatKind::SpawnRate => self.spawn_rate,
            StatKind::PassiveXpBoost => self.passive_xp_boost,
        }
    }

    pub fn get_mut(&mut self, kind: StatKind) -> &mut u32 {
        match kind {
            StatKind::XpGain => &mut self.xp_gain,
            StatKind::SpawnRate => &mut self.spawn_rate,
            StatKind::PassiveXpBoost => &mut self.passive_xp_boost,
        }
    }

    /// Kill XP multiplier
    pub fn xp_multiplier(&self) -> f64 {
        1.0 + self.xp_gain as f64 * 0.01
    }
}

/// A clone tank flanking the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneTank {
    pub id: EntityId,
    pub pos: Vec2,
    pub angle: f32,
    /// Flank angle relative to the player's facing
    pub offset_angle: f32,
    pub target: Option<EntityId>,
    #[serde(skip)]
    pub last_shot_ms: f64,
}

/// The player tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing angle (radians)
    pub angle: f32,
    pub radius: f32,
    pub level: u32,
    /// Progress toward the next level; fractional from passive gain
    pub xp: f64,
    pub health: f32,
    pub max_health: f32,
    pub tank_class: TankClass,
    pub stats: Stats,
    pub stat_points: u32,
    /// Visual barrel kick, decays each frame
    pub recoil_offset: f32,
    pub passive_xp_rate: f32,
    pub max_drones: usize,
    pub clones: Vec<CloneTank>,
    /// Only `Some` for ammo-switching classes
    pub current_ammo: Option<AmmoType>,
    pub gravity_aura_active: bool,
    #[serde(skip)]
    pub last_damage_ms: f64,
    #[serde(skip)]
    pub last_shot_ms: f64,
    #[serde(skip)]
    pub last_drone_spawn_ms: f64,
}

impl Player {
    pub fn new() -> Self {
        let mut player = Self {
            pos: Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0),
            vel: Vec2::ZERO,
            angle: 0.0,
            radius: PLAYER_RADIUS,
            level: 1,
            xp: 0.0,
            health: PLAYER_START_HEALTH,
            max_health: PLAYER_START_HEALTH,
            tank_class: TankClass::Default,
            stats: Stats::default(),
            stat_points: 0,
            recoil_offset: 0.0,
            passive_xp_rate: 0.0,
            max_drones: 0,
            clones: Vec::new(),
            current_ammo: None,
            gravity_aura_active: false,
            last_damage_ms: f64::NEG_INFINITY,
            last_shot_ms: f64::NEG_INFINITY,
            last_drone_spawn_ms: f64::NEG_INFINITY,
        };
        player.derive_class_fields();
        player
    }

    /// Recompute every field that depends on the class
    pub fn derive_class_fields(&mut self) {
        use super::classes::Ability;
        let class = self.tank_class;
        let profile = class.profile();
        self.max_drones = profile.max_drones;
        self.passive_xp_rate = profile.passive_xp_rate;
        self.gravity_aura_active = class.has(Ability::GravityAura);
        self.current_ammo = if class.has(Ability::MultiAmmo) {
            Some(self.current_ammo.unwrap_or(AmmoType::Standard))
        } else {
            None
        };
    }

    /// Muzzle position for a shot fired along `angle`
    pub fn muzzle(&self, angle: f32) -> Vec2 {
        self.pos + crate::direction(angle) * BARREL_LENGTH
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Square,
    Triangle,
    Pentagon,
    /// Miniboss
    AlphaPentagon,
    ChaserBoss,
    SpawnerBoss,
    GuardianBoss,
    SpawnerMinion,
}

impl ShapeKind {
    pub const BASIC: [ShapeKind; 3] = [ShapeKind::Square, ShapeKind::Triangle, ShapeKind::Pentagon];
    pub const BOSSES: [ShapeKind; 3] = [
        ShapeKind::ChaserBoss,
        ShapeKind::SpawnerBoss,
        ShapeKind::GuardianBoss,
    ];

    pub fn radius(self) -> f32 {
        match self {
            ShapeKind::Square => 12.0,
            ShapeKind::Triangle => 10.0,
            ShapeKind::Pentagon => 18.0,
            ShapeKind::AlphaPentagon => 30.0,
            ShapeKind::ChaserBoss => 80.0,
            ShapeKind::SpawnerBoss => 100.0,
            ShapeKind::GuardianBoss => 90.0,
            ShapeKind::SpawnerMinion => 8.0,
        }
    }

    pub fn health(self) -> f32 {
        match self {
            ShapeKind::Square => 10.0,
            ShapeKind::Triangle => 15.0,
            ShapeKind::Pentagon => 50.0,
            ShapeKind::AlphaPentagon => 200.0,
            ShapeKind::ChaserBoss => 5000.0,
            ShapeKind::SpawnerBoss => 7000.0,
            ShapeKind::GuardianBoss => 8000.0,
            ShapeKind::SpawnerMinion => 5.0,
        }
    }

    /// Base XP awarded on death
    pub fn xp(self) -> f64 {
        match self {
            ShapeKind::Square => 10.0,
            ShapeKind::Triangle => 25.0,
            ShapeKind::Pentagon => 130.0,
            ShapeKind::AlphaPentagon => 1000.0,
            ShapeKind::ChaserBoss => 20000.0,
            ShapeKind::SpawnerBoss => 30000.0,
            ShapeKind::GuardianBoss => 35000.0,
            ShapeKind::SpawnerMinion => 2.0,
        }
    }

    /// Damage dealt to the player on touch
    pub fn body_damage(self) -> f32 {
        match self {
            ShapeKind::Square => 8.0,
            ShapeKind::Triangle => 12.0,
            ShapeKind::Pentagon => 20.0,
            ShapeKind::AlphaPentagon => 40.0,
            ShapeKind::ChaserBoss => 60.0,
            ShapeKind::SpawnerBoss => 50.0,
            ShapeKind::GuardianBoss => 55.0,
            ShapeKind::SpawnerMinion => 5.0,
        }
    }

    /// Movement speed (units per frame), zero for drifting-free shapes
    pub fn speed(self) -> f32 {
        match self {
            ShapeKind::AlphaPentagon => 1.0,
            ShapeKind::ChaserBoss => 0.5,
            ShapeKind::SpawnerBoss => 0.3,
            ShapeKind::GuardianBoss => 0.4,
            ShapeKind::SpawnerMinion => 2.5,
            _ => 0.0,
        }
    }

    pub fn is_boss(self) -> bool {
        Self::BOSSES.contains(&self)
    }

    /// Bosses and the miniboss get the big death effects
    pub fn is_major(self) -> bool {
        self.is_boss() || self == ShapeKind::AlphaPentagon
    }

    pub fn color(self) -> u32 {
        match self {
            ShapeKind::Square => 0xffe869,
            ShapeKind::Triangle => 0xfc7677,
            ShapeKind::Pentagon => 0x768dfc,
            ShapeKind::AlphaPentagon => 0x8a5cf6,
            ShapeKind::ChaserBoss => 0xff3030,
            ShapeKind::SpawnerBoss => 0x30c060,
            ShapeKind::GuardianBoss => 0x40a0ff,
            ShapeKind::SpawnerMinion => 0x80e0a0,
        }
    }
}

/// What a minion is walking toward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MinionTarget {
    Player,
}

/// Guardian shield cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub shielded: bool,
    /// Time left in the current phase
    pub timer_ms: f64,
}

/// Shielded phase length
pub const SHIELD_UP_MS: f64 = 3000.0;
/// Unshielded phase length
pub const SHIELD_DOWN_MS: f64 = 8000.0;

impl Shield {
    pub fn new() -> Self {
        Self {
            shielded: true,
            timer_ms: SHIELD_UP_MS,
        }
    }

    /// Count down and flip phase when the timer runs out
    pub fn advance(&mut self, dt_ms: f64) {
        self.timer_ms -= dt_ms;
        if self.timer_ms <= 0.0 {
            self.shielded = !self.shielded;
            self.timer_ms = if self.shielded {
                SHIELD_UP_MS
            } else {
                SHIELD_DOWN_MS
            };
        }
    }
}

impl Default for Shield {
    fn default() -> Self {
        Self::new()
    }
}

/// An enemy or obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    pub id: EntityId,
    pub kind: ShapeKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub angle: f32,
    pub rotation_speed: f32,
    /// Frames left on the hit flash
    pub hit_cooldown: u32,
    /// Minions only
    pub target: Option<MinionTarget>,
    /// Guardian boss only
    pub shield: Option<Shield>,
    /// Last boss shot / minion spawn
    #[serde(skip)]
    pub last_action_ms: f64,
    #[serde(skip)]
    pub slowed_until_ms: f64,
}

impl Shape {
    /// Shape at rest with full health; the spawner adds motion
    pub fn new(id: EntityId, kind: ShapeKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            radius: kind.radius(),
            health: kind.health(),
            max_health: kind.health(),
            angle: 0.0,
            rotation_speed: 0.0,
            hit_cooldown: 0,
            target: None,
            shield: (kind == ShapeKind::GuardianBoss).then(Shield::new),
            last_action_ms: 0.0,
            slowed_until_ms: f64::NEG_INFINITY,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_shielded(&self) -> bool {
        self.shield.is_some_and(|s| s.shielded)
    }

    /// Apply damage and start the hit flash
    pub fn take_damage(&mut self, amount: f32) {
        self.health -= amount;
        self.hit_cooldown = HIT_FLASH_FRAMES;
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
    Clone,
}

impl Owner {
    /// Projectiles that hurt shapes
    pub fn is_friendly(self) -> bool {
        matches!(self, Owner::Player | Owner::Clone)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Bullet,
    /// Instant beam along the velocity direction
    Laser,
    /// Expanding ring centred on `pos`
    Wave,
}

/// Starting values for projectiles that grow with age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Growth {
    pub initial_damage: f32,
    pub initial_speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub owner: Owner,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub radius: f32,
    #[serde(skip)]
    pub created_ms: f64,
    pub bounces_left: u32,
    pub explosion_radius: Option<f32>,
    /// Chain-reaction classes schedule a follow-up blast
    pub chain: bool,
    pub target: Option<EntityId>,
    /// Shapes already damaged by this laser or wave
    pub pierced: Vec<EntityId>,
    /// Annihilates enemy projectiles on contact
    pub defensive: bool,
    pub reflected: bool,
    pub slows: bool,
    pub growth: Option<Growth>,
    /// Render-only flag
    pub invisible: bool,
}

impl Projectile {
    /// Plain bullet; callers set the optional behaviours afterwards
    pub fn bullet(
        id: EntityId,
        owner: Owner,
        pos: Vec2,
        vel: Vec2,
        damage: f32,
        radius: f32,
        now_ms: f64,
    ) -> Self {
        Self {
            id,
            owner,
            kind: ProjectileKind::Bullet,
            pos,
            vel,
            damage,
            radius,
            created_ms: now_ms,
            bounces_left: 0,
            explosion_radius: None,
            chain: false,
            target: None,
            pierced: Vec::new(),
            defensive: false,
            reflected: false,
            slows: false,
            growth: None,
            invisible: false,
        }
    }

    pub fn age_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.created_ms
    }

    /// Lasers and waves pass through what they hit
    pub fn passes_through(&self) -> bool {
        self.kind != ProjectileKind::Bullet
    }

    /// Turn an incoming shot around
    pub fn reflect(&mut self, new_owner: Owner) {
        self.vel = -self.vel;
        self.owner = new_owner;
        self.reflected = true;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mine {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub trigger_radius: f32,
    pub explosion_radius: f32,
    /// Steers toward nearby shapes
    pub smart: bool,
    pub target: Option<EntityId>,
    pub vel: Vec2,
    pub tether_to: Option<EntityId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: f32,
    pub target: Option<EntityId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turret {
    pub id: EntityId,
    pub pos: Vec2,
    /// Barrel angle
    pub angle: f32,
    /// Angle around the player (orbiting turrets)
    pub orbit_angle: f32,
    /// -1 or 1, the flank a mobile turret holds
    pub side: f32,
    pub target: Option<EntityId>,
    #[serde(skip)]
    pub last_shot_ms: f64,
}

/// Player-placed stationary gun
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub id: EntityId,
    pub pos: Vec2,
    pub angle: f32,
    pub health: f32,
    pub target: Option<EntityId>,
    #[serde(skip)]
    pub last_shot_ms: f64,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: u32,
    /// Frames left
    pub life: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub size: f32,
    pub alpha: f32,
}

/// A blast scheduled for later
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayedExplosion {
    pub pos: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub remaining_ms: f64,
}

/// Classes offered at an upgrade gate, waiting for the player to pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeOffer {
    pub level: u32,
    pub classes: Vec<TankClass>,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed
    pub seed: u64,
    pub settings: Settings,
    pub player: Player,
    pub shapes: Vec<Shape>,
    pub projectiles: Vec<Projectile>,
    pub drones: Vec<Drone>,
    pub mines: Vec<Mine>,
    pub turrets: Vec<Turret>,
    pub structures: Vec<Structure>,
    pub particles: Vec<Particle>,
    pub floating_texts: Vec<FloatingText>,
    pub delayed_explosions: Vec<DelayedExplosion>,
    /// Current boss, also present in `shapes`
    pub boss: Option<EntityId>,
    /// Countdown to the next boss
    pub boss_timer_ms: f64,
    /// Pending class choice
    pub upgrade: Option<UpgradeOffer>,
    pub evolution_view_open: bool,
    pub game_over: bool,
    /// Sum of kill XP
    pub score: u64,
    /// Timestamp of the current frame
    pub now_ms: f64,
    pub(crate) last_time_ms: Option<f64>,
    /// Frames simulated (paused frames excluded)
    pub frame: u64,
    /// Viewport size seen on the last frame
    pub viewport: Vec2,
    pub(crate) rng: Pcg32,
    next_id: EntityId,
}

impl GameState {
    /// Create a new game with default settings
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, Settings::default())
    }

    pub fn with_settings(seed: u64, settings: Settings) -> Self {
        let boss_timer_ms = settings.boss_interval_ms;
        Self {
            seed,
            settings,
            player: Player::new(),
            shapes: Vec::new(),
            projectiles: Vec::new(),
            drones: Vec::new(),
            mines: Vec::new(),
            turrets: Vec::new(),
            structures: Vec::new(),
            particles: Vec::new(),
            floating_texts: Vec::new(),
            delayed_explosions: Vec::new(),
            boss: None,
            boss_timer_ms,
            upgrade: None,
            evolution_view_open: false,
            game_over: false,
            score: 0,
            now_ms: 0.0,
            last_time_ms: None,
            frame: 0,
            viewport: Vec2::new(1280.0, 720.0),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Simulation is suspended while a choice or the evolution view is open
    pub fn is_paused(&self) -> bool {
        self.upgrade.is_some() || self.evolution_view_open
    }

    pub fn upgrade_pending(&self) -> bool {
        self.upgrade.is_some()
    }

    pub fn shape(&self, id: EntityId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Live shape by id; dead or removed shapes resolve to `None`
    pub fn live_shape(&self, id: EntityId) -> Option<&Shape> {
        self.shape(id).filter(|s| s.is_alive())
    }

    /// Emit a burst of particles, thinned by the game mode and capped
    pub fn burst(&mut self, pos: Vec2, requested: usize, color: u32, magnitude: f32) {
        let count = self.settings.mode.particle_count(requested);
        let room = self.settings.max_particles.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * magnitude,
                (self.rng.random::<f32>() - 0.5) * magnitude,
            );
            let particle = Particle {
                pos,
                vel,
                radius: self.rng.random_range(1.0..3.0),
                color,
                life: self.rng.random_range(20..70),
            };
            self.particles.push(particle);
        }
    }

    /// Floating "+N XP" marker
    pub fn float_text(&mut self, pos: Vec2, text: String, size: f32) {
        self.floating_texts.push(FloatingText {
            pos,
            text,
            size,
            alpha: 1.0,
        });
    }
}
