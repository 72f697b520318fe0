//! Frame-driven simulation module
//!
//! All gameplay logic lives here. The module has no rendering or platform
//! dependencies:
//! - One [`tick`] per animation frame, timestamped by the caller
//! - Seeded RNG only
//! - Entities reference each other by ID and re-validate every use

pub mod ai;
pub mod classes;
pub mod collision;
pub mod combat;
pub mod evolution;
pub mod mines;
pub mod movement;
pub mod progression;
pub mod spawn;
pub mod state;
pub mod targeting;
pub mod tick;
pub mod view;
pub mod weapons;

pub use classes::{Ability, AmmoType, ClassProfile, FirePattern, TankClass};
pub use evolution::{EvolutionTree, Path, UPGRADE_LEVELS};
pub use progression::{ActionError, MAX_LEVEL, xp_threshold};
pub use state::{
    CloneTank, DelayedExplosion, Drone, EntityId, FloatingText, GameState, Mine, Owner, Particle,
    Player, Projectile, ProjectileKind, Shape, ShapeKind, StatKind, Stats, Structure, Turret,
    UpgradeOffer,
};
pub use tick::{Controls, Phase, TickInput, tick};
pub use view::{CameraRect, FrameView};
