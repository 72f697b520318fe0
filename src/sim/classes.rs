//! Tank classes, their weapon profiles and special abilities
//!
//! Every class resolves to a [`ClassProfile`] once at first use. The firing
//! routine only ever looks at the profile's [`FirePattern`], never at the
//! class identity itself.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Every playable tank class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TankClass {
    Default,
    // Level 25
    TwinShot,
    Sniper,
    MachineGun,
    Destroyer,
    Bomber,
    Meditator,
    // Level 50
    Triplet,
    TwinHeavy,
    Assassin,
    Ricochet,
    Gatling,
    Hybrid,
    Annihilator,
    Launcher,
    Cluster,
    MineLayer,
    HarmonyViva,
    // Level 75
    Spreadshot,
    FortressTwin,
    Railgun,
    Pinball,
    Vulcan,
    DroneHybrid,
    Obliterator,
    Seeker,
    NukeCluster,
    SpiderMines,
    Channeler,
    // Level 100
    OverlordSupremo,
    Defender,
    Fortress,
    Titan,
    Juggernaut,
    SpiritOfPeace,
    // Level 200
    CannonColossus,
    NuclearSwarm,
    BulletStorm,
    SupremeHunter,
    LivingFortress,
    ReactiveShield,
    DroneOvermind,
    Artificer,
    ArmoredTitan,
    Muramasa,
    MineMaster,
    EternalGuardian,
    // Level 400
    ColossalArtillery,
    NuclearTempest,
    BulletHurricane,
    PhantomHunter,
    LivingCitadel,
    PrismaticShield,
    AscendedOvermind,
    WarEngineer,
    SteelTitan,
    MobileWall,
    MineWeaver,
    AbsoluteGuardian,
    // Level 800
    GodOfWar,
    NuclearSun,
    InfiniteRain,
    StellarPredator,
    SupremeArchitect,
    DimensionalShield,
    CosmicOvermind,
    SupremeArtificer,
    CosmicGuardian,
    WanderingFortress,
    TrapMaster,
    ShieldColossus,
    // Level 1600
    InfiniteFury,
    WarSupernova,
    FireTsunami,
    DimensionalHunter,
    SupremeConsciousness,
    RealityWeaver,
    ElementalMaster,
    SupremeGeneral,
    PureImmortality,
    CrystalColossus,
    EternalMuramasa,
    PlanetaryGuardian,
}

/// Special mechanics a class may opt into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    /// Cannot fire, earns XP over time
    Pacifist,
    Drones,
    DroneSplitting,
    Mines,
    SmartMines,
    TetherMines,
    Seeker,
    Laser,
    Wall,
    /// Shots annihilate enemy shots and send them back
    Reflector,
    ChainReaction,
    Slowing,
    Turrets,
    MobileTurrets,
    Architect,
    Clones,
    GrowingProjectiles,
    InvisibleProjectiles,
    DamageReflection,
    GravityAura,
    Wave,
    MultiAmmo,
    DamageReduction,
    Channeler,
    RapidRegen,
}

/// Shape of a single trigger pull
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FirePattern {
    /// One shot from the barrel; `radius` overrides the projectile radius
    Single { radius: Option<f32> },
    /// Two parallel shots offset sideways by `spacing`
    Twin { spacing: f32, radius: Option<f32> },
    /// Shots fanned at fixed angular offsets (radians)
    Spread { offsets: &'static [f32] },
    /// `count` shots evenly around the tank
    Ring { count: u32 },
    /// A line of slow heavy shots perpendicular to the aim
    Wall {
        half_width: i32,
        spacing: f32,
        radius: f32,
        speed_mod: f32,
        damage_mod: f32,
    },
    Mine,
    Laser,
    Wave,
}

/// Selectable ammunition for multi-ammo classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmmoType {
    Standard,
    Explosive,
    HighVelocity,
}

/// Multipliers an ammo type applies to a shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmmoModifiers {
    pub damage: f32,
    pub speed: f32,
    pub radius: f32,
    pub explosive: bool,
}

/// Blast radius explosive ammo uses when the class has none of its own
pub const AMMO_EXPLOSION_RADIUS: f32 = 60.0;

impl AmmoType {
    pub fn modifiers(self) -> AmmoModifiers {
        match self {
            AmmoType::Standard => AmmoModifiers {
                damage: 1.0,
                speed: 1.0,
                radius: 1.0,
                explosive: false,
            },
            AmmoType::Explosive => AmmoModifiers {
                damage: 1.5,
                speed: 0.7,
                radius: 1.2,
                explosive: true,
            },
            AmmoType::HighVelocity => AmmoModifiers {
                damage: 0.8,
                speed: 1.8,
                radius: 0.8,
                explosive: false,
            },
        }
    }

    /// Next ammo type in the cycle
    pub fn next(self) -> Self {
        match self {
            AmmoType::Standard => AmmoType::Explosive,
            AmmoType::Explosive => AmmoType::HighVelocity,
            AmmoType::HighVelocity => AmmoType::Standard,
        }
    }
}

impl Default for AmmoModifiers {
    fn default() -> Self {
        AmmoType::Standard.modifiers()
    }
}

/// Resolved weapon and progression numbers for one class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProfile {
    /// Minimum time between trigger pulls
    pub fire_rate_ms: f64,
    pub damage: f32,
    pub speed_mod: f32,
    /// Velocity kick opposite the aim on every shot
    pub recoil: f32,
    /// Total random angular jitter (radians)
    pub inaccuracy: f32,
    /// `Some` when shots explode on impact
    pub explosion_radius: Option<f32>,
    pub max_bounces: u32,
    /// XP per second for pacifist classes
    pub passive_xp_rate: f32,
    pub max_drones: usize,
    pub drone_spawn_ms: f64,
    pub pattern: FirePattern,
}

const TRIPLET_OFFSETS: [f32; 3] = [-0.2, 0.0, 0.2];
const SPREADSHOT_OFFSETS: [f32; 5] = [-0.2, 0.0, 0.2, -0.4, 0.4];

static PROFILES: LazyLock<Vec<ClassProfile>> = LazyLock::new(|| {
    TankClass::ALL
        .iter()
        .map(|&class| class.build_profile())
        .collect()
});

impl TankClass {
    /// All classes in declaration order
    pub const ALL: [TankClass; 83] = [
        TankClass::Default,
        TankClass::TwinShot,
        TankClass::Sniper,
        TankClass::MachineGun,
        TankClass::Destroyer,
        TankClass::Bomber,
        TankClass::Meditator,
        TankClass::Triplet,
        TankClass::TwinHeavy,
        TankClass::Assassin,
        TankClass::Ricochet,
        TankClass::Gatling,
        TankClass::Hybrid,
        TankClass::Annihilator,
        TankClass::Launcher,
        TankClass::Cluster,
        TankClass::MineLayer,
        TankClass::HarmonyViva,
        TankClass::Spreadshot,
        TankClass::FortressTwin,
        TankClass::Railgun,
        TankClass::Pinball,
        TankClass::Vulcan,
        TankClass::DroneHybrid,
        TankClass::Obliterator,
        TankClass::Seeker,
        TankClass::NukeCluster,
        TankClass::SpiderMines,
        TankClass::Channeler,
        TankClass::OverlordSupremo,
        TankClass::Defender,
        TankClass::Fortress,
        TankClass::Titan,
        TankClass::Juggernaut,
        TankClass::SpiritOfPeace,
        TankClass::CannonColossus,
        TankClass::NuclearSwarm,
        TankClass::BulletStorm,
        TankClass::SupremeHunter,
        TankClass::LivingFortress,
        TankClass::ReactiveShield,
        TankClass::DroneOvermind,
        TankClass::Artificer,
        TankClass::ArmoredTitan,
        TankClass::Muramasa,
        TankClass::MineMaster,
        TankClass::EternalGuardian,
        TankClass::ColossalArtillery,
        TankClass::NuclearTempest,
        TankClass::BulletHurricane,
        TankClass::PhantomHunter,
        TankClass::LivingCitadel,
        TankClass::PrismaticShield,
        TankClass::AscendedOvermind,
        TankClass::WarEngineer,
        TankClass::SteelTitan,
        TankClass::MobileWall,
        TankClass::MineWeaver,
        TankClass::AbsoluteGuardian,
        TankClass::GodOfWar,
        TankClass::NuclearSun,
        TankClass::InfiniteRain,
        TankClass::StellarPredator,
        TankClass::SupremeArchitect,
        TankClass::DimensionalShield,
        TankClass::CosmicOvermind,
        TankClass::SupremeArtificer,
        TankClass::CosmicGuardian,
        TankClass::WanderingFortress,
        TankClass::TrapMaster,
        TankClass::ShieldColossus,
        TankClass::InfiniteFury,
        TankClass::WarSupernova,
        TankClass::FireTsunami,
        TankClass::DimensionalHunter,
        TankClass::SupremeConsciousness,
        TankClass::RealityWeaver,
        TankClass::ElementalMaster,
        TankClass::SupremeGeneral,
        TankClass::PureImmortality,
        TankClass::CrystalColossus,
        TankClass::EternalMuramasa,
        TankClass::PlanetaryGuardian,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Resolved profile, O(1)
    pub fn profile(self) -> &'static ClassProfile {
        &PROFILES[self.index()]
    }

    /// Whether this class has a special mechanic
    pub fn has(self, ability: Ability) -> bool {
        use TankClass::*;
        match ability {
            Ability::Pacifist => {
                matches!(self, Meditator | HarmonyViva | Channeler | SpiritOfPeace)
            }
            Ability::Drones => matches!(
                self,
                OverlordSupremo
                    | DroneOvermind
                    | AscendedOvermind
                    | CosmicOvermind
                    | SupremeGeneral
                    | DroneHybrid
            ),
            Ability::DroneSplitting => self == CosmicOvermind,
            Ability::Mines => matches!(
                self,
                MineLayer | SpiderMines | MineMaster | MineWeaver | TrapMaster
            ),
            Ability::SmartMines => matches!(self, SpiderMines | TrapMaster),
            Ability::TetherMines => self == MineWeaver,
            Ability::Seeker => matches!(
                self,
                Launcher | Seeker | SupremeHunter | DimensionalHunter
            ),
            Ability::Laser => self == Railgun,
            Ability::Wall => matches!(self, Defender | Muramasa | MobileWall | EternalMuramasa),
            Ability::Reflector => matches!(self, ReactiveShield | PrismaticShield),
            Ability::ChainReaction => matches!(self, NuclearTempest | NuclearSun | WarSupernova),
            Ability::Slowing => self == RealityWeaver,
            Ability::Turrets => matches!(self, LivingFortress | LivingCitadel | SupremeGeneral),
            Ability::MobileTurrets => self == LivingCitadel,
            Ability::Architect => self == SupremeArchitect,
            Ability::Clones => self == SupremeConsciousness,
            Ability::GrowingProjectiles => self == StellarPredator,
            Ability::InvisibleProjectiles => self == PhantomHunter,
            Ability::DamageReflection => self == CrystalColossus,
            Ability::GravityAura => self == PlanetaryGuardian,
            Ability::Wave => self == FireTsunami,
            Ability::MultiAmmo => matches!(
                self,
                Artificer | WarEngineer | SupremeArtificer | ElementalMaster
            ),
            Ability::DamageReduction => self == SpiritOfPeace,
            Ability::Channeler => self == Channeler,
            Ability::RapidRegen => self == PureImmortality,
        }
    }

    #[inline]
    pub fn is_pacifist(self) -> bool {
        self.has(Ability::Pacifist)
    }

    /// Whether the main trigger fires for this class. Drone, turret and
    /// clone classes attack through their followers instead.
    pub fn fires_from_trigger(self) -> bool {
        !(self.is_pacifist()
            || self.has(Ability::Drones)
            || self.has(Ability::Turrets)
            || self.has(Ability::Clones))
    }

    /// Raw (fire interval ms, damage, projectile speed multiplier)
    fn weapon_table(self) -> (f64, f32, f32) {
        use TankClass::*;
        match self {
            Default => (DEFAULT_FIRE_RATE_MS, DEFAULT_DAMAGE, DEFAULT_SPEED_MOD),
            TwinShot => (150.0, 7.0, 1.0),
            Sniper => (500.0, 25.0, 1.8),
            MachineGun => (100.0, 4.0, 1.2),
            Destroyer => (800.0, 70.0, 0.6),
            Bomber => (600.0, 40.0, 0.8),
            Meditator => (0.0, 0.0, 1.0),
            Triplet => (150.0, 8.0, 1.0),
            TwinHeavy => (200.0, 15.0, 0.9),
            Assassin => (650.0, 40.0, 2.2),
            Ricochet => (550.0, 20.0, 1.5),
            Gatling => (80.0, 5.0, 1.3),
            Hybrid => (700.0, 60.0, 0.7),
            Annihilator => (1000.0, 100.0, 0.5),
            Launcher => (800.0, 50.0, 0.7),
            Cluster => (700.0, 30.0, 0.8),
            MineLayer => (1000.0, 0.0, 1.0),
            HarmonyViva => (0.0, 0.0, 1.0),
            Spreadshot => (200.0, 7.0, 1.0),
            FortressTwin => (300.0, 20.0, 0.8),
            Railgun => (1200.0, 120.0, 3.0),
            Pinball => (500.0, 22.0, 1.6),
            Vulcan => (60.0, 6.0, 1.4),
            DroneHybrid => (750.0, 50.0, 0.7),
            Obliterator => (1500.0, 150.0, 0.4),
            Seeker => (600.0, 40.0, 0.9),
            NukeCluster => (900.0, 35.0, 0.8),
            SpiderMines => (1000.0, 0.0, 1.0),
            Channeler => (0.0, 0.0, 1.0),
            OverlordSupremo => (100.0, 0.0, 1.0),
            Defender => (300.0, 15.0, 0.8),
            Fortress => (400.0, 25.0, 0.9),
            Titan => (1200.0, 200.0, 0.5),
            Juggernaut => (250.0, 12.0, 1.0),
            SpiritOfPeace => (0.0, 0.0, 1.0),
            CannonColossus => (250.0, 30.0, 0.8),
            NuclearSwarm => (800.0, 45.0, 0.7),
            BulletStorm => (50.0, 7.0, 1.5),
            SupremeHunter => (500.0, 50.0, 1.2),
            LivingFortress => (100.0, 0.0, 1.0),
            ReactiveShield => (300.0, 10.0, 0.9),
            DroneOvermind => (100.0, 0.0, 1.0),
            Artificer => (400.0, 25.0, 1.0),
            ArmoredTitan => (500.0, 40.0, 0.9),
            Muramasa => (600.0, 10.0, 0.6),
            MineMaster => (900.0, 0.0, 1.0),
            EternalGuardian => (700.0, 50.0, 1.0),
            ColossalArtillery => (1500.0, 300.0, 0.4),
            NuclearTempest => (700.0, 50.0, 0.7),
            BulletHurricane => (40.0, 8.0, 1.6),
            PhantomHunter => (600.0, 60.0, 1.3),
            LivingCitadel => (100.0, 0.0, 1.0),
            PrismaticShield => (350.0, 12.0, 0.9),
            AscendedOvermind => (100.0, 0.0, 1.0),
            WarEngineer => (400.0, 30.0, 1.0),
            SteelTitan => (600.0, 50.0, 0.9),
            MobileWall => (700.0, 12.0, 0.5),
            MineWeaver => (800.0, 0.0, 1.0),
            AbsoluteGuardian => (800.0, 60.0, 1.0),
            GodOfWar => (1800.0, 400.0, 0.3),
            NuclearSun => (600.0, 60.0, 0.6),
            InfiniteRain => (30.0, 9.0, 1.7),
            StellarPredator => (500.0, 70.0, 1.4),
            SupremeArchitect => (100.0, 0.0, 1.0),
            DimensionalShield => (400.0, 15.0, 1.0),
            CosmicOvermind => (100.0, 0.0, 1.0),
            SupremeArtificer => (400.0, 35.0, 1.0),
            CosmicGuardian => (900.0, 70.0, 1.0),
            WanderingFortress => (700.0, 60.0, 0.8),
            TrapMaster => (700.0, 0.0, 1.0),
            ShieldColossus => (1000.0, 20.0, 0.8),
            InfiniteFury => (20.0, 10.0, 1.8),
            WarSupernova => (500.0, 70.0, 0.6),
            FireTsunami => (1200.0, 150.0, 1.0),
            DimensionalHunter => (400.0, 80.0, 1.5),
            SupremeConsciousness => (100.0, 0.0, 1.0),
            RealityWeaver => (450.0, 30.0, 1.0),
            ElementalMaster => (400.0, 40.0, 1.0),
            SupremeGeneral => (100.0, 0.0, 1.0),
            PureImmortality => (1000.0, 80.0, 1.0),
            CrystalColossus => (800.0, 70.0, 0.9),
            EternalMuramasa => (600.0, 15.0, 0.4),
            PlanetaryGuardian => (1100.0, 90.0, 1.0),
        }
    }

    fn pattern(self) -> FirePattern {
        use TankClass::*;
        if self.has(Ability::Mines) {
            return FirePattern::Mine;
        }
        if self.has(Ability::Laser) {
            return FirePattern::Laser;
        }
        if self.has(Ability::Wave) {
            return FirePattern::Wave;
        }
        if self.has(Ability::Wall) {
            return FirePattern::Wall {
                half_width: 4,
                spacing: 15.0,
                radius: 10.0,
                speed_mod: 0.5,
                damage_mod: 2.0,
            };
        }
        match self {
            TwinShot | TwinHeavy => FirePattern::Twin {
                spacing: BARREL_WIDTH / 2.0,
                radius: None,
            },
            CannonColossus => FirePattern::Twin {
                spacing: BARREL_WIDTH,
                radius: Some(15.0),
            },
            Triplet => FirePattern::Spread {
                offsets: &TRIPLET_OFFSETS,
            },
            Spreadshot => FirePattern::Spread {
                offsets: &SPREADSHOT_OFFSETS,
            },
            Juggernaut => FirePattern::Ring { count: 8 },
            ColossalArtillery => FirePattern::Single { radius: Some(30.0) },
            GodOfWar => FirePattern::Single { radius: Some(40.0) },
            _ => FirePattern::Single { radius: None },
        }
    }

    fn build_profile(self) -> ClassProfile {
        use TankClass::*;
        let (fire_rate_ms, damage, speed_mod) = self.weapon_table();

        let recoil = match self {
            Destroyer => 4.0,
            Annihilator => 6.0,
            Obliterator => 8.0,
            Titan => 10.0,
            _ => 0.0,
        };
        let inaccuracy = match self {
            MachineGun => 0.3,
            Gatling => 0.4,
            Vulcan => 0.5,
            _ => 0.0,
        };
        let explosion_radius = match self {
            Bomber => Some(80.0),
            Cluster => Some(60.0),
            NukeCluster => Some(100.0),
            NuclearSwarm => Some(120.0),
            NuclearTempest => Some(140.0),
            NuclearSun => Some(160.0),
            WarSupernova => Some(180.0),
            _ => None,
        };
        let max_bounces = match self {
            Ricochet => 3,
            Pinball => 6,
            _ => 0,
        };
        let passive_xp_rate = match self {
            Meditator => 25.0,
            HarmonyViva | Channeler => 50.0,
            SpiritOfPeace => 75.0,
            _ => 0.0,
        };
        let max_drones = match self {
            OverlordSupremo => 8,
            DroneOvermind => 10,
            AscendedOvermind => 12,
            CosmicOvermind => 15,
            SupremeGeneral => 16,
            DroneHybrid => 4,
            _ => 0,
        };
        let drone_spawn_ms = match self {
            OverlordSupremo => 500.0,
            _ => 1000.0,
        };

        ClassProfile {
            fire_rate_ms: sane_f64(self, "fire rate", fire_rate_ms, DEFAULT_FIRE_RATE_MS),
            damage: sane_f32(self, "damage", damage, DEFAULT_DAMAGE),
            speed_mod: positive_f32(self, "speed", speed_mod, DEFAULT_SPEED_MOD),
            recoil,
            inaccuracy,
            explosion_radius: explosion_radius.filter(|r: &f32| r.is_finite() && *r > 0.0),
            max_bounces,
            passive_xp_rate: sane_f32(self, "passive xp", passive_xp_rate, 0.0),
            max_drones,
            drone_spawn_ms,
            pattern: self.pattern(),
        }
    }
}

fn sane_f64(class: TankClass, field: &str, value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!("{class:?}: unusable {field} {value}, using {fallback}");
        fallback
    }
}

fn sane_f32(class: TankClass, field: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!("{class:?}: unusable {field} {value}, using {fallback}");
        fallback
    }
}

fn positive_f32(class: TankClass, field: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        log::warn!("{class:?}: unusable {field} {value}, using {fallback}");
        fallback
    }
}
