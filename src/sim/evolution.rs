//! Evolution tree
//!
//! Upgrade offers depend on the gate level being crossed:
//! - 25 / 50 / 75: the hand-authored branches of the early tree
//! - 100: the fixed supreme set for every class (pacifists may also
//!   continue their lineage)
//! - 200: one of three paths picked by the level-100 class
//! - 400 / 800 / 1600: a single mapped successor
//!
//! The parent/children structure is a breadth-first spanning tree of those
//! offers rooted at [`TankClass::Default`], following each class only into
//! the gate right after its own tier. Built once and shared.

use std::collections::VecDeque;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::classes::TankClass;

/// Levels at which a class upgrade is offered
pub const UPGRADE_LEVELS: [u32; 8] = [25, 50, 75, 100, 200, 400, 800, 1600];

/// Level-200 branch families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Path {
    Offensive,
    Balanced,
    Defensive,
}

use TankClass::*;

const SUPREME_EVOLUTIONS: [TankClass; 5] =
    [OverlordSupremo, Defender, Fortress, Titan, Juggernaut];

const OFFENSIVE: [TankClass; 4] = [CannonColossus, NuclearSwarm, BulletStorm, SupremeHunter];
const BALANCED: [TankClass; 4] = [LivingFortress, ReactiveShield, DroneOvermind, Artificer];
const DEFENSIVE: [TankClass; 4] = [ArmoredTitan, Muramasa, MineMaster, EternalGuardian];

/// Hand-authored branches for levels 25-100
fn branches(class: TankClass) -> &'static [TankClass] {
    match class {
        Default => &[TwinShot, Sniper, MachineGun, Destroyer, Bomber, Meditator],
        TwinShot => &[Triplet, TwinHeavy],
        Sniper => &[Assassin, Ricochet],
        MachineGun => &[Gatling, Hybrid],
        Destroyer => &[Annihilator, Launcher],
        Bomber => &[Cluster, MineLayer],
        Triplet => &[Spreadshot],
        TwinHeavy => &[FortressTwin],
        Assassin => &[Railgun],
        Ricochet => &[Pinball],
        Gatling => &[Vulcan],
        Hybrid => &[DroneHybrid],
        Annihilator => &[Obliterator],
        Launcher => &[Seeker],
        Cluster => &[NukeCluster],
        MineLayer => &[SpiderMines],
        Meditator => &[HarmonyViva],
        HarmonyViva => &[Channeler],
        Channeler => &[SpiritOfPeace],
        _ => &[],
    }
}

fn path_of(class: TankClass) -> Option<Path> {
    match class {
        OverlordSupremo => Some(Path::Balanced),
        Defender | Fortress => Some(Path::Defensive),
        Titan | Juggernaut => Some(Path::Offensive),
        _ => None,
    }
}

fn path_classes(path: Path) -> &'static [TankClass] {
    match path {
        Path::Offensive => &OFFENSIVE,
        Path::Balanced => &BALANCED,
        Path::Defensive => &DEFENSIVE,
    }
}

fn ascension(class: TankClass) -> Option<TankClass> {
    Some(match class {
        CannonColossus => ColossalArtillery,
        NuclearSwarm => NuclearTempest,
        BulletStorm => BulletHurricane,
        SupremeHunter => PhantomHunter,
        LivingFortress => LivingCitadel,
        ReactiveShield => PrismaticShield,
        DroneOvermind => AscendedOvermind,
        Artificer => WarEngineer,
        ArmoredTitan => SteelTitan,
        Muramasa => MobileWall,
        MineMaster => MineWeaver,
        EternalGuardian => AbsoluteGuardian,
        _ => return None,
    })
}

fn apotheosis(class: TankClass) -> Option<TankClass> {
    Some(match class {
        ColossalArtillery => GodOfWar,
        NuclearTempest => NuclearSun,
        BulletHurricane => InfiniteRain,
        PhantomHunter => StellarPredator,
        LivingCitadel => SupremeArchitect,
        PrismaticShield => DimensionalShield,
        AscendedOvermind => CosmicOvermind,
        WarEngineer => SupremeArtificer,
        SteelTitan => CosmicGuardian,
        MobileWall => WanderingFortress,
        MineWeaver => TrapMaster,
        AbsoluteGuardian => ShieldColossus,
        _ => return None,
    })
}

fn transcendence(class: TankClass) -> Option<TankClass> {
    Some(match class {
        GodOfWar => InfiniteFury,
        NuclearSun => WarSupernova,
        InfiniteRain => FireTsunami,
        StellarPredator => DimensionalHunter,
        SupremeArchitect => SupremeConsciousness,
        DimensionalShield => RealityWeaver,
        CosmicOvermind => ElementalMaster,
        SupremeArtificer => SupremeGeneral,
        CosmicGuardian => PureImmortality,
        WanderingFortress => CrystalColossus,
        TrapMaster => EternalMuramasa,
        ShieldColossus => PlanetaryGuardian,
        _ => return None,
    })
}

/// Classes offered to a player of `class` who just reached `level`.
/// Empty when `level` is not a gate or the class has nowhere to go.
pub fn offers(class: TankClass, level: u32) -> Vec<TankClass> {
    match level {
        25 | 50 | 75 => branches(class).to_vec(),
        100 => {
            let mut out = if class.is_pacifist() {
                branches(class).to_vec()
            } else {
                Vec::new()
            };
            out.extend_from_slice(&SUPREME_EVOLUTIONS);
            out
        }
        200 => path_of(class).map(|p| path_classes(p).to_vec()).unwrap_or_default(),
        400 => ascension(class).into_iter().collect(),
        800 => apotheosis(class).into_iter().collect(),
        1600 => transcendence(class).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Level at which a class first becomes available
pub fn unlock_level(class: TankClass) -> u32 {
    let i = class.index();
    match i {
        0 => 1,
        1..=6 => 25,
        7..=17 => 50,
        18..=28 => 75,
        29..=34 => 100,
        35..=46 => 200,
        47..=58 => 400,
        59..=70 => 800,
        _ => 1600,
    }
}

/// First upgrade gate above `level`
pub fn next_gate(level: u32) -> Option<u32> {
    UPGRADE_LEVELS.iter().copied().find(|&gate| gate > level)
}

/// Precomputed parent/children structure over every class
#[derive(Debug, Clone)]
pub struct EvolutionTree {
    parent: Vec<Option<TankClass>>,
    children: Vec<Vec<TankClass>>,
}

static TREE: LazyLock<EvolutionTree> = LazyLock::new(EvolutionTree::build);

impl EvolutionTree {
    /// The shared tree
    pub fn get() -> &'static EvolutionTree {
        &TREE
    }

    fn build() -> Self {
        let n = TankClass::ALL.len();
        let mut parent: Vec<Option<TankClass>> = vec![None; n];
        let mut children: Vec<Vec<TankClass>> = vec![Vec::new(); n];
        let mut seen = vec![false; n];

        let mut queue = VecDeque::from([TankClass::Default]);
        seen[TankClass::Default.index()] = true;

        while let Some(class) = queue.pop_front() {
            let Some(gate) = next_gate(unlock_level(class)) else {
                continue;
            };
            for child in offers(class, gate) {
                if !seen[child.index()] {
                    seen[child.index()] = true;
                    parent[child.index()] = Some(class);
                    children[class.index()].push(child);
                    queue.push_back(child);
                }
            }
        }

        let missing = seen.iter().filter(|s| !**s).count();
        if missing > 0 {
            log::warn!("{missing} classes are unreachable from the root class");
        }

        Self { parent, children }
    }

    pub fn root(&self) -> TankClass {
        TankClass::Default
    }

    pub fn parent(&self, class: TankClass) -> Option<TankClass> {
        self.parent[class.index()]
    }

    pub fn children(&self, class: TankClass) -> &[TankClass] {
        &self.children[class.index()]
    }

    /// Ancestors from the immediate parent up to the root
    pub fn ancestors(&self, class: TankClass) -> Vec<TankClass> {
        let mut out = Vec::new();
        let mut cur = self.parent(class);
        while let Some(c) = cur {
            out.push(c);
            cur = self.parent(c);
        }
        out
    }

    /// Classes reachable from the root, breadth first
    pub fn reachable(&self) -> Vec<TankClass> {
        let mut out = vec![self.root()];
        let mut i = 0;
        while i < out.len() {
            out.extend_from_slice(self.children(out[i]));
            i += 1;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tree_covers_every_class() {
        let tree = EvolutionTree::get();
        let reachable: HashSet<_> = tree.reachable().into_iter().collect();
        let all: HashSet<_> = TankClass::ALL.into_iter().collect();
        assert_eq!(reachable, all);
        // No node is visited twice, so there are no cycles or shared children
        assert_eq!(tree.reachable().len(), TankClass::ALL.len());
    }

    #[test]
    fn test_every_non_root_has_exactly_one_parent() {
        let tree = EvolutionTree::get();
        assert_eq!(tree.parent(TankClass::Default), None);
        for class in TankClass::ALL.into_iter().skip(1) {
            let parent = tree.parent(class).expect("non-root must have a parent");
            let listed_by = TankClass::ALL
                .into_iter()
                .filter(|c| tree.children(*c).contains(&class))
                .count();
            assert_eq!(listed_by, 1, "{class:?} listed by {listed_by} parents");
            assert!(tree.children(parent).contains(&class));
        }
    }

    #[test]
    fn test_ancestors_end_at_root() {
        let tree = EvolutionTree::get();
        let chain = tree.ancestors(TankClass::InfiniteFury);
        assert_eq!(chain.first(), Some(&TankClass::GodOfWar));
        assert_eq!(chain.last(), Some(&TankClass::Default));
    }

    #[test]
    fn test_pacifist_lineage_is_disjoint() {
        let tree = EvolutionTree::get();
        for class in [HarmonyViva, Channeler, SpiritOfPeace] {
            let parent = tree.parent(class).unwrap();
            assert!(parent.is_pacifist(), "{class:?} has non-pacifist parent");
        }
    }

    #[test]
    fn test_gate_offers() {
        assert_eq!(offers(Default, 25).len(), 6);
        assert_eq!(offers(Triplet, 75), vec![Spreadshot]);
        assert_eq!(offers(Vulcan, 100), SUPREME_EVOLUTIONS.to_vec());
        assert_eq!(offers(Titan, 200), OFFENSIVE.to_vec());
        assert_eq!(offers(OverlordSupremo, 200), BALANCED.to_vec());
        assert_eq!(offers(Muramasa, 400), vec![MobileWall]);
        assert_eq!(offers(TrapMaster, 1600), vec![EternalMuramasa]);
        assert!(offers(SpiritOfPeace, 200).is_empty());
        assert!(offers(Default, 26).is_empty());
    }

    #[test]
    fn test_supreme_set_open_to_any_tier() {
        // Classes that skipped a gate still get somewhere to go at 100
        for class in [Default, TwinShot, Triplet, Spreadshot, Railgun] {
            assert_eq!(offers(class, 100), SUPREME_EVOLUTIONS.to_vec(), "{class:?}");
        }
        let pacifist = [&[HarmonyViva][..], &SUPREME_EVOLUTIONS[..]].concat();
        assert_eq!(offers(Meditator, 100), pacifist);
    }

    #[test]
    fn test_supreme_parents_are_tier_75() {
        let tree = EvolutionTree::get();
        for class in SUPREME_EVOLUTIONS {
            let parent = tree.parent(class).unwrap();
            assert_eq!(unlock_level(parent), 75, "{class:?} under {parent:?}");
        }
        assert_eq!(next_gate(1), Some(25));
        assert_eq!(next_gate(75), Some(100));
        assert_eq!(next_gate(1600), None);
    }

    #[test]
    fn test_channeler_may_leave_or_continue() {
        let at_100 = offers(Channeler, 100);
        assert_eq!(at_100[0], SpiritOfPeace);
        assert!(at_100.contains(&Juggernaut));
    }

    #[test]
    fn test_unlock_levels_follow_tiers() {
        assert_eq!(unlock_level(Default), 1);
        assert_eq!(unlock_level(Meditator), 25);
        assert_eq!(unlock_level(HarmonyViva), 50);
        assert_eq!(unlock_level(Channeler), 75);
        assert_eq!(unlock_level(SpiritOfPeace), 100);
        assert_eq!(unlock_level(EternalGuardian), 200);
        assert_eq!(unlock_level(AbsoluteGuardian), 400);
        assert_eq!(unlock_level(ShieldColossus), 800);
        assert_eq!(unlock_level(PlanetaryGuardian), 1600);
    }
}
