//! XP, levels, stat points and class changes

use std::sync::LazyLock;

use glam::Vec2;

use super::classes::{Ability, TankClass};
use super::evolution::{self, UPGRADE_LEVELS};
use super::state::{CloneTank, GameState, Shape, StatKind, Turret, UpgradeOffer};
use crate::consts::*;

/// Highest level with a finite threshold
pub const MAX_LEVEL: u32 = 2000;

/// Rejected player actions. State is left untouched on every variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("{0:?} is not among the offered classes")]
    NotOffered(TankClass),
    #[error("no class choice is pending")]
    NoChoicePending,
    #[error("no stat points to spend")]
    NoStatPoints,
    #[error("structure limit reached")]
    StructureCap,
    #[error("current class cannot build structures")]
    NotArchitect,
}

static XP_THRESHOLDS: LazyLock<Vec<f64>> = LazyLock::new(|| {
    let mut xp = 10.0_f64;
    (1..=MAX_LEVEL)
        .map(|level| {
            let threshold = xp.floor();
            xp *= 1.1;
            if level > 50 {
                xp *= 1.01;
            }
            threshold
        })
        .collect()
});

/// XP needed to advance from `level` to the next one. Level 0 is priced
/// like level 1.
pub fn xp_threshold(level: u32) -> f64 {
    match level {
        l if l <= MAX_LEVEL => XP_THRESHOLDS[l.saturating_sub(1) as usize],
        _ => f64::INFINITY,
    }
}

impl GameState {
    /// Spend one stat point
    pub fn upgrade_stat(&mut self, stat: StatKind) -> Result<(), ActionError> {
        if self.player.stat_points == 0 {
            log::debug!("Cannot raise {}: no stat points", stat.as_str());
            return Err(ActionError::NoStatPoints);
        }
        self.player.stat_points -= 1;
        *self.player.stats.get_mut(stat) += 1;
        Ok(())
    }

    /// Resolve the pending upgrade with one of the offered classes
    pub fn choose_class(&mut self, class: TankClass) -> Result<(), ActionError> {
        let offer = self.upgrade.as_ref().ok_or(ActionError::NoChoicePending)?;
        if !offer.classes.contains(&class) {
            log::debug!("Rejected class choice {class:?}, offered {:?}", offer.classes);
            return Err(ActionError::NotOffered(class));
        }
        self.upgrade = None;
        self.set_class(class);
        Ok(())
    }

    /// Swap class and rebuild everything that depends on it
    pub(crate) fn set_class(&mut self, class: TankClass) {
        let from = self.player.tank_class;
        let stats = &mut self.player.stats;
        match (from.is_pacifist(), class.is_pacifist()) {
            (false, true) => {
                self.player.stat_points += stats.xp_gain + stats.spawn_rate;
                stats.xp_gain = 0;
                stats.spawn_rate = 0;
            }
            (true, false) => {
                self.player.stat_points += stats.passive_xp_boost;
                stats.passive_xp_boost = 0;
            }
            _ => {}
        }

        self.player.tank_class = class;
        self.player.derive_class_fields();
        self.rebuild_followers();
        log::info!("Evolved from {from:?} to {class:?}");
    }

    /// Drop followers the class no longer supports and create fixed ones
    fn rebuild_followers(&mut self) {
        let class = self.player.tank_class;
        if !class.has(Ability::Drones) {
            self.drones.clear();
        }
        if !class.has(Ability::Architect) {
            self.structures.clear();
        }

        self.turrets.clear();
        if class.has(Ability::Turrets) {
            for (i, side) in [-1.0_f32, 1.0].into_iter().enumerate() {
                let id = self.next_entity_id();
                let orbit_angle = i as f32 * std::f32::consts::PI;
                self.turrets.push(Turret {
                    id,
                    pos: self.player.pos + crate::direction(orbit_angle) * 100.0,
                    angle: self.player.angle,
                    orbit_angle,
                    side,
                    target: None,
                    last_shot_ms: f64::NEG_INFINITY,
                });
            }
        }

        self.player.clones.clear();
        if class.has(Ability::Clones) {
            for offset in [-std::f32::consts::FRAC_PI_4, std::f32::consts::FRAC_PI_4] {
                let id = self.next_entity_id();
                self.player.clones.push(CloneTank {
                    id,
                    pos: self.player.pos,
                    angle: self.player.angle,
                    offset_angle: offset,
                    target: None,
                    last_shot_ms: f64::NEG_INFINITY,
                });
            }
        }
    }

    /// Passive income for pacifist classes
    pub(crate) fn gain_passive_xp(&mut self, dt_ms: f64) {
        let player = &mut self.player;
        if player.passive_xp_rate <= 0.0 {
            return;
        }
        let boost = 1.0 + player.stats.passive_xp_boost as f64 * 0.05;
        player.xp += player.passive_xp_rate as f64 * boost * dt_ms / 1000.0;
    }

    /// Pay out a dead shape and clear the boss slot if it was the boss
    pub(crate) fn award_kill(&mut self, shape: &Shape) {
        let xp = shape.kind.xp() * self.player.stats.xp_multiplier();
        self.player.xp += xp;
        self.score += xp as u64;

        if shape.kind.is_major() {
            self.burst(shape.pos, 150, shape.kind.color(), 15.0);
            self.float_text(shape.pos, format!("+{} XP", xp.floor()), 30.0);
        } else {
            self.burst(shape.pos, 35, shape.kind.color(), 8.0);
        }

        if self.boss == Some(shape.id) {
            self.boss = None;
            log::info!("{:?} defeated", shape.kind);
        }
    }

    /// Consume as many full XP bars as are available
    pub(crate) fn level_up(&mut self) {
        while self.player.xp >= xp_threshold(self.player.level) {
            let player = &mut self.player;
            player.xp -= xp_threshold(player.level);
            player.level += 1;
            player.stat_points += STAT_POINTS_PER_LEVEL;
            player.max_health += LEVEL_UP_HEALTH_BONUS;
            player.health = player.max_health;
            let level = player.level;
            let class = player.tank_class;

            self.burst(self.player.pos, 30, 0xffd700, 6.0);

            // Keep the first offer if a burst crosses several gates
            if UPGRADE_LEVELS.contains(&level) && self.upgrade.is_none() {
                let classes = evolution::offers(class, level);
                if !classes.is_empty() {
                    log::info!("Level {level}: choose from {classes:?}");
                    self.upgrade = Some(UpgradeOffer { level, classes });
                }
            }
        }
    }

    /// Regenerate health once the player has gone a while without damage
    pub(crate) fn regenerate(&mut self, dt_ms: f64) {
        let rapid = self.player.tank_class.has(Ability::RapidRegen);
        let (delay, rate) = if rapid {
            (HEALTH_REGEN_DELAY_MS / 5.0, HEALTH_REGEN_RATE * 5.0)
        } else {
            (HEALTH_REGEN_DELAY_MS, HEALTH_REGEN_RATE)
        };
        let player = &mut self.player;
        if self.now_ms - player.last_damage_ms > delay && player.health < player.max_health {
            let gain = player.max_health * rate * (dt_ms / 1000.0) as f32;
            player.health = (player.health + gain).min(player.max_health);
        }
    }

    /// Toggle the read-only evolution tree view (pauses the simulation)
    pub fn toggle_evolution_view(&mut self) {
        self.evolution_view_open = !self.evolution_view_open;
    }

    pub fn close_evolution_view(&mut self) {
        self.evolution_view_open = false;
    }

    /// Switch to the next ammo type (multi-ammo classes only)
    pub fn cycle_ammo(&mut self) {
        if let Some(ammo) = self.player.current_ammo.as_mut() {
            *ammo = ammo.next();
            let text = format!("{ammo:?}");
            let pos = self.player.pos - Vec2::new(0.0, 40.0);
            self.float_text(pos, text, 16.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_curve() {
        assert_eq!(xp_threshold(1), 10.0);
        assert_eq!(xp_threshold(2), 11.0);
        assert_eq!(xp_threshold(3), 12.0);
        assert!(xp_threshold(MAX_LEVEL).is_finite());
        assert_eq!(xp_threshold(MAX_LEVEL + 1), f64::INFINITY);
        assert_eq!(xp_threshold(0), xp_threshold(1));
    }

    #[test]
    fn test_level_zero_still_terminates() {
        let mut state = GameState::new(1);
        state.player.level = 0;
        state.player.xp = 5.0;
        state.level_up();
        assert_eq!(state.player.level, 0);

        state.player.xp = xp_threshold(0) + 1.0;
        state.level_up();
        assert_eq!(state.player.level, 1);
        assert_eq!(state.player.xp, 1.0);
    }

    #[test]
    fn test_exact_threshold_levels_once() {
        let mut state = GameState::new(1);
        state.player.xp = xp_threshold(1);
        state.level_up();
        assert_eq!(state.player.level, 2);
        assert_eq!(state.player.xp, 0.0);
        assert_eq!(state.player.stat_points, 2);
        assert_eq!(state.player.max_health, PLAYER_START_HEALTH + LEVEL_UP_HEALTH_BONUS);
        assert_eq!(state.player.health, state.player.max_health);
    }

    #[test]
    fn test_burst_levels_twice() {
        let mut state = GameState::new(1);
        state.player.level = 10;
        state.player.xp = xp_threshold(10) + xp_threshold(11);
        state.level_up();
        assert_eq!(state.player.level, 12);
        assert_eq!(state.player.xp, 0.0);
        assert_eq!(state.player.stat_points, 4);
    }

    #[test]
    fn test_gate_level_opens_offer() {
        let mut state = GameState::new(1);
        state.player.level = 24;
        state.player.xp = xp_threshold(24);
        state.level_up();
        let offer = state.upgrade.clone().expect("offer at 25");
        assert_eq!(offer.level, 25);
        assert_eq!(offer.classes.len(), 6);
        assert!(state.is_paused());
    }

    #[test]
    fn test_burst_over_two_gates_keeps_first_offer() {
        let mut state = GameState::new(1);
        state.player.level = 20;
        state.player.xp = (20..55).map(xp_threshold).sum();
        state.level_up();
        assert_eq!(state.player.level, 55);
        let offer = state.upgrade.clone().expect("offer kept");
        assert_eq!(offer.level, 25);
        assert_eq!(offer.classes, evolution::offers(TankClass::Default, 25));

        // The 50 gate was skipped; 75 and 100 still offer something
        state.choose_class(TankClass::TwinShot).unwrap();
        assert!(!evolution::offers(TankClass::TwinShot, 75).is_empty());
        assert!(!evolution::offers(TankClass::Triplet, 100).is_empty());
    }

    #[test]
    fn test_choose_class_rejects_unoffered() {
        let mut state = GameState::new(1);
        assert_eq!(
            state.choose_class(TankClass::Sniper),
            Err(ActionError::NoChoicePending)
        );

        state.upgrade = Some(UpgradeOffer {
            level: 25,
            classes: evolution::offers(TankClass::Default, 25),
        });
        assert_eq!(
            state.choose_class(TankClass::Railgun),
            Err(ActionError::NotOffered(TankClass::Railgun))
        );
        assert_eq!(state.player.tank_class, TankClass::Default);
        assert!(state.upgrade.is_some());

        state.choose_class(TankClass::Sniper).unwrap();
        assert_eq!(state.player.tank_class, TankClass::Sniper);
        assert!(!state.is_paused());
    }

    #[test]
    fn test_pacifist_refunds() {
        let mut state = GameState::new(1);
        state.player.stats.xp_gain = 3;
        state.player.stats.spawn_rate = 2;
        state.player.stats.passive_xp_boost = 1;
        state.set_class(TankClass::Meditator);
        assert_eq!(state.player.stat_points, 5);
        assert_eq!(state.player.stats.xp_gain, 0);
        assert_eq!(state.player.stats.spawn_rate, 0);
        assert!(state.player.passive_xp_rate > 0.0);

        // Within the lineage nothing is refunded
        state.player.stats.passive_xp_boost = 4;
        state.set_class(TankClass::HarmonyViva);
        assert_eq!(state.player.stat_points, 5);

        // Leaving gives back the passive boost
        state.set_class(TankClass::Juggernaut);
        assert_eq!(state.player.stat_points, 9);
        assert_eq!(state.player.stats.passive_xp_boost, 0);
        assert_eq!(state.player.passive_xp_rate, 0.0);
    }

    #[test]
    fn test_upgrade_stat_needs_points() {
        let mut state = GameState::new(1);
        assert_eq!(
            state.upgrade_stat(StatKind::XpGain),
            Err(ActionError::NoStatPoints)
        );
        state.player.stat_points = 1;
        state.upgrade_stat(StatKind::XpGain).unwrap();
        assert_eq!(state.player.stats.xp_gain, 1);
        assert_eq!(state.player.stat_points, 0);
    }

    #[test]
    fn test_passive_xp_uses_boost() {
        let mut state = GameState::new(1);
        state.set_class(TankClass::Meditator);
        state.player.stats.passive_xp_boost = 2;
        state.gain_passive_xp(1000.0);
        assert!((state.player.xp - 25.0 * 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_follower_classes_get_followers() {
        let mut state = GameState::new(1);
        state.set_class(TankClass::LivingFortress);
        assert_eq!(state.turrets.len(), 2);
        state.set_class(TankClass::SupremeConsciousness);
        assert!(state.turrets.is_empty());
        assert_eq!(state.player.clones.len(), 2);
    }

    #[test]
    fn test_regen_waits_for_delay() {
        let mut state = GameState::new(1);
        state.player.health = 50.0;
        state.player.last_damage_ms = 0.0;
        state.now_ms = 1000.0;
        state.regenerate(1000.0);
        assert_eq!(state.player.health, 50.0);

        state.now_ms = HEALTH_REGEN_DELAY_MS + 1.0;
        state.regenerate(1000.0);
        assert!((state.player.health - 52.0).abs() < 1e-4);
    }
}
