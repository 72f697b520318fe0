//! Per-frame simulation tick
//!
//! One call per animation frame. The frame body is an explicit ordered list
//! of [`Phase`]s; later phases see everything earlier phases changed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::GameState;

/// Input state sampled once per frame
///
/// Autofire and autofarm are never both on: enabling one switches the other
/// off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pointer position in viewport pixels
    pub pointer: Vec2,
    /// Primary button held
    pub pointer_down: bool,
    autofire: bool,
    autofarm: bool,
}

impl Controls {
    pub fn autofire(&self) -> bool {
        self.autofire
    }

    pub fn autofarm(&self) -> bool {
        self.autofarm
    }

    pub fn set_autofire(&mut self, on: bool) {
        self.autofire = on;
        if on {
            self.autofarm = false;
        }
    }

    pub fn set_autofarm(&mut self, on: bool) {
        self.autofarm = on;
        if on {
            self.autofire = false;
        }
    }

    /// Flip autofire, returning the new state
    pub fn toggle_autofire(&mut self) -> bool {
        self.set_autofire(!self.autofire);
        self.autofire
    }

    /// Flip autofarm, returning the new state
    pub fn toggle_autofarm(&mut self) -> bool {
        self.set_autofarm(!self.autofarm);
        self.autofarm
    }

    /// Raw movement direction from the held keys (not normalised)
    pub fn move_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.up {
            axis.y -= 1.0;
        }
        if self.down {
            axis.y += 1.0;
        }
        if self.left {
            axis.x -= 1.0;
        }
        if self.right {
            axis.x += 1.0;
        }
        axis
    }
}

/// Everything the outside world hands the simulation for one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub controls: Controls,
    /// Viewport size in pixels; `None` keeps the previous one
    pub viewport: Option<Vec2>,
    /// Switch to the next ammo type (one-shot)
    pub cycle_ammo: bool,
    /// Place a structure at this viewport position (one-shot, architect
    /// classes only)
    pub place_structure: Option<Vec2>,
}

/// A step of the frame body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    DelayedExplosions,
    Boss,
    Clones,
    Structures,
    Turrets,
    Player,
    Projectiles,
    Shapes,
    Drones,
    Effects,
    Mines,
    Collisions,
    DeathSweep,
    BodyCollision,
    Regen,
    LevelUp,
    Populate,
}

impl Phase {
    /// Frame body, in execution order
    pub const ORDER: [Phase; 17] = [
        Phase::DelayedExplosions,
        Phase::Boss,
        Phase::Clones,
        Phase::Structures,
        Phase::Turrets,
        Phase::Player,
        Phase::Projectiles,
        Phase::Shapes,
        Phase::Drones,
        Phase::Effects,
        Phase::Mines,
        Phase::Collisions,
        Phase::DeathSweep,
        Phase::BodyCollision,
        Phase::Regen,
        Phase::LevelUp,
        Phase::Populate,
    ];

    /// Run this phase against the state
    pub fn run(self, state: &mut GameState, controls: &Controls, dt_ms: f64) {
        match self {
            Phase::DelayedExplosions => state.update_delayed_explosions(dt_ms),
            Phase::Boss => {
                state.update_boss_timer(dt_ms);
                state.update_boss(dt_ms);
            }
            Phase::Clones => state.update_clones(),
            Phase::Structures => state.update_structures(),
            Phase::Turrets => state.update_turrets(),
            Phase::Player => state.update_player(controls, dt_ms),
            Phase::Projectiles => state.update_projectiles(dt_ms),
            Phase::Shapes => state.update_shapes(),
            Phase::Drones => state.update_drones(),
            Phase::Effects => state.update_effects(),
            Phase::Mines => state.update_mines(),
            Phase::Collisions => state.resolve_collisions(),
            Phase::DeathSweep => state.death_sweep(),
            Phase::BodyCollision => state.body_collisions(),
            Phase::Regen => state.regenerate(dt_ms),
            Phase::LevelUp => state.level_up(),
            Phase::Populate => state.maybe_spawn(),
        }
    }
}

/// Advance the game by one frame stamped `now_ms`
///
/// The time delta comes from the previous frame's stamp (zero on the first
/// frame, never negative). The clock keeps running while the game is paused
/// for a class choice or the evolution view, but nothing else changes.
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: f64) {
    let dt_ms = state
        .last_time_ms
        .map_or(0.0, |last| (now_ms - last).max(0.0));
    state.last_time_ms = Some(now_ms);
    state.now_ms = now_ms;
    if let Some(viewport) = input.viewport {
        state.viewport = viewport;
    }

    // Checked once per frame, never between phases
    if state.game_over || state.is_paused() {
        return;
    }

    if input.cycle_ammo {
        state.cycle_ammo();
    }
    if let Some(screen) = input.place_structure {
        let viewport = state.viewport;
        if let Err(e) = state.place_structure(screen, viewport) {
            log::debug!("Structure not placed: {e}");
        }
    }

    for phase in Phase::ORDER {
        phase.run(state, &input.controls, dt_ms);
    }
    state.frame += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::classes::TankClass;
    use crate::sim::progression::xp_threshold;
    use crate::sim::state::{Shape, ShapeKind};

    const FRAME: f64 = 1000.0 / 60.0;

    #[test]
    fn test_autofire_autofarm_exclusive() {
        let mut controls = Controls::default();
        controls.set_autofire(true);
        assert!(controls.autofire() && !controls.autofarm());
        assert!(controls.toggle_autofarm());
        assert!(!controls.autofire());
        assert!(controls.toggle_autofire());
        assert!(!controls.autofarm());
        assert!(!controls.toggle_autofire());
        assert!(!controls.autofire() && !controls.autofarm());
    }

    #[test]
    fn test_phase_order() {
        assert_eq!(Phase::ORDER.first(), Some(&Phase::DelayedExplosions));
        assert_eq!(Phase::ORDER.last(), Some(&Phase::Populate));
        let pos = |p| Phase::ORDER.iter().position(|&q| q == p);
        assert!(pos(Phase::DeathSweep) < pos(Phase::BodyCollision));
        assert!(pos(Phase::Mines) < pos(Phase::Collisions));
        assert!(pos(Phase::Regen) < pos(Phase::LevelUp));
    }

    #[test]
    fn test_first_frame_has_zero_delta() {
        let mut state = GameState::new(3);
        let timer = state.boss_timer_ms;
        tick(&mut state, &TickInput::default(), 50_000.0);
        assert_eq!(state.boss_timer_ms, timer);
        tick(&mut state, &TickInput::default(), 50_000.0 + FRAME);
        assert!((state.boss_timer_ms - (timer - FRAME)).abs() < 1e-6);
        // Clock going backwards counts as no time
        tick(&mut state, &TickInput::default(), 40_000.0);
        assert!((state.boss_timer_ms - (timer - FRAME)).abs() < 1e-6);
        assert_eq!(state.frame, 3);
    }

    #[test]
    fn test_exact_threshold_levels_once() {
        let mut state = GameState::new(3);
        state.player.xp = xp_threshold(1);
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.player.level, 2);
        assert_eq!(state.player.xp, 0.0);
        assert_eq!(state.player.stat_points, STAT_POINTS_PER_LEVEL);
    }

    #[test]
    fn test_gate_pauses_until_choice() {
        let mut state = GameState::new(3);
        state.player.level = 24;
        state.player.xp = xp_threshold(24);
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.player.level, 25);
        assert!(state.is_paused());
        let frame = state.frame;

        let mut input = TickInput::default();
        input.controls.right = true;
        let pos = state.player.pos;
        tick(&mut state, &input, FRAME);
        assert_eq!(state.frame, frame);
        assert_eq!(state.player.pos, pos);

        let first = state.upgrade.as_ref().unwrap().classes[0];
        state.choose_class(first).unwrap();
        tick(&mut state, &input, 2.0 * FRAME);
        assert_eq!(state.frame, frame + 1);
        assert_eq!(state.player.tank_class, first);
    }

    #[test]
    fn test_evolution_view_pauses() {
        let mut state = GameState::new(3);
        state.toggle_evolution_view();
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.frame, 0);
        state.close_evolution_view();
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.frame, 1);
    }

    #[test]
    fn test_game_over_is_inert() {
        let mut state = GameState::new(3);
        state.damage_player(10_000.0, None);
        assert!(state.game_over);
        assert_eq!(state.player.health, 0.0);
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.frame, 0);
    }

    #[test]
    fn test_dead_shape_on_player_pays_once() {
        let mut state = GameState::new(3);
        let id = state.next_entity_id();
        let mut square = Shape::new(id, ShapeKind::Square, state.player.pos);
        square.health = 0.0;
        state.shapes.push(square);

        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.score, ShapeKind::Square.xp() as u64);
        // Already removed by the sweep, so no body hit
        assert_eq!(state.player.last_damage_ms, f64::NEG_INFINITY);
        assert!(state.shape(id).is_none());
    }

    #[test]
    fn test_body_collision_kills_and_hurts() {
        let mut state = GameState::new(3);
        let pos = state.player.pos + Vec2::new(25.0, 0.0);
        let id = state.spawn_shape(Some(ShapeKind::Triangle), Some(pos));

        tick(&mut state, &TickInput::default(), 500.0);
        assert!(state.shape(id).is_none());
        assert_eq!(state.score, ShapeKind::Triangle.xp() as u64);
        assert_eq!(state.player.last_damage_ms, 500.0);
    }

    #[test]
    fn test_structure_placement_from_input() {
        let mut state = GameState::new(3);
        state.set_class(TankClass::SupremeArchitect);
        let input = TickInput {
            viewport: Some(Vec2::new(800.0, 600.0)),
            place_structure: Some(Vec2::new(600.0, 300.0)),
            ..Default::default()
        };
        tick(&mut state, &input, 0.0);
        assert_eq!(state.structures.len(), 1);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99);
        let mut b = GameState::new(99);
        a.populate();
        b.populate();
        let mut input = TickInput::default();
        input.controls.set_autofarm(true);
        for i in 0..300 {
            let now = i as f64 * FRAME;
            tick(&mut a, &input, now);
            tick(&mut b, &input, now);
        }
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.player.xp, b.player.xp);
        assert_eq!(a.shapes.len(), b.shapes.len());
        assert!(a.shapes.iter().zip(&b.shapes).all(|(x, y)| x.id == y.id && x.pos == y.pos));
        assert_eq!(a.projectiles.len(), b.projectiles.len());
    }
}
