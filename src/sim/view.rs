//! Read-only frame snapshot for renderers and UI

use glam::Vec2;
use serde::Serialize;

use super::state::{
    DelayedExplosion, Drone, FloatingText, GameState, Mine, Particle, Player, Projectile, Shape,
    Structure, Turret, UpgradeOffer,
};
use crate::zoom_for_level;

/// Visible world rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraRect {
    /// Top-left corner in world units
    pub min: Vec2,
    /// Size in world units
    pub size: Vec2,
    pub zoom: f32,
}

impl CameraRect {
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.min + self.size;
        point.x >= self.min.x && point.y >= self.min.y && point.x <= max.x && point.y <= max.y
    }
}

impl GameState {
    /// Camera centred on the player, zoomed out as the player levels
    pub fn camera_rect(&self) -> CameraRect {
        let zoom = zoom_for_level(self.player.level);
        let size = self.viewport / zoom;
        CameraRect {
            min: self.player.pos - size / 2.0,
            size,
            zoom,
        }
    }

    /// Borrow everything a renderer needs for this frame
    pub fn frame_view(&self) -> FrameView<'_> {
        FrameView {
            frame: self.frame,
            now_ms: self.now_ms,
            camera: self.camera_rect(),
            player: &self.player,
            shapes: &self.shapes,
            projectiles: &self.projectiles,
            drones: &self.drones,
            mines: &self.mines,
            turrets: &self.turrets,
            structures: &self.structures,
            particles: &self.particles,
            floating_texts: &self.floating_texts,
            delayed_explosions: &self.delayed_explosions,
            boss: self.boss.and_then(|id| self.shape(id)),
            upgrade: self.upgrade.as_ref(),
            evolution_view_open: self.evolution_view_open,
            game_over: self.game_over,
            score: self.score,
        }
    }
}

/// Borrowed snapshot of one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameView<'a> {
    pub frame: u64,
    pub now_ms: f64,
    pub camera: CameraRect,
    pub player: &'a Player,
    pub shapes: &'a [Shape],
    pub projectiles: &'a [Projectile],
    pub drones: &'a [Drone],
    pub mines: &'a [Mine],
    pub turrets: &'a [Turret],
    pub structures: &'a [Structure],
    pub particles: &'a [Particle],
    pub floating_texts: &'a [FloatingText],
    pub delayed_explosions: &'a [DelayedExplosion],
    pub boss: Option<&'a Shape>,
    /// Pending class choice, if any
    pub upgrade: Option<&'a UpgradeOffer>,
    pub evolution_view_open: bool,
    pub game_over: bool,
    pub score: u64,
}

impl FrameView<'_> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
