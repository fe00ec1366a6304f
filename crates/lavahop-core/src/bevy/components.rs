//! ECS Components for the lava scene.
//!
//! Every entity spawned by the scene graph carries `SceneOwned`, a `Transform`
//! and a `Tint`, plus exactly one role component.

use bevy::math::Mat4;
use bevy::prelude::*;

/// Marker for entities owned (and disposed) by the scene graph.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SceneOwned;

/// Converts a `0xRRGGBB` palette entry.
pub fn hex_color(hex: u32) -> Color {
    let [_, r, g, b] = hex.to_be_bytes();
    Color::srgb_u8(r, g, b)
}

/// Material state of a scene entity.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Tint {
    pub color: Color,
    pub opacity: f32,
    /// Glow strength, only meaningful for the lava.
    pub emissive: f32,
}

impl Tint {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            emissive: 0.0,
        }
    }

    pub fn glowing(color: Color, emissive: f32) -> Self {
        Self {
            emissive,
            ..Self::new(color)
        }
    }
}

/// An answer platform.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Option index this platform stands for (0..4).
    pub index: usize,
}

/// Values `reset_platforms` restores.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PlatformBaseline {
    pub y: f32,
    pub color: Color,
}

/// Letter floating above a platform.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct PlatformLabel {
    pub index: usize,
    pub text: String,
}

/// The jumping character.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Character;

/// The lava plane.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Ground;

/// Ember rising from the lava; moved every frame, never by tasks.
#[derive(Component, Debug, Clone, Copy)]
pub struct AmbientParticle {
    pub rise_speed: f32,
    /// Phase offset of the sideways sway.
    pub phase: f32,
    /// Height the ember restarts from once it reaches the ceiling.
    pub floor_y: f32,
}

/// Confetti piece; driven and despawned by its Confetti task.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ConfettiParticle;

/// Logical orthographic camera of the scene.
///
/// Animation tasks and victory mode write here; the render camera mirrors it.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SceneCamera {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Half of the visible world height.
    pub half_height: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
    pub near: f32,
    pub far: f32,
}

impl SceneCamera {
    pub fn aspect(&self) -> f32 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let half_width = self.half_height * self.aspect();
        Mat4::orthographic_rh(
            -half_width,
            half_width,
            -self.half_height,
            self.half_height,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Transform matching the camera pose.
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).looking_at(self.look_at, Vec3::Y)
    }
}

/// Marker for the render camera spawned by the unified plugin.
#[derive(Component, Debug, Clone, Default)]
pub struct MainCamera;
