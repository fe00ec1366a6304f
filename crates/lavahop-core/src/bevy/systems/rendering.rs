//! Rendering systems for the lava scene.
//!
//! Uses Bevy's Gizmos API to draw the scene entities from their `Transform`
//! and `Tint`, and mirrors the logical `SceneCamera` onto the render camera.

use std::f32::consts::FRAC_PI_2;

use bevy::math::Isometry3d;
use bevy::prelude::*;

use crate::bevy::components::{
    AmbientParticle, Character, ConfettiParticle, Ground, MainCamera, Platform, PlatformLabel,
    SceneCamera, Tint,
};
use crate::bevy::resources::SceneSettings;

/// Tint color with opacity and glow applied.
fn shade(tint: &Tint) -> Color {
    let linear = tint.color.to_linear();
    let boost = 1.0 + tint.emissive;
    Color::from(LinearRgba::new(
        linear.red * boost,
        linear.green * boost,
        linear.blue * boost,
        tint.opacity.clamp(0.0, 1.0),
    ))
}

/// Orthographic scale that shows `half_height` world units above and below
/// the centre. One world unit per pixel at scale 1.
fn ortho_scale(camera: &SceneCamera) -> f32 {
    2.0 * camera.half_height / camera.viewport.y.max(1.0)
}

/// Spawns the render camera once.
pub fn setup_render_camera(mut commands: Commands, existing: Query<Entity, With<MainCamera>>) {
    if !existing.is_empty() {
        return;
    }
    commands.spawn((
        Camera3d::default(),
        Projection::Orthographic(OrthographicProjection::default_3d()),
        MainCamera,
        Transform::default(),
    ));
    tracing::info!("[scene] render camera spawned");
}

/// System to copy the logical camera pose and framing to the render camera.
pub fn sync_render_camera(
    scene_cameras: Query<&SceneCamera>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<MainCamera>>,
) {
    let Some(scene_camera) = scene_cameras.iter().next() else {
        return;
    };
    for (mut transform, mut projection) in &mut cameras {
        *transform = scene_camera.transform();
        if let Projection::Orthographic(ortho) = projection.as_mut() {
            ortho.scale = ortho_scale(scene_camera);
            ortho.near = scene_camera.near;
            ortho.far = scene_camera.far;
        }
    }
}

/// System to draw every scene entity.
#[allow(clippy::type_complexity)]
pub fn render_scene(
    mut gizmos: Gizmos,
    settings: Res<SceneSettings>,
    grounds: Query<(&Transform, &Tint), With<Ground>>,
    platforms: Query<(&Transform, &Tint), With<Platform>>,
    labels: Query<(&Transform, &Tint), With<PlatformLabel>>,
    characters: Query<(&Transform, &Tint), With<Character>>,
    embers: Query<(&Transform, &Tint), With<AmbientParticle>>,
    confetti: Query<(&Transform, &Tint), With<ConfettiParticle>>,
) {
    let geometry = &settings.0.geometry;
    let flat = Quat::from_rotation_x(-FRAC_PI_2);

    for (transform, tint) in &grounds {
        gizmos.rect(
            Isometry3d::new(transform.translation, flat),
            Vec2::new(geometry.lava_width, geometry.lava_depth),
            shade(tint),
        );
    }

    let platform_size = Vec3::new(
        geometry.platform_width,
        geometry.platform_height,
        geometry.platform_depth,
    );
    for (transform, tint) in &platforms {
        let body = Transform {
            scale: transform.scale * platform_size,
            ..*transform
        };
        gizmos.cube(body, shade(tint));
    }

    for (transform, tint) in &labels {
        gizmos.circle(
            Isometry3d::new(transform.translation, flat),
            geometry.platform_width * 0.15,
            shade(tint),
        );
    }

    for (transform, tint) in &characters {
        gizmos.sphere(
            Isometry3d::new(transform.translation, transform.rotation),
            geometry.character_radius * transform.scale.y,
            shade(tint),
        );
    }

    for (transform, tint) in &embers {
        gizmos.sphere(
            Isometry3d::from_translation(transform.translation),
            0.08,
            shade(tint),
        );
    }

    for (transform, tint) in &confetti {
        gizmos.cube(*transform, shade(tint));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bevy::scene_graph::home_camera;
    use crate::config::SceneConfig;

    #[test]
    fn test_shade_applies_glow_and_opacity() {
        let mut tint = Tint::glowing(Color::linear_rgb(0.2, 0.4, 0.1), 0.5);
        tint.opacity = 0.25;
        let shaded = shade(&tint).to_linear();
        assert!((shaded.red - 0.3).abs() < 1e-5);
        assert!((shaded.green - 0.6).abs() < 1e-5);
        assert!((shaded.blue - 0.15).abs() < 1e-5);
        assert!((shaded.alpha - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_ortho_scale_frames_half_height() {
        let config = SceneConfig::default();
        let camera = home_camera(&config, Vec2::new(1280.0, 720.0));
        let visible_height = ortho_scale(&camera) * camera.viewport.y;
        assert!((visible_height - 2.0 * camera.half_height).abs() < 1e-3);
    }
}
