//! Scene graph lifecycle: spawning, resetting and disposing scene entities.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use crate::bevy::animation::AnimationScheduler;
use crate::bevy::components::{
    AmbientParticle, Character, Ground, Platform, PlatformBaseline, PlatformLabel, SceneCamera,
    SceneOwned, Tint, hex_color,
};
use crate::bevy::resources::{
    CharacterRest, DeterministicRng, HoverState, SceneHandles, SceneSettings, ViewportSize,
    VictoryMode, live_handles, scene_config,
};
use crate::config::{PLATFORM_COUNT, PLATFORM_LABELS, SceneConfig};
use crate::error::SceneError;

/// Builds a fresh scene, replacing any previous one.
pub fn spawn_scene(world: &mut World, config: &SceneConfig) -> SceneHandles {
    if live_handles(world).is_ok() {
        // Replay: the old entities go before the new ones arrive.
        let _ = dispose(world);
    }
    world.insert_resource(SceneSettings::new(config.clone()));
    world.init_resource::<DeterministicRng>();
    world.init_resource::<AnimationScheduler>();
    world.resource_mut::<AnimationScheduler>().clear();

    let geometry = &config.geometry;
    let ground = world
        .spawn((
            Ground,
            SceneOwned,
            Transform::from_xyz(0.0, geometry.lava_y, 0.0),
            Tint::glowing(hex_color(config.palette.lava), 0.2),
        ))
        .id();

    let platforms = create_platforms(world, config, PLATFORM_COUNT);
    let labels = label_entities(world);

    let home = Vec3::new(0.0, geometry.standing_y(), geometry.character_home_z);
    let character = world
        .spawn((
            Character,
            SceneOwned,
            Transform::from_translation(home),
            Tint::new(hex_color(config.palette.character)),
        ))
        .id();

    let viewport = world.get_resource::<ViewportSize>().copied().unwrap_or_default().0;
    let scene_camera = home_camera(config, viewport);
    let camera = world
        .spawn((SceneOwned, scene_camera.transform(), scene_camera))
        .id();

    let embers = spawn_embers(world, config);

    let handles = SceneHandles::new(platforms, labels, character, ground, camera, embers);
    world.insert_resource(handles.clone());
    world.insert_resource(CharacterRest::at_home(home));
    world.insert_resource(HoverState::default());
    world.insert_resource(VictoryMode::default());

    tracing::info!(
        "[scene] Spawned scene ({} platforms, {} embers)",
        handles.platforms.len(),
        handles.embers.len()
    );
    handles
}

/// Canonical camera framing for a viewport.
pub fn home_camera(config: &SceneConfig, viewport: Vec2) -> SceneCamera {
    let camera = &config.camera;
    SceneCamera {
        position: Vec3::from_array(camera.position),
        look_at: Vec3::from_array(camera.look_at),
        half_height: camera.half_height_for_width(viewport.x),
        viewport,
        near: camera.near,
        far: camera.far,
    }
}

/// Spawns `count` platforms in a row along X, each with its letter label.
pub fn create_platforms(world: &mut World, config: &SceneConfig, count: usize) -> Vec<Entity> {
    let geometry = &config.geometry;
    let color = hex_color(config.palette.platform);
    let label_color = hex_color(config.palette.label);

    (0..count)
        .map(|index| {
            let x = geometry.platform_x(index, count);
            let platform = world
                .spawn((
                    Platform { index },
                    PlatformBaseline { y: 0.0, color },
                    SceneOwned,
                    Transform::from_xyz(x, 0.0, 0.0),
                    Tint::new(color),
                ))
                .id();

            let text = PLATFORM_LABELS
                .get(index)
                .map_or_else(|| (index + 1).to_string(), |s| (*s).to_string());
            world.spawn((
                PlatformLabel { index, text },
                SceneOwned,
                Transform::from_xyz(x, geometry.platform_top() + geometry.label_offset, 0.0),
                Tint::new(label_color),
            ));
            platform
        })
        .collect()
}

fn label_entities(world: &mut World) -> Vec<Entity> {
    let mut labels: Vec<(usize, Entity)> = world
        .query::<(Entity, &PlatformLabel)>()
        .iter(world)
        .map(|(entity, label)| (label.index, entity))
        .collect();
    labels.sort_by_key(|(index, _)| *index);
    labels.into_iter().map(|(_, entity)| entity).collect()
}

fn spawn_embers(world: &mut World, config: &SceneConfig) -> Vec<Entity> {
    let ambient = &config.ambient;
    let geometry = &config.geometry;
    let color = hex_color(config.palette.lava_bright);
    let half_width = geometry.lava_width / 2.0;
    let half_depth = geometry.lava_depth / 2.0;

    let particles: Vec<(Vec3, AmbientParticle)> = {
        let mut rng = world.resource_mut::<DeterministicRng>();
        (0..ambient.ember_count)
            .map(|_| {
                let at = Vec3::new(
                    rng.rng.random_range(-half_width..=half_width),
                    rng.rng.random_range(geometry.lava_y..=ambient.ceiling_y),
                    rng.rng.random_range(-half_depth..=half_depth),
                );
                let particle = AmbientParticle {
                    rise_speed: rng
                        .rng
                        .random_range(ambient.min_rise_speed..=ambient.max_rise_speed),
                    phase: rng.rng.random_range(0.0..TAU),
                    floor_y: geometry.lava_y,
                };
                (at, particle)
            })
            .collect()
    };

    particles
        .into_iter()
        .map(|(at, particle)| {
            world
                .spawn((
                    particle,
                    SceneOwned,
                    Transform::from_translation(at),
                    Tint::glowing(color, 1.0),
                ))
                .id()
        })
        .collect()
}

/// Restores baseline height, scale and color of every platform.
pub fn reset_platforms(world: &mut World) -> Result<(), SceneError> {
    let platforms = live_handles(world)?.platforms.clone();
    for entity in platforms {
        let Some(baseline) = world.get::<PlatformBaseline>(entity).copied() else {
            continue;
        };
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation.y = baseline.y;
            transform.scale = Vec3::ONE;
        }
        if let Some(mut tint) = world.get_mut::<Tint>(entity) {
            tint.color = baseline.color;
            tint.opacity = 1.0;
        }
    }
    Ok(())
}

/// Puts the character back on its resting position, upright and unscaled.
pub fn reset_character(world: &mut World) -> Result<(), SceneError> {
    let character = live_handles(world)?.character;
    let resting = world
        .get_resource::<CharacterRest>()
        .ok_or(SceneError::MissingEntity)?
        .resting;
    let mut transform = world
        .get_mut::<Transform>(character)
        .ok_or(SceneError::MissingEntity)?;
    transform.translation = resting;
    transform.rotation = Quat::IDENTITY;
    transform.scale = Vec3::ONE;
    Ok(())
}

/// Makes the home spot the resting position again and resets the character.
pub fn return_character_home(world: &mut World) -> Result<(), SceneError> {
    live_handles(world)?;
    world
        .get_resource_mut::<CharacterRest>()
        .ok_or(SceneError::MissingEntity)?
        .send_home();
    reset_character(world)
}

/// Marks one platform as selected and returns the others to baseline.
pub fn highlight_platform(world: &mut World, index: usize) -> Result<(), SceneError> {
    let handles = live_handles(world)?;
    handles.platform(index)?;
    let platforms = handles.platforms.clone();
    let config = scene_config(world);
    let selected = hex_color(config.palette.platform_selected);

    for (i, entity) in platforms.into_iter().enumerate() {
        let Some(baseline) = world.get::<PlatformBaseline>(entity).copied() else {
            continue;
        };
        let (color, scale) = if i == index {
            (selected, config.timing.platform_highlight_scale)
        } else {
            (baseline.color, 1.0)
        };
        if let Some(mut tint) = world.get_mut::<Tint>(entity) {
            tint.color = color;
        }
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.scale = Vec3::splat(scale);
        }
    }
    Ok(())
}

pub fn set_platform_color(world: &mut World, index: usize, color: Color) -> Result<(), SceneError> {
    let entity = live_handles(world)?.platform(index)?;
    world
        .get_mut::<Tint>(entity)
        .ok_or(SceneError::MissingEntity)?
        .color = color;
    Ok(())
}

/// Current color of a platform.
pub fn platform_color(world: &World, index: usize) -> Result<Color, SceneError> {
    let entity = live_handles(world)?.platform(index)?;
    world
        .get::<Tint>(entity)
        .map(|tint| tint.color)
        .ok_or(SceneError::MissingEntity)
}

/// Where the character stands after jumping onto platform `index`.
pub fn landing_spot(world: &World, index: usize) -> Result<Vec3, SceneError> {
    let entity = live_handles(world)?.platform(index)?;
    let translation = world
        .get::<Transform>(entity)
        .ok_or(SceneError::MissingEntity)?
        .translation;
    let standing_y = scene_config(world).geometry.standing_y();
    Ok(Vec3::new(translation.x, standing_y, translation.z))
}

/// Despawns every scene entity and stops all animation.
pub fn dispose(world: &mut World) -> Result<(), SceneError> {
    live_handles(world)?;

    let owned: Vec<Entity> = world
        .query_filtered::<Entity, With<SceneOwned>>()
        .iter(world)
        .collect();
    let count = owned.len();
    for entity in owned {
        world.despawn(entity);
    }

    if let Some(mut scheduler) = world.get_resource_mut::<AnimationScheduler>() {
        scheduler.clear();
    }
    if let Some(mut victory) = world.get_resource_mut::<VictoryMode>() {
        victory.disable();
    }
    world.insert_resource(HoverState::default());
    if let Some(mut handles) = world.get_resource_mut::<SceneHandles>() {
        handles.mark_disposed();
    }

    tracing::info!("[scene] Disposed scene ({count} entities)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bevy::animation::{AnimationTask, TaskKind, submit};

    fn spawned() -> (World, SceneHandles) {
        let mut world = World::new();
        let handles = spawn_scene(&mut world, &SceneConfig::default());
        (world, handles)
    }

    fn snapshot(world: &World, handles: &SceneHandles) -> Vec<(Transform, Tint)> {
        handles
            .platforms
            .iter()
            .chain([&handles.character])
            .map(|&e| (*world.get::<Transform>(e).unwrap(), *world.get::<Tint>(e).unwrap()))
            .collect()
    }

    #[test]
    fn test_platform_layout() {
        let (world, handles) = spawned();
        let geometry = SceneConfig::default().geometry;
        assert_eq!(handles.platforms.len(), PLATFORM_COUNT);
        assert_eq!(handles.labels.len(), PLATFORM_COUNT);

        for (i, &entity) in handles.platforms.iter().enumerate() {
            assert_eq!(world.get::<Platform>(entity).unwrap().index, i);
            let at = world.get::<Transform>(entity).unwrap().translation;
            assert!((at.x - geometry.platform_x(i, PLATFORM_COUNT)).abs() < 1e-5);
            assert!(at.y.abs() < 1e-5 && at.z.abs() < 1e-5);
        }
        let texts: Vec<_> = handles
            .labels
            .iter()
            .map(|&e| world.get::<PlatformLabel>(e).unwrap().text.clone())
            .collect();
        assert_eq!(texts, ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_resets_are_idempotent() {
        let (mut world, handles) = spawned();
        highlight_platform(&mut world, 2).unwrap();
        world
            .get_mut::<Transform>(handles.platforms[1])
            .unwrap()
            .translation
            .y = -3.0;
        world.get_mut::<Transform>(handles.character).unwrap().translation = Vec3::splat(9.0);

        reset_platforms(&mut world).unwrap();
        reset_character(&mut world).unwrap();
        let once = snapshot(&world, &handles);
        reset_platforms(&mut world).unwrap();
        reset_character(&mut world).unwrap();
        assert_eq!(once, snapshot(&world, &handles));

        let platform = world.get::<Transform>(handles.platforms[1]).unwrap();
        assert!(platform.translation.y.abs() < 1e-5);
        let character = world.get::<Transform>(handles.character).unwrap();
        assert_eq!(character.translation, world.resource::<CharacterRest>().home);
    }

    #[test]
    fn test_reset_platforms_leaves_tasks_running() {
        let (mut world, handles) = spawned();
        submit(
            &mut world,
            AnimationTask::new(TaskKind::sink(5.0), handles.platforms[0], 1.0),
        );
        reset_platforms(&mut world).unwrap();
        assert!(world.resource::<AnimationScheduler>().has_active_tasks());
    }

    #[test]
    fn test_highlight_platform() {
        let (mut world, handles) = spawned();
        let palette = SceneConfig::default().palette;
        highlight_platform(&mut world, 1).unwrap();
        highlight_platform(&mut world, 3).unwrap();

        assert_eq!(platform_color(&world, 1).unwrap(), hex_color(palette.platform));
        assert_eq!(platform_color(&world, 3).unwrap(), hex_color(palette.platform_selected));
        let scale = world.get::<Transform>(handles.platforms[3]).unwrap().scale;
        assert!((scale.x - 1.15).abs() < 1e-5);
    }

    #[test]
    fn test_invalid_index() {
        let (mut world, _) = spawned();
        assert_eq!(
            set_platform_color(&mut world, 7, Color::BLACK),
            Err(SceneError::InvalidPlatform { index: 7, count: 4 })
        );
    }

    #[test]
    fn test_operations_after_dispose() {
        let (mut world, handles) = spawned();
        dispose(&mut world).unwrap();

        assert!(world.get::<Transform>(handles.character).is_none());
        assert_eq!(dispose(&mut world), Err(SceneError::Disposed));
        assert_eq!(reset_platforms(&mut world), Err(SceneError::Disposed));
        assert_eq!(reset_character(&mut world), Err(SceneError::Disposed));
        assert_eq!(highlight_platform(&mut world, 0), Err(SceneError::Disposed));
        assert_eq!(return_character_home(&mut world), Err(SceneError::Disposed));
    }

    #[test]
    fn test_operations_before_spawn() {
        let mut world = World::new();
        assert_eq!(reset_platforms(&mut world), Err(SceneError::NotSpawned));
        assert_eq!(landing_spot(&world, 0), Err(SceneError::NotSpawned));
    }

    #[test]
    fn test_respawn_gives_fresh_entities() {
        let (mut world, first) = spawned();
        dispose(&mut world).unwrap();
        let second = spawn_scene(&mut world, &SceneConfig::default());

        assert!(!second.is_disposed());
        assert!(world.get::<Transform>(first.platforms[0]).is_none());
        assert!(world.get::<Transform>(second.platforms[0]).is_some());
        assert_eq!(
            world.query::<&SceneOwned>().iter(&world).count(),
            second.entities().count()
        );
    }
}
