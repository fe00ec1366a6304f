//! Game events translated into scene animations.
//!
//! Each handler mutates the scene immediately (colors, highlights) and
//! submits the timed part as animation tasks. None of them decides whether
//! an answer is right; that is the caller's business.

use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::bevy::animation::{AnimationTask, TaskKind, submit};
use crate::bevy::components::{ConfettiParticle, SceneOwned, Tint, hex_color};
use crate::bevy::picking::clear_hover;
use crate::bevy::resources::{
    CharacterRest, DeterministicRng, VictoryMode, live_handles, scene_config,
};
use crate::bevy::scene_graph::{
    highlight_platform, landing_spot, reset_platforms, return_character_home, set_platform_color,
};
use crate::error::SceneError;

/// Jumps the character onto platform `index`.
///
/// `report` runs once the character has landed.
pub fn on_option_selected(
    world: &mut World,
    index: usize,
    report: impl FnOnce(&mut World, usize) + Send + Sync + 'static,
) -> Result<(), SceneError> {
    let handles = live_handles(world)?;
    handles.platform(index)?;
    let character = handles.character;

    clear_hover(world)?;
    highlight_platform(world, index)?;
    let end = landing_spot(world, index)?;
    let timing = scene_config(world).timing;

    submit(
        world,
        AnimationTask::new(
            TaskKind::jump(end, timing.jump_arc_height),
            character,
            timing.jump_duration,
        )
        .on_complete(move |world| report(world, index)),
    );
    tracing::debug!("[scene] Jumping to platform {index}");
    Ok(())
}

/// Marks platform `index` correct and bounces the character, then confetti.
pub fn on_correct(world: &mut World, index: usize) -> Result<(), SceneError> {
    let character = live_handles(world)?.character;
    let config = scene_config(world);
    set_platform_color(world, index, hex_color(config.palette.platform_correct))?;

    let squash = config.timing.bounce_squash;
    let squashed = Vec3::new(1.0 / squash, squash, 1.0 / squash);
    submit(
        world,
        AnimationTask::new(
            TaskKind::Bounce {
                squashed,
                original: Vec3::ONE,
            },
            character,
            config.timing.bounce_duration,
        )
        .on_complete(|world| {
            spawn_confetti_burst(world);
        }),
    );
    Ok(())
}

/// Marks platform `index` wrong, sinks it and drops the character in the lava.
///
/// The character is sent home once the fall ends.
pub fn on_wrong(world: &mut World, index: usize) -> Result<(), SceneError> {
    let handles = live_handles(world)?;
    let platform = handles.platform(index)?;
    let character = handles.character;
    let config = scene_config(world);
    set_platform_color(world, index, hex_color(config.palette.platform_wrong))?;

    let timing = &config.timing;
    let fall = AnimationTask::new(
        TaskKind::fall(timing.fall_distance),
        character,
        timing.fall_duration,
    )
    .on_complete(|world| {
        if let Err(e) = return_character_home(world) {
            tracing::debug!("[scene] Skipping return home: {e}");
        }
    });
    // The tumble goes first so the fall's reset wins their shared last tick.
    let tumble = AnimationTask::new(
        TaskKind::rotate(Quat::from_euler(EulerRot::XYZ, FRAC_PI_2, 0.0, PI)),
        character,
        timing.fall_duration,
    )
    .alongside(fall);

    submit(
        world,
        AnimationTask::new(
            TaskKind::sink(timing.sink_distance),
            platform,
            timing.sink_duration,
        )
        .and_then(tumble),
    );
    Ok(())
}

pub fn on_victory(world: &mut World) -> Result<(), SceneError> {
    live_handles(world)?;
    world.get_resource_or_insert_with(VictoryMode::default).enable();
    tracing::info!("[scene] Victory mode on");
    Ok(())
}

/// Leaves the pose where the celebration left it.
pub fn on_victory_end(world: &mut World) -> Result<(), SceneError> {
    live_handles(world)?;
    if let Some(mut victory) = world.get_resource_mut::<VictoryMode>() {
        victory.disable();
    }
    tracing::info!("[scene] Victory mode off");
    Ok(())
}

/// Resets the stage for a new question and swings the camera a little.
pub fn on_question_started(world: &mut World, question_index: usize) -> Result<(), SceneError> {
    let camera = live_handles(world)?.camera;
    if let Some(mut victory) = world.get_resource_mut::<VictoryMode>() {
        victory.disable();
    }
    reset_platforms(world)?;
    return_character_home(world)?;
    clear_hover(world)?;

    let config = scene_config(world);
    let jitter = config.camera.question_yaw_jitter.abs();
    let yaw = {
        let mut rng = world.get_resource_or_insert_with(DeterministicRng::default);
        rng.rng.random_range(-jitter..=jitter)
    };
    let position = Quat::from_rotation_y(yaw) * Vec3::from_array(config.camera.position);
    submit(
        world,
        AnimationTask::new(
            TaskKind::camera_pan(position, Vec3::from_array(config.camera.look_at)),
            camera,
            config.timing.camera_pan_duration,
        ),
    );
    tracing::debug!("[scene] Question {question_index} staged (yaw {yaw:.2})");
    Ok(())
}

struct ConfettiSeed {
    at: Vec3,
    velocity: Vec3,
    spin: Vec3,
    lifetime: f32,
    color: u32,
}

/// Throws one burst of confetti above the character. Returns the particle count.
pub fn spawn_confetti_burst(world: &mut World) -> usize {
    let Ok(handles) = live_handles(world) else {
        return 0;
    };
    let character = handles.character;
    let config = scene_config(world);
    let confetti = &config.confetti;
    let centre = world
        .get::<Transform>(character)
        .map(|t| t.translation)
        .or_else(|| world.get_resource::<CharacterRest>().map(|r| r.resting))
        .unwrap_or(Vec3::ZERO);

    let seeds: Vec<ConfettiSeed> = {
        let mut rng = world.get_resource_or_insert_with(DeterministicRng::default);
        let rng = &mut rng.rng;
        (0..confetti.count)
            .map(|_| ConfettiSeed {
                at: Vec3::new(
                    centre.x
                        + rng.random_range(
                            -confetti.spawn_half_width..=confetti.spawn_half_width,
                        ),
                    rng.random_range(confetti.spawn_min_y..=confetti.spawn_max_y),
                    centre.z
                        + rng.random_range(
                            -confetti.spawn_half_depth..=confetti.spawn_half_depth,
                        ),
                ),
                velocity: Vec3::new(
                    rng.random_range(-confetti.horizontal_speed..=confetti.horizontal_speed),
                    rng.random_range(confetti.min_rise_speed..=confetti.max_rise_speed),
                    rng.random_range(-confetti.horizontal_speed..=confetti.horizontal_speed),
                ),
                spin: Vec3::new(
                    rng.random_range(-confetti.spin_speed..=confetti.spin_speed),
                    rng.random_range(-confetti.spin_speed..=confetti.spin_speed),
                    rng.random_range(-confetti.spin_speed..=confetti.spin_speed),
                ),
                lifetime: rng.random_range(confetti.min_lifetime..=confetti.max_lifetime),
                color: config.palette.confetti.choose(&mut *rng).copied().unwrap_or(0xff_ff_ff),
            })
            .collect()
    };

    let count = seeds.len();
    for seed in seeds {
        let particle = world
            .spawn((
                ConfettiParticle,
                SceneOwned,
                Transform::from_translation(seed.at).with_scale(Vec3::splat(confetti.size)),
                Tint::new(hex_color(seed.color)),
            ))
            .id();
        submit(
            world,
            AnimationTask::new(
                TaskKind::Confetti {
                    velocity: seed.velocity,
                    spin: seed.spin,
                    gravity: confetti.gravity,
                    floor_y: confetti.floor_y,
                },
                particle,
                seed.lifetime,
            ),
        );
    }
    tracing::trace!("[scene] Confetti burst of {count}");
    count
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::bevy::animation::{AnimationScheduler, tick};
    use crate::bevy::components::{ConfettiParticle, SceneCamera};
    use crate::bevy::resources::SceneHandles;
    use crate::bevy::scene_graph::{dispose, platform_color, spawn_scene};
    use crate::config::SceneConfig;

    fn spawned() -> (World, SceneHandles) {
        let mut world = World::new();
        let handles = spawn_scene(&mut world, &SceneConfig::default());
        (world, handles)
    }

    fn run_until_idle(world: &mut World) {
        for _ in 0..200 {
            if !world.resource::<AnimationScheduler>().has_active_tasks() {
                return;
            }
            tick(world, 1.0 / 30.0);
        }
        panic!("animations never settled");
    }

    fn confetti_count(world: &mut World) -> usize {
        world.query::<&ConfettiParticle>().iter(world).count()
    }

    #[test]
    fn test_selection_reports_after_landing() {
        let (mut world, handles) = spawned();
        let reported = Arc::new(Mutex::new(None));
        let sink = reported.clone();
        on_option_selected(&mut world, 2, move |_, index| *sink.lock() = Some(index)).unwrap();

        tick(&mut world, 0.25);
        assert_eq!(*reported.lock(), None);
        run_until_idle(&mut world);
        assert_eq!(*reported.lock(), Some(2));

        let landed = landing_spot(&world, 2).unwrap();
        assert_eq!(world.resource::<CharacterRest>().resting, landed);
        assert_eq!(world.get::<Transform>(handles.character).unwrap().translation, landed);
    }

    #[test]
    fn test_wrong_answer_sends_character_home() {
        let (mut world, handles) = spawned();
        on_option_selected(&mut world, 0, |world, index| {
            on_wrong(world, index).unwrap();
        })
        .unwrap();
        run_until_idle(&mut world);

        let rest = *world.resource::<CharacterRest>();
        assert_eq!(rest.resting, rest.home);
        let character = world.get::<Transform>(handles.character).unwrap();
        assert_eq!(character.translation, rest.home);
        assert_eq!(character.rotation, Quat::IDENTITY);

        let palette = SceneConfig::default().palette;
        assert_eq!(platform_color(&world, 0).unwrap(), hex_color(palette.platform_wrong));
        let sunk = world.get::<Transform>(handles.platforms[0]).unwrap().translation.y;
        assert!((sunk + SceneConfig::default().timing.sink_distance).abs() < 1e-4);
    }

    #[test]
    fn test_correct_answer_bounces_then_confetti() {
        let (mut world, handles) = spawned();
        on_correct(&mut world, 1).unwrap();
        assert_eq!(confetti_count(&mut world), 0);

        tick(&mut world, 0.5);
        let expected = SceneConfig::default().confetti.count;
        assert_eq!(confetti_count(&mut world), expected);
        assert_eq!(world.get::<Transform>(handles.character).unwrap().scale, Vec3::ONE);

        run_until_idle(&mut world);
        assert_eq!(confetti_count(&mut world), 0);
    }

    #[test]
    fn test_invalid_index_submits_nothing() {
        let (mut world, _) = spawned();
        assert_eq!(
            on_wrong(&mut world, 4),
            Err(SceneError::InvalidPlatform { index: 4, count: 4 })
        );
        assert!(on_option_selected(&mut world, 9, |_, _| {}).is_err());
        assert!(!world.resource::<AnimationScheduler>().has_active_tasks());
    }

    #[test]
    fn test_question_started_restores_stage() {
        let (mut world, handles) = spawned();
        on_option_selected(&mut world, 3, |world, index| {
            on_correct(world, index).unwrap();
        })
        .unwrap();
        run_until_idle(&mut world);

        on_question_started(&mut world, 1).unwrap();
        let palette = SceneConfig::default().palette;
        for index in 0..4 {
            assert_eq!(platform_color(&world, index).unwrap(), hex_color(palette.platform));
        }
        let rest = *world.resource::<CharacterRest>();
        assert_eq!(world.get::<Transform>(handles.character).unwrap().translation, rest.home);

        run_until_idle(&mut world);
        let camera = world.get::<SceneCamera>(handles.camera).unwrap();
        let distance = camera.position.length();
        let expected = Vec3::from_array(SceneConfig::default().camera.position).length();
        assert!((distance - expected).abs() < 1e-3);
    }

    #[test]
    fn test_confetti_after_dispose() {
        let (mut world, _) = spawned();
        dispose(&mut world).unwrap();
        assert_eq!(spawn_confetti_burst(&mut world), 0);
        assert_eq!(on_victory(&mut world), Err(SceneError::Disposed));
    }
}
