//! Continuous per-frame motion: victory celebration, idle bob and ambience.
//!
//! Nothing here is an animation task. These effects run every frame for as
//! long as their mode holds.

use bevy::prelude::*;

use crate::bevy::animation::AnimationScheduler;
use crate::bevy::bridge::spawn_confetti_burst;
use crate::bevy::components::{AmbientParticle, SceneCamera, Tint};
use crate::bevy::resources::{
    CharacterRest, SceneClock, SceneHandles, VictoryMode, live_handles, scene_config,
};
use crate::config::SceneConfig;

/// Lava glow at scene time `t`.
pub fn lava_emissive(t: f32, pulse_speed: f32) -> f32 {
    0.2 + 0.3 * ((t * pulse_speed).sin() + 1.0) / 2.0
}

/// Advances victory, idle and ambient motion by `delta` seconds.
pub fn update_continuous_motion(world: &mut World, delta: f32) {
    let Ok(handles) = live_handles(world).cloned() else {
        return;
    };
    let config = scene_config(world);
    let t = {
        let mut clock = world.get_resource_or_insert_with(SceneClock::default);
        clock.elapsed += delta;
        clock.elapsed
    };

    let victory = world.get_resource::<VictoryMode>().copied().unwrap_or_default();
    if victory.active {
        celebrate(world, &handles, &config, victory, delta);
    } else if !world
        .get_resource::<AnimationScheduler>()
        .is_some_and(AnimationScheduler::has_active_tasks)
    {
        idle(world, &handles, &config, t);
    }
    ambient(world, &handles, &config, t, delta);
}

fn celebrate(
    world: &mut World,
    handles: &SceneHandles,
    config: &SceneConfig,
    victory: VictoryMode,
    delta: f32,
) {
    let settings = &config.victory;
    let elapsed = victory.elapsed + delta;

    let angle = elapsed * settings.orbit_speed;
    let pose = world.get_mut::<SceneCamera>(handles.camera).map(|mut camera| {
        camera.position = Vec3::new(
            angle.cos() * settings.orbit_radius,
            settings.orbit_height,
            angle.sin() * settings.orbit_radius,
        );
        camera.look_at = Vec3::ZERO;
        camera.transform()
    });
    if let (Some(pose), Some(mut transform)) = (pose, world.get_mut::<Transform>(handles.camera)) {
        *transform = pose;
    }

    if let Some(mut transform) = world.get_mut::<Transform>(handles.character) {
        transform.rotation = Quat::from_rotation_y(elapsed * settings.spin_speed);
    }

    // One burst on entry, then one per interval boundary from the second on.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let due = ((elapsed / settings.burst_interval).floor().max(0.0) as u64).max(1);
    let mut fired = victory.bursts_triggered;
    while fired < due {
        spawn_confetti_burst(world);
        fired += 1;
    }

    if let Some(mut mode) = world.get_resource_mut::<VictoryMode>() {
        mode.elapsed = elapsed;
        mode.bursts_triggered = fired;
    }
}

/// Gentle breathing on the resting spot. Never written back to `CharacterRest`.
fn idle(world: &mut World, handles: &SceneHandles, config: &SceneConfig, t: f32) {
    let Some(resting) = world.get_resource::<CharacterRest>().map(|r| r.resting) else {
        return;
    };
    let timing = &config.timing;
    let Some(mut transform) = world.get_mut::<Transform>(handles.character) else {
        return;
    };
    let bob = (t * timing.idle_bob_speed).sin() * timing.idle_bob_amount;
    transform.translation = resting + Vec3::Y * bob;
    let wobble = t * timing.idle_rotate_speed;
    transform.rotation = Quat::from_euler(
        EulerRot::XYZ,
        wobble.cos() * timing.idle_rotate_amount,
        0.0,
        wobble.sin() * timing.idle_rotate_amount,
    );
}

fn ambient(world: &mut World, handles: &SceneHandles, config: &SceneConfig, t: f32, delta: f32) {
    if let Some(mut tint) = world.get_mut::<Tint>(handles.ground) {
        tint.emissive = lava_emissive(t, config.timing.lava_pulse_speed);
    }

    let sway = config.ambient.sway_amount;
    let ceiling = config.ambient.ceiling_y;
    for &ember in &handles.embers {
        let Some(particle) = world.get::<AmbientParticle>(ember).copied() else {
            continue;
        };
        let Some(mut transform) = world.get_mut::<Transform>(ember) else {
            continue;
        };
        transform.translation.y += particle.rise_speed * delta;
        transform.translation.x += (t + particle.phase).cos() * sway * delta;
        if transform.translation.y > ceiling {
            transform.translation.y = particle.floor_y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bevy::animation::{AnimationTask, TaskKind, submit};
    use crate::bevy::bridge::{on_victory, on_victory_end};
    use crate::bevy::components::{ConfettiParticle, Ground};
    use crate::bevy::scene_graph::spawn_scene;

    fn spawned() -> (World, SceneHandles) {
        let mut world = World::new();
        let handles = spawn_scene(&mut world, &SceneConfig::default());
        (world, handles)
    }

    #[test]
    fn test_victory_bursts_per_interval() {
        let (mut world, _) = spawned();
        on_victory(&mut world).unwrap();
        for _ in 0..8 {
            update_continuous_motion(&mut world, 0.25);
        }
        update_continuous_motion(&mut world, 0.1);

        assert_eq!(world.resource::<VictoryMode>().bursts_triggered, 4);
        let particles = world.query::<&ConfettiParticle>().iter(&world).count();
        assert_eq!(particles, 4 * SceneConfig::default().confetti.count);
    }

    #[test]
    fn test_first_victory_frame_bursts() {
        let (mut world, _) = spawned();
        on_victory(&mut world).unwrap();
        update_continuous_motion(&mut world, 0.05);

        assert_eq!(world.resource::<VictoryMode>().bursts_triggered, 1);
        let particles = world.query::<&ConfettiParticle>().iter(&world).count();
        assert_eq!(particles, SceneConfig::default().confetti.count);

        update_continuous_motion(&mut world, 0.4);
        assert_eq!(world.resource::<VictoryMode>().bursts_triggered, 1);
    }

    #[test]
    fn test_long_frame_fires_several_bursts() {
        let (mut world, _) = spawned();
        on_victory(&mut world).unwrap();
        update_continuous_motion(&mut world, 1.6);
        assert_eq!(world.resource::<VictoryMode>().bursts_triggered, 3);
    }

    #[test]
    fn test_victory_orbits_camera() {
        let (mut world, handles) = spawned();
        on_victory(&mut world).unwrap();
        update_continuous_motion(&mut world, 0.3);
        update_continuous_motion(&mut world, 0.3);

        let victory = SceneConfig::default().victory;
        let camera = *world.get::<SceneCamera>(handles.camera).unwrap();
        assert!((camera.position.y - victory.orbit_height).abs() < 1e-5);
        let radius = Vec2::new(camera.position.x, camera.position.z).length();
        assert!((radius - victory.orbit_radius).abs() < 1e-3);

        on_victory_end(&mut world).unwrap();
        update_continuous_motion(&mut world, 0.3);
        assert_eq!(*world.get::<SceneCamera>(handles.camera).unwrap(), camera);
    }

    #[test]
    fn test_idle_bob_waits_for_tasks() {
        let (mut world, handles) = spawned();
        let home = world.resource::<CharacterRest>().home;
        submit(
            &mut world,
            AnimationTask::new(TaskKind::rotate(Quat::IDENTITY), handles.ground, 5.0),
        );
        update_continuous_motion(&mut world, 0.4);
        assert_eq!(world.get::<Transform>(handles.character).unwrap().translation, home);

        world.resource_mut::<AnimationScheduler>().clear();
        update_continuous_motion(&mut world, 0.4);
        let bobbed = world.get::<Transform>(handles.character).unwrap().translation;
        assert!((bobbed.y - home.y).abs() > 1e-4);
        assert!((bobbed.y - home.y).abs() <= SceneConfig::default().timing.idle_bob_amount + 1e-5);
        assert_eq!(world.resource::<CharacterRest>().resting, home);
    }

    #[test]
    fn test_lava_pulse_range() {
        let (mut world, handles) = spawned();
        for _ in 0..50 {
            update_continuous_motion(&mut world, 0.07);
            let glow = world.get::<Tint>(handles.ground).unwrap().emissive;
            assert!(glow > 0.2 - 1e-5 && glow < 0.5 + 1e-5);
        }
        assert!(world.get::<Ground>(handles.ground).is_some());
    }

    #[test]
    fn test_embers_stay_between_lava_and_ceiling() {
        let (mut world, handles) = spawned();
        let config = SceneConfig::default();
        for _ in 0..100 {
            update_continuous_motion(&mut world, 0.1);
        }
        for &ember in &handles.embers {
            let y = world.get::<Transform>(ember).unwrap().translation.y;
            assert!(y >= config.geometry.lava_y && y <= config.ambient.ceiling_y);
        }
    }
}
