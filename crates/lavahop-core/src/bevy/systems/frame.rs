//! Per-frame scene systems.
//!
//! Thin exclusive-system wrappers that feed the frame delta into the
//! scheduler, the continuous motion controller and the quiz flow.

use bevy::prelude::*;

use crate::bevy::animation::tick;
use crate::bevy::systems::quiz_flow::tick_quiz_flow;
use crate::bevy::victory::update_continuous_motion;

fn frame_delta(world: &World) -> f32 {
    world.get_resource::<Time>().map_or(0.0, |time| time.delta_secs())
}

/// System to advance all animation tasks.
pub fn advance_animations(world: &mut World) {
    let delta = frame_delta(world);
    tick(world, delta);
}

/// System to run victory, idle and ambient motion.
pub fn animate_continuous_motion(world: &mut World) {
    let delta = frame_delta(world);
    update_continuous_motion(world, delta);
}

/// System to run due quiz steps.
pub fn advance_quiz_flow(world: &mut World) {
    let delta = frame_delta(world);
    tick_quiz_flow(world, delta);
}
