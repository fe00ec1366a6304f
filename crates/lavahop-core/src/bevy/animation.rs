//! Frame-driven animation tasks.
//!
//! Every time-based effect in the scene is an `AnimationTask` held by the
//! `AnimationScheduler` resource. `tick` advances all of them once per frame,
//! writes each task's output to its target entity and retires finished tasks
//! after running their completion effect, callback and chained follow-up.

use std::f32::consts::PI;
use std::fmt;

use bevy::prelude::*;

use crate::bevy::components::{Character, SceneCamera, Tint};
use crate::bevy::resources::CharacterRest;
use crate::easing::EasingType;

/// Callback fired once when a task completes.
pub type CompletionFn = Box<dyn FnOnce(&mut World) + Send + Sync>;

/// What a task animates. `None` start values are captured from the target
/// on the first tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskKind {
    /// Arc from `start` to `end`, turning `spin` radians about Y on the way.
    Jump {
        start: Option<Vec3>,
        end: Vec3,
        arc_height: f32,
        spin: f32,
    },
    /// Scale springs from `squashed` back to `original`.
    Bounce { squashed: Vec3, original: Vec3 },
    /// Platform drops by `distance`.
    Sink { start_y: Option<f32>, distance: f32 },
    /// Character drops by `distance`.
    Fall { start_y: Option<f32>, distance: f32 },
    /// Ballistic particle, despawned when done.
    Confetti {
        velocity: Vec3,
        /// Radians per second around each axis.
        spin: Vec3,
        gravity: f32,
        floor_y: f32,
    },
    /// Moves a `SceneCamera` to a new pose.
    CameraPan {
        start: Option<(Vec3, Vec3)>,
        position: Vec3,
        look_at: Vec3,
    },
    Rotate { start: Option<Quat>, target: Quat },
}

impl TaskKind {
    pub fn jump(end: Vec3, arc_height: f32) -> Self {
        Self::Jump {
            start: None,
            end,
            arc_height,
            spin: PI,
        }
    }

    pub fn sink(distance: f32) -> Self {
        Self::Sink {
            start_y: None,
            distance,
        }
    }

    pub fn fall(distance: f32) -> Self {
        Self::Fall {
            start_y: None,
            distance,
        }
    }

    pub fn camera_pan(position: Vec3, look_at: Vec3) -> Self {
        Self::CameraPan {
            start: None,
            position,
            look_at,
        }
    }

    pub fn rotate(target: Quat) -> Self {
        Self::Rotate {
            start: None,
            target,
        }
    }

    /// Kinds that move the character or the platform under it.
    pub fn is_character_motion(&self) -> bool {
        matches!(
            self,
            Self::Jump { .. } | Self::Bounce { .. } | Self::Sink { .. } | Self::Fall { .. }
        )
    }
}

/// A single time-based mutation of one entity.
pub struct AnimationTask {
    pub kind: TaskKind,
    pub target: Entity,
    pub elapsed: f32,
    pub duration: f32,
    on_complete: Option<CompletionFn>,
    then: Option<Box<AnimationTask>>,
    companions: Vec<AnimationTask>,
}

impl fmt::Debug for AnimationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationTask")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("elapsed", &self.elapsed)
            .field("duration", &self.duration)
            .field("has_callback", &self.on_complete.is_some())
            .field("then", &self.then)
            .field("companions", &self.companions)
            .finish()
    }
}

impl AnimationTask {
    pub fn new(kind: TaskKind, target: Entity, duration: f32) -> Self {
        Self {
            kind,
            target,
            elapsed: 0.0,
            duration,
            on_complete: None,
            then: None,
            companions: Vec::new(),
        }
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn on_complete(
        mut self,
        callback: impl FnOnce(&mut World) + Send + Sync + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Appends `next` to the end of this task's chain.
    #[must_use]
    pub fn and_then(mut self, next: AnimationTask) -> Self {
        self.then = Some(Box::new(match self.then.take() {
            Some(existing) => existing.and_then(next),
            None => next,
        }));
        self
    }

    /// Adds a companion submitted together with this task.
    #[must_use]
    pub fn alongside(mut self, companion: AnimationTask) -> Self {
        self.companions.push(companion);
        self
    }

    /// Normalized progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Writes the task's output for the current progress.
    ///
    /// Returns `None` when the target is gone, otherwise whether the task
    /// has finished.
    fn apply(&mut self, world: &mut World, delta: f32) -> Option<bool> {
        let p = self.progress();
        let target = self.target;
        match &mut self.kind {
            TaskKind::Jump {
                start,
                end,
                arc_height,
                spin,
            } => {
                let mut transform = world.get_mut::<Transform>(target)?;
                let from = *start.get_or_insert(transform.translation);
                let mut position = from.lerp(*end, EasingType::EaseInOut.apply(p));
                position.y += (p * PI).sin() * *arc_height;
                transform.translation = position;
                transform.rotation = Quat::from_rotation_y(p * *spin);
            }
            TaskKind::Bounce { squashed, original } => {
                let mut transform = world.get_mut::<Transform>(target)?;
                transform.scale = squashed.lerp(*original, EasingType::OutBounce.apply(p));
            }
            TaskKind::Sink { start_y, distance } | TaskKind::Fall { start_y, distance } => {
                let mut transform = world.get_mut::<Transform>(target)?;
                let from = *start_y.get_or_insert(transform.translation.y);
                transform.translation.y = from - *distance * EasingType::EaseIn.apply(p);
            }
            TaskKind::Confetti {
                velocity,
                spin,
                gravity,
                floor_y,
            } => {
                let below_floor = {
                    let mut transform = world.get_mut::<Transform>(target)?;
                    transform.translation += *velocity * delta;
                    transform.rotate(Quat::from_euler(
                        EulerRot::XYZ,
                        spin.x * delta,
                        spin.y * delta,
                        spin.z * delta,
                    ));
                    transform.translation.y < *floor_y
                };
                velocity.y -= *gravity * delta;
                if let Some(mut tint) = world.get_mut::<Tint>(target) {
                    tint.opacity = 1.0 - p;
                }
                return Some(p >= 1.0 || below_floor);
            }
            TaskKind::CameraPan {
                start,
                position,
                look_at,
            } => {
                let pose = {
                    let mut camera = world.get_mut::<SceneCamera>(target)?;
                    let (from_position, from_look_at) =
                        *start.get_or_insert((camera.position, camera.look_at));
                    let eased = EasingType::EaseOut.apply(p);
                    camera.position = from_position.lerp(*position, eased);
                    camera.look_at = from_look_at.lerp(*look_at, eased);
                    camera.transform()
                };
                if let Some(mut transform) = world.get_mut::<Transform>(target) {
                    *transform = pose;
                }
            }
            TaskKind::Rotate {
                start,
                target: rotation,
            } => {
                let mut transform = world.get_mut::<Transform>(target)?;
                let from = *start.get_or_insert(transform.rotation);
                transform.rotation = from.slerp(*rotation, EasingType::EaseOut.apply(p));
            }
        }
        Some(p >= 1.0)
    }

    /// Kind-specific effect applied once after the final frame.
    fn settle(&self, world: &mut World) {
        match self.kind {
            TaskKind::Jump { end, .. } => {
                if let Some(mut transform) = world.get_mut::<Transform>(self.target) {
                    transform.translation = end;
                    transform.rotation = Quat::IDENTITY;
                }
                if world.get::<Character>(self.target).is_some()
                    && let Some(mut rest) = world.get_resource_mut::<CharacterRest>()
                {
                    rest.set(end);
                }
            }
            TaskKind::Bounce { original, .. } => {
                if let Some(mut transform) = world.get_mut::<Transform>(self.target) {
                    transform.scale = original;
                }
            }
            TaskKind::Confetti { .. } => {
                world.despawn(self.target);
            }
            _ => {}
        }
    }
}

/// Active animation tasks, in submission order.
#[derive(Resource, Default)]
pub struct AnimationScheduler {
    active: Vec<AnimationTask>,
    /// Bumped by `clear`, so a running tick can tell it was torn down.
    generation: u64,
    /// Tasks taken out by the running tick and not yet retired.
    in_flight: usize,
    in_flight_motion: usize,
}

impl AnimationScheduler {
    /// Queues a task and its companions for the next tick.
    pub fn submit(&mut self, mut task: AnimationTask) {
        let companions = std::mem::take(&mut task.companions);
        self.active.push(task);
        for companion in companions {
            self.submit(companion);
        }
    }

    pub fn has_active_tasks(&self) -> bool {
        self.active_count() > 0
    }

    pub fn has_character_motion(&self) -> bool {
        self.in_flight_motion > 0 || self.active.iter().any(|t| t.kind.is_character_motion())
    }

    pub fn active_count(&self) -> usize {
        self.active.len() + self.in_flight
    }

    /// Drops every task, including the ones a running tick still holds.
    pub fn clear(&mut self) {
        self.active.clear();
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = 0;
        self.in_flight_motion = 0;
    }

    fn retire(&mut self, was_motion: bool) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if was_motion {
            self.in_flight_motion = self.in_flight_motion.saturating_sub(1);
        }
    }
}

/// Submits a task to the world's scheduler.
pub fn submit(world: &mut World, task: AnimationTask) {
    world.init_resource::<AnimationScheduler>();
    world.resource_mut::<AnimationScheduler>().submit(task);
}

fn generation(world: &World) -> Option<u64> {
    world
        .get_resource::<AnimationScheduler>()
        .map(|s| s.generation)
}

/// Advances every active task by `delta` seconds.
pub fn tick(world: &mut World, delta: f32) {
    let (tasks, started_generation) = {
        let Some(mut scheduler) = world.get_resource_mut::<AnimationScheduler>() else {
            return;
        };
        let tasks = std::mem::take(&mut scheduler.active);
        scheduler.in_flight = tasks.len();
        scheduler.in_flight_motion = tasks.iter().filter(|t| t.kind.is_character_motion()).count();
        (tasks, scheduler.generation)
    };

    let mut survivors = Vec::with_capacity(tasks.len());
    for mut task in tasks {
        if generation(world) != Some(started_generation) {
            // Torn down by an earlier callback.
            break;
        }
        task.elapsed += delta;
        let was_motion = task.kind.is_character_motion();
        match task.apply(world, delta) {
            Some(false) => survivors.push(task),
            Some(true) => {
                world.resource_mut::<AnimationScheduler>().retire(was_motion);
                finish(world, task, started_generation);
            }
            None => {
                tracing::trace!(
                    "[scene] dropping {:?} task, target {} is gone",
                    task.kind,
                    task.target
                );
                world.resource_mut::<AnimationScheduler>().retire(was_motion);
            }
        }
    }

    let Some(mut scheduler) = world.get_resource_mut::<AnimationScheduler>() else {
        return;
    };
    scheduler.in_flight = 0;
    scheduler.in_flight_motion = 0;
    if scheduler.generation == started_generation {
        let submitted = std::mem::take(&mut scheduler.active);
        survivors.extend(submitted);
        scheduler.active = survivors;
    }
}

fn finish(world: &mut World, mut task: AnimationTask, started_generation: u64) {
    task.settle(world);
    if let Some(callback) = task.on_complete.take() {
        callback(world);
    }
    if let Some(next) = task.then.take()
        && generation(world) == Some(started_generation)
    {
        submit(world, *next);
    }
}
