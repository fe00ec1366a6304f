//! Pointer picking and hover feedback.
//!
//! Pointer coordinates are canvas pixels with the origin at the top-left
//! corner, as reported by DOM pointer events relative to the canvas rect.

use bevy::prelude::*;

use crate::bevy::animation::AnimationScheduler;
use crate::bevy::components::{SceneCamera, hex_color};
use crate::bevy::resources::{HoverState, ViewportSize, live_handles, scene_config};
use crate::bevy::scene_graph::{platform_color, set_platform_color};
use crate::error::SceneError;

/// A ray in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl SceneCamera {
    /// Ray through a pixel of the viewport.
    pub fn viewport_to_ray(&self, pointer: Vec2) -> Option<PickRay> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(
            pointer.x / self.viewport.x * 2.0 - 1.0,
            1.0 - pointer.y / self.viewport.y * 2.0,
        );
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        let direction = (far - near).try_normalize()?;
        Some(PickRay {
            origin: near,
            direction,
        })
    }

    /// Pixel position of a world point.
    pub fn world_to_viewport(&self, point: Vec3) -> Vec2 {
        let ndc = self.view_projection().project_point3(point);
        Vec2::new(
            (ndc.x + 1.0) / 2.0 * self.viewport.x,
            (1.0 - ndc.y) / 2.0 * self.viewport.y,
        )
    }
}

/// Pickable box of one platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformFootprint {
    pub index: usize,
    pub transform: Transform,
    /// Half extents at unit scale.
    pub half_extents: Vec3,
}

/// Distance along the ray to the box, if it is hit in front of the origin.
fn ray_box_distance(ray: &PickRay, footprint: &PlatformFootprint) -> Option<f32> {
    let inverse = footprint.transform.rotation.inverse();
    let origin = inverse * (ray.origin - footprint.transform.translation);
    let direction = inverse * ray.direction;
    let half = footprint.half_extents * footprint.transform.scale.abs();

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        if direction[axis].abs() < f32::EPSILON {
            if origin[axis].abs() > half[axis] {
                return None;
            }
            continue;
        }
        let t1 = (-half[axis] - origin[axis]) / direction[axis];
        let t2 = (half[axis] - origin[axis]) / direction[axis];
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }

    let entry = t_min.max(0.0);
    (t_max >= entry).then_some(entry)
}

/// Index of the nearest platform under the pointer.
pub fn pick_platform(
    pointer: Vec2,
    viewport: Vec2,
    camera: &SceneCamera,
    platforms: &[PlatformFootprint],
) -> Option<usize> {
    let camera = SceneCamera { viewport, ..*camera };
    let ray = camera.viewport_to_ray(pointer)?;
    platforms
        .iter()
        .filter_map(|footprint| ray_box_distance(&ray, footprint).map(|t| (t, footprint.index)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, index)| index)
}

/// Footprints of the live platforms at their current transforms.
pub fn platform_footprints(world: &World) -> Result<Vec<PlatformFootprint>, SceneError> {
    let handles = live_handles(world)?;
    let half_extents = Vec3::from_array(scene_config(world).geometry.platform_half_extents());
    Ok(handles
        .platforms
        .iter()
        .enumerate()
        .filter_map(|(index, &entity)| {
            world.get::<Transform>(entity).map(|transform| PlatformFootprint {
                index,
                transform: *transform,
                half_extents,
            })
        })
        .collect())
}

fn character_in_motion(world: &World) -> bool {
    world
        .get_resource::<AnimationScheduler>()
        .is_some_and(AnimationScheduler::has_character_motion)
}

/// Picks a platform with the live scene camera.
///
/// Nothing is pickable while the character or a platform under it moves.
pub fn pick_from_pointer(world: &World, pointer: Vec2) -> Option<usize> {
    if character_in_motion(world) {
        return None;
    }
    let camera = *world.get::<SceneCamera>(live_handles(world).ok()?.camera)?;
    let footprints = platform_footprints(world).ok()?;
    pick_platform(pointer, camera.viewport, &camera, &footprints)
}

/// Tints the platform under the pointer with the hover color.
///
/// Returns the hovered platform after the move.
pub fn hover_platform(world: &mut World, pointer: Vec2) -> Result<Option<usize>, SceneError> {
    live_handles(world)?;
    let current = world.get_resource::<HoverState>().and_then(|h| h.hovered);
    if character_in_motion(world) {
        return Ok(current);
    }

    let picked = pick_from_pointer(world, pointer);
    if picked == current {
        return Ok(current);
    }
    clear_hover(world)?;

    if let Some(index) = picked {
        let restore = platform_color(world, index)?;
        let hover = hex_color(scene_config(world).palette.platform_hover);
        set_platform_color(world, index, hover)?;
        world.insert_resource(HoverState {
            hovered: Some(index),
            restore: Some(restore),
        });
    }
    Ok(picked)
}

/// Restores the hovered platform's pre-hover color, once.
pub fn clear_hover(world: &mut World) -> Result<(), SceneError> {
    let state = world
        .get_resource_mut::<HoverState>()
        .map(|mut h| std::mem::take(&mut *h))
        .unwrap_or_default();
    if let (Some(index), Some(color)) = (state.hovered, state.restore) {
        set_platform_color(world, index, color)?;
    }
    Ok(())
}

/// Applies a new canvas size to the scene camera.
pub fn on_resize(world: &mut World, width: f32, height: f32) {
    let viewport = Vec2::new(width.max(1.0), height.max(1.0));
    world.insert_resource(ViewportSize(viewport));

    let half_height = scene_config(world).camera.half_height_for_width(viewport.x);
    let Ok(camera) = live_handles(world).map(|h| h.camera) else {
        return;
    };
    if let Some(mut scene_camera) = world.get_mut::<SceneCamera>(camera) {
        scene_camera.viewport = viewport;
        scene_camera.half_height = half_height;
    }
    tracing::debug!("[scene] Resized to {width}x{height} (half height {half_height})");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bevy::animation::{AnimationTask, TaskKind, submit};
    use crate::bevy::resources::SceneHandles;
    use crate::bevy::scene_graph::spawn_scene;
    use crate::config::SceneConfig;

    fn spawned() -> (World, SceneHandles) {
        let mut world = World::new();
        let handles = spawn_scene(&mut world, &SceneConfig::default());
        (world, handles)
    }

    fn camera(world: &World, handles: &SceneHandles) -> SceneCamera {
        *world.get::<SceneCamera>(handles.camera).unwrap()
    }

    /// Screen point over the top centre of platform `index`.
    fn platform_top_on_screen(world: &World, handles: &SceneHandles, index: usize) -> Vec2 {
        let top = SceneConfig::default().geometry.platform_top();
        let at = world.get::<Transform>(handles.platforms[index]).unwrap().translation;
        camera(world, handles).world_to_viewport(at + Vec3::Y * top)
    }

    #[test]
    fn test_each_platform_picks_itself() {
        let (world, handles) = spawned();
        for index in 0..handles.platforms.len() {
            let pointer = platform_top_on_screen(&world, &handles, index);
            assert_eq!(pick_from_pointer(&world, pointer), Some(index), "platform {index}");
        }
    }

    #[test]
    fn test_empty_space_picks_nothing() {
        let (world, _) = spawned();
        assert_eq!(pick_from_pointer(&world, Vec2::new(2.0, 2.0)), None);
        assert_eq!(pick_from_pointer(&world, Vec2::new(1278.0, 718.0)), None);
    }

    #[test]
    fn test_pick_after_mobile_resize() {
        let (mut world, handles) = spawned();
        on_resize(&mut world, 400.0, 800.0);
        let camera = camera(&world, &handles);
        assert!((camera.half_height - 26.0).abs() < 1e-5);
        let pointer = platform_top_on_screen(&world, &handles, 2);
        assert_eq!(pick_from_pointer(&world, pointer), Some(2));
    }

    #[test]
    fn test_no_pick_during_character_motion() {
        let (mut world, handles) = spawned();
        let pointer = platform_top_on_screen(&world, &handles, 0);
        submit(
            &mut world,
            AnimationTask::new(TaskKind::fall(5.0), handles.character, 1.0),
        );
        assert_eq!(pick_from_pointer(&world, pointer), None);
    }

    #[test]
    fn test_hover_restores_previous_color_once() {
        let (mut world, handles) = spawned();
        let palette = SceneConfig::default().palette;
        let red = hex_color(palette.platform_wrong);
        set_platform_color(&mut world, 1, red).unwrap();

        let over_one = platform_top_on_screen(&world, &handles, 1);
        let over_two = platform_top_on_screen(&world, &handles, 2);
        assert_eq!(hover_platform(&mut world, over_one).unwrap(), Some(1));
        assert_eq!(platform_color(&world, 1).unwrap(), hex_color(palette.platform_hover));

        assert_eq!(hover_platform(&mut world, over_two).unwrap(), Some(2));
        assert_eq!(platform_color(&world, 1).unwrap(), red);

        clear_hover(&mut world).unwrap();
        assert_eq!(platform_color(&world, 2).unwrap(), hex_color(palette.platform));

        // Nothing left to restore.
        set_platform_color(&mut world, 2, red).unwrap();
        clear_hover(&mut world).unwrap();
        assert_eq!(platform_color(&world, 2).unwrap(), red);
    }
}
