//! Visibility sets and the providers that produce them

use bevy_ecs::prelude::*;
use glam::{Mat4, Vec4};

use crate::command::{RenderQueueRange, ShaderTag, SortingCriteria};
use crate::config::CameraSettings;
use crate::scene::{Camera, CullingParameters, Light, LightType, Renderable, Transform};

/// A light that survived culling
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleLight {
    pub light_type: LightType,
    /// Linear color premultiplied by intensity
    pub final_color: Vec4,
    pub local_to_world: Mat4,
    pub range: f32,
    /// Outer cone angle in degrees
    pub spot_angle: f32,
    /// Inner cone angle in degrees
    pub inner_spot_angle: f32,
    pub rendering_layer_mask: u32,
    pub shadow_strength: f32,
}

impl VisibleLight {
    pub fn from_light(light: &Light, transform: &Transform) -> Self {
        Self {
            light_type: light.light_type,
            final_color: light.final_color(),
            local_to_world: transform.matrix(),
            range: light.range,
            spot_angle: light.spot_angle,
            inner_spot_angle: light.inner_spot_angle,
            rendering_layer_mask: light.rendering_layer_mask,
            shadow_strength: light.shadow_strength,
        }
    }
}

/// An object that survived culling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleObject {
    pub id: u64,
    pub render_queue: u32,
    pub rendering_layer_mask: u32,
    pub shader_tag: ShaderTag,
    /// Distance from the camera, used for sorting
    pub distance: f32,
}

/// Result of culling for one camera.
///
/// Light order is stable for the frame; a light's position in
/// [`lights`](Self::lights) is its visible index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilitySet {
    objects: Vec<VisibleObject>,
    lights: Vec<VisibleLight>,
    index_map_len: usize,
    light_index_map: Option<Vec<i32>>,
}

impl VisibilitySet {
    pub fn new(objects: Vec<VisibleObject>, lights: Vec<VisibleLight>) -> Self {
        let index_map_len = lights.len();
        Self {
            objects,
            lights,
            index_map_len,
            light_index_map: None,
        }
    }

    /// Reserve index map slots beyond the visible lights (off-screen lights
    /// that still affect visible objects)
    pub fn with_index_map_len(mut self, len: usize) -> Self {
        self.index_map_len = len.max(self.lights.len());
        self
    }

    pub fn objects(&self) -> &[VisibleObject] {
        &self.objects
    }

    pub fn lights(&self) -> &[VisibleLight] {
        &self.lights
    }

    /// A fresh identity index map covering every slot
    pub fn light_index_map(&self) -> Vec<i32> {
        (0..self.index_map_len as i32).collect()
    }

    /// Install the remap used for per-object light lists
    pub fn set_light_index_map(&mut self, map: Vec<i32>) {
        self.light_index_map = Some(map);
    }

    /// The installed remap, if any
    pub fn installed_light_index_map(&self) -> Option<&[i32]> {
        self.light_index_map.as_deref()
    }

    /// Resolve the ordered object ids one renderer list draw covers
    pub fn select_renderers(
        &self,
        queue: RenderQueueRange,
        rendering_layer_mask: u32,
        shader_tags: &[ShaderTag],
        sorting: SortingCriteria,
    ) -> Vec<u64> {
        let mut selected: Vec<&VisibleObject> = self
            .objects
            .iter()
            .filter(|object| {
                queue.contains(object.render_queue)
                    && object.rendering_layer_mask & rendering_layer_mask != 0
                    && shader_tags.contains(&object.shader_tag)
            })
            .collect();

        match sorting {
            SortingCriteria::CommonOpaque => selected.sort_by(|a, b| {
                a.render_queue
                    .cmp(&b.render_queue)
                    .then(a.distance.total_cmp(&b.distance))
            }),
            SortingCriteria::CommonTransparent => selected.sort_by(|a, b| {
                a.render_queue
                    .cmp(&b.render_queue)
                    .then(b.distance.total_cmp(&a.distance))
            }),
            SortingCriteria::None => {}
        }

        selected.into_iter().map(|object| object.id).collect()
    }
}

/// Produces the visible set for a camera
pub trait VisibilityProvider {
    fn cull(&mut self, parameters: &CullingParameters) -> VisibilitySet;
}

/// A prebuilt set is its own provider
impl VisibilityProvider for VisibilitySet {
    fn cull(&mut self, _parameters: &CullingParameters) -> VisibilitySet {
        self.clone()
    }
}

struct ExtractedObject {
    id: u64,
    renderable: Renderable,
    transform: Transform,
}

/// Visibility provider backed by a snapshot of a `World`.
///
/// Culling is a conservative range test against the far plane; lights and
/// objects keep entity order.
pub struct WorldVisibility {
    lights: Vec<VisibleLight>,
    objects: Vec<ExtractedObject>,
}

impl WorldVisibility {
    /// Snapshot lights and renderables from `world`
    pub fn extract(world: &mut World) -> Self {
        let mut light_query = world.query::<(Entity, &Transform, &Light)>();
        let mut lights: Vec<(Entity, VisibleLight)> = light_query
            .iter(world)
            .map(|(entity, transform, light)| (entity, VisibleLight::from_light(light, transform)))
            .collect();
        lights.sort_by_key(|(entity, _)| *entity);

        let mut object_query = world.query::<(Entity, &Transform, &Renderable)>();
        let mut objects: Vec<ExtractedObject> = object_query
            .iter(world)
            .map(|(entity, transform, renderable)| ExtractedObject {
                id: entity.to_bits(),
                renderable: *renderable,
                transform: *transform,
            })
            .collect();
        objects.sort_by_key(|object| object.id);

        log::trace!(
            "WorldVisibility: extracted {} lights, {} renderables",
            lights.len(),
            objects.len()
        );

        Self {
            lights: lights.into_iter().map(|(_, light)| light).collect(),
            objects,
        }
    }
}

impl VisibilityProvider for WorldVisibility {
    fn cull(&mut self, parameters: &CullingParameters) -> VisibilitySet {
        let lights = self
            .lights
            .iter()
            .filter(|light| match light.light_type {
                LightType::Directional => true,
                _ => {
                    let position = light.local_to_world.w_axis.truncate();
                    position.distance(parameters.position) - light.range <= parameters.far
                }
            })
            .cloned()
            .collect();

        let objects = self
            .objects
            .iter()
            .filter_map(|object| {
                let distance = object.transform.position.distance(parameters.position);
                (distance <= parameters.far).then_some(VisibleObject {
                    id: object.id,
                    render_queue: object.renderable.render_queue,
                    rendering_layer_mask: object.renderable.rendering_layer_mask,
                    shader_tag: object.renderable.shader_tag,
                    distance,
                })
            })
            .collect();

        VisibilitySet::new(objects, lights)
    }
}

/// Cameras in `world`, in ascending depth order
pub fn collect_cameras(world: &mut World) -> Vec<(Camera, Option<CameraSettings>)> {
    let mut query = world.query::<(Entity, &Camera, Option<&CameraSettings>)>();
    let mut cameras: Vec<(Entity, Camera, Option<CameraSettings>)> = query
        .iter(world)
        .map(|(entity, camera, settings)| (entity, camera.clone(), settings.cloned()))
        .collect();
    cameras.sort_by(|a, b| a.1.depth.total_cmp(&b.1.depth).then(a.0.cmp(&b.0)));
    cameras
        .into_iter()
        .map(|(_, camera, settings)| (camera, settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{UVec2, Vec3};

    fn object(id: u64, queue: u32, distance: f32) -> VisibleObject {
        VisibleObject {
            id,
            render_queue: queue,
            rendering_layer_mask: 1,
            shader_tag: ShaderTag::Lit,
            distance,
        }
    }

    #[test]
    fn test_opaque_sorted_front_to_back() {
        let set = VisibilitySet::new(
            vec![object(1, 2000, 5.0), object(2, 2000, 1.0), object(3, 3000, 0.5)],
            Vec::new(),
        );
        let ids = set.select_renderers(
            RenderQueueRange::OPAQUE,
            u32::MAX,
            &[ShaderTag::Unlit, ShaderTag::Lit],
            SortingCriteria::CommonOpaque,
        );
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_transparent_sorted_back_to_front() {
        let set = VisibilitySet::new(
            vec![object(1, 3000, 1.0), object(2, 3000, 9.0), object(3, 2000, 4.0)],
            Vec::new(),
        );
        let ids = set.select_renderers(
            RenderQueueRange::TRANSPARENT,
            u32::MAX,
            &[ShaderTag::Lit],
            SortingCriteria::CommonTransparent,
        );
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_layer_mask_and_tags_filter() {
        let mut legacy = object(2, 2000, 1.0);
        legacy.shader_tag = ShaderTag::Legacy;
        let mut masked = object(3, 2000, 1.0);
        masked.rendering_layer_mask = 0b100;
        let set = VisibilitySet::new(vec![object(1, 2000, 1.0), legacy, masked], Vec::new());
        let ids = set.select_renderers(
            RenderQueueRange::ALL,
            0b1,
            &[ShaderTag::Lit],
            SortingCriteria::None,
        );
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_index_map_covers_reserved_slots() {
        let set = VisibilitySet::new(Vec::new(), Vec::new()).with_index_map_len(3);
        assert_eq!(set.light_index_map(), vec![0, 1, 2]);
        assert!(set.installed_light_index_map().is_none());
    }

    #[test]
    fn test_world_extraction_and_culling() {
        let mut world = World::new();
        world.spawn((Transform::default(), Light::directional(Vec3::ONE, 1.0)));
        world.spawn((
            Transform::from_position(Vec3::new(0.0, 0.0, 5000.0)),
            Light::point(Vec3::ONE, 1.0, 10.0),
        ));
        world.spawn((Transform::from_position(Vec3::new(0.0, 0.0, 2.0)), Renderable::opaque()));
        world.spawn((Camera::new("b", UVec2::new(64, 64)), CameraSettings::default()));
        let mut first = Camera::new("a", UVec2::new(64, 64));
        first.depth = -1.0;
        world.spawn(first);

        let cameras = collect_cameras(&mut world);
        assert_eq!(cameras.len(), 2);
        assert_eq!(cameras[0].0.name, "a");
        assert!(cameras[0].1.is_none());
        assert!(cameras[1].1.is_some());

        let params = cameras[0].0.culling_parameters().unwrap();
        let mut provider = WorldVisibility::extract(&mut world);
        let set = provider.cull(&params);
        assert_eq!(set.lights().len(), 1);
        assert_eq!(set.lights()[0].light_type, LightType::Directional);
        assert_eq!(set.objects().len(), 1);
    }
}
