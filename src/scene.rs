//! Boundary traits toward the excluded collaborators.
//!
//! The engine never renders or loads assets itself; it issues commands
//! through [`SceneGraph`] and pulls templates through [`AssetProvider`].
//! [`RecordingScene`] and [`StaticAssets`] are headless implementations used
//! by the tests and the demo binary.

use crate::animation::AnimationPlan;
use crate::error::AssetError;
use crate::geometry::Transform;
use glam::Vec3;
use std::collections::HashMap;

/// Name of the content-bundle scene all screensaver templates live in.
pub const SCENE_NAME: &str = "flying_toasters";

/// Template name of the toaster model.
pub const TOASTER_TEMPLATE: &str = "toaster";

/// Template name of the moon the toasters fall into.
pub const MOON_TEMPLATE: &str = "moon";

/// Named animation clip the toaster model must carry.
pub const FLAP_CLIP: &str = "flap_wings";

/// An immutable renderable prototype: mesh plus material set, cloned per
/// pool slot.
#[derive(Clone, Debug)]
pub struct Template {
    /// Name inside the content bundle.
    pub name: String,
    /// Half-extents of the model's bounding box.
    pub bounds: Vec3,
    /// Named animation clips baked into the asset.
    pub clips: Vec<String>,
}

impl Template {
    /// A template with unit bounds and no clips.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec3::ONE,
            clips: Vec::new(),
        }
    }

    /// Set the bounding-box half-extents.
    pub fn with_bounds(mut self, bounds: Vec3) -> Self {
        self.bounds = bounds;
        self
    }

    /// Add a named animation clip.
    pub fn with_clip(mut self, clip: impl Into<String>) -> Self {
        self.clips.push(clip.into());
        self
    }

    /// Whether the asset carries the named clip.
    pub fn has_clip(&self, clip: &str) -> bool {
        self.clips.iter().any(|c| c == clip)
    }
}

/// Source of renderable templates (the 3D content bundle).
pub trait AssetProvider {
    /// Load the named template from a scene. Startup callers treat failure
    /// as fatal; lazy per-spawn callers log and abandon the spawn.
    fn load_template(&mut self, name: &str, scene: &str) -> Result<Template, AssetError>;
}

/// Scene container an object can be parented to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerId {
    /// The near-side space the objects fly through.
    SpaceOrigin,
    /// The world seen through the portals, home of the moon.
    PortalWorld,
}

/// Physics body mode for a spawned object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhysicsMode {
    /// Ghost mode: immovable, no collision response.
    Static,
    /// Collides and reacts.
    Dynamic,
}

/// A typed material parameter value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MaterialValue {
    Float(f32),
    Bool(bool),
    /// sRGB color triple.
    Color([f32; 3]),
}

/// Command surface of the rendering collaborator.
///
/// The engine decides where, when and how long things move; everything
/// visual happens behind this trait.
pub trait SceneGraph {
    /// Parent `object` under a container, placing it at its current local
    /// transform.
    fn attach(&mut self, object: &str, parent: ContainerId);

    /// Remove `object` from the scene graph entirely.
    fn detach(&mut self, object: &str);

    /// Move `object` to a new parent while preserving its world transform.
    fn reparent_preserving_world(&mut self, object: &str, parent: ContainerId);

    /// Set the object's local transform.
    fn set_transform(&mut self, object: &str, transform: Transform);

    /// Set a named shader parameter on all renderable descendants.
    fn set_material_parameter(&mut self, object: &str, name: &str, value: MaterialValue);

    /// Attach a composed animation plan, replacing any previous one.
    fn play_animation(&mut self, object: &str, plan: &AnimationPlan, transition_secs: f32);

    /// Play a named clip baked into the object's asset.
    fn play_named_clip(&mut self, object: &str, clip: &str, repeat: bool);

    /// Generate collision shapes for the object and its descendants.
    fn generate_collision_shapes(&mut self, object: &str);

    /// Switch the object's physics body mode.
    fn set_physics_mode(&mut self, object: &str, mode: PhysicsMode);

    /// Strip overlay children (speech bubbles and the like) before the
    /// object is recycled or removed.
    fn remove_overlay_children(&mut self, object: &str);
}

/// One recorded scene command, for assertions and replay.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneCommand {
    Attach(String, ContainerId),
    Detach(String),
    Reparent(String, ContainerId),
    SetTransform(String, Transform),
    SetMaterial(String, String, MaterialValue),
    PlayAnimation(String, AnimationPlan, f32),
    PlayClip(String, String, bool),
    GenerateCollisionShapes(String),
    SetPhysicsMode(String, PhysicsMode),
    RemoveOverlays(String),
}

/// Headless [`SceneGraph`] that records every command it receives.
#[derive(Default)]
pub struct RecordingScene {
    commands: Vec<SceneCommand>,
    attached: HashMap<String, ContainerId>,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command issued so far, in order.
    pub fn commands(&self) -> &[SceneCommand] {
        &self.commands
    }

    /// Current parent of an object, if attached.
    pub fn parent_of(&self, object: &str) -> Option<ContainerId> {
        self.attached.get(object).copied()
    }

    /// Number of objects currently attached to the given container.
    pub fn attached_count(&self, parent: ContainerId) -> usize {
        self.attached.values().filter(|&&p| p == parent).count()
    }

    /// Animation plans attached to the named object, oldest first.
    pub fn plans_for(&self, object: &str) -> Vec<&AnimationPlan> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                SceneCommand::PlayAnimation(name, plan, _) if name == object => Some(plan),
                _ => None,
            })
            .collect()
    }
}

impl SceneGraph for RecordingScene {
    fn attach(&mut self, object: &str, parent: ContainerId) {
        self.attached.insert(object.to_string(), parent);
        self.commands
            .push(SceneCommand::Attach(object.to_string(), parent));
    }

    fn detach(&mut self, object: &str) {
        self.attached.remove(object);
        self.commands.push(SceneCommand::Detach(object.to_string()));
    }

    fn reparent_preserving_world(&mut self, object: &str, parent: ContainerId) {
        self.attached.insert(object.to_string(), parent);
        self.commands
            .push(SceneCommand::Reparent(object.to_string(), parent));
    }

    fn set_transform(&mut self, object: &str, transform: Transform) {
        self.commands
            .push(SceneCommand::SetTransform(object.to_string(), transform));
    }

    fn set_material_parameter(&mut self, object: &str, name: &str, value: MaterialValue) {
        self.commands.push(SceneCommand::SetMaterial(
            object.to_string(),
            name.to_string(),
            value,
        ));
    }

    fn play_animation(&mut self, object: &str, plan: &AnimationPlan, transition_secs: f32) {
        self.commands.push(SceneCommand::PlayAnimation(
            object.to_string(),
            *plan,
            transition_secs,
        ));
    }

    fn play_named_clip(&mut self, object: &str, clip: &str, repeat: bool) {
        self.commands.push(SceneCommand::PlayClip(
            object.to_string(),
            clip.to_string(),
            repeat,
        ));
    }

    fn generate_collision_shapes(&mut self, object: &str) {
        self.commands
            .push(SceneCommand::GenerateCollisionShapes(object.to_string()));
    }

    fn set_physics_mode(&mut self, object: &str, mode: PhysicsMode) {
        self.commands
            .push(SceneCommand::SetPhysicsMode(object.to_string(), mode));
    }

    fn remove_overlay_children(&mut self, object: &str) {
        self.commands
            .push(SceneCommand::RemoveOverlays(object.to_string()));
    }
}

/// In-memory [`AssetProvider`] backed by a name → template map.
#[derive(Default)]
pub struct StaticAssets {
    templates: HashMap<String, Template>,
}

impl StaticAssets {
    /// An empty provider; every load fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider stocked with the standard screensaver set: the toaster
    /// (with its wing-flap clip), all three toast shades, and the moon.
    pub fn standard() -> Self {
        let mut assets = Self::new();
        assets.insert(Template::new(TOASTER_TEMPLATE).with_clip(FLAP_CLIP));
        assets.insert(Template::new("toast_light"));
        assets.insert(Template::new("toast_med"));
        assets.insert(Template::new("toast_dark"));
        assets.insert(Template::new(MOON_TEMPLATE).with_bounds(Vec3::ONE));
        assets
    }

    /// Add or replace a template.
    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Remove a template, simulating a missing asset.
    pub fn remove(&mut self, name: &str) {
        self.templates.remove(name);
    }
}

impl AssetProvider for StaticAssets {
    fn load_template(&mut self, name: &str, scene: &str) -> Result<Template, AssetError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::MissingTemplate {
                name: name.to_string(),
                scene: scene.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_assets_standard_set() {
        let mut assets = StaticAssets::standard();
        let toaster = assets.load_template(TOASTER_TEMPLATE, SCENE_NAME).unwrap();
        assert!(toaster.has_clip(FLAP_CLIP));
        assert!(assets.load_template("toast_dark", SCENE_NAME).is_ok());
        assert!(assets.load_template("sofa", SCENE_NAME).is_err());
    }

    #[test]
    fn test_recording_scene_tracks_parents() {
        let mut scene = RecordingScene::new();
        scene.attach("a", ContainerId::SpaceOrigin);
        scene.attach("b", ContainerId::SpaceOrigin);
        assert_eq!(scene.attached_count(ContainerId::SpaceOrigin), 2);

        scene.reparent_preserving_world("a", ContainerId::PortalWorld);
        assert_eq!(scene.parent_of("a"), Some(ContainerId::PortalWorld));

        scene.detach("a");
        scene.detach("b");
        assert_eq!(scene.attached_count(ContainerId::SpaceOrigin), 0);
        assert_eq!(scene.attached_count(ContainerId::PortalWorld), 0);
    }
}
