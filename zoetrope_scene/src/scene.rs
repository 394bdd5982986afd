use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::node::RenderNode;

/// One named animation produced by an evaluation pass. The whole set is
/// replaced, not merged, on every re-evaluation of the main script.
pub struct Animation {
    pub name: String,
    pub length: f32,
    pub light_pos: Vec3,
    pub root: RenderNode,
}

/// The rendering collaborator the scripting core hands scenes to.
pub trait SceneHandler {
    fn clear_scene(&mut self);

    /// Register an animation; a later registration under the same name
    /// within one pass replaces the earlier one in place.
    fn add_animation(&mut self, animation: Animation);
}

/// Plain in-memory scene, in insertion order.
#[derive(Default)]
pub struct Scene {
    animations: Vec<Animation>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn animations_mut(&mut self) -> &mut Vec<Animation> {
        &mut self.animations
    }

    pub fn get(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.name == name)
    }
}

impl SceneHandler for Scene {
    fn clear_scene(&mut self) {
        self.animations.clear();
    }

    fn add_animation(&mut self, animation: Animation) {
        match self.animations.iter_mut().find(|a| a.name == animation.name) {
            Some(slot) => *slot = animation,
            None => self.animations.push(animation),
        }
    }
}

/// Lets a host keep a handle to the scene it hands the runtime.
impl<S: SceneHandler> SceneHandler for Rc<RefCell<S>> {
    fn clear_scene(&mut self) {
        self.borrow_mut().clear_scene();
    }

    fn add_animation(&mut self, animation: Animation) {
        self.borrow_mut().add_animation(animation);
    }
}
