use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

/// A shared scalar cell. Scene nodes read it every frame; at most one tick
/// driver writes it. Ticks and renders never interleave, so no locking.
pub type SharedScalar = Rc<RefCell<f32>>;

pub fn shared_scalar(v: f32) -> SharedScalar {
    Rc::new(RefCell::new(v))
}

/// A shared 3-component cell. Components are individual scalar cells so a
/// single component can be driven while the others stay constant.
#[derive(Debug, Clone)]
pub struct SharedVec3 {
    pub x: SharedScalar,
    pub y: SharedScalar,
    pub z: SharedScalar,
}

impl SharedVec3 {
    pub fn constant(v: Vec3) -> Self {
        Self {
            x: shared_scalar(v.x),
            y: shared_scalar(v.y),
            z: shared_scalar(v.z),
        }
    }

    pub fn splat(v: f32) -> Self {
        Self::constant(Vec3::splat(v))
    }

    pub fn zeroed() -> Self {
        Self::constant(Vec3::ZERO)
    }

    pub fn get(&self) -> Vec3 {
        Vec3::new(*self.x.borrow(), *self.y.borrow(), *self.z.borrow())
    }

    pub fn set(&self, v: Vec3) {
        *self.x.borrow_mut() = v.x;
        *self.y.borrow_mut() = v.y;
        *self.z.borrow_mut() = v.z;
    }

    /// True when both handles alias the same cells.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.x, &other.x)
            && Rc::ptr_eq(&self.y, &other.y)
            && Rc::ptr_eq(&self.z, &other.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliased_cells_observe_writes() {
        let a = SharedVec3::constant(Vec3::new(1.0, 2.0, 3.0));
        let b = a.clone();
        a.set(Vec3::splat(9.0));
        assert_eq!(b.get(), Vec3::splat(9.0));
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn constant_cells_are_independent() {
        let a = SharedVec3::splat(1.0);
        let b = SharedVec3::splat(1.0);
        assert!(!a.ptr_eq(&b));
    }
}
