use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::cell::{SharedScalar, SharedVec3};
use crate::color::Color;
use crate::mesh::Mesh;

/// One node of the immutable scene tree. Adoption is move-only: a node
/// lives in exactly one parent slot, never two.
#[derive(Debug)]
pub enum RenderNode {
    Primitive {
        mesh: Arc<Mesh>,
        color: Color,
        scale: SharedVec3,
    },
    Group {
        children: Vec<RenderNode>,
    },
    Translate {
        offset: SharedVec3,
        children: Vec<RenderNode>,
    },
    Rotate {
        angle: SharedScalar,
        axis: SharedVec3,
        children: Vec<RenderNode>,
    },
    Scale {
        factor: SharedVec3,
        children: Vec<RenderNode>,
    },
}

impl RenderNode {
    pub fn primitive(mesh: Arc<Mesh>, color: Color, scale: SharedVec3) -> Self {
        RenderNode::Primitive { mesh, color, scale }
    }

    pub fn group(children: Vec<RenderNode>) -> Self {
        RenderNode::Group { children }
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Primitive { .. } => &[],
            RenderNode::Group { children }
            | RenderNode::Translate { children, .. }
            | RenderNode::Rotate { children, .. }
            | RenderNode::Scale { children, .. } => children,
        }
    }

    /// Transform this node applies before its children are drawn, sampled
    /// from the reactive cells at their current values.
    pub fn local_transform(&self) -> Mat4 {
        match self {
            RenderNode::Primitive { scale, .. } => Mat4::from_scale(scale.get()),
            RenderNode::Group { .. } => Mat4::IDENTITY,
            RenderNode::Translate { offset, .. } => Mat4::from_translation(offset.get()),
            RenderNode::Rotate { angle, axis, .. } => {
                let axis = axis.get();
                if axis.length_squared() > 0.0 {
                    // Angles are radians; scripts convert with `rad`/`deg`.
                    Mat4::from_quat(Quat::from_axis_angle(axis.normalize(), *angle.borrow()))
                } else {
                    Mat4::IDENTITY
                }
            }
            RenderNode::Scale { factor, .. } => Mat4::from_scale(factor.get()),
        }
    }

    /// Total node count including this node.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(RenderNode::node_count)
            .sum::<usize>()
    }

    /// Depth-first walk with the accumulated world transform, visiting
    /// primitives in paint order.
    pub fn visit_primitives(&self, f: &mut impl FnMut(&Arc<Mesh>, Color, Mat4)) {
        self.visit_inner(Mat4::IDENTITY, f);
    }

    fn visit_inner(&self, world: Mat4, f: &mut impl FnMut(&Arc<Mesh>, Color, Mat4)) {
        let local = world * self.local_transform();
        if let RenderNode::Primitive { mesh, color, .. } = self {
            f(mesh, *color, local);
        }
        for child in self.children() {
            child.visit_inner(local, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::cube_mesh;

    fn cube() -> RenderNode {
        RenderNode::primitive(cube_mesh(), Color::default(), SharedVec3::splat(1.0))
    }

    #[test]
    fn node_count_walks_the_tree() {
        let tree = RenderNode::Translate {
            offset: SharedVec3::zeroed(),
            children: vec![cube(), RenderNode::group(vec![cube(), cube()])],
        };
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn translate_transform_tracks_its_cell() {
        let offset = SharedVec3::zeroed();
        let node = RenderNode::Translate {
            offset: offset.clone(),
            children: vec![],
        };
        offset.set(Vec3::new(1.0, 2.0, 3.0));
        let t = node.local_transform();
        assert_eq!(t.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn primitives_visited_in_paint_order() {
        let tree = RenderNode::group(vec![
            RenderNode::primitive(cube_mesh(), Color::rgb(1, 0, 0), SharedVec3::splat(1.0)),
            RenderNode::primitive(cube_mesh(), Color::rgb(2, 0, 0), SharedVec3::splat(1.0)),
        ]);
        let mut seen = Vec::new();
        tree.visit_primitives(&mut |_, color, _| seen.push(color.r));
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn zero_axis_rotation_is_identity() {
        let node = RenderNode::Rotate {
            angle: crate::cell::shared_scalar(45.0),
            axis: SharedVec3::zeroed(),
            children: vec![],
        };
        assert_eq!(node.local_transform(), Mat4::IDENTITY);
    }
}
