use std::sync::Arc;

use once_cell::sync::Lazy;

/// Static triangle-list geometry. Positions and normals are interleaved
/// per vertex; indices form counter-clockwise triangles.
#[derive(Debug)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

static UNIT_CUBE: Lazy<Arc<Mesh>> = Lazy::new(|| Arc::new(build_unit_cube()));

/// The shared unit-cube geometry every `cube` primitive references.
pub fn cube_mesh() -> Arc<Mesh> {
    Arc::clone(&UNIT_CUBE)
}

fn build_unit_cube() -> Mesh {
    // Six faces, four vertices each, centered on the origin with extent 0.5.
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in FACES {
        let base = positions.len() as u32;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            positions.push([
                normal[0] * 0.5 + u[0] * su + v[0] * sv,
                normal[1] * 0.5 + u[1] * su + v[1] * sv,
                normal[2] * 0.5 + u[2] * su + v[2] * sv,
            ]);
            normals.push(normal);
        }
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh {
        positions,
        normals,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_is_a_singleton() {
        assert!(Arc::ptr_eq(&cube_mesh(), &cube_mesh()));
    }

    #[test]
    fn cube_geometry_counts() {
        let mesh = cube_mesh();
        assert_eq!(mesh.positions.len(), 24);
        assert_eq!(mesh.normals.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn cube_fits_unit_extent() {
        let mesh = cube_mesh();
        for p in &mesh.positions {
            for c in p {
                assert!(c.abs() <= 0.5 + f32::EPSILON);
            }
        }
    }
}
