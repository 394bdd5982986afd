pub mod cell;
pub mod color;
pub mod mesh;
pub mod node;
pub mod scene;

pub use cell::{SharedScalar, SharedVec3, shared_scalar};
pub use color::Color;
pub use mesh::{Mesh, cube_mesh};
pub use node::RenderNode;
pub use scene::{Animation, Scene, SceneHandler};
