//! Plain data shared by the renderer: vertices, meshes, transforms,
//! bounding volumes, textures and lighting uniforms.
//!
//! - `vertex` holds the vertex formats and their buffer layouts
//! - `mesh` holds CPU mesh data and its uploaded GPU counterpart
//! - `transform` composes position, rotation and scale into world matrices
//! - `bounds` has axis-aligned boxes and frustum culling
//! - `texture` wraps 2D, array, cube and heightmap textures
//! - `lighting` has materials, lights, fog and the uniform layouts

pub mod bounds;
pub mod lighting;
pub mod mesh;
pub mod texture;
pub mod transform;
pub mod vertex;
