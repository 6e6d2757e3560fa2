//! terra-ngin
//!
//! A small scene library on top of wgpu. It builds procedural meshes, a
//! heightmapped terrain drawn as patches with distance based LOD, a sky
//! dome, directional lighting with fog, and CPU ray picking with a
//! highlighted triangle. The caller owns the window, surface and device and
//! hands the library a device, a queue and a target format.
//!
//! High-level modules
//! - `camera`: first-person camera, its lens and the keyboard/mouse controller
//! - `config`: start-up parameters for the context and the demo scene
//! - `context`: device, queue, pipelines, frame uniform and depth buffer
//! - `data_structures`: vertices, meshes, transforms, bounds and textures
//! - `geometry`: procedural box, grid, hills, sphere and basis meshes
//! - `objects`: the scene objects and the trait they share
//! - `pick`: ray construction and ray/triangle tests
//! - `pipelines`: WGSL shaders and the render pipelines built from them
//! - `render`: render composition and batched drawing in a fixed order
//! - `scene`: the demo scene tying everything into one frame loop
//! - `terrain`: heightmap, patch layout, LOD and the terrain renderer
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod geometry;
pub mod input;
pub mod objects;
pub mod pick;
pub mod pipelines;
pub mod render;
pub mod render_states;
pub mod resources;
pub mod scene;
pub mod sky;
pub mod terrain;
pub mod timer;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use wgpu;
pub use winit::event::WindowEvent;
