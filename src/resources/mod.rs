//! GPU resource helpers: bind group layouts and uniform buffers.
//!
//! Nothing in here reads files. Images and heightmaps are handed in by the
//! caller as bytes or decoded images.

pub mod layouts;
pub mod uniform;

pub use layouts::{Layouts, texture_bind_group};
pub use uniform::UniformBinding;
