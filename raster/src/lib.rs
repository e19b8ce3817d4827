//! # Glimmer Raster
//!
//! The software raster pipeline of the Glimmer engine: a single-threaded,
//! frame-driven pass that takes triangulated meshes from `glimmer-core`
//! through world→view→clip transforms, frustum and back-face culling,
//! near-plane clipping, flat shading, painter-sorted scanline fill and a
//! depth buffer, into any [`FrameSink`](framebuffer::FrameSink).

pub mod camera;
pub mod clipper;
pub mod framebuffer;
pub mod pipeline;
pub mod scanline;
pub mod scene;
pub mod triangle;

pub use camera::Camera;
pub use framebuffer::{Framebuffer, FrameSink, Rgba8};
pub use pipeline::RasterPipeline;
pub use scene::Scene;
