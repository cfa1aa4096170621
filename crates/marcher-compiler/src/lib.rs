//! Marcher Compiler - shape trees to distance-field expressions
//!
//! ## Key Types
//!
//! - [`DistanceFieldCompiler`] - lowers a [`marcher_scene::Shape`] into one
//!   expression string
//! - [`PreviewSink`] - receives each successful top-level compile
//!
//! ## Example
//!
//! ```rust
//! use marcher_compiler::{DistanceFieldCompiler, inject_world_map};
//! use marcher_scene::{IdAllocator, Shape, ShapeKind};
//!
//! let mut ids = IdAllocator::new();
//! let mut sphere = Shape::create(ShapeKind::Sphere, &mut ids);
//!
//! let mut compiler = DistanceFieldCompiler::default();
//! let expr = compiler.compile(Some(&mut sphere), &mut ids);
//! let shader = inject_world_map("void main() {}", &expr);
//! assert!(shader.contains("Col(Sphere("));
//! ```

mod df_gen;
mod preview;
mod shader;

pub use df_gen::{DistanceFieldCompiler, FlattenMode, NEUTRAL_EXPR};
pub use preview::{NoPreview, PreviewSink, SharedPreview};
pub use shader::{WORLD_MAP_MARKER, inject_world_map, world_map_function};
