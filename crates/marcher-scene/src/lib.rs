//! Marcher Scene - editable CSG shape tree
//!
//! This crate holds the data side of Marcher: the shape tree that the
//! distance-field compiler lowers into shader code, plus everything needed
//! to edit and persist it.
//!
//! ## Key Types
//!
//! - [`Shape`] - closed union of primitives, combinators and custom nodes
//! - [`Scene`] - the root union with the displayed shape as its first child
//! - [`IdAllocator`] - hands out increasing node ids
//! - [`EventLog`] - append-only record of structural edits
//! - [`Store`] - durable key-value storage for the tagged JSON codec
//!
//! ## Example
//!
//! ```rust
//! use marcher_scene::{EventLog, IdAllocator, Scene, ShapeKind};
//!
//! let mut ids = IdAllocator::new();
//! let mut log = EventLog::new();
//! let mut scene = Scene::new();
//!
//! let root = scene.root_id().clone();
//! let union = scene.add_shape(ShapeKind::Union, &root, &mut ids, &mut log)?;
//! scene.add_shape(ShapeKind::Sphere, &union, &mut ids, &mut log)?;
//! assert_eq!(log.len(), 2);
//! # Ok::<(), marcher_scene::Error>(())
//! ```

pub mod camera;
pub mod codec;
pub mod defaults;
pub mod edit;
pub mod events;
pub mod ids;
pub mod persist;
pub mod scene;
pub mod shape;
pub mod store;
pub mod value;

mod error;

pub use camera::CameraState;
pub use error::{Error, Result};
pub use events::{ChangeEvent, ChangeKind, EventLog, HistorySink};
pub use ids::{IdAllocator, NodeId};
pub use scene::{SCENE_ROOT_ID, Scene};
pub use shape::{
    BoxShape, CombinatorKind, Cone, Custom, InfCylinder, LeafView, Param, Plane, Shape, ShapeKind,
    Sphere, Torus, Transform, Triangle, Two,
};
pub use store::{FileStore, MemoryStore, Store};
pub use value::{NumVec3, SVec3, Scalar};
