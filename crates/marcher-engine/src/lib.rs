//! Marcher Engine - editing sessions over a stored scene
//!
//! The engine is a thin orchestration layer over marcher-scene and
//! marcher-compiler: it restores a scene from a [`Store`], applies edits,
//! compiles the result and writes it back.
//!
//! ## Example
//!
//! ```rust
//! use marcher_engine::{MemoryStore, Session, ShapeKind};
//!
//! let mut session = Session::open(MemoryStore::new());
//!
//! // The built-in scene's top-level union has id "1"
//! let union = marcher_engine::NodeId::new("1");
//! session.add_shape(ShapeKind::Torus, &union)?;
//!
//! let expr = session.compile(None)?;
//! assert!(expr.contains("Torus("));
//!
//! session.save()?;
//! # Ok::<(), marcher_engine::SessionError>(())
//! ```

pub mod session;
pub mod settings;

// Re-export commonly used types from dependencies
pub use marcher_compiler::{FlattenMode, NEUTRAL_EXPR, inject_world_map};
pub use marcher_scene::{
    CameraState, ChangeEvent, ChangeKind, FileStore, MemoryStore, NodeId, Scene, Shape, ShapeKind,
    Store,
};

pub use session::{SceneExport, Session, SessionError};
pub use settings::{EngineSettings, load_settings, save_settings};
