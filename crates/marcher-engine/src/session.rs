//! The editing session
//!
//! A [`Session`] owns everything one editor works on: the scene, the id
//! allocator, the change log, the camera and the compiler. There is no
//! global state, so several sessions can live side by side.

use marcher_compiler::{DistanceFieldCompiler, SharedPreview};
use marcher_scene::persist;
use marcher_scene::store::{CAMERA_KEY, ROOT_KEY};
use marcher_scene::{
    CameraState, ChangeEvent, EventLog, IdAllocator, NodeId, Scene, Shape, ShapeKind, Store, codec,
    defaults, edit,
};
use thiserror::Error;

use crate::settings::EngineSettings;

/// Errors that can occur while editing a session
#[derive(Error, Debug)]
pub enum SessionError {
    /// Editing, encoding or storage failed
    #[error(transparent)]
    Scene(#[from] marcher_scene::Error),

    /// No node with this id is in the scene
    #[error("Shape {0} not found")]
    ShapeNotFound(NodeId),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Both persisted documents, as they would be written
#[derive(Debug, Clone, PartialEq)]
pub struct SceneExport {
    /// `None` when the scene is empty
    pub root: Option<String>,
    /// Encoded camera state
    pub camera: String,
}

/// One editor's scene, camera and compiler over a [`Store`]
pub struct Session<S: Store> {
    store: S,
    scene: Scene,
    ids: IdAllocator,
    events: EventLog,
    camera: CameraState,
    compiler: DistanceFieldCompiler,
    preview: Option<SharedPreview>,
}

impl<S: Store> Session<S> {
    /// Open a session with default settings
    pub fn open(store: S) -> Self {
        Self::with_settings(store, &EngineSettings::default())
    }

    /// Open a session, restoring the saved scene or falling back to the
    /// built-in one
    pub fn with_settings(store: S, settings: &EngineSettings) -> Self {
        let mut ids = IdAllocator::new();
        let content = persist::load_content_or_default(&store, &mut ids);
        let camera = persist::load_camera_or_default(&store);

        let mut compiler = DistanceFieldCompiler::new(settings.flatten);
        let preview = settings.publish_preview.then(SharedPreview::new);
        if let Some(sink) = &preview {
            compiler = compiler.with_preview(sink.clone());
        }

        Self {
            store,
            scene: Scene::with_content(content),
            ids,
            events: EventLog::new(),
            camera,
            compiler,
            preview,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: CameraState) {
        self.camera = camera;
    }

    /// Every structural change since the session opened, oldest first
    pub fn events(&self) -> &[ChangeEvent] {
        self.events.events()
    }

    /// Drain the change log
    pub fn take_events(&mut self) -> Vec<ChangeEvent> {
        self.events.take()
    }

    /// Last successfully compiled expression, if previews are enabled
    pub fn preview(&self) -> Option<String> {
        self.preview.as_ref().and_then(SharedPreview::latest)
    }

    pub fn compiler_mut(&mut self) -> &mut DistanceFieldCompiler {
        &mut self.compiler
    }

    // ========================================================================
    // Structural edits
    // ========================================================================

    /// Create a default `kind` node under `parent`
    pub fn add_shape(&mut self, kind: ShapeKind, parent: &NodeId) -> Result<NodeId> {
        Ok(self
            .scene
            .add_shape(kind, parent, &mut self.ids, &mut self.events)?)
    }

    /// Re-attach a detached subtree, for example one returned by
    /// [`Session::delete_shape`]
    pub fn insert_shape(&mut self, shape: Shape, parent: &NodeId) -> Result<NodeId> {
        Ok(self.scene.insert_shape(shape, parent, &mut self.events)?)
    }

    /// Delete `node` and its subtree from `parent`
    pub fn delete_shape(&mut self, node: &NodeId, parent: &NodeId) -> Result<Shape> {
        Ok(self.scene.delete_shape(node, parent, &mut self.events)?)
    }

    /// Swap `old` for `new` under `parent`, recording a delete and an add
    pub fn replace_shape(&mut self, old: &NodeId, new: Shape, parent: &NodeId) -> Result<Shape> {
        Ok(self.scene.replace_shape(old, new, parent, &mut self.events)?)
    }

    /// Give `node` a new kind; the node is rebuilt with that kind's defaults
    pub fn change_kind(&mut self, node: &NodeId, kind: ShapeKind, parent: &NodeId) -> Result<NodeId> {
        Ok(self
            .scene
            .change_kind(node, kind, parent, &mut self.ids, &mut self.events)?)
    }

    /// Delete `node` from wherever it is in the scene
    pub fn remove_shape(&mut self, node: &NodeId) -> Result<Shape> {
        let parent = self
            .scene
            .parent_of(node)
            .cloned()
            .ok_or_else(|| SessionError::ShapeNotFound(node.clone()))?;
        self.delete_shape(node, &parent)
    }

    /// Change one field of `node` from editor text
    pub fn set_field(&mut self, node: &NodeId, field: &str, text: &str) -> Result<()> {
        let shape = self
            .scene
            .find_mut(node)
            .ok_or_else(|| SessionError::ShapeNotFound(node.clone()))?;
        edit::set_field(shape, field, text)?;
        tracing::debug!(%node, field, text, "set field");
        Ok(())
    }

    pub fn is_combinator(&self, node: &NodeId) -> Result<bool> {
        if node == self.scene.root_id() {
            return Ok(true);
        }
        self.scene
            .find(node)
            .map(Shape::is_combinator)
            .ok_or_else(|| SessionError::ShapeNotFound(node.clone()))
    }

    // ========================================================================
    // Compile
    // ========================================================================

    /// Compile `node`, or the displayed shape when `None`
    ///
    /// Wide combinators may be rewritten in place, depending on the
    /// flatten mode.
    pub fn compile(&mut self, node: Option<&NodeId>) -> Result<String> {
        let target = match node {
            Some(id) if id != self.scene.root_id() => Some(
                self.scene
                    .find_mut(id)
                    .ok_or_else(|| SessionError::ShapeNotFound(id.clone()))?,
            ),
            _ => {
                let extra = self.scene.root().len().saturating_sub(1);
                if extra > 0 {
                    tracing::warn!(extra, "root has shapes besides the displayed one, ignoring");
                }
                self.scene.content_mut()
            }
        };
        Ok(self.compiler.compile(target, &mut self.ids))
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the displayed shape and the camera to the store
    ///
    /// An empty scene removes the saved shape, so the next open starts
    /// from the built-in scene.
    pub fn save(&mut self) -> Result<()> {
        match self.scene.content() {
            Some(content) => persist::save_content(&mut self.store, content)?,
            None => {
                self.store.remove(ROOT_KEY)?;
                tracing::debug!("scene is empty, removed saved shape");
            }
        }
        persist::save_camera(&mut self.store, &self.camera)?;
        Ok(())
    }

    /// Replace the scene and camera with what the store holds
    ///
    /// Ids restored this way are observed, so later allocations stay
    /// unique.
    pub fn load(&mut self) {
        let content = persist::load_content_or_default(&self.store, &mut self.ids);
        self.scene = Scene::with_content(content);
        self.camera = persist::load_camera_or_default(&self.store);
    }

    /// Throw away the current scene and camera for the built-in ones, then
    /// recompile. Nothing is written to the store.
    pub fn reload_to_defaults(&mut self) -> String {
        self.scene = Scene::with_content(defaults::default_content(&mut self.ids));
        self.camera = defaults::default_camera();
        let nodes = self.scene.content().map_or(0, Shape::node_count);
        tracing::info!(nodes, "reloaded default scene");
        self.compiler.compile(self.scene.content_mut(), &mut self.ids)
    }

    /// Encode both persisted documents without writing them
    pub fn export(&self) -> Result<SceneExport> {
        let root = self.scene.content().map(codec::encode).transpose()?;
        let camera = codec::encode(&self.camera)?;
        tracing::debug!(keys = ?[ROOT_KEY, CAMERA_KEY], "exported scene");
        Ok(SceneExport { root, camera })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use marcher_compiler::NEUTRAL_EXPR;
    use marcher_scene::MemoryStore;

    #[test]
    fn test_open_empty_store_uses_defaults() {
        let session = Session::open(MemoryStore::new());
        assert_eq!(session.scene().content().unwrap().node_count(), 5);
        assert_eq!(session.ids().floor(), 5);
        assert_eq!(session.camera(), &defaults::default_camera());
        assert!(session.events().is_empty());
    }

    #[test]
    fn test_unknown_node_errors() {
        let mut session = Session::open(MemoryStore::new());
        let missing = NodeId::new("404");
        assert!(matches!(
            session.set_field(&missing, "radius", "1"),
            Err(SessionError::ShapeNotFound(_))
        ));
        assert!(matches!(
            session.compile(Some(&missing)),
            Err(SessionError::ShapeNotFound(_))
        ));
        assert!(matches!(
            session.is_combinator(&missing),
            Err(SessionError::ShapeNotFound(_))
        ));
        assert!(matches!(
            session.remove_shape(&missing),
            Err(SessionError::ShapeNotFound(_))
        ));
    }

    #[test]
    fn test_is_combinator() {
        let session = Session::open(MemoryStore::new());
        let root = session.scene().root_id().clone();
        assert!(session.is_combinator(&root).unwrap());
        assert!(session.is_combinator(&NodeId::new("1")).unwrap());
        assert!(!session.is_combinator(&NodeId::new("2")).unwrap());
    }

    #[test]
    fn test_empty_scene_compiles_to_neutral() {
        let mut session = Session::open(MemoryStore::new());
        let root = session.scene().root_id().clone();
        session.delete_shape(&NodeId::new("1"), &root).unwrap();
        assert_eq!(session.compile(None).unwrap(), NEUTRAL_EXPR);
        assert_eq!(session.preview(), None);
    }

    #[test]
    fn test_preview_disabled() {
        let settings = EngineSettings {
            publish_preview: false,
            ..EngineSettings::default()
        };
        let mut session = Session::with_settings(MemoryStore::new(), &settings);
        session.compile(None).unwrap();
        assert_eq!(session.preview(), None);
    }
}
