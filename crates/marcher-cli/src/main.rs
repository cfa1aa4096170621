//! Marcher CLI - edit and compile a saved raymarching scene

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use marcher_engine::settings::load_settings;
use marcher_engine::{
    FileStore, FlattenMode, NodeId, Session, Shape, ShapeKind, inject_world_map,
};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "marcher")]
#[command(about = "Edit a CSG scene and compile it to a distance-field expression", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the saved scene (overrides settings)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Split wide combinators on a scratch copy instead of the saved tree
    #[arg(long, global = true)]
    no_flatten: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the distance-field expression
    Compile {
        /// Compile only this node
        #[arg(long)]
        id: Option<String>,
    },

    /// Print the shape tree
    Tree,

    /// Add a default shape
    Add {
        /// Shape kind, e.g. sphere or union
        kind: ShapeKind,

        /// Combinator to add to (defaults to the displayed shape)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Delete a shape and everything under it
    Delete {
        id: String,

        /// Combinator holding the shape (looked up when omitted)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Replace a shape with a default one of another kind
    Kind {
        id: String,

        kind: ShapeKind,

        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Set one field, e.g. `set 4 radius 0.5` or `set 4 transform.position 0,1,0`
    Set {
        id: String,
        field: String,
        value: String,
    },

    /// Replace the saved scene with the built-in one
    Reset,

    /// Print the persisted documents
    Export,

    /// Write a shader with the scene's worldMap injected
    Shader {
        /// Shader template containing the worldMap placeholder
        #[arg(short, long)]
        template: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr, stdout carries command output
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    let cli = Cli::parse();

    let mut settings = load_settings();
    if cli.store.is_some() {
        settings.store_dir = cli.store;
    }
    if cli.no_flatten {
        settings.flatten = FlattenMode::Transient;
    }

    let dir = settings
        .resolved_store_dir()
        .context("Could not determine a scene directory, pass --store")?;
    tracing::debug!(dir = %dir.display(), "opening scene store");
    let mut session = Session::with_settings(FileStore::new(dir), &settings);

    match cli.command {
        Commands::Compile { id } => {
            let id = id.map(NodeId::from);
            println!("{}", session.compile(id.as_ref())?);
            session.save()?;
        }
        Commands::Tree => {
            print!("{}", render_tree(&session));
        }
        Commands::Add { kind, parent } => {
            let parent = match parent {
                Some(parent) => NodeId::from(parent),
                None => default_parent(&session),
            };
            let id = session.add_shape(kind, &parent)?;
            session.save()?;
            println!("{}", id);
        }
        Commands::Delete { id, parent } => {
            let id = NodeId::from(id);
            match parent {
                Some(parent) => session.delete_shape(&id, &NodeId::from(parent))?,
                None => session.remove_shape(&id)?,
            };
            session.save()?;
        }
        Commands::Kind { id, kind, parent } => {
            let id = NodeId::from(id);
            let parent = match parent {
                Some(parent) => NodeId::from(parent),
                None => session
                    .scene()
                    .parent_of(&id)
                    .cloned()
                    .with_context(|| format!("Shape {} not found", id))?,
            };
            let new_id = session.change_kind(&id, kind, &parent)?;
            session.save()?;
            println!("{}", new_id);
        }
        Commands::Set { id, field, value } => {
            session.set_field(&NodeId::from(id), &field, &value)?;
            session.save()?;
        }
        Commands::Reset => {
            println!("{}", session.reload_to_defaults());
            session.save()?;
        }
        Commands::Export => {
            let exported = session.export()?;
            println!("root: {}", exported.root.as_deref().unwrap_or("null"));
            println!("camera: {}", exported.camera);
        }
        Commands::Shader { template, output } => {
            let base = fs::read_to_string(&template)
                .with_context(|| format!("Failed to read {}", template.display()))?;
            let shader = inject_world_map(&base, &session.compile(None)?);
            session.save()?;

            match output {
                Some(path) => {
                    fs::write(&path, shader)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", shader),
            }
        }
    }

    Ok(())
}

/// The displayed shape when it can hold children, otherwise the root
fn default_parent(session: &Session<FileStore>) -> NodeId {
    match session.scene().content() {
        Some(content) if content.is_combinator() => content.id().clone(),
        _ => session.scene().root_id().clone(),
    }
}

// String writing is infallible
#[allow(clippy::unwrap_used)]
fn render_tree(session: &Session<FileStore>) -> String {
    fn visit(shape: &Shape, depth: usize, out: &mut String) {
        write!(out, "{:indent$}{} {}", "", shape.id(), shape.kind(), indent = depth * 2).unwrap();
        if let Some(leaf) = shape.as_leaf() {
            for (name, param) in &leaf.params {
                write!(out, " {}={}", name, param).unwrap();
            }
            write!(out, " color={}", leaf.color).unwrap();
        }
        match shape {
            Shape::Custom(custom) => write!(out, " content={:?}", custom.content).unwrap(),
            _ => {
                if let Some(two) = shape.as_two() {
                    write!(out, " smoothness={}", two.smoothness).unwrap();
                }
            }
        }
        if !shape.transform().is_identity() {
            let t = shape.transform();
            write!(
                out,
                " position={} rotation={} scale={}",
                t.position, t.rotation, t.scale
            )
            .unwrap();
        }
        out.push('\n');

        if let Some(two) = shape.as_two() {
            for child in two.shapes.values() {
                visit(child, depth + 1, out);
            }
        }
    }

    let mut out = String::new();
    match session.scene().content() {
        Some(content) => visit(content, 0, &mut out),
        None => out.push_str("(empty)\n"),
    }
    out
}
