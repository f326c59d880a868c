#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod render;
pub mod scene;
pub mod theme;
pub mod visualization;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{CustomColors, RenderOptions, RenderOptionsPatch, load_config};
pub use error::{ExportError, VizError, VizResult};
pub use export::{Download, DownloadSink, DirectorySink, ExportFormat, MemorySink};
pub use hierarchy::{Tree, TreeNode, build_hierarchy};
pub use interaction::{InteractionController, Tooltip, ViewTransform};
pub use layout::{PositionedNode, PositionedTree, compute_layout};
pub use model::{FamilyGraph, FamilyMember, Gender, parse_members};
pub use render::render_scene;
pub use scene::Scene;
pub use theme::{ColorRole, ColorScheme, get_color};
pub use visualization::{Container, Document, Visualization};
