use crate::config::{RenderOptions, RenderOptionsPatch};
use crate::error::{ExportError, VizError, VizResult};
use crate::export::{Download, DownloadSink, ExportService, MemorySink};
use crate::hierarchy::build_hierarchy;
use crate::interaction::{InteractionController, Tooltip, ViewTransform};
use crate::layout::{PositionedTree, compute_layout};
use crate::model::{FamilyGraph, FamilyMember};
use crate::render::render_scene;
use crate::scene::Scene;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A named mount point a visualization can attach to.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: String,
    pub width: f32,
    pub height: f32,
}

/// The host page: the set of containers that exist at construction time.
#[derive(Debug, Clone, Default)]
pub struct Document {
    containers: HashMap<String, Container>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, id: impl Into<String>, width: f32, height: f32) -> Self {
        self.add_container(id, width, height);
        self
    }

    pub fn add_container(&mut self, id: impl Into<String>, width: f32, height: f32) {
        let id = id.into();
        self.containers.insert(
            id.clone(),
            Container {
                id,
                width,
                height,
            },
        );
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.get(id)
    }
}

/// One interactive family tree bound to a container.
///
/// `load_data` runs hierarchy building, layout and rendering synchronously;
/// when it returns the scene is complete. Exports read the current scene and
/// leave every piece of state untouched.
pub struct Visualization {
    container: Container,
    options: RenderOptions,
    graph: FamilyGraph,
    positioned: Option<PositionedTree>,
    scene: Option<Scene>,
    interaction: InteractionController,
    exporter: ExportService,
}

impl Visualization {
    pub fn new(
        document: &Document,
        container_id: &str,
        options: Option<RenderOptions>,
    ) -> VizResult<Self> {
        Self::with_sink(document, container_id, options, Box::new(MemorySink::new()))
    }

    pub fn with_sink(
        document: &Document,
        container_id: &str,
        options: Option<RenderOptions>,
        sink: Box<dyn DownloadSink>,
    ) -> VizResult<Self> {
        let container = document
            .container(container_id)
            .cloned()
            .ok_or_else(|| VizError::ContainerNotFound(container_id.to_string()))?;
        let options = options.unwrap_or_else(|| RenderOptions {
            width: container.width,
            height: container.height,
            ..Default::default()
        });
        Ok(Self {
            container,
            interaction: InteractionController::new(options.enable_zoom),
            options,
            graph: FamilyGraph::new(),
            positioned: None,
            scene: None,
            exporter: ExportService::new(sink),
        })
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn graph(&self) -> &FamilyGraph {
        &self.graph
    }

    pub fn positioned(&self) -> Option<&PositionedTree> {
        self.positioned.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn tooltip(&self) -> &Tooltip {
        self.interaction.tooltip()
    }

    pub fn transform(&self) -> &ViewTransform {
        self.interaction.transform()
    }

    /// Replaces all members and re-renders.
    pub fn load_data(&mut self, members: Vec<FamilyMember>) {
        self.graph = FamilyGraph::from_members(members);
        self.render();
    }

    /// Merges `patch` into the options; re-renders when data is loaded.
    pub fn update_options(&mut self, patch: RenderOptionsPatch) {
        self.options.apply(patch);
        self.interaction.set_zoom_enabled(self.options.enable_zoom);
        if self.scene.is_some() {
            self.render();
        }
    }

    fn render(&mut self) {
        // The old tooltip may point at a member the new scene no longer draws.
        self.interaction.hide_tooltip();
        let tree = build_hierarchy(&self.graph);
        if tree.is_none() {
            if self.graph.is_empty() {
                warn!("no family members to render");
            } else {
                warn!(
                    members = self.graph.len(),
                    "no root member found (every member lists a parent); rendering empty tree"
                );
            }
        }
        self.positioned = tree.map(|tree| compute_layout(&tree, &self.options));
        let scene = render_scene(
            self.positioned.as_ref(),
            &self.options,
            self.interaction.transform(),
        );
        debug!(
            nodes = scene.node_count(),
            links = scene.link_count(),
            width = scene.width,
            height = scene.height,
            "rendered family tree"
        );
        self.scene = Some(scene);
    }

    fn sync_transform(&mut self) {
        let transform = *self.interaction.transform();
        if let Some(scene) = self.scene.as_mut() {
            scene.set_view_transform(&transform);
        }
    }

    pub fn zoom_by(&mut self, factor: f32, anchor: (f32, f32)) {
        if self.interaction.zoom_by(factor, anchor) {
            self.sync_transform();
        }
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        if self.interaction.pan_by(dx, dy) {
            self.sync_transform();
        }
    }

    pub fn click_node(&mut self, id: &str) -> bool {
        self.interaction.click_node(self.scene.as_ref(), id)
    }

    pub fn click_at(&mut self, x: f32, y: f32) -> Option<String> {
        self.interaction.click_at(self.scene.as_ref(), x, y)
    }

    pub fn export_as_svg(&self, filename: Option<&str>) -> Result<Download, ExportError> {
        self.exporter.export_svg(self.scene.as_ref(), filename)
    }

    pub async fn export_as_png(&self, filename: Option<&str>) -> Result<Download, ExportError> {
        self.exporter.export_png(self.scene.as_ref(), filename).await
    }

    pub async fn export_as_pdf(&self, filename: Option<&str>) -> Result<Download, ExportError> {
        self.exporter.export_pdf(self.scene.as_ref(), filename).await
    }

    /// Drops the scene and all members and resets pan/zoom.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.positioned = None;
        self.scene = None;
        self.interaction.reset();
    }
}
