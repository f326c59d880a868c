use crate::error::ExportError;
use crate::scene::Scene;
use base64::Engine as _;
use once_cell::unsync::OnceCell;
use resvg::tiny_skia;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use usvg::fontdb;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn default_filename(self) -> &'static str {
        match self {
            ExportFormat::Svg => "family-tree.svg",
            ExportFormat::Png => "family-tree.png",
            ExportFormat::Pdf => "family-tree.pdf",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Svg => "image/svg+xml;charset=utf-8",
            ExportFormat::Png => "image/png",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Svg => "SVG",
            ExportFormat::Png => "PNG",
            ExportFormat::Pdf => "PDF",
        }
    }
}

/// A finished export artifact, ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Where finished exports go.
pub trait DownloadSink {
    fn deliver(&self, download: &Download) -> Result<(), ExportError>;
}

/// Writes each download into a directory, keeping only the file name part of
/// the requested name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        let name = Path::new(filename)
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "download".into());
        self.dir.join(name)
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, download: &Download) -> Result<(), ExportError> {
        let path = self.path_for(&download.filename);
        std::fs::write(&path, &download.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = download.bytes.len(), "wrote export");
        Ok(())
    }
}

/// Keeps downloads in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    downloads: Rc<RefCell<Vec<Download>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.borrow().clone()
    }

    pub fn last(&self) -> Option<Download> {
        self.downloads.borrow().last().cloned()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, download: &Download) -> Result<(), ExportError> {
        self.downloads.borrow_mut().push(download.clone());
        Ok(())
    }
}

/// Serializes or rasterizes scene snapshots and delivers them to a sink.
/// Never mutates the scene it reads.
pub struct ExportService {
    sink: Box<dyn DownloadSink>,
    fonts: OnceCell<Arc<fontdb::Database>>,
}

impl ExportService {
    pub fn new(sink: Box<dyn DownloadSink>) -> Self {
        Self {
            sink,
            fonts: OnceCell::new(),
        }
    }

    /// System fonts, scanned on the first raster export and reused after.
    pub fn fonts(&self) -> Arc<fontdb::Database> {
        self.fonts
            .get_or_init(|| {
                let mut db = fontdb::Database::new();
                db.load_system_fonts();
                debug!(faces = db.len(), "loaded system fonts");
                Arc::new(db)
            })
            .clone()
    }

    pub fn export_svg(
        &self,
        scene: Option<&Scene>,
        filename: Option<&str>,
    ) -> Result<Download, ExportError> {
        let scene = scene.ok_or(ExportError::NoScene)?;
        let download = Download {
            filename: filename_or_default(filename, ExportFormat::Svg),
            mime: ExportFormat::Svg.mime(),
            bytes: scene.to_svg_string().into_bytes(),
        };
        self.sink.deliver(&download)?;
        Ok(download)
    }

    pub async fn export_png(
        &self,
        scene: Option<&Scene>,
        filename: Option<&str>,
    ) -> Result<Download, ExportError> {
        let filename = filename_or_default(filename, ExportFormat::Png);
        let snapshot = scene.map(Scene::to_svg_string);
        let result: Result<Vec<u8>, ExportError> = async {
            let svg = snapshot.ok_or(ExportError::NoScene)?;
            let pixmap = rasterize(&svg, self.fonts())?;
            encode_png(&pixmap)
        }
        .await;
        self.finish(ExportFormat::Png, filename, result)
    }

    pub async fn export_pdf(
        &self,
        scene: Option<&Scene>,
        filename: Option<&str>,
    ) -> Result<Download, ExportError> {
        let filename = filename_or_default(filename, ExportFormat::Pdf);
        let snapshot = scene.map(Scene::to_svg_string);
        let result: Result<Vec<u8>, ExportError> = async {
            let svg = snapshot.ok_or(ExportError::NoScene)?;
            let pixmap = rasterize(&svg, self.fonts())?;
            bitmap_to_pdf(&pixmap)
        }
        .await;
        self.finish(ExportFormat::Pdf, filename, result)
    }

    fn finish(
        &self,
        format: ExportFormat,
        filename: String,
        result: Result<Vec<u8>, ExportError>,
    ) -> Result<Download, ExportError> {
        let delivered = result.and_then(|bytes| {
            let download = Download {
                filename: filename.clone(),
                mime: format.mime(),
                bytes,
            };
            self.sink.deliver(&download)?;
            Ok(download)
        });
        if let Err(err) = &delivered {
            error!(format = format.name(), %filename, error = %err, "export failed");
        }
        delivered
    }
}

fn filename_or_default(filename: Option<&str>, format: ExportFormat) -> String {
    filename
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(format.default_filename())
        .to_string()
}

/// Renders SVG markup into a bitmap at its intrinsic size.
pub fn rasterize(
    svg: &str,
    fonts: Arc<fontdb::Database>,
) -> Result<tiny_skia::Pixmap, ExportError> {
    let opt = usvg::Options {
        font_family: "Inter".to_string(),
        fontdb: fonts,
        ..Default::default()
    };

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| ExportError::Parse(err.to_string()))?;
    let size = tree.size().to_int_size();
    let (width, height) = (size.width(), size.height());
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::Allocate { width, height })?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap_mut);
    Ok(pixmap)
}

pub fn encode_png(pixmap: &tiny_skia::Pixmap) -> Result<Vec<u8>, ExportError> {
    pixmap
        .encode_png()
        .map_err(|err| ExportError::encode("PNG", err.to_string()))
}

/// One-page PDF holding the bitmap at 1 px = 1 pt, page sized to the bitmap.
pub fn bitmap_to_pdf(pixmap: &tiny_skia::Pixmap) -> Result<Vec<u8>, ExportError> {
    let png = encode_png(pixmap)?;
    let (width, height) = (pixmap.width(), pixmap.height());
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    let page = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\"><image x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" xlink:href=\"data:image/png;base64,{encoded}\"/></svg>"
    );

    let opt = svg2pdf::usvg::Options::default();
    let tree = svg2pdf::usvg::Tree::from_str(&page, &opt)
        .map_err(|err| ExportError::Pdf(err.to_string()))?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|err| ExportError::Pdf(err.to_string()))
}
