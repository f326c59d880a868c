use crate::config::load_config;
use crate::export::{DirectorySink, DownloadSink, ExportFormat, MemorySink};
use crate::model::{FamilyMember, parse_members};
use crate::theme::ColorScheme;
use crate::visualization::{Document, Visualization};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use futures::executor::block_on;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const CONTAINER_ID: &str = "family-tree";

#[derive(Parser, Debug)]
#[command(name = "ftree", version, about = "Family tree renderer (SVG/PNG/PDF)")]
pub struct Args {
    /// Members JSON file (array or {"members": [...]}) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/pdf). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Render options JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Color scheme: default, vintage, modern or custom
    #[arg(short = 's', long = "scheme")]
    pub scheme: Option<ColorScheme>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Svg => ExportFormat::Svg,
            OutputFormat::Png => ExportFormat::Png,
            OutputFormat::Pdf => ExportFormat::Pdf,
        }
    }
}

pub fn run() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut options = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }
    if let Some(scheme) = args.scheme {
        options.color_scheme = scheme;
    }
    // Static output: the animation would only be replayed by SVG viewers.
    if args.output_format != OutputFormat::Svg {
        options.animation_duration = 0;
    }

    let members = read_members(args.input.as_deref())?;
    let format = ExportFormat::from(args.output_format);
    let document = Document::new().with_container(CONTAINER_ID, options.width, options.height);

    match args.output.as_deref() {
        Some(output) => {
            let (sink, filename) = directory_sink_for(output)?;
            let mut viz = Visualization::with_sink(&document, CONTAINER_ID, Some(options), sink)?;
            viz.load_data(members);
            export(&viz, format, Some(&filename))?;
        }
        None => {
            if format != ExportFormat::Svg {
                return Err(anyhow::anyhow!(
                    "Output path required for {} output",
                    format.name()
                ));
            }
            let sink = MemorySink::new();
            let mut viz =
                Visualization::with_sink(&document, CONTAINER_ID, Some(options), Box::new(sink))?;
            viz.load_data(members);
            let download = viz.export_as_svg(None)?;
            print!("{}", String::from_utf8_lossy(&download.bytes));
        }
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn export(viz: &Visualization, format: ExportFormat, filename: Option<&str>) -> Result<()> {
    match format {
        ExportFormat::Svg => {
            viz.export_as_svg(filename)?;
        }
        ExportFormat::Png => {
            block_on(viz.export_as_png(filename))?;
        }
        ExportFormat::Pdf => {
            block_on(viz.export_as_pdf(filename))?;
        }
    }
    Ok(())
}

fn directory_sink_for(output: &Path) -> Result<(Box<dyn DownloadSink>, String)> {
    let filename = output
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", output.display()))?
        .to_string();
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((Box::new(DirectorySink::new(dir)), filename))
}

fn read_members(path: Option<&Path>) -> Result<Vec<FamilyMember>> {
    let input = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(parse_members(&input)?)
}
