//! # Sticker App
//!
//! Command-line composer host for Sticker Studio: loads image files and
//! text labels onto a board, applies a layout and exports the finished
//! sheet.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use sticker_core::{AdvanceWidthMeasurer, Element, LayoutEngine, Scene};
use sticker_renderer::{
    decode_batch, ExportConfig, ExportFormat, RenderError, SceneExporter, TextureCache,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Layout applied after all stickers are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LayoutKind {
    /// Near-square grid.
    Grid,
    /// Ring around the canvas center.
    Circle,
    /// Randomized scatter.
    Collage,
    /// Width-driven packer.
    Arrange,
    /// Keep the staggered upload placement.
    None,
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Png,
    Jpeg,
    Svg,
    Pdf,
}

/// Compose a sticker sheet from images and text labels.
#[derive(Parser, Debug)]
#[command(name = "sticker-app", version, about)]
struct CliArgs {
    /// Image files to place on the board.
    images: Vec<PathBuf>,

    /// Add a text sticker (repeatable).
    #[arg(long)]
    text: Vec<String>,

    /// Canvas size as WIDTHxHEIGHT.
    #[arg(long, default_value = "1000x1000")]
    canvas: String,

    /// Layout to apply.
    #[arg(long, value_enum, default_value_t = LayoutKind::Arrange)]
    layout: LayoutKind,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

    /// Output file.
    #[arg(long, default_value = "sticker-sheet.png")]
    out: PathBuf,

    /// RNG seed for reproducible collage placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Layout spacing multiplier (smaller is tighter).
    #[arg(long)]
    spacing: Option<f32>,

    /// Zoom the finished composition about the canvas center.
    #[arg(long)]
    zoom: Option<f32>,

    /// Disable the white outlines behind stickers.
    #[arg(long)]
    no_outline: bool,

    /// Font family for text stickers.
    #[arg(long, default_value = "sans-serif")]
    font: String,

    /// Font size in pixels for text stickers.
    #[arg(long, default_value_t = 36.0)]
    font_size: f32,

    /// Color for text stickers.
    #[arg(long, default_value = "#111111")]
    color: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sticker_app=info,sticker_core=info,sticker_renderer=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let (width, height) = parse_canvas(&args.canvas)?;
    tracing::info!("Composing on a {width}x{height} board");

    let mut scene = Scene::new(width, height);
    let mut cache = TextureCache::new();

    // Read every input up front, skipping unreadable files the same way
    // undecodable ones are skipped later.
    let mut inputs = Vec::with_capacity(args.images.len());
    for path in &args.images {
        match std::fs::read(path) {
            Ok(bytes) => inputs.push((path.display().to_string(), bytes)),
            Err(e) => tracing::warn!("Skipping unreadable file {}: {e}", path.display()),
        }
    }

    let decoded = decode_batch(inputs).await;
    for (i, (src, raster)) in decoded.into_iter().enumerate() {
        let mut element = Element::image(
            src.clone(),
            raster.width,
            raster.height,
            scene.width(),
            scene.height(),
        );
        // Stagger fresh uploads so they don't stack exactly.
        #[allow(clippy::cast_precision_loss)]
        element.set_position((i % 3) as f32 * 280.0 + 200.0, (i / 3) as f32 * 280.0 + 200.0);
        scene.add(element);
        cache.insert(src, raster);
    }

    for label in &args.text {
        scene.add(Element::text(
            label.as_str(),
            args.font.as_str(),
            args.font_size,
            args.color.as_str(),
            scene.width(),
            scene.height(),
            &AdvanceWidthMeasurer,
        ));
    }

    if scene.is_empty() {
        tracing::warn!("Nothing to compose; writing an empty board");
    }

    let mut engine = args.seed.map_or_else(LayoutEngine::new, LayoutEngine::with_seed);
    if let Some(spacing) = args.spacing {
        engine.set_spacing(spacing);
    }
    match args.layout {
        LayoutKind::Grid => engine.grid(&mut scene),
        LayoutKind::Circle => engine.circle(&mut scene),
        LayoutKind::Collage => engine.collage(&mut scene),
        LayoutKind::Arrange => engine.auto_arrange(&mut scene),
        LayoutKind::None => {}
    }
    if let Some(zoom) = args.zoom {
        engine.zoom_all(&mut scene, zoom);
    }

    let exporter = SceneExporter::new(ExportConfig {
        outline: !args.no_outline,
        ..ExportConfig::default()
    });
    let format = match args.format {
        OutputFormat::Png => ExportFormat::Png,
        OutputFormat::Jpeg => ExportFormat::Jpeg,
        OutputFormat::Svg => ExportFormat::Svg,
        OutputFormat::Pdf => ExportFormat::Pdf,
    };

    let bytes = match exporter.export(&scene, &cache, format) {
        Ok(bytes) => bytes,
        Err(RenderError::Unsupported(msg)) => {
            tracing::warn!("{msg}");
            exporter.export(&scene, &cache, ExportFormat::Png)?
        }
        Err(e) => return Err(e.into()),
    };

    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("writing {}", args.out.display()))?;
    tracing::info!(
        "Wrote {} ({} bytes, {} stickers)",
        args.out.display(),
        bytes.len(),
        scene.len()
    );
    Ok(())
}

/// Parse a WIDTHxHEIGHT canvas size.
fn parse_canvas(spec: &str) -> anyhow::Result<(f32, f32)> {
    let (w, h) = spec
        .split_once(['x', 'X'])
        .with_context(|| format!("canvas size must be WIDTHxHEIGHT, got {spec}"))?;
    let width: f32 = w.trim().parse().context("invalid canvas width")?;
    let height: f32 = h.trim().parse().context("invalid canvas height")?;
    Ok((width, height))
}
