mod logging;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mapdraw_core::config::{BuildingMode, LabelMode, MapConfiguration};
use mapdraw_draw::raster::load_font;
use mapdraw_draw::Drawing;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "mapdraw")]
#[command(about = "Renders map scenes to SVG or PNG.")]
struct Cli {
    /// Log filter in `env_logger` syntax; defaults to `RUST_LOG`, then `info`.
    #[arg(long, global = true)]
    log: Option<String>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Draws a JSON scene file.
    Render {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// JSON map configuration; flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum)]
        buildings: Option<BuildingsArg>,
        #[arg(long)]
        no_roofs: bool,
        #[arg(long)]
        building_colors: bool,
        #[arg(long, value_enum)]
        label_mode: Option<LabelModeArg>,
        #[arg(long)]
        overlap: Option<usize>,
        #[arg(long)]
        hide_credit: bool,
        /// TrueType font for PNG text.
        #[arg(long)]
        font: Option<PathBuf>,
    },
    /// Parses path text and prints its normalized form and JSON.
    Path { text: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BuildingsArg {
    No,
    Flat,
    Isometric,
}

impl From<BuildingsArg> for BuildingMode {
    fn from(value: BuildingsArg) -> Self {
        match value {
            BuildingsArg::No => BuildingMode::No,
            BuildingsArg::Flat => BuildingMode::Flat,
            BuildingsArg::Isometric => BuildingMode::Isometric,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LabelModeArg {
    No,
    Main,
    All,
}

impl From<LabelModeArg> for LabelMode {
    fn from(value: LabelModeArg) -> Self {
        match value {
            LabelModeArg::No => LabelMode::No,
            LabelModeArg::Main => LabelMode::Main,
            LabelModeArg::All => LabelMode::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Svg,
    Png,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log.as_deref());

    match cli.cmd {
        Command::Render {
            input,
            output,
            config,
            buildings,
            no_roofs,
            building_colors,
            label_mode,
            overlap,
            hide_credit,
            font,
        } => {
            let mut configuration = match config.as_deref() {
                Some(path) => load_configuration(path)?,
                None => MapConfiguration::default(),
            };
            if let Some(mode) = buildings {
                configuration.building_mode = mode.into();
            }
            if no_roofs {
                configuration.draw_roofs = false;
            }
            if building_colors {
                configuration.use_building_colors = true;
            }
            if let Some(mode) = label_mode {
                configuration.label_mode = mode.into();
            }
            if let Some(overlap) = overlap {
                configuration.overlap = overlap;
            }
            if hide_credit {
                configuration.show_credit = false;
            }
            render(&input, &output, &configuration, font.as_deref())
        }
        Command::Path { text } => print_path(&text),
    }
}

fn render(input: &Path, output: &Path, configuration: &MapConfiguration, font: Option<&Path>) -> Result<()> {
    ensure_input_file(input)?;
    let format = output_format(output)?;

    let scene = mapdraw_scene::load_scene(input, configuration)?;
    log::info!(
        "rendering {input:?} at {}x{} to {output:?}",
        scene.size.x,
        scene.size.y
    );

    let mut drawing = match format {
        OutputFormat::Svg => Drawing::vector(scene.size.x, scene.size.y),
        OutputFormat::Png => {
            let font = match font {
                Some(path) => {
                    ensure_input_file(path)?;
                    let data = std::fs::read(path).with_context(|| format!("read font: {path:?}"))?;
                    Some(load_font(&data).with_context(|| format!("load font: {path:?}"))?)
                }
                None => None,
            };
            Drawing::raster(scene.size.x, scene.size.y, font).context("create raster surface")?
        }
    };

    mapdraw_scene::render(&scene, configuration, &mut drawing).context("draw scene")?;

    create_parent_dir(output)?;
    drawing
        .finalize(output)
        .with_context(|| format!("write output: {output:?}"))
}

fn create_parent_dir(output: &Path) -> Result<()> {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory: {parent:?}")),
        _ => Ok(()),
    }
}

fn print_path(text: &str) -> Result<()> {
    let commands = mapdraw_core::path::parse(text).with_context(|| format!("parse path `{text}`"))?;
    println!("{commands}");
    let json = serde_json::to_string_pretty(&commands).context("serialize path")?;
    println!("{json}");
    Ok(())
}

fn load_configuration(path: &Path) -> Result<MapConfiguration> {
    ensure_input_file(path)?;
    let text = std::fs::read_to_string(path).with_context(|| format!("read config: {path:?}"))?;
    serde_json::from_str(&text).with_context(|| format!("parse config: {path:?}"))
}

fn output_format(output: &Path) -> Result<OutputFormat> {
    let ext = output
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "svg" => Ok(OutputFormat::Svg),
        "png" => Ok(OutputFormat::Png),
        _ => bail!("Unsupported output extension: .{ext}"),
    }
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("input is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
