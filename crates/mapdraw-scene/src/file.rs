//! JSON scene files.
//!
//! Coordinates in the file are planar map coordinates (meters, y up); the
//! loader projects them into canvas space with a [`LinearProjector`].

use crate::crater::Crater;
use crate::direction::DirectionSector;
use crate::point::{Icon, IconSet, IconShape, Label, Point};
use crate::road::Road;
use crate::scene::Scene;
use crate::tree::Tree;
use anyhow::{bail, Context, Result};
use mapdraw_core::building::Building;
use mapdraw_core::config::MapConfiguration;
use mapdraw_core::figure::{Figure, Ring, StyledFigure};
use mapdraw_core::geom::{BBox2, LinearProjector, Projector};
use mapdraw_core::path::parse;
use mapdraw_core::style::Style;
use mapdraw_core::tags::Tags;
use mapdraw_core::Color;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

type Coordinates = (f64, f64);

#[derive(Debug, Clone, Deserialize)]
pub struct SceneFile {
    pub bounds: BoundsFile,
    /// Canvas units per meter.
    pub scale: f64,
    #[serde(default)]
    pub figures: Vec<FigureFile>,
    #[serde(default)]
    pub buildings: Vec<BuildingFile>,
    #[serde(default)]
    pub roads: Vec<RoadFile>,
    #[serde(default)]
    pub trees: Vec<NodeFile>,
    #[serde(default)]
    pub craters: Vec<NodeFile>,
    #[serde(default)]
    pub directions: Vec<NodeFile>,
    #[serde(default)]
    pub points: Vec<PointFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoundsFile {
    pub min: Coordinates,
    pub max: Coordinates,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FigureFile {
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub inners: Vec<Vec<Coordinates>>,
    #[serde(default)]
    pub outers: Vec<Vec<Coordinates>>,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub priority: f64,
    #[serde(default)]
    pub parallel_offset: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildingFile {
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub inners: Vec<Vec<Coordinates>>,
    pub outers: Vec<Vec<Coordinates>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoadFile {
    #[serde(default)]
    pub tags: Tags,
    pub points: Vec<Coordinates>,
    /// Width in meters.
    #[serde(default = "default_road_width")]
    pub width: f64,
    #[serde(default = "default_road_color")]
    pub color: Color,
    #[serde(default)]
    pub border_color: Option<Color>,
    #[serde(default)]
    pub priority: f64,
}

fn default_road_width() -> f64 {
    5.0
}

fn default_road_color() -> Color {
    Color::WHITE
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeFile {
    #[serde(default)]
    pub tags: Tags,
    pub point: Coordinates,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointFile {
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub processed: BTreeSet<String>,
    pub point: Coordinates,
    #[serde(default)]
    pub icon: IconFile,
    #[serde(default)]
    pub extra_icons: Vec<IconFile>,
    #[serde(default)]
    pub default_icon: Option<IconFile>,
    #[serde(default)]
    pub labels: Vec<LabelFile>,
    #[serde(default)]
    pub priority: f64,
    #[serde(default = "default_true")]
    pub is_for_node: bool,
    #[serde(default = "default_true")]
    pub draw_outline: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IconFile {
    #[serde(default)]
    pub shapes: Vec<IconShapeFile>,
    #[serde(default)]
    pub is_default: bool,
}

/// One icon shape in the path language, on a 16×16 grid.
#[derive(Debug, Clone, Deserialize)]
pub struct IconShapeFile {
    pub path: String,
    #[serde(default = "default_icon_color")]
    pub fill: Color,
}

fn default_icon_color() -> Color {
    Color::rgb(0.267, 0.267, 0.267)
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelFile {
    pub text: String,
    #[serde(default)]
    pub fill: Option<Color>,
    #[serde(default = "default_label_size")]
    pub size: f64,
    #[serde(default)]
    pub out_fill: Option<Color>,
}

fn default_label_size() -> f64 {
    10.0
}

pub fn load_scene(path: &Path, configuration: &MapConfiguration) -> Result<Scene> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read scene: {path:?}"))?;
    parse_scene(&text, configuration).with_context(|| format!("load scene: {path:?}"))
}

pub fn parse_scene(text: &str, configuration: &MapConfiguration) -> Result<Scene> {
    let file: SceneFile = serde_json::from_str(text).context("parse scene json")?;
    build_scene(file, configuration)
}

pub fn build_scene(file: SceneFile, configuration: &MapConfiguration) -> Result<Scene> {
    let bounds = BBox2::new(file.bounds.min.into(), file.bounds.max.into());
    if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
        bail!("scene bounds must have a positive size");
    }
    if !(file.scale.is_finite() && file.scale > 0.0) {
        bail!("scene scale must be positive, got {}", file.scale);
    }

    let projector = LinearProjector::new(bounds, file.scale);
    let scale = projector.scale(None);
    let project_ring = |ring: &[Coordinates]| -> Ring {
        ring.iter().map(|c| projector.project((*c).into())).collect()
    };
    let project_rings =
        |rings: &[Vec<Coordinates>]| -> Vec<Ring> { rings.iter().map(|r| project_ring(r)).collect() };

    let mut scene = Scene::new(projector.size(), scale);

    for figure in file.figures {
        let styled = StyledFigure::new(
            Figure::new(
                figure.tags,
                project_rings(&figure.inners),
                project_rings(&figure.outers),
            ),
            figure.style,
            figure.priority,
        )
        .with_parallel_offset(figure.parallel_offset);
        scene.figures.push(styled);
    }

    for building in file.buildings {
        scene.buildings.push(Building::new(
            building.tags,
            project_rings(&building.inners),
            project_rings(&building.outers),
            &configuration.scheme,
            &configuration.buildings,
        ));
    }

    for road in file.roads {
        scene.roads.push(Road {
            tags: road.tags,
            points: project_ring(&road.points),
            width: road.width * scale,
            color: road.color,
            border_color: road.border_color,
            priority: road.priority,
        });
    }

    for node in file.trees {
        scene.trees.push(Tree {
            tags: node.tags,
            point: projector.project(node.point.into()),
        });
    }
    for node in file.craters {
        scene.craters.push(Crater {
            tags: node.tags,
            point: projector.project(node.point.into()),
        });
    }
    for node in file.directions {
        scene.directions.push(DirectionSector {
            tags: node.tags,
            point: projector.project(node.point.into()),
        });
    }

    for (index, point) in file.points.into_iter().enumerate() {
        let icon_set = IconSet {
            main_icon: build_icon(&point.icon).with_context(|| format!("point {index}: main icon"))?,
            extra_icons: point
                .extra_icons
                .iter()
                .map(build_icon)
                .collect::<Result<_>>()
                .with_context(|| format!("point {index}: extra icons"))?,
            default_icon: point
                .default_icon
                .as_ref()
                .map(build_icon)
                .transpose()
                .with_context(|| format!("point {index}: default icon"))?,
        };
        let labels = point
            .labels
            .into_iter()
            .map(|label| Label {
                text: label.text,
                fill: label.fill.unwrap_or(configuration.scheme.label_color),
                size: label.size,
                out_fill: label.out_fill,
            })
            .collect();
        let mut built = Point::new(
            point.tags,
            icon_set,
            labels,
            projector.project(point.point.into()),
            point.priority,
        );
        built.processed = point.processed;
        built.is_for_node = point.is_for_node;
        built.draw_outline = point.draw_outline;
        scene.points.push(built);
    }

    log::debug!(
        "scene: {} figures, {} buildings, {} roads, {} points",
        scene.figures.len(),
        scene.buildings.len(),
        scene.roads.len(),
        scene.points.len()
    );
    Ok(scene)
}

fn build_icon(icon: &IconFile) -> Result<Icon> {
    let shapes = icon
        .shapes
        .iter()
        .map(|shape| {
            Ok(IconShape {
                path: parse(&shape.path).with_context(|| format!("icon path `{}`", shape.path))?,
                fill: shape.fill,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Icon {
        shapes,
        is_default: icon.is_default,
    })
}
