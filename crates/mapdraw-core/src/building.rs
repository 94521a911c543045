//! Buildings and their isometric extrusion.
//!
//! Walls are drawn band by band: the distinct building heights of the scene
//! split the vertical axis into bands, and every band draws the wall quads of
//! buildings that span it before the roofs that stop at its top. This keeps
//! near walls over far roofs without a depth buffer.

use crate::color::Color;
use crate::config::{BuildingConfig, ColorScheme};
use crate::figure::{Figure, Ring};
use crate::geom::Vec2;
use crate::tags::{get_float, get_length, Tags};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::f64::consts::PI;
use std::hash::{Hash, Hasher};

/// Directed wall edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Segment {
    pub point_1: Vec2,
    pub point_2: Vec2,
    /// Illumination factor in `[0, 1]`.
    pub angle: f64,
}

impl Segment {
    pub fn new(point_1: Vec2, point_2: Vec2) -> Self {
        let angle = match (point_2 - point_1).normalized() {
            Some(mut direction) => {
                if direction.x > 0.0 {
                    direction = -direction;
                }
                direction.dot(Vec2::new(0.0, 1.0)).clamp(-1.0, 1.0).acos() / PI
            }
            None => 0.0,
        };
        Self {
            point_1,
            point_2,
            angle,
        }
    }

    pub fn middle_y(&self) -> f64 {
        (self.point_1.y + self.point_2.y) / 2.0
    }

    /// `(middle y, x1, y1, x2, y2)`, compared with IEEE total order.
    pub fn order_key(&self) -> [f64; 5] {
        [
            self.middle_y(),
            self.point_1.x,
            self.point_1.y,
            self.point_2.x,
            self.point_2.y,
        ]
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Segment {}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key()
            .iter()
            .zip(other.order_key().iter())
            .map(|(a, b)| a.total_cmp(b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in [
            self.point_1.x,
            self.point_1.y,
            self.point_2.x,
            self.point_2.y,
        ] {
            value.to_bits().hash(state);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub figure: Figure,
    pub height: f64,
    pub min_height: f64,
    pub wall_color: Color,
    pub wall_default_color: Color,
    pub fill: Color,
    pub stroke: Color,
    pub default_fill: Color,
    pub default_stroke: Color,
    pub is_construction: bool,
    pub has_walls: bool,
    /// Wall segments in segment order.
    pub parts: Vec<Segment>,
}

impl Building {
    pub fn new(
        tags: Tags,
        inners: Vec<Ring>,
        outers: Vec<Ring>,
        scheme: &ColorScheme,
        config: &BuildingConfig,
    ) -> Self {
        let figure = Figure::new(tags, inners, outers);
        let tags = &figure.tags;

        let is_construction = figure.tag("building") == Some("construction")
            || figure.tag("construction") == Some("yes");
        let has_walls = figure.tag("building") != Some("roof");

        let (default_fill, default_stroke, wall_default_color) = if is_construction {
            (
                scheme.building_construction_color,
                scheme.building_construction_border_color,
                scheme.wall_construction_color,
            )
        } else {
            (
                scheme.building_color,
                scheme.building_border_color,
                scheme.wall_color,
            )
        };

        let (fill, stroke) = match figure.tag("roof:colour").and_then(|v| scheme.parse_color(v)) {
            Some(fill) => (fill, fill.darkened(0.85)),
            None => (scheme.building_color, scheme.building_border_color),
        };

        let wall_color = figure
            .tag("building:material")
            .and_then(|m| scheme.material_colors.get(m).copied())
            .or_else(|| figure.tag("building:colour").and_then(|v| scheme.parse_color(v)))
            .or_else(|| figure.tag("colour").and_then(|v| scheme.parse_color(v)))
            .unwrap_or(wall_default_color);

        let height = derived_height(tags, "building:levels", "height", config)
            .unwrap_or(config.minimal_height);
        let min_height =
            derived_height(tags, "building:min_level", "min_height", config).unwrap_or(0.0);

        let mut parts: Vec<Segment> = figure
            .inners
            .iter()
            .chain(figure.outers.iter())
            .flat_map(|ring| ring.iter().tuple_windows().map(|(a, b)| Segment::new(*a, *b)))
            .collect();
        parts.sort();

        Self {
            figure,
            height,
            min_height,
            wall_color,
            wall_default_color,
            fill,
            stroke,
            default_fill,
            default_stroke,
            is_construction,
            has_walls,
            parts,
        }
    }

    pub fn roof_colors(&self, use_building_colors: bool) -> (Color, Color) {
        if use_building_colors {
            (self.fill, self.stroke)
        } else {
            (self.default_fill, self.default_stroke)
        }
    }

    pub fn base_wall_color(&self, use_building_colors: bool) -> Color {
        if use_building_colors {
            self.wall_color
        } else {
            self.wall_default_color
        }
    }
}

/// `B + levels * L`, else `B + length`; zero values count as absent.
fn derived_height(tags: &Tags, levels_key: &str, length_key: &str, config: &BuildingConfig) -> Option<f64> {
    if let Some(levels) = get_float(tags, levels_key).filter(|v| *v != 0.0) {
        return Some(config.minimal_height + levels * config.level_height);
    }
    get_length(tags, length_key)
        .filter(|v| *v != 0.0)
        .map(|length| config.minimal_height + length)
}

/// Wall color for one segment in the band ending at `band_top`.
///
/// Construction sites shift channels without clamping, so the result may
/// fall outside `[0, 1]`.
pub fn wall_color(
    base: Color,
    angle: f64,
    band_top: f64,
    is_construction: bool,
    config: &BuildingConfig,
) -> Color {
    let [low, middle] = config.illumination_heights();
    if is_construction {
        base.shifted(angle * 0.2)
    } else if band_top <= low {
        base.darkened(0.70)
    } else if band_top <= middle {
        base.darkened(0.85)
    } else {
        base.shifted(angle * 0.2 - 0.1).clamped()
    }
}

/// Wall of one building, addressed by indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallRef {
    pub building: usize,
    pub part: usize,
}

/// All walls of a scene in segment order; equal segments keep building
/// order.
#[derive(Debug, Clone, Default)]
pub struct WallIndex {
    walls: Vec<(Segment, WallRef)>,
}

impl WallIndex {
    pub fn new(buildings: &[Building]) -> Self {
        let mut walls: Vec<(Segment, WallRef)> = buildings
            .iter()
            .enumerate()
            .flat_map(|(building, b)| {
                b.parts
                    .iter()
                    .enumerate()
                    .map(move |(part, segment)| (*segment, WallRef { building, part }))
            })
            .collect();
        walls.sort_by(|a, b| a.0.cmp(&b.0));
        Self { walls }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Segment, WallRef)> {
        self.walls.iter()
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }
}

/// Illumination thresholds plus every building height and min height,
/// sorted ascending without duplicates.
pub fn scene_heights(buildings: &[Building], config: &BuildingConfig) -> Vec<f64> {
    let mut heights: Vec<f64> = config.illumination_heights().to_vec();
    for building in buildings {
        heights.push(building.height);
        heights.push(building.min_height);
    }
    normalize_heights(heights)
}

fn normalize_heights(mut heights: Vec<f64>) -> Vec<f64> {
    heights.retain(|h| h.is_finite());
    heights.sort_by(f64::total_cmp);
    heights.dedup();
    heights
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandStep {
    Wall {
        wall: WallRef,
        previous_top: f64,
        top: f64,
    },
    Roof {
        building: usize,
        top: f64,
    },
}

/// Draw sequence of the isometric pass over `heights`.
///
/// Each band from the previous top (starting at 0) to the current top lists
/// the walls of buildings with `min_height < top <= height`, then the roofs
/// of buildings whose height equals the top.
pub fn plan_bands(heights: &[f64], buildings: &[Building], walls: &WallIndex) -> Vec<BandStep> {
    let mut steps = Vec::new();
    let mut previous_top = 0.0;

    for top in normalize_heights(heights.to_vec()) {
        for (_, wall) in walls.iter() {
            let building = &buildings[wall.building];
            if !building.has_walls || building.height < top || building.min_height >= top {
                continue;
            }
            steps.push(BandStep::Wall {
                wall: *wall,
                previous_top,
                top,
            });
        }
        for (index, building) in buildings.iter().enumerate() {
            if building.height == top {
                steps.push(BandStep::Roof {
                    building: index,
                    top,
                });
            }
        }
        previous_top = top;
    }

    steps
}
