use crate::geom::Vec2;
use crate::path::PathCommands;
use crate::style::Style;
use crate::tags::{parse_float, Tags};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One loop of a polygon boundary or hole, or an open line.
pub type Ring = Vec<Vec2>;

/// Σ (x[next] - x[i]) * (y[next] + y[i]) over the ring, wrapping around.
pub fn signed_area_sum(ring: &[Vec2]) -> f64 {
    ring.iter()
        .circular_tuple_windows()
        .map(|(a, b)| (b.x - a.x) * (b.y + a.y))
        .sum()
}

/// Zero-area rings count as clockwise.
pub fn is_clockwise(ring: &[Vec2]) -> bool {
    signed_area_sum(ring) >= 0.0
}

pub fn make_clockwise(mut ring: Ring) -> Ring {
    if !is_clockwise(&ring) {
        ring.reverse();
    }
    ring
}

pub fn make_counter_clockwise(mut ring: Ring) -> Ring {
    if is_clockwise(&ring) {
        ring.reverse();
    }
    ring
}

/// Area or line on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub tags: Tags,
    pub inners: Vec<Ring>,
    pub outers: Vec<Ring>,
}

impl Figure {
    /// Forces inner rings clockwise and outer rings counter-clockwise when
    /// both kinds are present.
    pub fn new(tags: Tags, inners: Vec<Ring>, outers: Vec<Ring>) -> Self {
        if !inners.is_empty() && !outers.is_empty() {
            Self {
                tags,
                inners: inners.into_iter().map(make_clockwise).collect(),
                outers: outers.into_iter().map(make_counter_clockwise).collect(),
            }
        } else {
            Self {
                tags,
                inners,
                outers,
            }
        }
    }

    /// Outer rings first, then inner rings.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.outers.iter().chain(self.inners.iter())
    }

    pub fn path(&self, offset: Vec2) -> PathCommands {
        self.path_with_parallel_offset(offset, 0.0)
    }

    pub fn path_with_parallel_offset(&self, offset: Vec2, parallel_offset: f64) -> PathCommands {
        let mut commands = PathCommands::new();
        for ring in self.rings() {
            commands.append(ring_path(ring, offset, parallel_offset));
        }
        commands
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

pub fn ring_path(ring: &[Vec2], offset: Vec2, parallel_offset: f64) -> PathCommands {
    let shifted: Vec<Vec2> = ring.iter().map(|p| *p + offset).collect();
    let points = if parallel_offset.abs() < 1e-12 {
        shifted
    } else {
        offset_polyline(&shifted, parallel_offset).unwrap_or(shifted)
    };
    PathCommands::polyline(&points)
}

/// Displaces a polyline by `distance` along the left normal of each edge,
/// joining neighbouring edges at their intersection.
///
/// Closed input (first point equal to last) gives closed output. Returns
/// `None` when the line has fewer than two distinct points.
pub fn offset_polyline(points: &[Vec2], distance: f64) -> Option<Vec<Vec2>> {
    let mut clean: Vec<Vec2> = Vec::with_capacity(points.len());
    for p in points {
        if clean.last().map_or(true, |last: &Vec2| !last.approx_eq(*p, 1e-12)) {
            clean.push(*p);
        }
    }
    let closed = clean.len() > 2 && clean[0].approx_eq(clean[clean.len() - 1], 1e-12);
    if closed {
        clean.pop();
    }
    if clean.len() < 2 {
        return None;
    }

    let edge_count = if closed { clean.len() } else { clean.len() - 1 };
    let edges: Vec<(Vec2, Vec2)> = (0..edge_count)
        .map(|i| {
            let a = clean[i];
            let b = clean[(i + 1) % clean.len()];
            let shift = (b - a).normalized().map(Vec2::right_normal).unwrap_or(Vec2::ZERO) * distance;
            (a + shift, b + shift)
        })
        .collect();

    let mut result = Vec::with_capacity(clean.len() + 1);
    if closed {
        for i in 0..edges.len() {
            let previous = edges[(i + edges.len() - 1) % edges.len()];
            result.push(join(previous, edges[i]));
        }
        result.push(result[0]);
    } else {
        result.push(edges[0].0);
        for pair in edges.windows(2) {
            result.push(join(pair[0], pair[1]));
        }
        result.push(edges[edges.len() - 1].1);
    }
    Some(result)
}

/// Intersection of the lines through two consecutive offset edges, or the
/// shared shifted vertex when they are parallel.
fn join(first: (Vec2, Vec2), second: (Vec2, Vec2)) -> Vec2 {
    let r = first.1 - first.0;
    let s = second.1 - second.0;
    let denominator = r.cross(s);
    if denominator.abs() < 1e-12 {
        return second.0;
    }
    let t = (second.0 - first.0).cross(s) / denominator;
    first.0 + r * t
}

/// Figure with paint style and draw-order keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledFigure {
    pub figure: Figure,
    pub style: Style,
    pub priority: f64,
    #[serde(default)]
    pub parallel_offset: f64,
}

impl StyledFigure {
    pub fn new(figure: Figure, style: Style, priority: f64) -> Self {
        Self {
            figure,
            style,
            priority,
            parallel_offset: 0.0,
        }
    }

    pub fn with_parallel_offset(mut self, parallel_offset: f64) -> Self {
        self.parallel_offset = parallel_offset;
        self
    }

    /// Value of the `layer` tag; 0 when missing or not a number.
    pub fn layer(&self) -> f64 {
        self.figure.tag("layer").and_then(parse_float).unwrap_or(0.0)
    }

    pub fn order_key(&self) -> (f64, f64) {
        (self.layer(), self.priority)
    }

    pub fn cmp_order(&self, other: &Self) -> Ordering {
        let (layer_a, priority_a) = self.order_key();
        let (layer_b, priority_b) = other.order_key();
        layer_a
            .total_cmp(&layer_b)
            .then_with(|| priority_a.total_cmp(&priority_b))
    }

    pub fn path(&self, offset: Vec2) -> PathCommands {
        self.figure
            .path_with_parallel_offset(offset, self.parallel_offset)
    }
}

/// Stable sort by `(layer, priority)`; later figures draw on top.
pub fn sort_figures(figures: &mut [StyledFigure]) {
    figures.sort_by(StyledFigure::cmp_order);
}
