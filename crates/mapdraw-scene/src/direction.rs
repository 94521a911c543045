//! View directions of cameras, signs and viewpoints.
//!
//! A `direction` value is a `;` separated list of sectors; each is either a
//! single direction (degrees clockwise from north, or a compass point such
//! as `NW`) widened by an angle, or an explicit `from-to` range.

use mapdraw_core::config::ColorScheme;
use mapdraw_core::geom::Vec2;
use mapdraw_core::path::PathCommands;
use mapdraw_core::style::Style;
use mapdraw_core::tags::{get_float, Tags};
use mapdraw_core::Color;
use mapdraw_draw::Drawing;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Rotates compass degrees so that 0 points up on the canvas.
const SHIFT: f64 = -FRAC_PI_2;
const SMALLEST_ANGLE: f64 = PI / 15.0;
const DEFAULT_ANGLE: f64 = PI / 30.0;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Unit canvas vector for a direction written in degrees or as a compass
/// point.
pub fn parse_vector(text: &str) -> Option<Vec2> {
    let text = text.trim();
    let degrees = match text.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            let upper = text.to_ascii_uppercase();
            let index = COMPASS_POINTS.iter().position(|p| *p == upper)?;
            index as f64 * 22.5
        }
    };
    let radians = degrees.to_radians() + SHIFT;
    Some(Vec2::new(radians.cos(), radians.sin()))
}

/// `[[cos a, sin a], [-sin a, cos a]] * v`
fn rotated(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * v.x + sin * v.y, -sin * v.x + cos * v.y)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub start: Vec2,
    pub end: Vec2,
    pub main_direction: Vec2,
}

impl Sector {
    /// `angle` is the full opening in degrees for single directions.
    pub fn parse(text: &str, angle: Option<f64>) -> Option<Sector> {
        if let Some((from, to)) = text.split_once('-').filter(|_| !text.starts_with('-')) {
            let start = parse_vector(from)?;
            let end = parse_vector(to)?;
            return Some(Sector {
                start,
                end,
                main_direction: (start + end) * 0.5,
            });
        }

        let half = match angle {
            Some(degrees) => SMALLEST_ANGLE.max(degrees.to_radians() / 2.0),
            None => DEFAULT_ANGLE,
        };
        let vector = parse_vector(text)?;
        Some(Sector {
            start: rotated(vector, half),
            end: rotated(vector, -half),
            main_direction: vector,
        })
    }

    /// Wedge from `center`, sweeping from `end` back to `start`.
    pub fn path(&self, center: Vec2, radius: f64) -> PathCommands {
        let from = self.end.y.atan2(self.end.x);
        let mut to = self.start.y.atan2(self.start.x);
        if to > from {
            to -= TAU;
        }
        PathCommands::sector(center, radius, from, to)
    }
}

pub fn parse_sectors(text: &str) -> Vec<Sector> {
    text.split(';')
        .filter_map(|part| Sector::parse(part, None))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionSector {
    pub tags: Tags,
    pub point: Vec2,
}

impl DirectionSector {
    fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn draw(&self, drawing: &mut Drawing, scheme: &ColorScheme) {
        let mut angle = None;
        let (direction, radius, color) = if self.tag("man_made") == Some("surveillance") {
            angle = get_float(&self.tags, "angle").or_else(|| get_float(&self.tags, "camera:angle"));
            (
                self.tag("camera:direction"),
                50.0,
                scheme.direction_camera_color.with_alpha(0.2),
            )
        } else if self.tag("traffic_sign") == Some("stop") {
            (
                self.tag("direction"),
                25.0,
                Color::rgb(1.0, 0.0, 0.0).with_alpha(0.2),
            )
        } else {
            (
                self.tag("direction"),
                50.0,
                scheme.direction_view_color.with_alpha(0.35),
            )
        };

        let Some(direction) = direction.filter(|d| !d.is_empty()) else {
            return;
        };
        let center = Vec2::new(self.point.x.trunc(), self.point.y.trunc());

        let sectors = match angle {
            Some(_) => Sector::parse(direction, angle).into_iter().collect(),
            None => parse_sectors(direction),
        };
        for sector in sectors {
            drawing.path(&sector.path(center, radius), &Style::fill(color));
        }
    }
}
