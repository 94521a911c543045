use crate::color::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Paint attributes of a shape.
///
/// Fill and stroke are independent: an unset one is simply not painted, and
/// a style with neither draws nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    /// Dash pattern in canvas units; empty for solid strokes.
    pub dash: Vec<f64>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            dash: Vec::new(),
        }
    }
}

impl Style {
    pub fn new(fill: Option<Color>, stroke: Option<Color>, width: f64) -> Self {
        Self {
            fill,
            stroke,
            width,
            ..Self::default()
        }
    }

    pub fn fill(color: Color) -> Self {
        Self::new(Some(color), None, 1.0)
    }

    pub fn stroke(color: Color, width: f64) -> Self {
        Self::new(None, Some(color), width)
    }

    pub fn with_line_join(mut self, line_join: LineJoin) -> Self {
        self.line_join = line_join;
        self
    }

    pub fn with_line_cap(mut self, line_cap: LineCap) -> Self {
        self.line_cap = line_cap;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.fill.is_some() || self.stroke.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub size: f64,
    pub fill: Color,
    /// Outline painted under the glyphs.
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
    pub anchor: TextAnchor,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 10.0,
            fill: Color::BLACK,
            stroke: None,
            stroke_width: 1.0,
            opacity: 1.0,
            anchor: TextAnchor::Middle,
        }
    }
}
