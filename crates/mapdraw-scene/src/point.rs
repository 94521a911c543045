//! Point features: icons and labels stacked under a node.

use mapdraw_core::config::LabelMode;
use mapdraw_core::geom::Vec2;
use mapdraw_core::path::PathCommands;
use mapdraw_core::style::{LineJoin, Style, TextStyle};
use mapdraw_core::tags::Tags;
use mapdraw_core::Color;
use mapdraw_draw::Drawing;
use std::collections::BTreeSet;

/// Icons are drawn on a grid of this size, centered on their position.
pub const ICON_SIZE: f64 = 16.0;
/// Vertical advance of one label line.
pub const LABEL_STEP: f64 = 11.0;
pub const LABEL_MAX_CHARS: usize = 26;

/// Canvas cells already covered by icons and labels.
#[derive(Debug, Clone)]
pub struct Occupied {
    width: usize,
    height: usize,
    pub overlap: usize,
    cells: Vec<bool>,
}

impl Occupied {
    pub fn new(width: f64, height: f64, overlap: usize) -> Self {
        let width = width.max(0.0) as usize;
        let height = height.max(0.0) as usize;
        Self {
            width,
            height,
            overlap,
            cells: vec![false; width * height],
        }
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Points outside the canvas count as occupied.
    pub fn check(&self, x: i64, y: i64) -> bool {
        self.index(x, y).map_or(true, |i| self.cells[i])
    }

    pub fn register(&mut self, x: i64, y: i64) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = true;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconShape {
    pub path: PathCommands,
    pub fill: Color,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Icon {
    pub shapes: Vec<IconShape>,
    /// Placeholder icon for nodes nothing more specific matched.
    pub is_default: bool,
}

impl Icon {
    pub fn draw(&self, drawing: &mut Drawing, position: Vec2, outline: bool) {
        let offset = position - Vec2::new(ICON_SIZE / 2.0, ICON_SIZE / 2.0);
        for shape in &self.shapes {
            let path = shape.path.translated(offset);
            if outline {
                let color = if shape.fill.luminance() > 0.78 {
                    Color::BLACK
                } else {
                    Color::WHITE
                };
                let style = Style::stroke(color.with_alpha(0.5), 2.2).with_line_join(LineJoin::Round);
                drawing.path(&path, &style);
            } else {
                drawing.path(&path, &Style::fill(shape.fill));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IconSet {
    pub main_icon: Icon,
    pub extra_icons: Vec<Icon>,
    /// Drawn instead of the main icon when its place is taken.
    pub default_icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub fill: Color,
    pub size: f64,
    pub out_fill: Option<Color>,
}

impl Label {
    /// Unescapes quotes and ampersands and cuts long text with `...`.
    pub fn display_text(&self) -> String {
        let text = self.text.replace("&quot;", "\"").replace("&amp;", "&");
        if text.chars().count() > LABEL_MAX_CHARS {
            let cut: String = text.chars().take(LABEL_MAX_CHARS).collect();
            format!("{cut}...")
        } else {
            text
        }
    }
}

/// Vertical layout state of one point during a render.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointCursor {
    pub y: f64,
    pub main_icon_painted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub tags: Tags,
    /// Tags already expressed by the icons.
    pub processed: BTreeSet<String>,
    pub icon_set: IconSet,
    pub labels: Vec<Label>,
    pub point: Vec2,
    pub priority: f64,
    pub is_for_node: bool,
    pub draw_outline: bool,
}

impl Point {
    pub fn new(tags: Tags, icon_set: IconSet, labels: Vec<Label>, point: Vec2, priority: f64) -> Self {
        Self {
            tags,
            processed: BTreeSet::new(),
            icon_set,
            labels,
            point,
            priority,
            is_for_node: true,
            draw_outline: true,
        }
    }

    pub fn draw_main_shapes(
        &self,
        cursor: &mut PointCursor,
        drawing: &mut Drawing,
        occupied: Option<&mut Occupied>,
    ) {
        let has_unprocessed = self.tags.keys().any(|k| !self.processed.contains(k));
        if self.icon_set.main_icon.is_default
            && self.icon_set.extra_icons.is_empty()
            && (!has_unprocessed || !self.is_for_node)
        {
            return;
        }

        let position = self.point + Vec2::new(0.0, cursor.y);
        cursor.main_icon_painted = self.draw_point_shape(
            drawing,
            &self.icon_set.main_icon,
            self.icon_set.default_icon.as_ref(),
            position,
            occupied,
        );
        if cursor.main_icon_painted {
            cursor.y += ICON_SIZE;
        }
    }

    pub fn draw_extra_shapes(
        &self,
        cursor: &mut PointCursor,
        drawing: &mut Drawing,
        mut occupied: Option<&mut Occupied>,
    ) {
        let extras = &self.icon_set.extra_icons;
        if extras.is_empty() || !cursor.main_icon_painted {
            return;
        }

        let first_left = -(extras.len() as f64 - 1.0) * ICON_SIZE / 2.0;
        if let Some(occupied) = occupied.as_deref() {
            let mut left = first_left;
            for _ in extras {
                let x = (self.point.x + left) as i64;
                let y = (self.point.y + cursor.y) as i64;
                if occupied.check(x, y) {
                    return;
                }
                left += ICON_SIZE;
            }
        }

        let mut left = first_left;
        for icon in extras {
            let position = self.point + Vec2::new(left, cursor.y);
            self.draw_point_shape(drawing, icon, None, position, occupied.as_deref_mut());
            left += ICON_SIZE;
        }
        cursor.y += ICON_SIZE;
    }

    /// Draws `icon` (or `default_icon` when the place is taken); returns
    /// whether the requested icon itself was painted.
    fn draw_point_shape(
        &self,
        drawing: &mut Drawing,
        icon: &Icon,
        default_icon: Option<&Icon>,
        position: Vec2,
        occupied: Option<&mut Occupied>,
    ) -> bool {
        let position = Vec2::new(position.x.trunc(), position.y.trunc());
        let (x, y) = (position.x as i64, position.y as i64);

        let mut icon_to_draw = icon;
        let mut is_painted = true;
        if let Some(occupied) = occupied.as_deref() {
            if occupied.check(x, y) {
                match default_icon {
                    Some(default_icon) => {
                        icon_to_draw = default_icon;
                        is_painted = false;
                    }
                    None => return false,
                }
            }
        }

        if self.draw_outline {
            icon_to_draw.draw(drawing, position, true);
        }
        icon_to_draw.draw(drawing, position, false);

        if let Some(occupied) = occupied {
            if is_painted {
                let overlap = occupied.overlap as i64;
                for i in -overlap..overlap {
                    for j in -overlap..overlap {
                        occupied.register(x + i, y + j);
                    }
                }
            }
        }
        is_painted
    }

    pub fn draw_texts(
        &self,
        cursor: &mut PointCursor,
        drawing: &mut Drawing,
        mut occupied: Option<&mut Occupied>,
        label_mode: LabelMode,
    ) {
        let labels = match label_mode {
            LabelMode::No => return,
            LabelMode::Main => &self.labels[..self.labels.len().min(1)],
            LabelMode::All => &self.labels[..],
        };
        for label in labels {
            let text = label.display_text();
            let point = self.point + Vec2::new(0.0, cursor.y + 2.0);
            if self.draw_text(drawing, &text, point, label, occupied.as_deref_mut()) {
                cursor.y += LABEL_STEP;
            }
        }
    }

    fn draw_text(
        &self,
        drawing: &mut Drawing,
        text: &str,
        point: Vec2,
        label: &Label,
        occupied: Option<&mut Occupied>,
    ) -> bool {
        if let Some(occupied) = occupied {
            let half = (text.chars().count() * 6 / 2) as i64;
            let y = (point.y - 4.0) as i64;
            if (-half..half).any(|i| occupied.check((point.x + i as f64) as i64, y)) {
                return false;
            }
            for i in -half..half {
                for j in -12..5 {
                    occupied.register((point.x + i as f64) as i64, (point.y + j as f64) as i64);
                }
            }
        }

        if let Some(out_fill) = label.out_fill {
            let outline = TextStyle {
                size: label.size,
                fill: label.fill,
                stroke: Some(out_fill),
                stroke_width: 3.0,
                opacity: 0.5,
                ..TextStyle::default()
            };
            drawing.label(text, point, &outline);
        }
        let style = TextStyle {
            size: label.size,
            fill: label.fill,
            ..TextStyle::default()
        };
        drawing.label(text, point, &style);
        true
    }
}
