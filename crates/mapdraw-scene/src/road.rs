use mapdraw_core::geom::Vec2;
use mapdraw_core::style::{LineCap, LineJoin, Style};
use mapdraw_core::tags::Tags;
use mapdraw_core::Color;
use mapdraw_draw::Drawing;

#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    pub tags: Tags,
    pub points: Vec<Vec2>,
    pub width: f64,
    pub color: Color,
    /// Casing drawn one unit wider on each side, under every road body.
    pub border_color: Option<Color>,
    pub priority: f64,
}

impl Road {
    fn border_style(&self) -> Option<Style> {
        self.border_color.map(|color| {
            Style::stroke(color, self.width + 2.0)
                .with_line_cap(LineCap::Round)
                .with_line_join(LineJoin::Round)
        })
    }

    fn body_style(&self) -> Style {
        Style::stroke(self.color, self.width)
            .with_line_cap(LineCap::Round)
            .with_line_join(LineJoin::Round)
    }
}

/// Draws all casings, then all bodies, both in ascending priority.
pub fn draw_roads(drawing: &mut Drawing, roads: &[Road]) {
    let mut ordered: Vec<&Road> = roads.iter().collect();
    ordered.sort_by(|a, b| a.priority.total_cmp(&b.priority));

    for road in &ordered {
        if let Some(style) = road.border_style() {
            drawing.polyline(&road.points, &style);
        }
    }
    for road in &ordered {
        drawing.polyline(&road.points, &road.body_style());
    }
}
