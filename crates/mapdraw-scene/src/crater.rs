use mapdraw_core::geom::Vec2;
use mapdraw_core::path::PathCommands;
use mapdraw_core::style::Style;
use mapdraw_core::tags::{get_float, Tags};
use mapdraw_core::Color;
use mapdraw_draw::Drawing;

/// Volcano or impact crater, drawn as a dark translucent disc.
#[derive(Debug, Clone, PartialEq)]
pub struct Crater {
    pub tags: Tags,
    pub point: Vec2,
}

impl Crater {
    pub fn radius(&self) -> Option<f64> {
        get_float(&self.tags, "diameter").map(|d| d / 2.0)
    }

    pub fn draw(&self, drawing: &mut Drawing, scale: f64) {
        let Some(radius) = self.radius() else {
            log::debug!("crater without diameter skipped");
            return;
        };
        let disc = PathCommands::circle(self.point, radius * scale);
        drawing.path(&disc, &Style::fill(Color::BLACK.with_alpha(0.1)));
    }
}
