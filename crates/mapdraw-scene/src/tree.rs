use mapdraw_core::config::ColorScheme;
use mapdraw_core::geom::Vec2;
use mapdraw_core::path::PathCommands;
use mapdraw_core::style::Style;
use mapdraw_core::tags::{get_float, Tags};
use std::f64::consts::PI;

/// Crown radius in meters when `diameter_crown` is not given.
const DEFAULT_CROWN_RADIUS: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub tags: Tags,
    pub point: Vec2,
}

impl Tree {
    pub fn crown_radius(&self) -> f64 {
        get_float(&self.tags, "diameter_crown")
            .map(|d| d / 2.0)
            .unwrap_or(DEFAULT_CROWN_RADIUS)
    }

    pub fn trunk_radius(&self) -> Option<f64> {
        get_float(&self.tags, "circumference").map(|c| c / 2.0 / PI)
    }

    pub fn draw(&self, drawing: &mut mapdraw_draw::Drawing, scale: f64, scheme: &ColorScheme) {
        let crown = PathCommands::circle(self.point, self.crown_radius() * scale);
        drawing.path(&crown, &Style::fill(scheme.evergreen_color.with_alpha(0.3)));

        if let Some(radius) = self.trunk_radius() {
            let trunk = PathCommands::circle(self.point, radius * scale);
            drawing.path(&trunk, &Style::fill(scheme.trunk_color));
        }
    }
}
