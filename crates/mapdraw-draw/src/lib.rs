//! Drawing surface with a vector (SVG) and a raster (PNG) backend.
//!
//! Both backends interpret shapes through [`mapdraw_core::path::execute`],
//! so the same commands give the same geometry on either of them.

pub mod error;
pub mod raster;
pub mod svg;

pub use error::DrawError;
pub use raster::RasterDrawing;
pub use svg::SvgDrawing;

use mapdraw_core::geom::Vec2;
use mapdraw_core::path::{parse, PathCommands};
use mapdraw_core::style::{Style, TextStyle};
use mapdraw_core::Color;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output surface, chosen once when the image is created.
pub enum Drawing {
    Vector(SvgDrawing),
    Raster(RasterDrawing),
}

impl Drawing {
    pub fn vector(width: f64, height: f64) -> Self {
        Drawing::Vector(SvgDrawing::new(width, height))
    }

    pub fn raster(width: f64, height: f64, font: Option<fontdue::Font>) -> Result<Self, DrawError> {
        Ok(Drawing::Raster(RasterDrawing::new(width, height, font)?))
    }

    pub fn width(&self) -> f64 {
        match self {
            Drawing::Vector(svg) => svg.width(),
            Drawing::Raster(raster) => raster.width(),
        }
    }

    pub fn height(&self) -> f64 {
        match self {
            Drawing::Vector(svg) => svg.height(),
            Drawing::Raster(raster) => raster.height(),
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    /// Axis-aligned rectangle between two opposite corners.
    pub fn rectangle(&mut self, corner_1: Vec2, corner_2: Vec2, style: &Style) {
        let corners = [
            corner_1,
            Vec2::new(corner_2.x, corner_1.y),
            corner_2,
            Vec2::new(corner_1.x, corner_2.y),
            corner_1,
        ];
        self.path(&PathCommands::polyline(&corners), style);
    }

    pub fn polyline(&mut self, points: &[Vec2], style: &Style) {
        self.path(&PathCommands::polyline(points), style);
    }

    pub fn path(&mut self, commands: &PathCommands, style: &Style) {
        match self {
            Drawing::Vector(svg) => svg.path(commands, style),
            Drawing::Raster(raster) => raster.path(commands, style),
        }
    }

    /// Parses `text` in the path language, then draws it.
    pub fn path_text(&mut self, text: &str, style: &Style) -> Result<(), DrawError> {
        let commands = parse(text)?;
        self.path(&commands, style);
        Ok(())
    }

    pub fn text(&mut self, text: &str, point: Vec2, color: Color) {
        let style = TextStyle {
            fill: color,
            ..TextStyle::default()
        };
        self.label(text, point, &style);
    }

    pub fn label(&mut self, text: &str, point: Vec2, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        match self {
            Drawing::Vector(svg) => svg.text(text, point, style),
            Drawing::Raster(raster) => raster.text(text, point, style),
        }
    }

    /// Runs `draw` on a layer composited with `opacity` when it returns.
    pub fn group<F>(&mut self, opacity: f64, draw: F) -> Result<(), DrawError>
    where
        F: FnOnce(&mut Drawing) -> Result<(), DrawError>,
    {
        match self {
            Drawing::Vector(svg) => svg.begin_group(opacity),
            Drawing::Raster(raster) => raster.begin_group(opacity)?,
        }
        let result = draw(self);
        match self {
            Drawing::Vector(svg) => svg.end_group(),
            Drawing::Raster(raster) => raster.end_group(),
        }
        result
    }

    pub fn write_to(&self, out: &mut impl Write) -> Result<(), DrawError> {
        match self {
            Drawing::Vector(svg) => svg.write_to(out)?,
            Drawing::Raster(raster) => raster.write_to(out)?,
        }
        Ok(())
    }

    /// Writes the finished image to `path`.
    pub fn finalize(self, path: &Path) -> Result<(), DrawError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

impl std::fmt::Debug for Drawing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Drawing::Vector(_) => "Vector",
            Drawing::Raster(_) => "Raster",
        };
        f.debug_struct("Drawing")
            .field("kind", &kind)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
