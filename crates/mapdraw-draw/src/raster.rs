//! Raster backend on a `tiny_skia` pixmap.
//!
//! Translucent groups draw into an offscreen pixmap that is composited onto
//! the layer below when the group ends. Text is rasterized with `fontdue`.

use crate::error::DrawError;
use fontdue::{Font, FontSettings};
use log::{debug, warn};
use mapdraw_core::geom::Vec2;
use mapdraw_core::path::{execute, PathCommands, PathSink};
use mapdraw_core::style::{LineCap, LineJoin, Style, TextAnchor, TextStyle};
use mapdraw_core::Color;
use std::io;
use tiny_skia::{
    FillRule, Paint, Path, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8, Stroke,
    StrokeDash, Transform,
};

pub struct RasterDrawing {
    width: u32,
    height: u32,
    /// Base image first; one extra pixmap per open group.
    layers: Vec<Layer>,
    font: Option<Font>,
    warned_missing_font: bool,
}

struct Layer {
    pixmap: Pixmap,
    opacity: f32,
}

impl RasterDrawing {
    pub fn new(width: f64, height: f64, font: Option<Font>) -> Result<Self, DrawError> {
        let (w, h) = pixel_size(width, height)?;
        let pixmap = new_pixmap(w, h)?;
        debug!("raster surface {w}x{h}");
        Ok(Self {
            width: w,
            height: h,
            layers: vec![Layer {
                pixmap,
                opacity: 1.0,
            }],
            font,
            warned_missing_font: false,
        })
    }

    pub fn width(&self) -> f64 {
        f64::from(self.width)
    }

    pub fn height(&self) -> f64 {
        f64::from(self.height)
    }

    fn target(&mut self) -> &mut Pixmap {
        let index = self.layers.len() - 1;
        &mut self.layers[index].pixmap
    }

    pub fn path(&mut self, commands: &PathCommands, style: &Style) {
        if !style.is_visible() {
            return;
        }
        let Some(path) = skia_path(commands) else {
            return;
        };

        if let Some(fill) = style.fill {
            let paint = solid_paint(fill);
            self.target()
                .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
        if let Some(stroke_color) = style.stroke {
            let paint = solid_paint(stroke_color);
            let stroke = skia_stroke(style);
            self.target()
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    pub fn text(&mut self, text: &str, point: Vec2, style: &TextStyle) {
        let Some(font) = self.font.as_ref() else {
            if !self.warned_missing_font {
                warn!("no font loaded, raster text is skipped");
                self.warned_missing_font = true;
            }
            return;
        };

        let size = style.size as f32;
        let glyphs: Vec<(fontdue::Metrics, Vec<u8>)> =
            text.chars().map(|c| font.rasterize(c, size)).collect();
        let advance: f32 = glyphs.iter().map(|(m, _)| m.advance_width).sum();
        let mut pen_x = point.x as f32
            - match style.anchor {
                TextAnchor::Start => 0.0,
                TextAnchor::Middle => advance / 2.0,
                TextAnchor::End => advance,
            };
        let baseline = point.y as f32;

        let opacity = style.opacity.clamp(0.0, 1.0) as f32;
        let radius = match style.stroke {
            Some(_) => (style.stroke_width / 2.0).ceil().max(0.0) as usize,
            None => 0,
        };

        for (metrics, coverage) in &glyphs {
            let x = (pen_x + metrics.xmin as f32).round() as i32;
            let y = (baseline - (metrics.ymin as f32 + metrics.height as f32)).round() as i32;
            let glyph = Coverage {
                width: metrics.width,
                height: metrics.height,
                values: coverage.clone(),
            };
            if let Some(stroke) = style.stroke {
                let outline = glyph.dilated(radius);
                blend(
                    self.target(),
                    x - radius as i32,
                    y - radius as i32,
                    &outline,
                    stroke,
                    opacity,
                );
            }
            blend(self.target(), x, y, &glyph, style.fill, opacity);
            pen_x += metrics.advance_width;
        }
    }

    pub fn begin_group(&mut self, opacity: f64) -> Result<(), DrawError> {
        let pixmap = new_pixmap(self.width, self.height)?;
        self.layers.push(Layer {
            pixmap,
            opacity: opacity.clamp(0.0, 1.0) as f32,
        });
        Ok(())
    }

    pub fn end_group(&mut self) {
        if self.layers.len() < 2 {
            return;
        }
        if let Some(layer) = self.layers.pop() {
            let paint = PixmapPaint {
                opacity: layer.opacity,
                ..PixmapPaint::default()
            };
            self.target().draw_pixmap(
                0,
                0,
                layer.pixmap.as_ref(),
                &paint,
                Transform::identity(),
                None,
            );
        }
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.layers[0].pixmap
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, DrawError> {
        self.pixmap()
            .encode_png()
            .map_err(|e| DrawError::Encode(e.to_string()))
    }

    pub fn write_to(&self, out: &mut impl io::Write) -> Result<(), DrawError> {
        let data = self.encode_png()?;
        out.write_all(&data)?;
        Ok(())
    }
}

pub fn load_font(data: &[u8]) -> Result<Font, DrawError> {
    Font::from_bytes(data, FontSettings::default())
        .map_err(|e| DrawError::Surface(format!("font: {e}")))
}

/// `tiny_skia` path for `commands`; `None` when nothing would be drawn.
pub fn skia_path(commands: &PathCommands) -> Option<Path> {
    let mut sink = SkiaSink {
        builder: PathBuilder::new(),
        last_move: Vec2::ZERO,
        current: Vec2::ZERO,
    };
    execute(commands, &mut sink);
    sink.builder.finish()
}

struct SkiaSink {
    builder: PathBuilder,
    last_move: Vec2,
    current: Vec2,
}

impl PathSink for SkiaSink {
    fn move_to(&mut self, point: Vec2) {
        self.builder.move_to(point.x as f32, point.y as f32);
        self.last_move = point;
        self.current = point;
    }

    fn line_to(&mut self, point: Vec2) {
        self.builder.line_to(point.x as f32, point.y as f32);
        self.current = point;
    }

    fn curve_to(&mut self, control_1: Vec2, control_2: Vec2, end: Vec2) {
        self.builder.cubic_to(
            control_1.x as f32,
            control_1.y as f32,
            control_2.x as f32,
            control_2.y as f32,
            end.x as f32,
            end.y as f32,
        );
        self.current = end;
    }

    /// Same rule as the SVG sink: a native close only when it adds no edge.
    fn close(&mut self) {
        if self.current == self.last_move {
            self.builder.close();
        }
    }
}

fn pixel_size(width: f64, height: f64) -> Result<(u32, u32), DrawError> {
    let valid = |v: f64| v.is_finite() && v >= 1.0 && v <= f64::from(u32::MAX);
    if !valid(width) || !valid(height) {
        return Err(DrawError::Surface(format!(
            "invalid image size {width}x{height}"
        )));
    }
    Ok((width.ceil() as u32, height.ceil() as u32))
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, DrawError> {
    Pixmap::new(width, height)
        .ok_or_else(|| DrawError::Surface(format!("cannot allocate {width}x{height} pixmap")))
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    paint
}

fn skia_stroke(style: &Style) -> Stroke {
    let mut dash: Vec<f32> = style.dash.iter().map(|v| *v as f32).collect();
    if dash.len() % 2 == 1 {
        dash.extend_from_within(..);
    }
    Stroke {
        width: style.width as f32,
        line_cap: match style.line_cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        },
        line_join: match style.line_join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        },
        dash: StrokeDash::new(dash, 0.0),
        ..Stroke::default()
    }
}

/// Glyph alpha mask.
struct Coverage {
    width: usize,
    height: usize,
    values: Vec<u8>,
}

impl Coverage {
    /// Grows the mask by `radius` pixels in every direction (disc kernel).
    fn dilated(&self, radius: usize) -> Coverage {
        if radius == 0 {
            return Coverage {
                width: self.width,
                height: self.height,
                values: self.values.clone(),
            };
        }
        let width = self.width + 2 * radius;
        let height = self.height + 2 * radius;
        let mut values = vec![0u8; width * height];
        let r = radius as i64;
        for y in 0..self.height {
            for x in 0..self.width {
                let value = self.values[y * self.width + x];
                if value == 0 {
                    continue;
                }
                for dy in -r..=r {
                    for dx in -r..=r {
                        if dx * dx + dy * dy > r * r {
                            continue;
                        }
                        let tx = (x as i64 + r + dx) as usize;
                        let ty = (y as i64 + r + dy) as usize;
                        let cell = &mut values[ty * width + tx];
                        *cell = (*cell).max(value);
                    }
                }
            }
        }
        Coverage {
            width,
            height,
            values,
        }
    }
}

/// Source-over blend of `color` through `mask` at `(x0, y0)`.
fn blend(pixmap: &mut Pixmap, x0: i32, y0: i32, mask: &Coverage, color: Color, opacity: f32) {
    let [r, g, b, a] = color.to_rgba8();
    let base_alpha = f32::from(a) / 255.0 * opacity;
    let width = pixmap.width() as i32;
    let height = pixmap.height() as i32;
    let pixels = pixmap.pixels_mut();

    for my in 0..mask.height {
        let py = y0 + my as i32;
        if py < 0 || py >= height {
            continue;
        }
        for mx in 0..mask.width {
            let px = x0 + mx as i32;
            if px < 0 || px >= width {
                continue;
            }
            let coverage = f32::from(mask.values[my * mask.width + mx]) / 255.0;
            let alpha = coverage * base_alpha;
            if alpha <= 0.0 {
                continue;
            }
            let index = (py * width + px) as usize;
            let dst = pixels[index];
            let keep = 1.0 - alpha;
            let mix = |src: u8, dst: u8| f32::from(src) * alpha + f32::from(dst) * keep;
            let out_a = (alpha * 255.0 + f32::from(dst.alpha()) * keep).round().min(255.0);
            let channel = |value: f32| value.round().min(out_a) as u8;
            let out = PremultipliedColorU8::from_rgba(
                channel(mix(r, dst.red())),
                channel(mix(g, dst.green())),
                channel(mix(b, dst.blue())),
                out_a as u8,
            );
            if let Some(out) = out {
                pixels[index] = out;
            }
        }
    }
}
