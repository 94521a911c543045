//! SVG document backend.

use mapdraw_core::geom::Vec2;
use mapdraw_core::path::{execute, PathCommands, PathSink};
use mapdraw_core::style::{LineCap, LineJoin, Style, TextAnchor, TextStyle};
use mapdraw_core::Color;
use std::fmt::Write as _;
use std::io;

/// SVG document under construction, one element per line.
#[derive(Debug, Clone)]
pub struct SvgDrawing {
    width: f64,
    height: f64,
    depth: usize,
    lines: Vec<String>,
}

impl SvgDrawing {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            depth: 1,
            lines: Vec::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    fn push(&mut self, element: String) {
        let indent = "  ".repeat(self.depth);
        self.lines.push(format!("{indent}{element}"));
    }

    pub fn path(&mut self, commands: &PathCommands, style: &Style) {
        if !style.is_visible() {
            return;
        }
        let d = path_data(commands);
        if d.is_empty() {
            return;
        }
        self.push(format!(r#"<path d="{d}"{}/>"#, style_attributes(style)));
    }

    pub fn text(&mut self, text: &str, point: Vec2, style: &TextStyle) {
        let mut attributes = String::new();
        let _ = write!(
            attributes,
            r#" x="{}" y="{}" font-size="{}" text-anchor="{}"{}"#,
            point.x,
            point.y,
            style.size,
            anchor_name(style.anchor),
            paint("fill", style.fill)
        );
        if let Some(stroke) = style.stroke {
            let _ = write!(
                attributes,
                r#"{} stroke-width="{}" paint-order="stroke""#,
                paint("stroke", stroke),
                style.stroke_width
            );
        }
        if style.opacity < 1.0 {
            let _ = write!(attributes, r#" opacity="{}""#, style.opacity.max(0.0));
        }
        self.push(format!("<text{attributes}>{}</text>", escape(text)));
    }

    pub fn begin_group(&mut self, opacity: f64) {
        self.push(format!(r#"<g opacity="{}">"#, opacity.clamp(0.0, 1.0)));
        self.depth += 1;
    }

    pub fn end_group(&mut self) {
        self.depth = self.depth.saturating_sub(1).max(1);
        self.push("</g>".to_string());
    }

    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        for line in &self.lines {
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out, "</svg>");
        out
    }

    pub fn write_to(&self, out: &mut impl io::Write) -> io::Result<()> {
        out.write_all(self.to_svg_string().as_bytes())
    }
}

/// Absolute `d` attribute for `commands`.
pub fn path_data(commands: &PathCommands) -> String {
    let mut sink = SvgPathSink::default();
    execute(commands, &mut sink);
    sink.data
}

#[derive(Default)]
struct SvgPathSink {
    data: String,
    /// Latest `M` target and pen position; `Z` returns to the former.
    last_move: Vec2,
    current: Vec2,
}

impl SvgPathSink {
    fn separate(&mut self) {
        if !self.data.is_empty() {
            self.data.push(' ');
        }
    }
}

impl PathSink for SvgPathSink {
    fn move_to(&mut self, point: Vec2) {
        self.separate();
        let _ = write!(self.data, "M {},{}", point.x, point.y);
        self.last_move = point;
        self.current = point;
    }

    fn line_to(&mut self, point: Vec2) {
        self.separate();
        let _ = write!(self.data, "L {},{}", point.x, point.y);
        self.current = point;
    }

    fn curve_to(&mut self, control_1: Vec2, control_2: Vec2, end: Vec2) {
        self.separate();
        let _ = write!(
            self.data,
            "C {},{} {},{} {},{}",
            control_1.x, control_1.y, control_2.x, control_2.y, end.x, end.y
        );
        self.current = end;
    }

    /// `Z` would draw an edge back to the latest `M`; leave the contour
    /// open when the pen is not already there.
    fn close(&mut self) {
        if self.current != self.last_move {
            return;
        }
        self.separate();
        self.data.push('Z');
    }
}

fn style_attributes(style: &Style) -> String {
    let mut out = String::new();
    match style.fill {
        Some(fill) => out.push_str(&paint("fill", fill)),
        None => out.push_str(r#" fill="none""#),
    }
    if let Some(stroke) = style.stroke {
        out.push_str(&paint("stroke", stroke));
        let _ = write!(out, r#" stroke-width="{}""#, style.width);
        match style.line_cap {
            LineCap::Butt => {}
            LineCap::Round => out.push_str(r#" stroke-linecap="round""#),
            LineCap::Square => out.push_str(r#" stroke-linecap="square""#),
        }
        match style.line_join {
            LineJoin::Miter => {}
            LineJoin::Round => out.push_str(r#" stroke-linejoin="round""#),
            LineJoin::Bevel => out.push_str(r#" stroke-linejoin="bevel""#),
        }
        if !style.dash.is_empty() {
            let dash: Vec<String> = style.dash.iter().map(f64::to_string).collect();
            let _ = write!(out, r#" stroke-dasharray="{}""#, dash.join(","));
        }
    }
    out
}

/// ` name="#rrggbb"`, plus ` name-opacity` for translucent colors.
fn paint(name: &str, color: Color) -> String {
    let alpha = color.alpha.clamp(0.0, 1.0);
    if alpha < 1.0 {
        format!(r#" {name}="{}" {name}-opacity="{alpha}""#, color.to_hex())
    } else {
        format!(r#" {name}="{}""#, color.to_hex())
    }
}

fn anchor_name(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
