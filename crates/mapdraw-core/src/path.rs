//! Compact vector-path language.
//!
//! Text form: whitespace separated tokens, command letters `M L C V H Z`
//! (uppercase absolute, lowercase relative) and numeric operands, points
//! written either as `x,y` or as two tokens `x y`:
//!
//! ```text
//! M 0,0 L 10,0 l 0 10 Z
//! ```
//!
//! [`execute`] interprets commands against a [`PathSink`]; every drawing
//! backend goes through it so vector and raster output stay identical.

use crate::error::PathError;
use crate::geom::Vec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Absolute,
    Relative,
}

impl Mode {
    fn from_letter(letter: char) -> Self {
        if letter.is_ascii_uppercase() {
            Mode::Absolute
        } else {
            Mode::Relative
        }
    }

    fn letter(self, upper: char) -> char {
        match self {
            Mode::Absolute => upper,
            Mode::Relative => upper.to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Vec2, Mode),
    LineTo(Vec2, Mode),
    /// Two control points and the end point.
    CurveTo(Vec2, Vec2, Vec2, Mode),
    Horizontal(f64, Mode),
    Vertical(f64, Mode),
    Close,
}

impl PathCommand {
    fn translated(self, offset: Vec2) -> Self {
        use PathCommand::*;
        match self {
            MoveTo(p, Mode::Absolute) => MoveTo(p + offset, Mode::Absolute),
            LineTo(p, Mode::Absolute) => LineTo(p + offset, Mode::Absolute),
            CurveTo(p1, p2, p3, Mode::Absolute) => {
                CurveTo(p1 + offset, p2 + offset, p3 + offset, Mode::Absolute)
            }
            Horizontal(x, Mode::Absolute) => Horizontal(x + offset.x, Mode::Absolute),
            Vertical(y, Mode::Absolute) => Vertical(y + offset.y, Mode::Absolute),
            other => other,
        }
    }
}

/// Ordered command list; may hold several subpaths.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathCommands(Vec<PathCommand>);

impl PathCommands {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, command: PathCommand) {
        self.0.push(command);
    }

    pub fn append(&mut self, other: PathCommands) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathCommand> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[PathCommand] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shifts absolute operands by `offset`; relative operands already
    /// follow the pen.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self(self.0.iter().map(|c| c.translated(offset)).collect())
    }

    /// Open polyline or closed ring through `points`; closes when the first
    /// and last points coincide.
    pub fn polyline(points: &[Vec2]) -> Self {
        let mut commands = Self::new();
        let Some((first, rest)) = points.split_first() else {
            return commands;
        };
        commands.push(PathCommand::MoveTo(*first, Mode::Absolute));
        for p in rest {
            commands.push(PathCommand::LineTo(*p, Mode::Absolute));
        }
        if let Some(last) = points.last() {
            if points.len() > 1 && first.approx_eq(*last, 1e-9) {
                commands.push(PathCommand::Close);
            }
        }
        commands
    }

    pub fn circle(center: Vec2, radius: f64) -> Self {
        let mut commands = Self::new();
        commands.push(PathCommand::MoveTo(
            center + Vec2::new(radius, 0.0),
            Mode::Absolute,
        ));
        commands.0.extend(arc_curves(center, radius, 0.0, TAU));
        commands.push(PathCommand::Close);
        commands
    }

    /// Filled circle sector from `start_angle` to `end_angle` (radians,
    /// measured from +x towards +y).
    pub fn sector(center: Vec2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        let mut commands = Self::new();
        commands.push(PathCommand::MoveTo(center, Mode::Absolute));
        commands.push(PathCommand::LineTo(
            center + Vec2::new(start_angle.cos(), start_angle.sin()) * radius,
            Mode::Absolute,
        ));
        commands.append(Self::arc(center, radius, start_angle, end_angle));
        commands.push(PathCommand::Close);
        commands
    }

    /// Curves along a circular arc; the pen must already be at the arc
    /// start.
    pub fn arc(center: Vec2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self(arc_curves(center, radius, start_angle, end_angle))
    }
}

impl From<Vec<PathCommand>> for PathCommands {
    fn from(commands: Vec<PathCommand>) -> Self {
        Self(commands)
    }
}

impl IntoIterator for PathCommands {
    type Item = PathCommand;
    type IntoIter = std::vec::IntoIter<PathCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PathCommands {
    type Item = &'a PathCommand;
    type IntoIter = std::slice::Iter<'a, PathCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Cubic approximation of a circular arc, at most a quarter turn per curve.
fn arc_curves(center: Vec2, radius: f64, from: f64, to: f64) -> Vec<PathCommand> {
    let sweep = to - from;
    let count = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / count as f64;
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    (0..count)
        .map(|i| {
            let a0 = from + step * i as f64;
            let a1 = a0 + step;
            let p0 = center + Vec2::new(a0.cos(), a0.sin()) * radius;
            let p3 = center + Vec2::new(a1.cos(), a1.sin()) * radius;
            let c1 = p0 + Vec2::new(-a0.sin(), a0.cos()) * (k * radius);
            let c2 = p3 - Vec2::new(-a1.sin(), a1.cos()) * (k * radius);
            PathCommand::CurveTo(c1, c2, p3, Mode::Absolute)
        })
        .collect()
}

pub fn parse(text: &str) -> Result<PathCommands, PathError> {
    let mut tokens = Tokens {
        items: text.split_whitespace().collect(),
        index: 0,
    };
    let mut commands = PathCommands::new();
    let mut command = 'M';
    let mut mode = Mode::Absolute;

    while let Some(token) = tokens.peek() {
        if is_command_token(token) {
            let index = tokens.index;
            tokens.index += 1;
            let letter = command_letter(token, index)?;
            mode = Mode::from_letter(letter);
            command = letter.to_ascii_uppercase();
            if command == 'Z' {
                commands.push(PathCommand::Close);
            } else if tokens.peek().map_or(true, is_command_token) {
                return Err(PathError::parse(
                    index,
                    format!("command `{letter}` without operands"),
                ));
            }
            continue;
        }

        let next = match command {
            'M' => PathCommand::MoveTo(tokens.point()?, mode),
            'L' => PathCommand::LineTo(tokens.point()?, mode),
            'C' => {
                let p1 = tokens.point()?;
                let p2 = tokens.point()?;
                let p3 = tokens.point()?;
                PathCommand::CurveTo(p1, p2, p3, mode)
            }
            'H' => PathCommand::Horizontal(tokens.number()?, mode),
            'V' => PathCommand::Vertical(tokens.number()?, mode),
            _ => {
                return Err(PathError::parse(
                    tokens.index,
                    format!("unexpected operand `{token}` after `Z`"),
                ))
            }
        };
        commands.push(next);
    }

    Ok(commands)
}

fn is_command_token(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_alphabetic())
}

fn command_letter(token: &str, index: usize) -> Result<char, PathError> {
    let mut chars = token.chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return Err(PathError::parse(
            index,
            format!("expected a single command letter, got `{token}`"),
        ));
    };
    match letter.to_ascii_uppercase() {
        'M' | 'L' | 'C' | 'V' | 'H' | 'Z' => Ok(letter),
        _ => Err(PathError::UnsupportedCommand(letter)),
    }
}

struct Tokens<'a> {
    items: Vec<&'a str>,
    index: usize,
}

impl<'a> Tokens<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.items.get(self.index).copied()
    }

    /// Next token, which must be an operand.
    fn operand(&mut self) -> Result<&'a str, PathError> {
        match self.peek() {
            Some(token) if !is_command_token(token) => {
                self.index += 1;
                Ok(token)
            }
            Some(token) => Err(PathError::parse(
                self.index,
                format!("missing operand before `{token}`"),
            )),
            None => Err(PathError::parse(self.index, "missing operand at end of path")),
        }
    }

    fn number(&mut self) -> Result<f64, PathError> {
        let index = self.index;
        let token = self.operand()?;
        parse_number(token, index)
    }

    fn point(&mut self) -> Result<Vec2, PathError> {
        let index = self.index;
        let token = self.operand()?;
        if let Some((x, y)) = token.split_once(',') {
            return Ok(Vec2::new(parse_number(x, index)?, parse_number(y, index)?));
        }
        let x = parse_number(token, index)?;
        let y = self.number()?;
        Ok(Vec2::new(x, y))
    }
}

fn parse_number(text: &str, index: usize) -> Result<f64, PathError> {
    text.parse::<f64>()
        .map_err(|_| PathError::parse(index, format!("invalid number `{text}`")))
}

impl FromStr for PathCommands {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathCommand::MoveTo(p, mode) => write!(f, "{} {},{}", mode.letter('M'), p.x, p.y),
            PathCommand::LineTo(p, mode) => write!(f, "{} {},{}", mode.letter('L'), p.x, p.y),
            PathCommand::CurveTo(p1, p2, p3, mode) => write!(
                f,
                "{} {},{} {},{} {},{}",
                mode.letter('C'),
                p1.x,
                p1.y,
                p2.x,
                p2.y,
                p3.x,
                p3.y
            ),
            PathCommand::Horizontal(x, mode) => write!(f, "{} {}", mode.letter('H'), x),
            PathCommand::Vertical(y, mode) => write!(f, "{} {}", mode.letter('V'), y),
            PathCommand::Close => f.write_str("Z"),
        }
    }
}

impl fmt::Display for PathCommands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{command}")?;
        }
        Ok(())
    }
}

/// Receiver of resolved, absolute pen operations.
pub trait PathSink {
    fn move_to(&mut self, point: Vec2);
    fn line_to(&mut self, point: Vec2);
    fn curve_to(&mut self, control_1: Vec2, control_2: Vec2, end: Vec2);
    /// Ends the current subpath; the pen is already back at its start.
    fn close(&mut self);
}

/// Absolute pen operation, as recorded by the `Vec<PenEvent>` sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PenEvent {
    MoveTo(Vec2),
    LineTo(Vec2),
    CurveTo(Vec2, Vec2, Vec2),
    Close,
}

impl PenEvent {
    /// Point where the pen ends up, if the event moves it.
    pub fn end_point(&self) -> Option<Vec2> {
        match *self {
            PenEvent::MoveTo(p) | PenEvent::LineTo(p) | PenEvent::CurveTo(_, _, p) => Some(p),
            PenEvent::Close => None,
        }
    }
}

impl PathSink for Vec<PenEvent> {
    fn move_to(&mut self, point: Vec2) {
        self.push(PenEvent::MoveTo(point));
    }

    fn line_to(&mut self, point: Vec2) {
        self.push(PenEvent::LineTo(point));
    }

    fn curve_to(&mut self, control_1: Vec2, control_2: Vec2, end: Vec2) {
        self.push(PenEvent::CurveTo(control_1, control_2, end));
    }

    fn close(&mut self) {
        self.push(PenEvent::Close);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PenState {
    NoSubpath { current: Vec2 },
    InSubpath { start: Vec2, current: Vec2 },
}

impl PenState {
    fn current(self) -> Vec2 {
        match self {
            PenState::NoSubpath { current } | PenState::InSubpath { current, .. } => current,
        }
    }

    fn resolve(self, point: Vec2, mode: Mode) -> Vec2 {
        match mode {
            Mode::Absolute => point,
            Mode::Relative => self.current() + point,
        }
    }

    /// Opens a subpath at the pen if none is open, so drawing commands that
    /// do not follow an `M` still start from a defined point.
    fn ensure_subpath(self, sink: &mut impl PathSink) -> Vec2 {
        match self {
            PenState::NoSubpath { current } => {
                sink.move_to(current);
                current
            }
            PenState::InSubpath { start, .. } => start,
        }
    }
}

pub fn execute(commands: &PathCommands, sink: &mut impl PathSink) {
    let mut state = PenState::NoSubpath {
        current: Vec2::ZERO,
    };

    for command in commands {
        state = match *command {
            PathCommand::MoveTo(point, mode) => {
                let target = state.resolve(point, mode);
                sink.move_to(target);
                let start = match state {
                    PenState::NoSubpath { .. } => target,
                    PenState::InSubpath { start, .. } => start,
                };
                PenState::InSubpath {
                    start,
                    current: target,
                }
            }
            PathCommand::LineTo(point, mode) => {
                let target = state.resolve(point, mode);
                let start = state.ensure_subpath(sink);
                sink.line_to(target);
                PenState::InSubpath {
                    start,
                    current: target,
                }
            }
            PathCommand::CurveTo(p1, p2, p3, mode) => {
                let c1 = state.resolve(p1, mode);
                let c2 = state.resolve(p2, mode);
                let end = state.resolve(p3, mode);
                let start = state.ensure_subpath(sink);
                sink.curve_to(c1, c2, end);
                PenState::InSubpath {
                    start,
                    current: end,
                }
            }
            PathCommand::Horizontal(x, mode) => {
                let current = state.current();
                let target = match mode {
                    Mode::Absolute => Vec2::new(x, current.y),
                    Mode::Relative => current + Vec2::new(x, 0.0),
                };
                let start = state.ensure_subpath(sink);
                sink.line_to(target);
                PenState::InSubpath {
                    start,
                    current: target,
                }
            }
            PathCommand::Vertical(y, mode) => {
                let current = state.current();
                let target = match mode {
                    Mode::Absolute => Vec2::new(current.x, y),
                    Mode::Relative => current + Vec2::new(0.0, y),
                };
                let start = state.ensure_subpath(sink);
                sink.line_to(target);
                PenState::InSubpath {
                    start,
                    current: target,
                }
            }
            PathCommand::Close => match state {
                PenState::InSubpath { start, .. } => {
                    sink.line_to(start);
                    sink.close();
                    PenState::NoSubpath { current: start }
                }
                // Nothing to close.
                PenState::NoSubpath { .. } => state,
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_move_keeps_open_subpath_start() {
        let commands = parse("M 0,0 L 5,0 M 20,20 L 30,30 Z").unwrap();
        let mut events = Vec::new();
        execute(&commands, &mut events);
        assert_eq!(
            Some(&PenEvent::LineTo(Vec2::new(0.0, 0.0))),
            events.iter().rev().nth(1)
        );
    }

    #[test]
    fn line_without_move_starts_at_origin() {
        let commands = parse("L 3,4").unwrap();
        let mut events = Vec::new();
        execute(&commands, &mut events);
        assert_eq!(
            vec![
                PenEvent::MoveTo(Vec2::ZERO),
                PenEvent::LineTo(Vec2::new(3.0, 4.0))
            ],
            events
        );
    }

    #[test]
    fn quarter_arcs_end_on_circle() {
        let commands = PathCommands::circle(Vec2::new(1.0, 1.0), 2.0);
        let mut events = Vec::new();
        execute(&commands, &mut events);
        for event in &events {
            if let Some(p) = event.end_point() {
                assert!(((p - Vec2::new(1.0, 1.0)).length() - 2.0).abs() < 1e-9);
            }
        }
        assert_eq!(Some(&PenEvent::Close), events.last());
    }
}
