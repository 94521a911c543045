//! Geometry, styles and the path language shared by the mapdraw renderers.

pub mod building;
pub mod color;
pub mod config;
pub mod error;
pub mod figure;
pub mod geom;
pub mod path;
pub mod style;
pub mod tags;

pub use color::Color;
pub use error::PathError;
pub use geom::Vec2;
pub use path::{PathCommand, PathCommands};
pub use style::Style;
