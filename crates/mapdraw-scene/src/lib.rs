//! Map scenes and their composition onto a [`mapdraw_draw::Drawing`].

pub mod crater;
pub mod direction;
pub mod file;
pub mod map;
pub mod point;
pub mod road;
pub mod scene;
pub mod tree;

pub use file::load_scene;
pub use map::{render, Map};
pub use scene::Scene;
