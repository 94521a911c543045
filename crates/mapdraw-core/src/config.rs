use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingMode {
    No,
    #[default]
    Flat,
    Isometric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    No,
    #[default]
    Main,
    All,
}

/// Height and projection constants of building extrusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    /// Added to every derived height.
    pub minimal_height: f64,
    pub level_height: f64,
    /// Converts building height units into canvas units (times map scale).
    pub building_scale: f64,
    pub shade_scale: f64,
    pub shade_opacity: f64,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            minimal_height: 8.0,
            level_height: 2.5,
            building_scale: 0.33,
            shade_scale: 0.4,
            shade_opacity: 0.1,
        }
    }
}

impl BuildingConfig {
    /// Band tops where illumination changes.
    pub fn illumination_heights(&self) -> [f64; 2] {
        [0.25 / self.building_scale, 0.5 / self.building_scale]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub background_color: Color,
    pub building_color: Color,
    pub building_border_color: Color,
    pub building_construction_color: Color,
    pub building_construction_border_color: Color,
    pub wall_color: Color,
    pub wall_construction_color: Color,
    pub evergreen_color: Color,
    pub trunk_color: Color,
    pub direction_view_color: Color,
    pub direction_camera_color: Color,
    pub label_color: Color,
    pub label_outline_color: Color,
    pub material_colors: BTreeMap<String, Color>,
}

impl Default for ColorScheme {
    fn default() -> Self {
        let material_colors = [
            ("brick", "#8c4f3f"),
            ("concrete", "#c8c8c0"),
            ("glass", "#a8c8d8"),
            ("metal", "#a0a4a8"),
            ("plaster", "#e8e0d0"),
            ("stone", "#b0a898"),
            ("timber_framing", "#a07850"),
            ("wood", "#b08860"),
        ]
        .into_iter()
        .map(|(name, hex)| (name.to_string(), hex_color(hex)))
        .collect();

        Self {
            background_color: hex_color("#eeeee4"),
            building_color: hex_color("#d8d0c8"),
            building_border_color: hex_color("#c4c0bb"),
            building_construction_color: hex_color("#f0ebe6"),
            building_construction_border_color: hex_color("#d0ccc8"),
            wall_color: hex_color("#e8e0d8"),
            wall_construction_color: hex_color("#c8c0b8"),
            evergreen_color: hex_color("#688c44"),
            trunk_color: hex_color("#805533"),
            direction_view_color: hex_color("#e0f0ff"),
            direction_camera_color: hex_color("#0088ff"),
            label_color: hex_color("#444444"),
            label_outline_color: Color::WHITE,
            material_colors,
        }
    }
}

impl ColorScheme {
    /// Parses a tag value as a color, `None` when it is not one.
    pub fn parse_color(&self, value: &str) -> Option<Color> {
        value.parse().ok()
    }
}

fn hex_color(hex: &str) -> Color {
    let value = u32::from_str_radix(hex.trim_start_matches('#'), 16).unwrap_or(0);
    Color::rgb(
        f64::from((value >> 16) & 0xff) / 255.0,
        f64::from((value >> 8) & 0xff) / 255.0,
        f64::from(value & 0xff) / 255.0,
    )
}

/// Which parts of the scene get drawn and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfiguration {
    pub scheme: ColorScheme,
    pub buildings: BuildingConfig,
    pub building_mode: BuildingMode,
    pub label_mode: LabelMode,
    /// Half-size of the square each icon reserves; 0 disables the tracker.
    pub overlap: usize,
    pub draw_roofs: bool,
    pub use_building_colors: bool,
    pub draw_buildings: bool,
    pub draw_trees: bool,
    pub draw_craters: bool,
    pub draw_directions: bool,
    pub draw_nodes: bool,
    /// Figures at or above this priority draw over roads.
    pub road_priority: f64,
    pub background_color: Option<Color>,
    pub credit: Option<String>,
    pub show_credit: bool,
}

impl Default for MapConfiguration {
    fn default() -> Self {
        Self {
            scheme: ColorScheme::default(),
            buildings: BuildingConfig::default(),
            building_mode: BuildingMode::Flat,
            label_mode: LabelMode::Main,
            overlap: 12,
            draw_roofs: true,
            use_building_colors: false,
            draw_buildings: true,
            draw_trees: true,
            draw_craters: true,
            draw_directions: true,
            draw_nodes: true,
            road_priority: 40.0,
            background_color: None,
            credit: Some("© OpenStreetMap contributors".to_string()),
            show_credit: true,
        }
    }
}

impl MapConfiguration {
    pub fn background(&self) -> Color {
        self.background_color
            .unwrap_or(self.scheme.background_color)
    }
}
