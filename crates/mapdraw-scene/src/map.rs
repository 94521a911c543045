//! Scene composition in a fixed layer order.

use crate::point::{Occupied, PointCursor};
use crate::road::draw_roads;
use crate::scene::Scene;
use log::{debug, info};
use mapdraw_core::building::{plan_bands, scene_heights, wall_color, BandStep, Building, Segment, WallIndex};
use mapdraw_core::config::{BuildingMode, MapConfiguration};
use mapdraw_core::geom::Vec2;
use mapdraw_core::path::{PathCommand, PathCommands, Mode};
use mapdraw_core::style::{LineJoin, Style, TextAnchor, TextStyle};
use mapdraw_core::Color;
use mapdraw_draw::{DrawError, Drawing};

const CREDIT_RIGHT_MARGIN: f64 = 15.0;
const CREDIT_BOTTOM_MARGIN: f64 = 15.0;
const CREDIT_FONT_SIZE: f64 = 10.0;
const CREDIT_SPACING: f64 = 2.0;

pub struct Map<'a> {
    drawing: &'a mut Drawing,
    configuration: &'a MapConfiguration,
}

impl<'a> Map<'a> {
    pub fn new(drawing: &'a mut Drawing, configuration: &'a MapConfiguration) -> Self {
        Self {
            drawing,
            configuration,
        }
    }

    pub fn draw(&mut self, scene: &Scene) -> Result<(), DrawError> {
        let configuration = self.configuration;

        self.drawing.rectangle(
            Vec2::ZERO,
            scene.size,
            &Style::fill(configuration.background()),
        );

        info!("drawing ways");
        let figures = scene.sorted_figures();
        let (bottom, top): (Vec<_>, Vec<_>) = figures
            .into_iter()
            .partition(|f| f.priority < configuration.road_priority);
        debug!("{} figures under roads, {} over", bottom.len(), top.len());
        for figure in bottom {
            self.drawing.path(&figure.path(Vec2::ZERO), &figure.style);
        }
        draw_roads(self.drawing, &scene.roads);
        for figure in top {
            self.drawing.path(&figure.path(Vec2::ZERO), &figure.style);
        }

        if configuration.draw_trees {
            for tree in &scene.trees {
                tree.draw(self.drawing, scene.scale, &configuration.scheme);
            }
        }
        if configuration.draw_craters {
            for crater in &scene.craters {
                crater.draw(self.drawing, scene.scale);
            }
        }
        if configuration.draw_buildings {
            self.draw_buildings(&scene.buildings, scene.scale)?;
        }
        if configuration.draw_directions {
            for direction in &scene.directions {
                direction.draw(self.drawing, &configuration.scheme);
            }
        }
        if configuration.draw_nodes {
            self.draw_points(scene);
        }
        if configuration.show_credit {
            self.draw_credits(scene.size);
        }
        Ok(())
    }

    fn draw_buildings(&mut self, buildings: &[Building], scale: f64) -> Result<(), DrawError> {
        let configuration = self.configuration;
        let use_colors = configuration.use_building_colors;

        match configuration.building_mode {
            BuildingMode::No => Ok(()),
            BuildingMode::Flat => {
                for building in buildings {
                    let (fill, stroke) = building.roof_colors(use_colors);
                    let fill = (!building.is_construction).then_some(fill);
                    let style = Style::new(fill, Some(stroke), 1.0).with_line_join(LineJoin::Round);
                    self.drawing.path(&building.figure.path(Vec2::ZERO), &style);
                }
                Ok(())
            }
            BuildingMode::Isometric => {
                info!("drawing isometric buildings");
                let config = &configuration.buildings;
                let shade_scale = scale * config.shade_scale;
                self.drawing.group(config.shade_opacity, |drawing| {
                    for building in buildings {
                        draw_shade(drawing, building, shade_scale);
                    }
                    Ok(())
                })?;

                let walls = WallIndex::new(buildings);
                let heights = scene_heights(buildings, config);
                debug!("{} walls over {} heights", walls.len(), heights.len());
                let lift = scale * config.building_scale;

                for step in plan_bands(&heights, buildings, &walls) {
                    match step {
                        BandStep::Wall {
                            wall,
                            previous_top,
                            top,
                        } => {
                            let building = &buildings[wall.building];
                            let segment = &building.parts[wall.part];
                            let color = wall_color(
                                building.base_wall_color(use_colors),
                                segment.angle,
                                top,
                                building.is_construction,
                                config,
                            );
                            let style = Style::new(Some(color), Some(color), 1.0)
                                .with_line_join(LineJoin::Round);
                            let quad = quad(
                                segment,
                                Vec2::new(0.0, -previous_top * lift),
                                Vec2::new(0.0, -top * lift),
                            );
                            self.drawing.path(&quad, &style);
                        }
                        BandStep::Roof { building, .. } if configuration.draw_roofs => {
                            let building = &buildings[building];
                            let (fill, stroke) = building.roof_colors(use_colors);
                            let fill = (!building.is_construction).then_some(fill);
                            let style = Style::new(fill, Some(stroke), 1.0).with_line_join(LineJoin::Round);
                            let offset = Vec2::new(0.0, -building.height * lift);
                            self.drawing.path(&building.figure.path(offset), &style);
                        }
                        BandStep::Roof { .. } => {}
                    }
                }
                Ok(())
            }
        }
    }

    fn draw_points(&mut self, scene: &Scene) {
        let configuration = self.configuration;
        let points = scene.sorted_points();
        let mut cursors = vec![PointCursor::default(); points.len()];
        let mut occupied = (configuration.overlap > 0)
            .then(|| Occupied::new(scene.size.x, scene.size.y, configuration.overlap));

        info!("drawing main icons");
        for (point, cursor) in points.iter().zip(cursors.iter_mut()) {
            point.draw_main_shapes(cursor, self.drawing, occupied.as_mut());
        }
        info!("drawing extra icons");
        for (point, cursor) in points.iter().zip(cursors.iter_mut()) {
            point.draw_extra_shapes(cursor, self.drawing, occupied.as_mut());
        }
        info!("drawing texts");
        for (point, cursor) in points.iter().zip(cursors.iter_mut()) {
            point.draw_texts(cursor, self.drawing, occupied.as_mut(), configuration.label_mode);
        }
    }

    fn draw_credits(&mut self, size: Vec2) {
        let text_color: Color = Color::rgb(136.0 / 255.0, 136.0 / 255.0, 136.0 / 255.0);

        let mut credits = vec![(
            "Rendering: mapdraw".to_string(),
            Vec2::new(CREDIT_RIGHT_MARGIN, CREDIT_BOTTOM_MARGIN),
        )];
        if let Some(credit) = &self.configuration.credit {
            credits.push((
                format!("Data: {credit}"),
                Vec2::new(
                    CREDIT_RIGHT_MARGIN,
                    CREDIT_BOTTOM_MARGIN + CREDIT_FONT_SIZE + CREDIT_SPACING,
                ),
            ));
        }

        for (text, margin) in credits {
            let point = size - margin;
            let outline = TextStyle {
                size: CREDIT_FONT_SIZE,
                fill: text_color,
                stroke: Some(Color::WHITE),
                stroke_width: 3.0,
                opacity: 0.7,
                anchor: TextAnchor::End,
            };
            self.drawing.label(&text, point, &outline);
            let fill = TextStyle {
                stroke: None,
                stroke_width: 1.0,
                opacity: 1.0,
                ..outline
            };
            self.drawing.label(&text, point, &fill);
        }
    }
}

/// Draws `scene` onto `drawing` with `configuration`.
pub fn render(scene: &Scene, configuration: &MapConfiguration, drawing: &mut Drawing) -> Result<(), DrawError> {
    Map::new(drawing, configuration).draw(scene)
}

/// Closed quadrangle between a segment shifted by `shift_1` and by
/// `shift_2`.
fn quad(segment: &Segment, shift_1: Vec2, shift_2: Vec2) -> PathCommands {
    vec![
        PathCommand::MoveTo(segment.point_1 + shift_1, Mode::Absolute),
        PathCommand::LineTo(segment.point_2 + shift_1, Mode::Absolute),
        PathCommand::LineTo(segment.point_2 + shift_2, Mode::Absolute),
        PathCommand::LineTo(segment.point_1 + shift_2, Mode::Absolute),
        PathCommand::LineTo(segment.point_1 + shift_1, Mode::Absolute),
        PathCommand::Close,
    ]
    .into()
}

/// Footprint pushed sideways by `min_height` plus the side quads reaching
/// to `height`.
fn draw_shade(drawing: &mut Drawing, building: &Building, shade_scale: f64) {
    let style = Style::new(Some(Color::BLACK), Some(Color::BLACK), 1.0);
    let shift_1 = Vec2::new(shade_scale * building.min_height, 0.0);
    let shift_2 = Vec2::new(shade_scale * building.height, 0.0);

    drawing.path(&building.figure.path(shift_1), &style);
    for ring in building.figure.inners.iter().chain(&building.figure.outers) {
        for pair in ring.windows(2) {
            let edge = Segment::new(pair[0], pair[1]);
            drawing.path(&quad(&edge, shift_1, shift_2), &style);
        }
    }
}
