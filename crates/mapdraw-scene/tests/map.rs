use mapdraw_core::config::{BuildingMode, LabelMode, MapConfiguration};
use mapdraw_draw::Drawing;
use mapdraw_scene::file::parse_scene;
use mapdraw_scene::{render, Scene};

const LAYERED: &str = r##"{
  "bounds": {"min": [0, 0], "max": [100, 100]},
  "scale": 1,
  "figures": [
    {"outers": [[[0, 0], [10, 0], [10, 10], [0, 0]]], "style": {"fill": "#ff0000"}, "priority": 50},
    {"outers": [[[0, 0], [20, 0], [20, 20], [0, 0]]], "style": {"fill": "#00ff00"}, "priority": 10}
  ],
  "roads": [{"points": [[0, 50], [100, 50]], "color": "#0000ff", "width": 4}],
  "trees": [{"point": [30, 30], "tags": {"circumference": "3"}}],
  "craters": [{"point": [60, 60], "tags": {"diameter": "10"}}],
  "directions": [{"point": [70, 70], "tags": {"direction": "N;S"}}]
}"##;

const BUILDING: &str = r##"{
  "bounds": {"min": [0, 0], "max": [100, 100]},
  "scale": 1,
  "buildings": [{"outers": [[[10, 10], [20, 10], [20, 20], [10, 20], [10, 10]]]}]
}"##;

const POINTS: &str = r##"{
  "bounds": {"min": [0, 0], "max": [100, 100]},
  "scale": 1,
  "points": [
    {"point": [50, 50], "priority": 1, "labels": [{"text": "First"}]},
    {"point": [50, 50], "priority": 2, "labels": [{"text": "Second"}, {"text": "Other"}]}
  ]
}"##;

fn quiet() -> MapConfiguration {
    MapConfiguration {
        show_credit: false,
        ..MapConfiguration::default()
    }
}

fn draw(scene: &Scene, configuration: &MapConfiguration) -> String {
    let mut drawing = Drawing::vector(scene.size.x, scene.size.y);
    render(scene, configuration, &mut drawing).unwrap();
    let mut out = Vec::new();
    drawing.write_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn paths(svg: &str) -> Vec<(Option<String>, Option<String>)> {
    let doc = roxmltree::Document::parse(svg).unwrap();
    doc.descendants()
        .filter(|n| n.has_tag_name("path"))
        .map(|n| {
            (
                n.attribute("fill").map(str::to_string),
                n.attribute("stroke").map(str::to_string),
            )
        })
        .collect()
}

fn texts(svg: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(svg).unwrap();
    doc.descendants()
        .filter(|n| n.has_tag_name("text"))
        .map(|n| n.text().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn figures_split_around_roads_by_priority() {
    let configuration = MapConfiguration {
        draw_trees: false,
        draw_craters: false,
        draw_directions: false,
        ..quiet()
    };
    let scene = parse_scene(LAYERED, &configuration).unwrap();
    let svg = draw(&scene, &configuration);

    let painted: Vec<(Option<String>, Option<String>)> = paths(&svg);
    assert_eq!(
        vec![
            (Some("#eeeee4".to_string()), None),
            (Some("#00ff00".to_string()), None),
            (Some("none".to_string()), Some("#0000ff".to_string())),
            (Some("#ff0000".to_string()), None),
        ],
        painted
    );
}

#[test]
fn road_priority_threshold_is_configurable() {
    let configuration = MapConfiguration {
        road_priority: 5.0,
        draw_trees: false,
        draw_craters: false,
        draw_directions: false,
        ..quiet()
    };
    let scene = parse_scene(LAYERED, &configuration).unwrap();
    let fills: Vec<Option<String>> = paths(&draw(&scene, &configuration))
        .into_iter()
        .map(|(fill, _)| fill)
        .collect();
    assert_eq!(Some("none".to_string()), fills[1]);
}

#[test]
fn disabled_categories_draw_nothing() {
    let everything = quiet();
    let scene = parse_scene(LAYERED, &everything).unwrap();
    // background, 2 figures, road, crown, trunk, crater, 2 sectors
    assert_eq!(9, paths(&draw(&scene, &everything)).len());

    let no_trees = MapConfiguration {
        draw_trees: false,
        ..quiet()
    };
    assert_eq!(7, paths(&draw(&scene, &no_trees)).len());

    let no_craters = MapConfiguration {
        draw_craters: false,
        ..quiet()
    };
    assert_eq!(8, paths(&draw(&scene, &no_craters)).len());

    let no_directions = MapConfiguration {
        draw_directions: false,
        ..quiet()
    };
    assert_eq!(7, paths(&draw(&scene, &no_directions)).len());
}

#[test]
fn isometric_buildings_draw_shade_walls_and_one_roof() {
    let configuration = MapConfiguration {
        building_mode: BuildingMode::Isometric,
        ..quiet()
    };
    let scene = parse_scene(BUILDING, &configuration).unwrap();
    let svg = draw(&scene, &configuration);

    let doc = roxmltree::Document::parse(&svg).unwrap();
    let shade = doc.descendants().find(|n| n.has_tag_name("g")).unwrap();
    assert_eq!(Some("0.1"), shade.attribute("opacity"));
    // footprint plus one quad per edge
    assert_eq!(5, shade.children().filter(|n| n.is_element()).count());

    // background, 5 shade paths, 4 walls in each of 3 bands, roof
    let painted = paths(&svg);
    assert_eq!(19, painted.len());
    let roof = painted.last().unwrap();
    assert_eq!(Some("#d8d0c8".to_string()), roof.0);
    assert_eq!(Some("#c4c0bb".to_string()), roof.1);

    let without_roofs = MapConfiguration {
        draw_roofs: false,
        ..configuration
    };
    assert_eq!(18, paths(&draw(&scene, &without_roofs)).len());
}

#[test]
fn building_modes_control_building_output() {
    let flat = quiet();
    let scene = parse_scene(BUILDING, &flat).unwrap();
    assert_eq!(2, paths(&draw(&scene, &flat)).len());

    let none = MapConfiguration {
        building_mode: BuildingMode::No,
        ..quiet()
    };
    assert_eq!(1, paths(&draw(&scene, &none)).len());

    let hidden = MapConfiguration {
        building_mode: BuildingMode::Isometric,
        draw_buildings: false,
        ..quiet()
    };
    assert_eq!(1, paths(&draw(&scene, &hidden)).len());
}

#[test]
fn construction_roofs_are_not_filled() {
    let text = BUILDING.replace(
        r#""buildings": [{"#,
        r#""buildings": [{"tags": {"building": "construction"}, "#,
    );
    let configuration = MapConfiguration {
        building_mode: BuildingMode::Isometric,
        ..quiet()
    };
    let scene = parse_scene(&text, &configuration).unwrap();
    let painted = paths(&draw(&scene, &configuration));
    assert_eq!(Some("none".to_string()), painted.last().unwrap().0);

    let flat = quiet();
    let painted = paths(&draw(&scene, &flat));
    assert_eq!(2, painted.len());
    assert_eq!(Some("none".to_string()), painted[1].0);
    assert_eq!(Some("#d0ccc8".to_string()), painted[1].1);
}

#[test]
fn occupied_cells_hide_lower_priority_points() {
    let configuration = quiet();
    let scene = parse_scene(POINTS, &configuration).unwrap();
    assert_eq!(vec!["Second".to_string()], texts(&draw(&scene, &configuration)));

    let no_overlap = MapConfiguration {
        overlap: 0,
        ..quiet()
    };
    assert_eq!(
        vec!["Second".to_string(), "First".to_string()],
        texts(&draw(&scene, &no_overlap))
    );

    let all_labels = MapConfiguration {
        overlap: 0,
        label_mode: LabelMode::All,
        ..quiet()
    };
    assert_eq!(
        vec!["Second".to_string(), "Other".to_string(), "First".to_string()],
        texts(&draw(&scene, &all_labels))
    );
}

#[test]
fn label_mode_no_draws_no_labels() {
    let configuration = MapConfiguration {
        label_mode: LabelMode::No,
        overlap: 0,
        ..quiet()
    };
    let scene = parse_scene(POINTS, &configuration).unwrap();
    assert!(texts(&draw(&scene, &configuration)).is_empty());

    let hidden = MapConfiguration {
        draw_nodes: false,
        overlap: 0,
        ..quiet()
    };
    assert!(texts(&draw(&scene, &hidden)).is_empty());
}

#[test]
fn credits_sit_in_the_bottom_right_corner() {
    let configuration = MapConfiguration::default();
    let scene = Scene::new(mapdraw_core::Vec2::new(200.0, 100.0), 1.0);
    let svg = draw(&scene, &configuration);

    let doc = roxmltree::Document::parse(&svg).unwrap();
    let credits: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("text"))
        .collect();
    assert_eq!(4, credits.len());
    assert_eq!(Some("Rendering: mapdraw"), credits[0].text());
    assert_eq!(Some("#ffffff"), credits[0].attribute("stroke"));
    assert_eq!(None, credits[1].attribute("stroke"));
    assert_eq!(Some("185"), credits[0].attribute("x"));
    assert_eq!(Some("85"), credits[0].attribute("y"));
    assert_eq!(Some("end"), credits[0].attribute("text-anchor"));
    assert_eq!(
        Some("Data: © OpenStreetMap contributors"),
        credits[2].text()
    );
    assert_eq!(Some("73"), credits[2].attribute("y"));

    let no_data = MapConfiguration {
        credit: None,
        ..MapConfiguration::default()
    };
    assert_eq!(2, texts(&draw(&scene, &no_data)).len());
}

#[test]
fn raster_and_vector_render_the_same_scene() {
    let configuration = MapConfiguration {
        building_mode: BuildingMode::Isometric,
        ..quiet()
    };
    let scene = parse_scene(BUILDING, &configuration).unwrap();
    let mut drawing = Drawing::raster(scene.size.x, scene.size.y, None).unwrap();
    render(&scene, &configuration, &mut drawing).unwrap();

    let Drawing::Raster(raster) = &drawing else {
        panic!("expected raster drawing");
    };
    let background = raster.pixmap().pixel(90, 90).unwrap();
    assert_eq!(
        (0xee, 0xee, 0xe4, 255),
        (background.red(), background.green(), background.blue(), background.alpha())
    );
    // Roof of the 8 m building is lifted 8 * 0.33 canvas units.
    let roof = raster.pixmap().pixel(15, 82).unwrap();
    assert_eq!((0xd8, 0xd0, 0xc8), (roof.red(), roof.green(), roof.blue()));
}
