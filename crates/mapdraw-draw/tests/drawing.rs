use mapdraw_core::geom::Vec2;
use mapdraw_core::path::{execute, parse, PenEvent};
use mapdraw_core::style::{Style, TextAnchor, TextStyle};
use mapdraw_core::Color;
use mapdraw_draw::raster::skia_path;
use mapdraw_draw::svg::path_data;
use mapdraw_draw::{DrawError, Drawing};
use tiny_skia::PathSegment;

fn svg_text(drawing: &Drawing) -> String {
    let mut out = Vec::new();
    drawing.write_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn red() -> Color {
    Color::rgb(1.0, 0.0, 0.0)
}

#[test]
fn fill_only_style_emits_fill_without_stroke() {
    let mut drawing = Drawing::vector(20.0, 10.0);
    drawing.path_text("M 0,0 L 10,0 L 10,10 Z", &Style::fill(red())).unwrap();

    let text = svg_text(&drawing);
    let doc = roxmltree::Document::parse(&text).unwrap();
    let paths: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("path"))
        .collect();
    assert_eq!(1, paths.len());
    assert_eq!(Some("#ff0000"), paths[0].attribute("fill"));
    assert_eq!(None, paths[0].attribute("stroke"));
    assert_eq!(
        Some("M 0,0 L 10,0 L 10,10 L 0,0 Z"),
        paths[0].attribute("d")
    );
}

#[test]
fn stroke_only_style_disables_fill() {
    let mut drawing = Drawing::vector(20.0, 10.0);
    drawing.polyline(
        &[Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0)],
        &Style::stroke(Color::BLACK, 2.5),
    );

    let text = svg_text(&drawing);
    let doc = roxmltree::Document::parse(&text).unwrap();
    let path = doc
        .descendants()
        .find(|n| n.has_tag_name("path"))
        .unwrap();
    assert_eq!(Some("none"), path.attribute("fill"));
    assert_eq!(Some("#000000"), path.attribute("stroke"));
    assert_eq!(Some("2.5"), path.attribute("stroke-width"));
}

#[test]
fn invisible_style_emits_nothing() {
    let mut drawing = Drawing::vector(20.0, 10.0);
    drawing.rectangle(Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0), &Style::default());

    let text = svg_text(&drawing);
    let doc = roxmltree::Document::parse(&text).unwrap();
    assert_eq!(1, doc.descendants().filter(|n| n.is_element()).count());
    assert_eq!(Some("20"), doc.root_element().attribute("width"));
}

#[test]
fn groups_wrap_their_children() {
    let mut drawing = Drawing::vector(10.0, 10.0);
    drawing
        .group(0.1, |inner| {
            inner.rectangle(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), &Style::fill(red()));
            inner.rectangle(Vec2::new(2.0, 2.0), Vec2::new(3.0, 3.0), &Style::fill(red()));
            Ok(())
        })
        .unwrap();
    drawing.rectangle(Vec2::new(4.0, 4.0), Vec2::new(5.0, 5.0), &Style::fill(red()));

    let text = svg_text(&drawing);
    let doc = roxmltree::Document::parse(&text).unwrap();
    let group = doc.descendants().find(|n| n.has_tag_name("g")).unwrap();
    assert_eq!(Some("0.1"), group.attribute("opacity"));
    assert_eq!(2, group.children().filter(|n| n.is_element()).count());
    assert_eq!(
        3,
        doc.descendants().filter(|n| n.has_tag_name("path")).count()
    );
}

#[test]
fn group_errors_still_close_the_group() {
    let mut drawing = Drawing::vector(10.0, 10.0);
    let result = drawing.group(0.5, |inner| inner.path_text("M 0,0 X 1,1", &Style::fill(red())));
    assert!(matches!(result, Err(DrawError::Path(_))));
    let text = svg_text(&drawing);
    assert!(roxmltree::Document::parse(&text).is_ok());
}

#[test]
fn labels_are_escaped_and_anchored() {
    let mut drawing = Drawing::vector(100.0, 100.0);
    let style = TextStyle {
        size: 12.0,
        stroke: Some(Color::WHITE),
        stroke_width: 3.0,
        opacity: 0.7,
        anchor: TextAnchor::End,
        ..TextStyle::default()
    };
    drawing.label("Fish & Chips", Vec2::new(90.0, 50.0), &style);
    drawing.text("", Vec2::new(0.0, 0.0), Color::BLACK);

    let text = svg_text(&drawing);
    let doc = roxmltree::Document::parse(&text).unwrap();
    let labels: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("text"))
        .collect();
    assert_eq!(1, labels.len());
    assert_eq!(Some("Fish & Chips"), labels[0].text());
    assert_eq!(Some("end"), labels[0].attribute("text-anchor"));
    assert_eq!(Some("#ffffff"), labels[0].attribute("stroke"));
    assert_eq!(Some("0.7"), labels[0].attribute("opacity"));
}

/// Path element kind with its points in thousandths of a unit.
#[derive(Debug, PartialEq)]
enum Segment {
    Move(Vec<(i64, i64)>),
    Line(Vec<(i64, i64)>),
    Cubic(Vec<(i64, i64)>),
    Close,
}

fn milli(x: f64, y: f64) -> (i64, i64) {
    ((x * 1000.0).round() as i64, (y * 1000.0).round() as i64)
}

fn vector_segments(data: &str) -> Vec<Segment> {
    fn flush(verb: &str, points: &mut Vec<(i64, i64)>, segments: &mut Vec<Segment>) {
        match verb {
            "M" => segments.push(Segment::Move(std::mem::take(points))),
            "L" => segments.push(Segment::Line(std::mem::take(points))),
            "C" => segments.push(Segment::Cubic(std::mem::take(points))),
            _ => {}
        }
    }

    let mut segments = Vec::new();
    let mut verb = "";
    let mut points = Vec::new();
    for token in data.split_whitespace() {
        match token {
            "M" | "L" | "C" | "Z" => {
                flush(verb, &mut points, &mut segments);
                if token == "Z" {
                    segments.push(Segment::Close);
                }
                verb = token;
            }
            point => {
                let (x, y) = point.split_once(',').unwrap();
                points.push(milli(x.parse().unwrap(), y.parse().unwrap()));
            }
        }
    }
    flush(verb, &mut points, &mut segments);
    segments
}

fn raster_segments(path: &tiny_skia::Path) -> Vec<Segment> {
    let p = |point: tiny_skia::Point| milli(f64::from(point.x), f64::from(point.y));
    path.segments()
        .map(|segment| match segment {
            PathSegment::MoveTo(a) => Segment::Move(vec![p(a)]),
            PathSegment::LineTo(a) => Segment::Line(vec![p(a)]),
            PathSegment::QuadTo(a, b) => panic!("unexpected quad {a:?} {b:?}"),
            PathSegment::CubicTo(a, b, c) => Segment::Cubic(vec![p(a), p(b), p(c)]),
            PathSegment::Close => Segment::Close,
        })
        .collect()
}

#[test]
fn vector_and_raster_see_the_same_points() {
    let commands = parse("M 1,2 l 3,0 c 1,1 2,2 3,0 V 9 h -2 Z M 20,20 L 25,21").unwrap();

    let mut events = Vec::new();
    execute(&commands, &mut events);
    assert!(matches!(events[5], PenEvent::LineTo(p) if p == Vec2::new(1.0, 2.0)));

    let vector = vector_segments(&path_data(&commands));
    assert_eq!(events.len(), vector.len());
    let raster = raster_segments(&skia_path(&commands).unwrap());
    assert_eq!(vector, raster);
}

#[test]
fn closed_triangle_returns_to_its_start_on_both_backends() {
    let commands = parse("M 0,0 L 10,0 L 10,10 Z").unwrap();
    let expected = vec![
        Segment::Move(vec![milli(0.0, 0.0)]),
        Segment::Line(vec![milli(10.0, 0.0)]),
        Segment::Line(vec![milli(10.0, 10.0)]),
        Segment::Line(vec![milli(0.0, 0.0)]),
        Segment::Close,
    ];
    assert_eq!(expected, raster_segments(&skia_path(&commands).unwrap()));
    assert_eq!(expected, vector_segments(&path_data(&commands)));
}

#[test]
fn close_after_second_move_adds_no_edge_to_the_latest_move() {
    let commands = parse("M 0,0 L 5,0 M 20,0 L 20,10 Z").unwrap();
    let expected = vec![
        Segment::Move(vec![milli(0.0, 0.0)]),
        Segment::Line(vec![milli(5.0, 0.0)]),
        Segment::Move(vec![milli(20.0, 0.0)]),
        Segment::Line(vec![milli(20.0, 10.0)]),
        Segment::Line(vec![milli(0.0, 0.0)]),
    ];
    assert_eq!(expected, vector_segments(&path_data(&commands)));
    assert_eq!(expected, raster_segments(&skia_path(&commands).unwrap()));

    let mut drawing = Drawing::raster(30.0, 20.0, None).unwrap();
    drawing.path(&commands, &Style::stroke(Color::BLACK, 2.0));
    let Drawing::Raster(raster) = &drawing else {
        panic!("expected raster drawing");
    };
    assert_eq!(255, raster.pixmap().pixel(2, 0).unwrap().alpha());
    // (12, 0) lies only on an edge from (20, 0) back to (0, 0).
    assert_eq!(0, raster.pixmap().pixel(12, 0).unwrap().alpha());
}

#[test]
fn raster_fill_paints_inside_only() {
    let mut drawing = Drawing::raster(10.0, 10.0, None).unwrap();
    drawing.rectangle(Vec2::new(2.0, 2.0), Vec2::new(8.0, 8.0), &Style::fill(red()));

    let Drawing::Raster(raster) = &drawing else {
        panic!("expected raster drawing");
    };
    let inside = raster.pixmap().pixel(5, 5).unwrap();
    assert_eq!((255, 0, 0, 255), (inside.red(), inside.green(), inside.blue(), inside.alpha()));
    assert_eq!(0, raster.pixmap().pixel(0, 0).unwrap().alpha());
}

#[test]
fn raster_group_composites_with_opacity() {
    let mut drawing = Drawing::raster(10.0, 10.0, None).unwrap();
    drawing
        .group(0.5, |inner| {
            inner.rectangle(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0), &Style::fill(red()));
            Ok(())
        })
        .unwrap();

    let Drawing::Raster(raster) = &drawing else {
        panic!("expected raster drawing");
    };
    let alpha = raster.pixmap().pixel(5, 5).unwrap().alpha();
    assert!((126..=129).contains(&alpha), "alpha {alpha}");
}

#[test]
fn raster_text_without_font_is_skipped() {
    let mut drawing = Drawing::raster(10.0, 10.0, None).unwrap();
    drawing.text("hello", Vec2::new(5.0, 5.0), Color::BLACK);
    drawing.text("again", Vec2::new(5.0, 5.0), Color::BLACK);

    let Drawing::Raster(raster) = &drawing else {
        panic!("expected raster drawing");
    };
    assert!(raster.pixmap().pixels().iter().all(|p| p.alpha() == 0));
}

#[test]
fn raster_rejects_empty_size() {
    assert!(matches!(
        Drawing::raster(0.0, 10.0, None),
        Err(DrawError::Surface(_))
    ));
    assert!(matches!(
        Drawing::raster(f64::NAN, 10.0, None),
        Err(DrawError::Surface(_))
    ));
}

#[test]
fn finalize_writes_png_and_svg_files() {
    let dir = std::env::temp_dir().join(format!("mapdraw-draw-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let png = dir.join("out.png");
    let mut raster = Drawing::raster(4.0, 4.0, None).unwrap();
    raster.rectangle(Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0), &Style::fill(red()));
    raster.finalize(&png).unwrap();
    let bytes = std::fs::read(&png).unwrap();
    assert_eq!(b"\x89PNG", &bytes[..4]);

    let svg = dir.join("out.svg");
    let mut vector = Drawing::vector(4.0, 4.0);
    vector.rectangle(Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0), &Style::fill(red()));
    vector.finalize(&svg).unwrap();
    let text = std::fs::read_to_string(&svg).unwrap();
    assert!(roxmltree::Document::parse(&text).is_ok());

    let missing = dir.join("no-such-dir").join("out.svg");
    assert!(matches!(
        Drawing::vector(1.0, 1.0).finalize(&missing),
        Err(DrawError::Io(_))
    ));

    std::fs::remove_dir_all(&dir).unwrap();
}
