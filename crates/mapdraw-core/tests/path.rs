use mapdraw_core::geom::Vec2;
use mapdraw_core::path::{execute, parse, Mode, PathCommand, PathCommands, PenEvent};
use mapdraw_core::PathError;

fn end_points(commands: &PathCommands) -> Vec<Vec2> {
    let mut events = Vec::new();
    execute(commands, &mut events);
    events.iter().filter_map(PenEvent::end_point).collect()
}

#[test]
fn closed_triangle_returns_to_start() {
    let commands = parse("M 0,0 L 10,0 L 10,10 Z").unwrap();
    assert_eq!(
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 0.0),
        ],
        end_points(&commands)
    );
}

#[test]
fn points_accept_comma_and_space_forms() {
    let joined = parse("M 1,2 L 3,4").unwrap();
    let split = parse("M 1 2 L 3 4").unwrap();
    assert_eq!(joined, split);
    assert_eq!(
        PathCommand::LineTo(Vec2::new(3.0, 4.0), Mode::Absolute),
        joined.as_slice()[1]
    );
}

#[test]
fn mode_and_command_persist_across_operands() {
    let commands = parse("m 1,1 l 1,0 0,1 -1,0").unwrap();
    assert_eq!(4, commands.len());
    assert!(matches!(
        commands.as_slice()[3],
        PathCommand::LineTo(_, Mode::Relative)
    ));
    assert_eq!(
        vec![
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(1.0, 2.0),
        ],
        end_points(&commands)
    );
}

#[test]
fn relative_curve_controls_are_relative_to_current_point() {
    let commands = parse("M 10,10 c 1,0 2,0 3,3").unwrap();
    let mut events = Vec::new();
    execute(&commands, &mut events);
    assert_eq!(
        PenEvent::CurveTo(
            Vec2::new(11.0, 10.0),
            Vec2::new(12.0, 10.0),
            Vec2::new(13.0, 13.0)
        ),
        events[1]
    );
}

#[test]
fn axis_moves_keep_other_coordinate() {
    let commands = parse("M 2,3 H 7 v 4 h -1 V 0").unwrap();
    assert_eq!(
        vec![
            Vec2::new(2.0, 3.0),
            Vec2::new(7.0, 3.0),
            Vec2::new(7.0, 7.0),
            Vec2::new(6.0, 7.0),
            Vec2::new(6.0, 0.0),
        ],
        end_points(&commands)
    );
}

#[test]
fn close_starts_a_fresh_subpath() {
    let commands = parse("M 0,0 L 1,0 Z M 5,5 L 6,5 Z").unwrap();
    let points = end_points(&commands);
    assert_eq!(Vec2::new(5.0, 5.0), *points.last().unwrap());
}

#[test]
fn missing_operand_is_a_parse_error() {
    assert!(matches!(parse("M 10"), Err(PathError::Parse { .. })));
    assert!(matches!(parse("C 1,2 3,4"), Err(PathError::Parse { .. })));
    assert!(matches!(parse("M L 1,1"), Err(PathError::Parse { .. })));
    assert!(matches!(parse("M 1,x"), Err(PathError::Parse { .. })));
    assert!(matches!(parse("M 0,0 Z 4,4"), Err(PathError::Parse { .. })));
}

#[test]
fn unknown_letter_is_unsupported() {
    assert_eq!(
        Err(PathError::UnsupportedCommand('A')),
        parse("M 0,0 A 1,1")
    );
    assert_eq!(Err(PathError::UnsupportedCommand('q')), parse("q 1,1 2,2"));
}

#[test]
fn serialized_commands_replay_identically() {
    let commands: PathCommands = vec![
        PathCommand::MoveTo(Vec2::new(0.5, -1.25), Mode::Absolute),
        PathCommand::LineTo(Vec2::new(3.0, 4.0), Mode::Relative),
        PathCommand::CurveTo(
            Vec2::new(1.0, 2.0),
            Vec2::new(3.0, 4.0),
            Vec2::new(5.0, 6.0),
            Mode::Absolute,
        ),
        PathCommand::MoveTo(Vec2::new(1.0 / 3.0, 0.1), Mode::Relative),
        PathCommand::CurveTo(
            Vec2::new(-1.0, 0.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(2.0, 2.0),
            Mode::Relative,
        ),
        PathCommand::LineTo(Vec2::new(1e-7, 12345.678), Mode::Absolute),
    ]
    .into();

    let text = commands.to_string();
    let reparsed = parse(&text).unwrap();
    assert_eq!(commands, reparsed);
    assert_eq!(end_points(&commands), end_points(&reparsed));
}

#[test]
fn translation_moves_absolute_operands_only() {
    let commands = parse("M 1,1 l 2,0 V 5 h 1").unwrap();
    let moved = commands.translated(Vec2::new(10.0, 20.0));
    assert_eq!("M 11,21 l 2,0 V 25 h 1", moved.to_string());
}

#[test]
fn polyline_closes_only_rings() {
    let open = PathCommands::polyline(&[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)]);
    assert_eq!("M 0,0 L 1,0", open.to_string());
    let ring = PathCommands::polyline(&[
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(0.0, 0.0),
    ]);
    assert_eq!("M 0,0 L 1,0 L 0,1 L 0,0 Z", ring.to_string());
}
