use approx::assert_relative_eq;
use brick_types::*;
use proptest::prelude::*;

// ── Geometry ─────────────────────────────────────────────────────────────

#[test]
fn identity_entries_are_row_major() {
    assert_eq!(
        Mat3::IDENTITY.entries(),
        [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
    );
}

#[test]
fn from_entries_round_trips() {
    let e = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0];
    let m = Mat3::from_entries(e);
    assert_eq!(m.rows[0], [1.0, 2.0, 3.0]);
    assert_eq!(m.rows[2], [7.0, 8.0, 10.0]);
    assert_eq!(m.entries(), e);
}

#[test]
fn rot_y_90_maps_x_to_minus_z() {
    let v = Mat3::ROT_Y_90.mul_vec(Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(v, Vec3::new(0.0, 0.0, -1.0));
    // Y axis is fixed.
    assert_eq!(Mat3::ROT_Y_90.mul_vec(Vec3::new(0.0, 1.0, 0.0)), Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn rot_x_90_maps_y_to_z() {
    let v = Mat3::ROT_X_90.mul_vec(Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(v, Vec3::new(0.0, 0.0, 1.0));
}

#[test]
fn quarter_turn_rotations_are_exact() {
    assert_eq!(Mat3::rotation_y_quarter_turns(4), Mat3::IDENTITY);
    assert_eq!(Mat3::rotation_x_quarter_turns(0), Mat3::IDENTITY);
    assert_eq!(Mat3::rotation_y_quarter_turns(1), Mat3::ROT_Y_90);
    // Three turns one way equals one turn back, which is the transpose.
    assert_eq!(Mat3::rotation_y_quarter_turns(-1), Mat3::ROT_Y_90.transpose());
    assert_eq!(Mat3::rotation_x_quarter_turns(3), Mat3::ROT_X_90.transpose());
}

#[test]
fn rotations_have_unit_determinant() {
    assert_eq!(Mat3::ROT_Y_90.determinant(), 1.0);
    assert_eq!(Mat3::ROT_X_90.determinant(), 1.0);
    assert!(Mat3::ROT_X_90.is_invertible());
}

#[test]
fn shear_is_invertible_but_zero_scale_is_not() {
    let shear = Mat3::from_entries([1.0, 0.5, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    assert!(shear.is_invertible());
    assert!(!Mat3::scaling(1.0, 0.0, 1.0).is_invertible());
    assert!(!Mat3::from_entries([f64::NAN, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]).is_invertible());
}

#[test]
fn frame_compose_applies_parent_orientation() {
    let parent = Frame::new(Vec3::new(10.0, 0.0, 0.0), Mat3::ROT_Y_90);
    let child = Frame::translation(20.0, -8.0, 0.0);
    let world = parent.compose(&child);
    assert_relative_eq!(world.position.x, 10.0);
    assert_relative_eq!(world.position.y, -8.0);
    assert_relative_eq!(world.position.z, -20.0);
    assert_eq!(world.orientation, Mat3::ROT_Y_90);
    assert_eq!(world.transform_point(Vec3::ZERO), world.position);
}

proptest! {
    #[test]
    fn four_quarter_turns_are_identity(turns in -12i32..12) {
        let m = Mat3::rotation_y_quarter_turns(turns);
        let back = Mat3::rotation_y_quarter_turns(-turns);
        prop_assert_eq!(m.mul(&back), Mat3::IDENTITY);
    }

    #[test]
    fn identity_is_neutral(e in prop::array::uniform9(-100.0f64..100.0)) {
        let m = Mat3::from_entries(e);
        prop_assert_eq!(Mat3::IDENTITY.mul(&m), m);
        prop_assert_eq!(m.mul(&Mat3::IDENTITY), m);
    }
}

// ── Colors ───────────────────────────────────────────────────────────────

#[test]
fn standard_table_covers_palette() {
    let table = ColorTable::standard();
    for code in 0..=20 {
        assert!(table.contains(ColorCode(code)), "missing color {code}");
    }
    for code in [36, 43, 47] {
        assert!(table.is_translucent(ColorCode(code)));
    }
    assert!(!table.contains(ColorCode(21)));
    assert_eq!(table.len(), 24);
}

#[test]
fn standard_table_is_shared() {
    assert!(std::ptr::eq(ColorTable::standard(), ColorTable::standard()));
}

#[test]
fn color_lookup_by_name_is_case_insensitive() {
    let table = ColorTable::standard();
    assert_eq!(table.by_name("red").map(|c| c.code), Some(ColorCode::RED));
    assert_eq!(table.by_name("Light Grey").map(|c| c.code), Some(ColorCode(7)));
    assert_eq!(table.get(ColorCode(15)).map(|c| c.hex()), Some("#FFFFFF".to_string()));
    assert!(table.by_name("chartreuse").is_none());
}

// ── Model ────────────────────────────────────────────────────────────────

#[test]
fn part_ref_appends_dat_extension() {
    assert_eq!(PartRef::new("3001").as_str(), "3001.dat");
    assert_eq!(PartRef::new("3641.dat").as_str(), "3641.dat");
    assert_eq!(PartRef::new("car.LDR").as_str(), "car.LDR");
    assert!(PartRef::new("  ").is_empty());
}

#[test]
fn part_ref_collapses_inner_whitespace() {
    assert_eq!(PartRef::new("my  part.dat").as_str(), "my part.dat");
    assert_eq!(PartRef::new(" big\t brick ").as_str(), "big brick.dat");
    assert_eq!(PartRef::new("two\nlines").as_str(), "two lines.dat");
}

#[test]
fn model_counts_by_kind() {
    let mut model = Model::new("Car", "me");
    model
        .elements
        .push(Element::Part(PartPlacement::new("3001", ColorCode::RED, Vec3::ZERO)));
    model.elements.push(Element::Step);
    model
        .elements
        .push(Element::Part(PartPlacement::new("3020", ColorCode(1), Vec3::ZERO)));
    assert_eq!(model.count(ElementKind::Part), 2);
    assert_eq!(model.count(ElementKind::Step), 1);
    assert_eq!(model.placements().count(), 2);
    assert!(model.check().is_empty());
}

#[test]
fn model_check_reports_issues() {
    let mut model = Model::new("Bad", "me");
    model.elements.push(Element::Step);
    model.elements.push(Element::Part(
        PartPlacement::new("", ColorCode(0), Vec3::new(f64::NAN, 0.0, 0.0))
            .with_orientation(Mat3::scaling(0.0, 1.0, 1.0)),
    ));
    let issues = model.check();
    assert!(issues.contains(&ModelIssue::MisplacedStep { index: 0 }));
    assert!(issues.contains(&ModelIssue::EmptyPartRef { index: 1 }));
    assert!(issues.contains(&ModelIssue::NonFinitePosition { index: 1 }));
    assert!(issues.contains(&ModelIssue::SingularOrientation { index: 1 }));
}

#[test]
fn error_kind_serializes_snake_case() {
    let json = serde_json::to_string(&ErrorKind::NoOutput).unwrap();
    assert_eq!(json, "\"no_output\"");
    assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
}
