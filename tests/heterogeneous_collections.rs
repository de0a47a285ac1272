use featurekit::{
    AnyRecord, ExtractError, Extractor, FlattenError, Record, Role, RoleSet, SchemaBuilder,
    SchemaRegistry, clone_fields,
};

#[derive(Clone, Debug, Default, PartialEq)]
struct Trip {
    rider: String,
    distance_km: f64,
    legs: Vec<f64>,
    fare: f64,
}

impl Record for Trip {
    fn describe(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        schema
            .named("Trip")
            .scalar("rider", RoleSet::EMPTY, |t: &Trip| t.rider.clone())
            .writable(|src: &Trip, dst: &mut Trip| dst.rider = src.rider.clone())
            .scalar("distance_km", Role::Feature, |t: &Trip| t.distance_km)
            .writable(|src: &Trip, dst: &mut Trip| dst.distance_km = src.distance_km)
            .array("legs", Role::Feature, 2, |t: &Trip| t.legs.clone())
            .scalar("fare", Role::Label, |t: &Trip| t.fare)
    }
}

struct Delivery {
    distance_km: f64,
}

impl Record for Delivery {
    fn describe(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        schema
            .named("Delivery")
            .scalar("distance_km", Role::Feature, |d: &Delivery| d.distance_km)
    }
}

fn trip(distance_km: f64, legs: Vec<f64>, fare: f64) -> Trip {
    Trip {
        rider: format!("rider-{distance_km}"),
        distance_km,
        legs,
        fare,
    }
}

fn extractor() -> Extractor {
    let registry = SchemaRegistry::new()
        .with::<Trip>()
        .and_then(|registry| registry.with::<Delivery>())
        .expect("schemas should register");
    Extractor::new(registry)
}

#[test]
fn first_record_type_defines_the_columns() {
    let first = trip(4.0, vec![1.5, 2.5], 12.0);
    let other = Delivery { distance_km: 9.0 };
    let records: Vec<&dyn AnyRecord> = vec![&first, &other];

    let matrix = extractor().input_matrix(records.iter().copied());
    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix.row(0), Some(&[4.0, 1.5, 2.5][..]));

    // Foreign scalars read as NaN; foreign arrays contribute nothing.
    let foreign = matrix.row(1).expect("second row should exist");
    assert_eq!(foreign.len(), 1);
    assert!(foreign[0].is_nan());

    let report = matrix.report();
    assert_eq!(report.foreign_rows, 1);
    assert_eq!(report.ragged_rows, 1);
    assert_eq!(report.degraded_fields, 1);
    assert_eq!(matrix.width(), None);
}

#[test]
fn leading_foreign_type_flips_the_field_set() {
    let other = Delivery { distance_km: 9.0 };
    let second = trip(4.0, vec![1.5, 2.5], 12.0);
    let records: Vec<&dyn AnyRecord> = vec![&other, &second];

    let matrix = extractor().input_matrix(records.iter().copied());
    assert_eq!(matrix.row(0), Some(&[9.0][..]));
    let row = matrix.row(1).expect("second row should exist");
    assert_eq!(row.len(), 1);
    assert!(row[0].is_nan());
    assert!(extractor().output_matrix(records.iter().copied()).is_empty());
}

#[test]
fn strict_build_reports_the_first_foreign_row() {
    let a = trip(1.0, vec![0.5, 0.5], 3.0);
    let b = trip(2.0, vec![1.0, 1.0], 5.0);
    let other = Delivery { distance_km: 9.0 };
    let records: Vec<&dyn AnyRecord> = vec![&a, &b, &other];

    let err = extractor()
        .try_build_matrix(records.iter().copied(), Role::Feature)
        .expect_err("mixed collection should fail strict extraction");
    match err {
        ExtractError::MixedRecordTypes { row, .. } => assert_eq!(row, 2),
        other => panic!("unexpected error: {other}"),
    }

    let homogeneous = extractor()
        .try_build_matrix(&[a, b], Role::Label)
        .expect("homogeneous collection should extract");
    assert_eq!(homogeneous.rows(), &[vec![3.0], vec![5.0]]);
}

#[test]
fn strict_build_rejects_unregistered_first_type() {
    let err = extractor()
        .try_build_matrix(&["free text"], Role::Feature)
        .expect_err("unregistered type should fail");
    assert!(matches!(err, ExtractError::UnregisteredType(_)));
}

#[test]
fn wrong_length_arrays_are_dropped_and_counted() {
    let records = vec![
        trip(1.0, vec![0.1, 0.2], 2.0),
        trip(2.0, vec![0.3], 4.0),
        trip(3.0, vec![0.4, 0.5], 6.0),
    ];
    let extractor = extractor();
    let detailed = extractor.vectorize_detailed(&records[1], Role::Feature);
    assert_eq!(detailed.values, vec![2.0]);
    assert_eq!(
        detailed.degraded,
        vec![FlattenError::LengthMismatch {
            field: "legs",
            expected: 2,
            found: 1,
        }]
    );

    let matrix = extractor.input_matrix(&records);
    assert_eq!(matrix.report().degraded_fields, 1);
    assert_eq!(matrix.report().ragged_rows, 1);
    assert_eq!(matrix.row(2), Some(&[3.0, 0.4, 0.5][..]));
    assert_eq!(matrix.to_row_major(), None);
}

#[test]
fn cloning_copies_writable_fields_only() {
    let source = trip(7.5, vec![3.0, 4.5], 20.0);
    let mut destination = Trip::default();
    let copied = extractor()
        .clone_record(&source, &mut destination)
        .expect("registered type should clone");
    assert_eq!(copied, 2);
    assert_eq!(destination.rider, source.rider);
    assert_eq!(destination.distance_km, 7.5);
    assert!(destination.legs.is_empty());
    assert_eq!(destination.fare, 0.0);

    let extractor = extractor();
    let delivery_schema = extractor
        .registry()
        .schema_of::<Delivery>()
        .expect("delivery schema registered");
    let err = clone_fields(delivery_schema, &source, &mut destination)
        .expect_err("schema of another type should be rejected");
    assert!(matches!(err, ExtractError::SchemaMismatch { .. }));
}

#[test]
fn clone_of_unregistered_type_fails() {
    let mut destination = 0_i32;
    let err = extractor()
        .clone_record(&5_i32, &mut destination)
        .expect_err("unregistered type should fail");
    assert!(matches!(err, ExtractError::UnregisteredType(_)));
}
