use std_util::prelude::*;
use tabula_core::schema::field::*;
use tabula_core::schema::*;

fn name(s: &str) -> FieldName {
    FieldName::new(s).unwrap()
}

fn config() -> RollupConfig {
    RollupConfig::new(TableId::generate(), FieldId::generate())
}

fn sum() -> Aggregate {
    Aggregate::new(RollupFunction::Sum, None, None)
}

#[test]
fn sum_over_text_is_rejected() {
    let err = assert_err!(Rollup::create(
        FieldId::generate(),
        name("Total"),
        config(),
        sum(),
        FieldValueType::multiple(CellValueType::String),
    ));

    assert!(err.is_validation());
    assert_eq!(err.code(), Some("rollup.unsupported_expression"));
}

#[test]
fn sum_over_numbers_yields_a_number() {
    let field = assert_ok!(Rollup::create(
        FieldId::generate(),
        name("Total"),
        config(),
        sum(),
        FieldValueType::multiple(CellValueType::Number),
    ));

    assert!(!field.is_pending());
    assert_eq!(
        field.value_type().unwrap(),
        FieldValueType::single(CellValueType::Number)
    );

    // a default number formatting is filled in
    assert!(matches!(
        field.formatting().unwrap(),
        Some(Formatting::Number(_))
    ));
}

#[test]
fn mismatched_formatting_is_rejected() {
    let aggregate = Aggregate::new(
        RollupFunction::And,
        Some(Formatting::Number(NumberFormatting::default())),
        None,
    );

    let err = assert_err!(Rollup::create(
        FieldId::generate(),
        name("All done"),
        config(),
        aggregate,
        FieldValueType::multiple(CellValueType::Boolean),
    ));
    assert!(err.is_validation());
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn changing_function_rolls_back_on_failure() {
    init_tracing();

    let mut field = Rollup::create(
        FieldId::generate(),
        name("Titles"),
        config(),
        Aggregate::new(RollupFunction::ArrayJoin, None, None),
        FieldValueType::multiple(CellValueType::String),
    )
    .unwrap();

    let before = field.clone();

    let err = assert_err!(field.set_rollup_function(RollupFunction::Average));
    assert_eq!(err.code(), Some("rollup.unsupported_expression"));
    assert_eq!(field, before);

    assert_ok!(field.set_rollup_function(RollupFunction::CountAll));
    assert_eq!(
        field.value_type().unwrap(),
        FieldValueType::single(CellValueType::Number)
    );
    assert_eq!(
        field.ty().expect_rollup().aggregate().function(),
        RollupFunction::CountAll
    );
}

#[test]
fn set_function_on_other_kinds() {
    let mut field =
        SingleLineText::create(FieldId::generate(), name("Title"), Default::default()).unwrap();

    let err = assert_err!(field.set_rollup_function(RollupFunction::Sum));
    assert!(err.is_unexpected());
}

#[test]
fn pending_rollup_resolves_through_its_table() {
    let base = BaseId::generate();
    let hours = FieldId::generate();

    let timesheets = Table::builder(base.clone(), "Timesheets")
        .field(SingleLineText::create(FieldId::generate(), name("Entry"), Default::default()).unwrap())
        .field(Number::create(hours.clone(), name("Hours"), Default::default()).unwrap())
        .build()
        .unwrap();

    let id = FieldId::generate();
    let rollup = assert_ok!(Rollup::create_pending(
        id.clone(),
        name("Total hours"),
        RollupConfig::new(timesheets.id().clone(), hours.clone()),
        sum(),
    ));
    assert!(rollup.is_pending());

    let err = assert_err!(rollup.value_type());
    assert_eq!(err.code(), Some("field.pending"));

    let mut people = Table::builder(base, "People")
        .field(SingleLineText::create(FieldId::generate(), name("Name"), Default::default()).unwrap())
        .field(rollup)
        .build()
        .unwrap();

    assert_none!(people.field(&id).unwrap().db_field_type());

    let foreign_tables: ForeignTables<'_> = [&timesheets].into_iter().collect();
    people.validate_foreign_tables(&foreign_tables).unwrap();

    let rollup = people.field(&id).unwrap();
    assert!(!rollup.is_pending());
    assert_eq!(rollup.cell_value_type().unwrap(), CellValueType::Number);
    assert_eq!(rollup.db_field_type(), Some(DbFieldType::Real));
    assert_eq!(rollup.dependencies(), [hours]);

    // resolving again with the same target is a no-op
    assert_ok!(people.validate_foreign_tables(&foreign_tables));
}

#[test]
fn conditional_rollup_counts() {
    let field = assert_ok!(ConditionalRollup::create(
        FieldId::generate(),
        name("Open tasks"),
        ConditionalRollupConfig::new(TableId::generate(), FieldId::generate(), Default::default()),
        Aggregate::new(RollupFunction::Count, None, None),
        FieldValueType::single(CellValueType::String),
    ));

    assert_eq!(field.kind(), FieldKind::ConditionalRollup);
    assert!(field.is_computed());
    assert_eq!(field.cell_value_type().unwrap(), CellValueType::Number);
}
