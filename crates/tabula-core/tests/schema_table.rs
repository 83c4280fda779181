use std_util::prelude::*;
use tabula_core::schema::field::*;
use tabula_core::schema::*;

fn name(s: &str) -> FieldName {
    FieldName::new(s).unwrap()
}

fn text(s: &str) -> Field {
    SingleLineText::create(FieldId::generate(), name(s), Default::default()).unwrap()
}

#[test]
fn builder_requires_fields_and_a_name() {
    let base = BaseId::generate();

    let err = assert_err!(Table::builder(base.clone(), "Empty").build());
    assert_eq!(err.code(), Some("table.no_fields"));

    let err = assert_err!(Table::builder(base.clone(), "  ").field(text("Name")).build());
    assert_eq!(err.code(), Some("table.name_empty"));

    let err = assert_err!(Table::builder(base, "Stray")
        .field(text("Name"))
        .primary_field(FieldId::generate())
        .build());
    assert_eq!(err.code(), Some("table.primary_field_not_found"));
}

#[test]
fn builder_assigns_storage() {
    let base = BaseId::generate();
    let first = text("Full Name");
    let first_id = first.id().clone();

    let table = Table::builder(base.clone(), "Contacts")
        .field(first)
        .field(Number::create(FieldId::generate(), name("Age"), Default::default()).unwrap())
        .build()
        .unwrap();

    assert_eq!(table.base_id(), &base);
    assert_eq!(table.primary_field_id(), &first_id);
    assert_eq!(table.primary_field().name().as_str(), "Full Name");
    assert!(table.db_table_name().starts_with(base.as_str()));

    let kinds: Vec<_> = table.fields().map(|field| field.db_field_type()).collect();
    assert_eq!(kinds, [Some(DbFieldType::Text), Some(DbFieldType::Real)]);
    assert!(table.fields().all(|field| field.db_field_name().is_some()));
}

#[test]
fn duplicate_names_and_ids_conflict() {
    let mut table = Table::builder(BaseId::generate(), "Notes")
        .field(text("Title"))
        .build()
        .unwrap();

    let err = assert_err!(table.add_field(text("Title")));
    assert!(err.is_conflict());
    assert_eq!(err.code(), Some("table.duplicate_field_name"));

    let primary = table.primary_field().clone();
    let err = assert_err!(table.add_field(primary));
    assert_eq!(err.code(), Some("table.duplicate_field_id"));
}

#[test]
fn db_field_names_are_unique_within_a_table() {
    let mut table = Table::builder(BaseId::generate(), "Notes")
        .field(text("Due date"))
        .build()
        .unwrap();
    table.add_field(text("Due-date")).unwrap();

    let names: Vec<_> = table
        .fields()
        .map(|field| field.db_field_name().unwrap().to_string())
        .collect();
    assert_ne!(names[0], names[1]);
}

#[test]
fn generate_field_name_skips_taken_names() {
    let mut table = Table::builder(BaseId::generate(), "Notes")
        .field(text("Tag"))
        .build()
        .unwrap();

    assert_eq!(table.generate_field_name("Owner").unwrap().as_str(), "Owner");
    assert_eq!(table.generate_field_name("Tag").unwrap().as_str(), "Tag 2");

    table.add_field(text("Tag 2")).unwrap();
    assert_eq!(table.generate_field_name("Tag").unwrap().as_str(), "Tag 3");
}

#[test]
fn lookup_by_key_and_predicate() {
    let table = Table::builder(BaseId::generate(), "Notes")
        .field(text("Title"))
        .field(CreatedTime::create(FieldId::generate(), name("Created"), Default::default()).unwrap())
        .build()
        .unwrap();

    let created = table.field_by_name("Created").unwrap();
    assert_eq!(
        table.field_by_key(created.id().as_str()).map(Field::id),
        Some(created.id())
    );
    assert_eq!(table.field_by_key("Title").map(Field::id), Some(table.primary_field_id()));
    assert_none!(table.field_by_key("Missing"));

    let computed = table.fields_where(Field::is_computed);
    assert_eq!(computed.len(), 1);
    assert_eq!(computed[0].id(), created.id());
}

#[test]
fn remove_field() {
    let mut table = Table::builder(BaseId::generate(), "Notes")
        .field(text("Title"))
        .field(text("Body"))
        .build()
        .unwrap();

    let primary = table.primary_field_id().clone();
    let err = assert_err!(table.remove_field(&primary));
    assert!(err.is_conflict());

    let body = table.field_by_name("Body").unwrap().id().clone();
    let removed = assert_ok!(table.remove_field(&body));
    assert_eq!(removed.name().as_str(), "Body");

    let err = assert_err!(table.remove_field(&body));
    assert!(err.is_not_found());
}

#[test]
fn computed_fields_cannot_be_constrained() {
    let mut field = AutoNumber::create(FieldId::generate(), name("Number"));

    let err = assert_err!(field.set_unique(true));
    assert!(err.is_conflict());
    assert_eq!(err.code(), Some("field.computed_unique"));

    let err = assert_err!(field.set_not_null(true));
    assert_eq!(err.code(), Some("field.computed_not_null"));

    assert_ok!(field.set_not_null(false));
}

#[test]
fn db_field_name_is_set_once() {
    let mut field = text("Title");
    let first = DbFieldName::new("title").unwrap();

    assert_ok!(field.set_db_field_name(first.clone()));
    assert_ok!(field.set_db_field_name(first.clone()));

    let err = assert_err!(field.set_db_field_name(DbFieldName::new("title_2").unwrap()));
    assert!(err.is_invariant());
    assert_eq!(field.db_field_name(), Some(&first));
}
