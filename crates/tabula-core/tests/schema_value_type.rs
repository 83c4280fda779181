use tabula_core::schema::field::*;
use tabula_core::schema::*;

fn name(s: &str) -> FieldName {
    FieldName::new(s).unwrap()
}

fn catalogue() -> Vec<(Field, FieldValueType)> {
    let table_id = TableId::generate();

    vec![
        (
            SingleLineText::create(FieldId::generate(), name("Text"), Default::default()).unwrap(),
            FieldValueType::single(CellValueType::String),
        ),
        (
            Rating::create(FieldId::generate(), name("Score"), Default::default()).unwrap(),
            FieldValueType::single(CellValueType::Number),
        ),
        (
            Checkbox::create(FieldId::generate(), name("Done"), Default::default()).unwrap(),
            FieldValueType::single(CellValueType::Boolean),
        ),
        (
            Date::create(FieldId::generate(), name("Due"), Default::default()).unwrap(),
            FieldValueType::single(CellValueType::DateTime),
        ),
        (
            Attachment::create(FieldId::generate(), name("Files")).unwrap(),
            FieldValueType::multiple(CellValueType::String),
        ),
        (
            User::create(
                FieldId::generate(),
                name("Watchers"),
                UserOptions {
                    is_multiple: true,
                    should_notify: false,
                },
            )
            .unwrap(),
            FieldValueType::multiple(CellValueType::String),
        ),
        (
            MultipleSelect::create(FieldId::generate(), name("Tags"), Default::default()).unwrap(),
            FieldValueType::multiple(CellValueType::String),
        ),
        (
            LastModifiedTime::create(FieldId::generate(), name("Modified"), Default::default())
                .unwrap(),
            FieldValueType::single(CellValueType::DateTime),
        ),
        (
            AutoNumber::create(FieldId::generate(), name("Number")),
            FieldValueType::single(CellValueType::Number),
        ),
        (
            Link::create(
                FieldId::generate(),
                name("Projects"),
                LinkConfig::new(Relationship::ManyMany, table_id.clone(), FieldId::generate()),
            )
            .unwrap(),
            FieldValueType::multiple(CellValueType::String),
        ),
        (
            Link::create(
                FieldId::generate(),
                name("Owner"),
                LinkConfig::new(Relationship::OneOne, table_id, FieldId::generate()),
            )
            .unwrap(),
            FieldValueType::single(CellValueType::String),
        ),
    ]
}

#[test]
fn value_type_is_deterministic_and_pure() {
    for (field, expected) in catalogue() {
        let before = field.clone();

        assert_eq!(field.value_type().unwrap(), expected, "{}", field.kind());
        assert_eq!(field.value_type().unwrap(), expected, "{}", field.kind());
        assert_eq!(field, before);
    }
}

#[test]
fn storage_types() {
    let expected = [
        DbFieldType::Text,
        DbFieldType::Integer,
        DbFieldType::Boolean,
        DbFieldType::DateTime,
        DbFieldType::Json,
        DbFieldType::Json,
        DbFieldType::Json,
        DbFieldType::DateTime,
        DbFieldType::Integer,
        DbFieldType::Json,
        DbFieldType::Json,
    ];

    for ((field, _), expected) in catalogue().into_iter().zip(expected) {
        assert_eq!(field.default_db_field_type().unwrap(), expected, "{}", field.kind());
    }
}

#[test]
fn form_visibility() {
    let text = SingleLineText::create(FieldId::generate(), name("Text"), Default::default()).unwrap();
    let number = AutoNumber::create(FieldId::generate(), name("Number"));

    assert!(text.is_form_visible());
    assert!(!number.is_form_visible());
}
