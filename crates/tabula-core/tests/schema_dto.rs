use pretty_assertions::assert_eq;
use serde_json::json;
use std_util::prelude::*;
use tabula_core::schema::field::*;
use tabula_core::schema::*;

fn name(s: &str) -> FieldName {
    FieldName::new(s).unwrap()
}

#[test]
fn restores_a_select() {
    let id = FieldId::generate();
    let dto: FieldDto = serde_json::from_value(json!({
        "id": id.as_str(),
        "name": "Status",
        "type": "singleSelect",
        "description": "where it is",
        "options": {
            "choices": [
                { "id": "choTodo000000000000", "name": "Todo", "color": "blue" },
                { "id": "choDone000000000000", "name": "Done", "color": "green" },
            ],
        },
        "notNull": true,
        "dbFieldName": "status",
        "dbFieldType": "text",
    }))
    .unwrap();

    let field = assert_ok!(Field::from_dto(dto.clone()));
    assert_eq!(field.id(), &id);
    assert_eq!(field.kind(), FieldKind::SingleSelect);
    assert!(field.not_null());
    assert_eq!(field.description(), Some("where it is"));
    assert_eq!(field.db_field_type(), Some(DbFieldType::Text));

    let options = &field.ty().expect_single_select().options;
    assert_eq!(options.choices.len(), 2);
    assert_eq!(options.choices[1].color, Color::Green);

    let back = field.to_dto().unwrap();
    assert_eq!(back.cell_value_type, Some(CellValueType::String));
    assert_eq!(back.is_multiple, Some(false));
    assert_eq!(back.options["choices"], dto.options["choices"]);
    assert!(!back.is_computed);
}

#[test]
fn formula_needs_its_result_type() {
    let dto: FieldDto = serde_json::from_value(json!({
        "id": FieldId::generate().as_str(),
        "name": "Double",
        "type": "formula",
        "options": { "expression": "1 + 1" },
    }))
    .unwrap();

    let err = assert_err!(Field::from_dto(dto.clone()));
    assert!(err.is_validation());
    assert_eq!(err.code(), Some("dto.malformed"));

    let dto = FieldDto {
        cell_value_type: Some(CellValueType::Number),
        is_multiple: Some(false),
        ..dto
    };
    let field = assert_ok!(Field::from_dto(dto));
    assert!(field.is_computed());
    assert_eq!(field.ty().expect_formula().expression, "1 + 1");
}

#[test]
fn lookup_comes_back_pending_with_its_override() {
    let field = Lookup::rehydrate(
        FieldId::generate(),
        name("Owner name"),
        LookupOptions::new(TableId::generate(), FieldId::generate()).through(FieldId::generate()),
        Some(false),
    )
    .unwrap();

    let dto = field.to_dto().unwrap();
    assert!(dto.is_pending);
    assert!(dto.is_computed);
    assert_eq!(dto.is_multiple, Some(false));
    assert_none!(dto.cell_value_type);
    assert!(dto.lookup_options.is_some());

    let json = serde_json::to_value(&dto).unwrap();
    assert_eq!(json["type"], "lookup");
    assert_eq!(json["isMultipleCellValue"], false);

    let back = Field::from_dto(serde_json::from_value(json).unwrap()).unwrap();
    assert!(back.is_pending());
    assert_eq!(back, field);
}

#[test]
fn rollup_keeps_its_result_type() {
    let field = Rollup::create(
        FieldId::generate(),
        name("Total"),
        RollupConfig::new(TableId::generate(), FieldId::generate()),
        Aggregate::new(RollupFunction::Sum, None, None),
        FieldValueType::multiple(CellValueType::Number),
    )
    .unwrap();

    let dto = field.to_dto().unwrap();
    assert_eq!(dto.options["expression"], "sum({values})");
    assert_eq!(dto.cell_value_type, Some(CellValueType::Number));

    let back = Field::from_dto(dto).unwrap();
    assert!(!back.is_pending());
    assert_eq!(
        back.value_type().unwrap(),
        FieldValueType::single(CellValueType::Number)
    );
}

#[test]
fn missing_lookup_options() {
    let dto: FieldDto = serde_json::from_value(json!({
        "id": FieldId::generate().as_str(),
        "name": "Total",
        "type": "rollup",
        "options": { "expression": "sum({values})" },
    }))
    .unwrap();

    let err = assert_err!(Field::from_dto(dto));
    assert_eq!(err.code(), Some("dto.malformed"));
}

#[test]
fn every_kind_survives_a_round_trip() {
    let table_id = TableId::generate();
    let target = FieldId::generate();

    let fields = vec![
        SingleLineText::create(FieldId::generate(), name("Text"), Default::default()).unwrap(),
        LongText::create(FieldId::generate(), name("Notes"), Default::default()).unwrap(),
        Number::create(FieldId::generate(), name("Amount"), Default::default()).unwrap(),
        Rating::create(FieldId::generate(), name("Score"), Default::default()).unwrap(),
        Checkbox::create(FieldId::generate(), name("Done"), Default::default()).unwrap(),
        Date::create(FieldId::generate(), name("Due"), Default::default()).unwrap(),
        Attachment::create(FieldId::generate(), name("Files")).unwrap(),
        User::create(FieldId::generate(), name("Owner"), Default::default()).unwrap(),
        MultipleSelect::create(
            FieldId::generate(),
            name("Tags"),
            SelectOptions::from_names(["a", "b"]).unwrap(),
        )
        .unwrap(),
        CreatedTime::create(FieldId::generate(), name("Created"), Default::default()).unwrap(),
        LastModifiedTime::create(FieldId::generate(), name("Modified"), Default::default()).unwrap(),
        CreatedBy::create(FieldId::generate(), name("Creator")),
        LastModifiedBy::create(FieldId::generate(), name("Editor")),
        AutoNumber::create(FieldId::generate(), name("Number")),
        Link::create(
            FieldId::generate(),
            name("Link"),
            LinkConfig::new(Relationship::OneMany, table_id.clone(), target.clone()),
        )
        .unwrap(),
        ConditionalLookup::create_pending(
            FieldId::generate(),
            name("Filtered"),
            ConditionalLookupOptions::new(table_id, target, Default::default()),
        )
        .unwrap(),
    ];

    for field in fields {
        let json = serde_json::to_value(field.to_dto().unwrap()).unwrap();
        let back = Field::from_dto(serde_json::from_value(json).unwrap()).unwrap();
        assert_eq!(back, field, "{}", field.kind());
    }
}
