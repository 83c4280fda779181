use std_util::prelude::*;
use tabula_core::schema::field::*;
use tabula_core::schema::*;
use tabula_core::visit::DuplicateParams;

fn name(s: &str) -> FieldName {
    FieldName::new(s).unwrap()
}

fn params(s: &str) -> DuplicateParams {
    DuplicateParams {
        id: FieldId::generate(),
        name: name(s),
    }
}

#[test]
fn lookup_cannot_be_duplicated() {
    let base = BaseId::generate();
    let title = FieldId::generate();
    let projects = Table::builder(base.clone(), "Projects")
        .field(SingleLineText::create(title.clone(), name("Name"), Default::default()).unwrap())
        .build()
        .unwrap();

    let id = FieldId::generate();
    let lookup = Lookup::create_pending(
        id.clone(),
        name("Mirror"),
        LookupOptions::new(projects.id().clone(), title),
    )
    .unwrap();

    let err = assert_err!(lookup.duplicate(params("Mirror copy")));
    assert!(err.is_validation());
    assert_eq!(err.code(), Some("field.lookup_cannot_duplicate"));

    // resolved lookups are refused too
    let mut people = Table::builder(base, "People")
        .field(SingleLineText::create(FieldId::generate(), name("Name"), Default::default()).unwrap())
        .field(lookup)
        .build()
        .unwrap();
    let foreign_tables: ForeignTables<'_> = [&projects].into_iter().collect();
    people.validate_foreign_tables(&foreign_tables).unwrap();

    let resolved = people.field(&id).unwrap();
    assert!(!resolved.is_pending());

    let err = assert_err!(resolved.duplicate(params("Mirror copy")));
    assert_eq!(err.code(), Some("field.lookup_cannot_duplicate"));
}

#[test]
fn duplicate_keeps_configuration_and_drops_binding() {
    let mut field = SingleSelect::create(
        FieldId::generate(),
        name("Status"),
        SelectOptions::from_names(["Open", "Closed"]).unwrap(),
    )
    .unwrap();
    field.set_not_null(true).unwrap();
    field.set_description(Some("workflow state".to_string()));
    field
        .set_db_field_name(DbFieldName::new("status").unwrap())
        .unwrap();

    let params = params("Status copy");
    let copy = assert_ok!(field.duplicate(params.clone()));

    assert_eq!(copy.id(), &params.id);
    assert_eq!(copy.name(), &params.name);
    assert_eq!(copy.ty(), field.ty());
    assert!(copy.not_null());
    assert_eq!(copy.description(), Some("workflow state"));
    assert_none!(copy.db_field_name());
}

#[test]
fn duplicated_formula_keeps_its_references() {
    let price = FieldId::generate();
    let field = Formula::create(
        FieldId::generate(),
        name("Total"),
        format!("{{{price}}} * 2"),
        FieldValueType::single(CellValueType::Number),
        None,
        None,
    )
    .unwrap();
    assert_eq!(field.dependencies(), [price.clone()]);

    let copy = field.duplicate(params("Total copy")).unwrap();
    assert_eq!(copy.dependencies(), [price]);
}

#[test]
fn duplicated_link_is_detached() {
    let config = LinkConfig::new(Relationship::ManyMany, TableId::generate(), FieldId::generate())
        .with_symmetric_field_id(FieldId::generate());
    let field = Link::create(FieldId::generate(), name("Projects"), config).unwrap();

    let copy = field.duplicate(params("Projects copy")).unwrap();
    let link = copy.ty().expect_link();

    assert_none!(link.symmetric_field_id());
    assert_none!(link.storage());
    assert_eq!(link.relationship(), Relationship::ManyMany);
}
