use std_util::prelude::*;
use tabula_core::schema::field::*;
use tabula_core::schema::*;
use tabula_core::spec::{LookupCondition, Operator};
use tabula_core::Spec;

fn name(s: &str) -> FieldName {
    FieldName::new(s).unwrap()
}

struct Fixture {
    projects: Table,
    tasks: Table,
    project_name: FieldId,
    budget: FieldId,
    link: FieldId,
}

/// Schema:
///   Projects { Name, Budget }
///   Tasks    { Title, Project -> Projects (manyOne) }
fn fixture() -> Fixture {
    let base = BaseId::generate();
    let project_name = FieldId::generate();
    let budget = FieldId::generate();
    let link = FieldId::generate();

    let projects = Table::builder(base.clone(), "Projects")
        .field(SingleLineText::create(project_name.clone(), name("Name"), Default::default()).unwrap())
        .field(Number::create(budget.clone(), name("Budget"), Default::default()).unwrap())
        .build()
        .unwrap();

    let config = LinkConfig::new(
        Relationship::ManyOne,
        projects.id().clone(),
        project_name.clone(),
    );

    let tasks = Table::builder(base, "Tasks")
        .field(SingleLineText::create(FieldId::generate(), name("Title"), Default::default()).unwrap())
        .field(Link::create(link.clone(), name("Project"), config).unwrap())
        .build()
        .unwrap();

    Fixture {
        projects,
        tasks,
        project_name,
        budget,
        link,
    }
}

#[test]
fn lookup_is_pending_until_resolved() {
    let Fixture {
        projects,
        mut tasks,
        project_name,
        link,
        ..
    } = fixture();

    let id = FieldId::generate();
    let options = LookupOptions::new(projects.id().clone(), project_name.clone()).through(link.clone());
    let lookup = assert_ok!(Lookup::create_pending(id.clone(), name("Project name"), options));

    assert!(lookup.is_pending());
    let err = assert_err!(lookup.cell_value_type());
    assert!(err.is_invariant());
    assert_eq!(err.code(), Some("lookup.pending"));

    assert_ok!(tasks.add_field(lookup));
    assert_eq!(tasks.pending_fields().len(), 1);

    let foreign_tables: ForeignTables<'_> = [&projects].into_iter().collect();
    assert_ok!(tasks.validate_foreign_tables(&foreign_tables));

    let lookup = tasks.field(&id).unwrap();
    assert!(!lookup.is_pending());
    assert!(tasks.pending_fields().is_empty());
    assert_eq!(lookup.cell_value_type().unwrap(), CellValueType::String);

    // many-to-one link over a single value
    assert!(!lookup.is_multiple_cell_value().unwrap());
    assert_eq!(lookup.db_field_type(), Some(DbFieldType::Json));
    assert_eq!(lookup.dependencies(), [link.clone(), project_name.clone()]);

    let inner = lookup.ty().expect_lookup().inner().unwrap();
    assert_eq!(inner.id(), &project_name);

    // the link now lists the lookup as a dependent
    assert_eq!(tasks.field(&link).unwrap().dependents(), [id]);
}

#[test]
fn persisted_multiplicity_wins() {
    let Fixture {
        projects,
        mut tasks,
        project_name,
        link,
        ..
    } = fixture();

    let id = FieldId::generate();
    let options = LookupOptions::new(projects.id().clone(), project_name).through(link);
    let lookup = Lookup::rehydrate(id.clone(), name("Project name"), options, Some(true)).unwrap();
    tasks.add_field(lookup).unwrap();

    let foreign_tables: ForeignTables<'_> = [&projects].into_iter().collect();
    tasks.validate_foreign_tables(&foreign_tables).unwrap();

    assert!(tasks.field(&id).unwrap().is_multiple_cell_value().unwrap());
}

#[test]
fn missing_foreign_table_is_an_invariant_error() {
    let Fixture {
        projects,
        mut tasks,
        project_name,
        ..
    } = fixture();

    let lookup = Lookup::create_pending(
        FieldId::generate(),
        name("Project name"),
        LookupOptions::new(projects.id().clone(), project_name),
    )
    .unwrap();
    tasks.add_field(lookup).unwrap();

    let err = assert_err!(tasks.validate_foreign_tables(&ForeignTables::new()));
    assert!(err.is_invariant());
    assert_eq!(err.code(), Some("foreign_table.not_loaded"));
}

#[test]
fn missing_lookup_field_is_not_found() {
    let Fixture {
        projects,
        mut tasks,
        ..
    } = fixture();

    let lookup = Lookup::create_pending(
        FieldId::generate(),
        name("Ghost"),
        LookupOptions::new(projects.id().clone(), FieldId::generate()),
    )
    .unwrap();
    tasks.add_field(lookup).unwrap();

    let foreign_tables: ForeignTables<'_> = [&projects].into_iter().collect();
    let err = assert_err!(tasks.validate_foreign_tables(&foreign_tables));
    assert!(err.is_not_found());
    assert_eq!(err.code(), Some("lookup.field_not_found"));
}

#[test]
fn lookup_through_a_non_link_is_rejected() {
    let Fixture {
        projects,
        mut tasks,
        project_name,
        ..
    } = fixture();

    let title = tasks.primary_field_id().clone();
    let lookup = Lookup::create_pending(
        FieldId::generate(),
        name("Project name"),
        LookupOptions::new(projects.id().clone(), project_name).through(title),
    )
    .unwrap();
    tasks.add_field(lookup).unwrap();

    let foreign_tables: ForeignTables<'_> = [&projects].into_iter().collect();
    let err = assert_err!(tasks.validate_foreign_tables(&foreign_tables));
    assert!(err.is_validation());
    assert_eq!(err.code(), Some("lookup.link_field_not_link"));
}

#[test]
fn self_referencing_lookup_resolves_against_host() {
    let Fixture { mut projects, project_name, .. } = fixture();

    let id = FieldId::generate();
    let lookup = Lookup::create_pending(
        id.clone(),
        name("Echo"),
        LookupOptions::new(projects.id().clone(), project_name),
    )
    .unwrap();
    projects.add_field(lookup).unwrap();

    assert_ok!(projects.validate_foreign_tables(&ForeignTables::new()));
    assert!(!projects.field(&id).unwrap().is_pending());
}

#[test]
fn conditional_lookup_depends_on_filter_fields() {
    let Fixture {
        projects,
        mut tasks,
        project_name,
        budget,
        ..
    } = fixture();

    let condition = LookupCondition::filter(Spec::condition(
        budget.clone(),
        Operator::IsGreater,
        1000,
    ))
    .limited_to(1);

    let id = FieldId::generate();
    let options = ConditionalLookupOptions::new(projects.id().clone(), project_name.clone(), condition);
    let field = ConditionalLookup::create_pending(id.clone(), name("Big project"), options).unwrap();
    assert!(field.is_pending());
    tasks.add_field(field).unwrap();

    let foreign_tables: ForeignTables<'_> = [&projects].into_iter().collect();
    tasks.validate_foreign_tables(&foreign_tables).unwrap();

    let field = tasks.field(&id).unwrap();
    assert!(!field.is_pending());
    assert_eq!(field.cell_value_type().unwrap(), CellValueType::String);
    assert!(!field.is_multiple_cell_value().unwrap());
    assert_eq!(field.dependencies(), [project_name, budget]);
}

#[test]
fn conditional_lookup_with_unknown_filter_field() {
    let Fixture {
        projects,
        mut tasks,
        project_name,
        ..
    } = fixture();

    let condition = LookupCondition::filter(Spec::condition(
        FieldId::generate(),
        Operator::IsNotEmpty,
        serde_json::Value::Null,
    ));
    let options = ConditionalLookupOptions::new(projects.id().clone(), project_name, condition);
    let field = ConditionalLookup::create_pending(FieldId::generate(), name("Any"), options).unwrap();
    tasks.add_field(field).unwrap();

    let foreign_tables: ForeignTables<'_> = [&projects].into_iter().collect();
    let err = assert_err!(tasks.validate_foreign_tables(&foreign_tables));
    assert_eq!(err.code(), Some("conditional.filter_field_not_found"));
}
