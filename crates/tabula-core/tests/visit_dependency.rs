use std_util::prelude::*;
use tabula_core::schema::field::*;
use tabula_core::schema::*;
use tabula_core::spec::{LookupCondition, Operator};
use tabula_core::visit::DependencyVisitor;
use tabula_core::Spec;

fn name(s: &str) -> FieldName {
    FieldName::new(s).unwrap()
}

#[test]
fn primitive_fields_have_no_dependencies() {
    let field = Number::create(FieldId::generate(), name("Budget"), Default::default()).unwrap();

    assert!(assert_ok!(field.collect_dependencies()).is_empty());
    assert!(field.dependencies().is_empty());
}

#[test]
fn formula_depends_on_each_reference_once() {
    let price = FieldId::generate();
    let qty = FieldId::generate();
    let field = Formula::create(
        FieldId::generate(),
        name("Total"),
        format!("{{{price}}} * {{{qty}}} + {{{price}}}"),
        FieldValueType::single(CellValueType::Number),
        None,
        None,
    )
    .unwrap();

    let collected = assert_ok!(field.accept(&mut DependencyVisitor));
    assert_eq!(collected, [price.clone(), qty.clone()]);
    assert_eq!(field.dependencies(), collected);
}

#[test]
fn lookup_depends_on_link_then_target() {
    let link = FieldId::generate();
    let target = FieldId::generate();
    let options = LookupOptions::new(TableId::generate(), target.clone()).through(link.clone());
    let field = Lookup::create_pending(FieldId::generate(), name("Project name"), options).unwrap();

    // readable while the lookup is still pending
    assert_eq!(assert_ok!(field.collect_dependencies()), [link, target]);
}

#[test]
fn link_depends_on_its_primary_field() {
    let primary = FieldId::generate();
    let config = LinkConfig::new(Relationship::ManyOne, TableId::generate(), primary.clone());
    let field = Link::create(FieldId::generate(), name("Project"), config).unwrap();

    assert_eq!(assert_ok!(field.collect_dependencies()), [primary]);
}

#[test]
fn conditional_lookup_filter_adds_dependencies() {
    let target = FieldId::generate();
    let budget = FieldId::generate();
    let status = FieldId::generate();

    let condition = LookupCondition::filter(Spec::and([
        Spec::condition(budget.clone(), Operator::IsGreater, 1000),
        Spec::condition(status.clone(), Operator::Is, "active"),
    ]));
    let options = ConditionalLookupOptions::new(TableId::generate(), target.clone(), condition);
    let field = ConditionalLookup::create_pending(FieldId::generate(), name("Big"), options).unwrap();

    assert_eq!(
        assert_ok!(field.collect_dependencies()),
        [target, budget, status]
    );
}

#[test]
fn unfiltered_conditional_lookup_depends_on_target_only() {
    let target = FieldId::generate();
    let options =
        ConditionalLookupOptions::new(TableId::generate(), target.clone(), Default::default());
    let field = ConditionalLookup::create_pending(FieldId::generate(), name("Any"), options).unwrap();

    assert_eq!(assert_ok!(field.collect_dependencies()), [target]);
}
