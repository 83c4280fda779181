use super::{FieldCondition, Spec};

/// An interpretation of a [`Spec`] tree.
pub trait SpecVisitor {
    type Output;

    fn visit_and(&mut self, specs: &[Spec]) -> Self::Output;

    fn visit_or(&mut self, specs: &[Spec]) -> Self::Output;

    fn visit_not(&mut self, spec: &Spec) -> Self::Output;

    fn visit_condition(&mut self, condition: &FieldCondition) -> Self::Output;
}
