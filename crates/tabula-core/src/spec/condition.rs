use super::{Record, SortSpec, Spec};
use crate::schema::FieldId;

use serde::{Deserialize, Serialize};

/// Selects foreign records for conditional lookups and rollups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Spec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl LookupCondition {
    pub fn filter(filter: Spec) -> LookupCondition {
        LookupCondition {
            filter: Some(filter),
            ..LookupCondition::default()
        }
    }

    pub fn sorted_by(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn limited_to(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Every field the filter and sort refer to.
    pub fn field_ids(&self) -> Vec<FieldId> {
        let mut ids = self
            .filter
            .as_ref()
            .map(Spec::field_ids)
            .unwrap_or_default();

        for sort in &self.sort {
            if !ids.contains(&sort.field_id) {
                ids.push(sort.field_id.clone());
            }
        }

        ids
    }

    /// Filters, sorts and truncates `records`.
    pub fn apply<'r>(&self, records: impl IntoIterator<Item = &'r Record>) -> Vec<&'r Record> {
        let mut selected: Vec<&Record> = records
            .into_iter()
            .filter(|record| {
                self.filter
                    .as_ref()
                    .map_or(true, |filter| filter.is_satisfied_by(record))
            })
            .collect();

        SortSpec::sort(&self.sort, &mut selected);

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RecordId;
    use crate::spec::Operator;

    #[test]
    fn filter_sort_limit() {
        let status = FieldId::parse("fldStatus0000000000").unwrap();
        let amount = FieldId::parse("fldAmount0000000000").unwrap();

        let records: Vec<Record> = [
            ("rec1000000000000000", "open", 5),
            ("rec2000000000000000", "done", 9),
            ("rec3000000000000000", "open", 7),
        ]
        .into_iter()
        .map(|(id, s, a)| {
            Record::new(RecordId::parse(id).unwrap())
                .with(status.clone(), s)
                .with(amount.clone(), a)
        })
        .collect();

        let condition = LookupCondition::filter(Spec::condition(
            status.clone(),
            Operator::Is,
            "open",
        ))
        .sorted_by(SortSpec::desc(amount.clone()))
        .limited_to(1);

        let selected = condition.apply(&records);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id.as_str(), "rec3000000000000000");
        assert_eq!(condition.field_ids(), vec![status, amount]);
    }
}
