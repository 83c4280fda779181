use super::{Comma, Formatter, Ident, Params, ToSql};

use tabula_core::spec::{SortOrder, SortSpec};
use tabula_core::Result;

struct SortKey<'a> {
    column: &'a str,
    order: SortOrder,
}

impl ToSql for SortKey<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        // empty cells sort first ascending, matching the in-memory order
        let order = match self.order {
            SortOrder::Asc => " ASC NULLS FIRST",
            SortOrder::Desc => " DESC NULLS LAST",
        };
        fmt!(f, Ident(self.column), order);
    }
}

impl<P: Params> Formatter<'_, P> {
    pub(super) fn order_by(&mut self, sort: &[SortSpec]) -> Result<()> {
        if sort.is_empty() {
            return Ok(());
        }

        let keys = sort
            .iter()
            .map(|spec| {
                let field = self.serializer.field(&spec.field_id)?;
                let column = self.serializer.column(field)?;
                Ok(SortKey {
                    column: column.name,
                    order: spec.order,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        fmt!(self, "ORDER BY ", Comma(keys));
        Ok(())
    }
}
