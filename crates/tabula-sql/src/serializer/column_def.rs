use super::{Column, Formatter, Ident, Params, ToSql};
use crate::Type;

pub(super) struct ColumnDef<'a> {
    pub(super) name: &'a str,
    pub(super) ty: Type,
}

impl<'a> From<Column<'a>> for ColumnDef<'a> {
    fn from(column: Column<'a>) -> ColumnDef<'a> {
        ColumnDef {
            name: column.name,
            ty: column.ty,
        }
    }
}

impl ToSql for ColumnDef<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let ty = self.ty.storage_name(f.serializer.storage_types());
        fmt!(f, Ident(self.name), " ", ty);
    }
}
