#[macro_use]
mod fmt;
use fmt::ToSql;

mod column_def;
use column_def::ColumnDef;

mod condition;

mod delim;
use delim::{Comma, Delimited};

mod flavor;
use flavor::Flavor;

mod ident;
use ident::Ident;

mod params;
pub use params::{Param, Params, Placeholder};

mod sort;

use crate::Type;

use tabula_core::schema::{Field, FieldId, Table};
use tabula_core::spec::SortSpec;
use tabula_core::{Error, Result, Spec};

/// Column holding the record id in every table.
pub const RECORD_ID_COLUMN: &str = "__id";

/// Serializes specifications over one table to SQL.
#[derive(Debug)]
pub struct Serializer<'a> {
    /// Table whose fields filters and sort keys refer to
    table: &'a Table,

    /// The database flavor handles the differences between SQL dialects.
    flavor: Flavor,
}

struct Formatter<'a, P> {
    /// Handle to the serializer
    serializer: &'a Serializer<'a>,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut P,
}

/// A field's column as seen by the serializer.
#[derive(Debug, Clone, Copy)]
struct Column<'a> {
    name: &'a str,
    ty: Type,
}

impl<'a> Serializer<'a> {
    /// Serializes `spec` into a boolean expression for a `WHERE` clause.
    ///
    /// Every condition evaluates to `TRUE` or `FALSE`, never `NULL`, so the
    /// result selects exactly the records [`Spec::is_satisfied_by`] accepts.
    pub fn filter(&self, spec: &Spec, params: &mut impl Params) -> Result<String> {
        let mut ret = String::new();

        let mut f = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        spec.accept(&mut f)?;

        tracing::trace!(table = %self.table.id(), sql = %ret, "serialized filter");
        Ok(ret)
    }

    /// Serializes an `ORDER BY` clause. Empty when there are no sort keys.
    pub fn order_by(&self, sort: &[SortSpec]) -> Result<String> {
        let mut ret = String::new();
        let mut params: Vec<Param> = vec![];

        let mut f = Formatter {
            serializer: self,
            dst: &mut ret,
            params: &mut params,
        };

        f.order_by(sort)?;
        Ok(ret)
    }

    /// Serializes a query for the ids of matching records.
    pub fn select_ids(
        &self,
        filter: Option<&Spec>,
        sort: &[SortSpec],
        params: &mut impl Params,
    ) -> Result<String> {
        let mut ret = String::new();

        let mut f = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        let table_name = Ident(self.table.db_table_name());
        fmt!(&mut f, "SELECT ", Ident(RECORD_ID_COLUMN), " FROM ", table_name);

        if let Some(spec) = filter {
            fmt!(&mut f, " WHERE ");
            spec.accept(&mut f)?;
        }

        if !sort.is_empty() {
            fmt!(&mut f, " ");
            f.order_by(sort)?;
        }

        ret.push(';');
        Ok(ret)
    }

    /// Serializes the `CREATE TABLE` statement for the table's fields.
    pub fn create_table(&self) -> Result<String> {
        let mut ret = String::new();
        let mut params: Vec<Param> = vec![];

        let columns = self
            .table
            .fields()
            .map(|field| self.column(field).map(ColumnDef::from))
            .collect::<Result<Vec<_>>>()?;

        let mut f = Formatter {
            serializer: self,
            dst: &mut ret,
            params: &mut params,
        };

        let record_id = ColumnDef {
            name: RECORD_ID_COLUMN,
            ty: Type::Text,
        };

        fmt!(
            &mut f,
            "CREATE TABLE ",
            Ident(self.table.db_table_name()),
            " (",
            record_id,
            " PRIMARY KEY, ",
            Comma(columns),
            ");"
        );

        Ok(ret)
    }

    fn field(&self, id: &FieldId) -> Result<&'a Field> {
        self.table.field(id).ok_or_else(|| {
            Error::not_found(
                "sql.unknown_field",
                format!("table `{}` has no field `{id}`", self.table.name()),
            )
        })
    }

    fn column(&self, field: &'a Field) -> Result<Column<'a>> {
        let Some(name) = field.db_field_name() else {
            return Err(Error::invariant(
                "sql.unbound_field",
                format!("field `{}` has no column", field.id()),
            ));
        };

        Ok(Column {
            name: name.as_str(),
            ty: Type::from_field(field)?,
        })
    }
}
