//! Table-schema domain model: identifiers, the field catalogue, tables and
//! the foreign-table resolution protocol.

mod dto;
pub use dto::FieldDto;

pub mod field;
pub use field::{Field, FieldTy};

mod foreign;
pub use foreign::{ForeignTable, ForeignTableRelatedField, ForeignTables, ResolveCx};

mod formatting;
pub use formatting::{
    validate_result_options, Color, DateFormat, DatetimeFormatting, Formatting,
    MultiNumberDisplay, MultiNumberShowAs, NumberFormatting, ShowAs, SingleNumberDisplay,
    SingleNumberShowAs, TextDisplay, TextShowAs, TimeFormat,
};

mod id;
pub use id::{BaseId, ChoiceId, FieldId, RecordId, TableId};

mod kind;
pub use kind::{CellValueType, DbFieldType, FieldKind, FieldValueType};

mod name;
pub use name::{DbFieldName, FieldName};

mod once;
pub use once::SetOnce;

mod table;
pub use table::{Table, TableBuilder, TableMutation};
