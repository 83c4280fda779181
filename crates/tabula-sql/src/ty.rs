use tabula_core::schema::{DbFieldType, Field};
use tabula_core::Result;

/// Storage class of a field's column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Text,
    Integer,
    Real,
    Boolean,
    DateTime,
    Json,
}

/// Names the column type used for each storage class by one SQL flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageTypes {
    pub text: &'static str,
    pub integer: &'static str,
    pub real: &'static str,
    pub boolean: &'static str,
    pub date_time: &'static str,
    pub json: &'static str,
}

impl StorageTypes {
    /// SQLite keeps timestamps as ISO-8601 text and JSON as text.
    pub const SQLITE: StorageTypes = StorageTypes {
        text: "TEXT",
        integer: "INTEGER",
        real: "REAL",
        boolean: "BOOLEAN",
        date_time: "TEXT",
        json: "TEXT",
    };

    pub const POSTGRESQL: StorageTypes = StorageTypes {
        text: "TEXT",
        integer: "BIGINT",
        real: "DOUBLE PRECISION",
        boolean: "BOOLEAN",
        date_time: "TIMESTAMPTZ",
        json: "JSONB",
    };
}

impl Type {
    /// The storage class of a field. Uses the recorded storage binding, or
    /// the default one for fields not bound yet.
    pub fn from_field(field: &Field) -> Result<Type> {
        let db_field_type = match field.db_field_type() {
            Some(db_field_type) => db_field_type,
            None => field.default_db_field_type()?,
        };

        Ok(db_field_type.into())
    }

    pub fn storage_name(self, types: &StorageTypes) -> &'static str {
        match self {
            Type::Text => types.text,
            Type::Integer => types.integer,
            Type::Real => types.real,
            Type::Boolean => types.boolean,
            Type::DateTime => types.date_time,
            Type::Json => types.json,
        }
    }

    pub fn is_json(self) -> bool {
        matches!(self, Type::Json)
    }
}

impl From<DbFieldType> for Type {
    fn from(value: DbFieldType) -> Type {
        match value {
            DbFieldType::Text => Type::Text,
            DbFieldType::Integer => Type::Integer,
            DbFieldType::Real => Type::Real,
            DbFieldType::Boolean => Type::Boolean,
            DbFieldType::DateTime => Type::DateTime,
            DbFieldType::Json => Type::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flavors_name_every_class() {
        assert_eq!(Type::Json.storage_name(&StorageTypes::SQLITE), "TEXT");
        assert_eq!(Type::Json.storage_name(&StorageTypes::POSTGRESQL), "JSONB");
        assert_eq!(
            Type::DateTime.storage_name(&StorageTypes::POSTGRESQL),
            "TIMESTAMPTZ"
        );
    }
}
