use super::Serializer;
use crate::StorageTypes;

use tabula_core::schema::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flavor {
    Postgresql,
    Sqlite,
}

impl<'a> Serializer<'a> {
    pub fn sqlite(table: &'a Table) -> Serializer<'a> {
        Serializer {
            table,
            flavor: Flavor::Sqlite,
        }
    }

    pub fn postgresql(table: &'a Table) -> Serializer<'a> {
        Serializer {
            table,
            flavor: Flavor::Postgresql,
        }
    }

    pub fn storage_types(&self) -> &'static StorageTypes {
        match self.flavor {
            Flavor::Sqlite => &StorageTypes::SQLITE,
            Flavor::Postgresql => &StorageTypes::POSTGRESQL,
        }
    }

    pub(super) fn is_sqlite(&self) -> bool {
        matches!(self.flavor, Flavor::Sqlite)
    }
}
