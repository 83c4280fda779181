use super::Field;
use crate::schema::{
    FieldId, FieldName, ForeignTable, ForeignTableRelatedField, ResolveCx, SetOnce, Table,
    TableId,
};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relationship {
    OneOne,
    OneMany,
    ManyOne,
    ManyMany,
}

/// Where the keys backing a link are physically stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStorage {
    /// The table holding the key columns. Either one of the two linked
    /// tables or a junction table.
    pub fk_host_table_name: String,

    /// Column identifying the record that owns the link.
    pub self_key_name: String,

    /// Column identifying the linked record.
    pub foreign_key_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkConfig {
    relationship: Relationship,

    foreign_table_id: TableId,

    /// The foreign field shown as the title of linked records.
    lookup_field_id: FieldId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    visible_field_ids: Vec<FieldId>,

    #[serde(default)]
    is_one_way: bool,

    /// The mirrored field in the foreign table. Always absent for one-way
    /// links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    symmetric_field_id: Option<FieldId>,

    #[serde(default)]
    storage: SetOnce<LinkStorage>,
}

/// A reference from records of one table to records of another (or the
/// same) table.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    config: LinkConfig,
}

impl Relationship {
    /// The relationship as seen from the other side.
    pub fn inverse(self) -> Relationship {
        match self {
            Self::OneOne => Self::OneOne,
            Self::OneMany => Self::ManyOne,
            Self::ManyOne => Self::OneMany,
            Self::ManyMany => Self::ManyMany,
        }
    }

    /// Whether a cell on this side holds several linked records.
    pub fn is_multiple(self) -> bool {
        matches!(self, Self::OneMany | Self::ManyMany)
    }
}

impl LinkStorage {
    /// The same storage seen from the other side of the link.
    pub fn inverse(&self) -> LinkStorage {
        LinkStorage {
            fk_host_table_name: self.fk_host_table_name.clone(),
            self_key_name: self.foreign_key_name.clone(),
            foreign_key_name: self.self_key_name.clone(),
        }
    }

    pub fn is_junction(&self) -> bool {
        self.fk_host_table_name
            .rsplit('.')
            .next()
            .is_some_and(|name| name.starts_with("junction_"))
    }
}

impl LinkConfig {
    pub fn new(
        relationship: Relationship,
        foreign_table_id: TableId,
        lookup_field_id: FieldId,
    ) -> LinkConfig {
        LinkConfig {
            relationship,
            foreign_table_id,
            lookup_field_id,
            visible_field_ids: vec![],
            is_one_way: false,
            symmetric_field_id: None,
            storage: SetOnce::Unset,
        }
    }

    pub fn one_way(mut self, is_one_way: bool) -> Self {
        self.is_one_way = is_one_way;
        self
    }

    pub fn with_symmetric_field_id(mut self, id: FieldId) -> Self {
        self.symmetric_field_id = Some(id);
        self
    }

    pub fn with_visible_field_ids(mut self, ids: Vec<FieldId>) -> Self {
        self.visible_field_ids = ids;
        self
    }

    pub fn with_storage(mut self, storage: LinkStorage) -> Self {
        self.storage = SetOnce::Set(storage);
        self
    }

    pub fn relationship(&self) -> Relationship {
        self.relationship
    }

    pub fn foreign_table_id(&self) -> &TableId {
        &self.foreign_table_id
    }

    pub fn lookup_field_id(&self) -> &FieldId {
        &self.lookup_field_id
    }

    pub fn visible_field_ids(&self) -> &[FieldId] {
        &self.visible_field_ids
    }

    pub fn is_one_way(&self) -> bool {
        self.is_one_way
    }

    pub fn symmetric_field_id(&self) -> Option<&FieldId> {
        self.symmetric_field_id.as_ref()
    }

    pub fn storage(&self) -> Option<&LinkStorage> {
        self.storage.get()
    }
}

impl Link {
    pub fn create(id: FieldId, name: FieldName, config: LinkConfig) -> Result<Field> {
        if config.is_one_way && config.symmetric_field_id.is_some() {
            return Err(Error::validation(
                "link.one_way_symmetric",
                "a one-way link cannot have a symmetric field",
            ));
        }

        Ok(Field::new(id, name, Link { config }))
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// A copy of this link that shares its target but none of its pairing:
    /// no symmetric field and no storage.
    pub(crate) fn detached(&self) -> Link {
        let config = LinkConfig::new(
            self.config.relationship,
            self.config.foreign_table_id.clone(),
            self.config.lookup_field_id.clone(),
        )
        .one_way(self.config.is_one_way)
        .with_visible_field_ids(self.config.visible_field_ids.clone());

        Link { config }
    }

    pub fn relationship(&self) -> Relationship {
        self.config.relationship
    }

    pub fn is_multiple(&self) -> bool {
        self.config.relationship.is_multiple()
    }

    pub fn is_one_way(&self) -> bool {
        self.config.is_one_way
    }

    pub fn symmetric_field_id(&self) -> Option<&FieldId> {
        self.config.symmetric_field_id.as_ref()
    }

    pub fn storage(&self) -> Option<&LinkStorage> {
        self.config.storage.get()
    }

    /// Picks the physical layout for a link from its relationship and
    /// direction.
    ///
    /// Many-to-many and one-way one-to-many links go through a junction
    /// table. Many-to-one and one-to-one links keep the key on the host
    /// table. Two-way one-to-many links keep it on the foreign table, where
    /// the symmetric many-to-one field lives.
    fn derive_storage(
        &self,
        field_id: &FieldId,
        host: &Table,
        foreign: ForeignTable<'_>,
    ) -> Result<LinkStorage> {
        let symmetric = self.config.symmetric_field_id.as_ref();

        let storage = match (self.config.relationship, self.config.is_one_way) {
            (Relationship::ManyMany, _) | (Relationship::OneMany, true) => {
                let (junction, self_key_name) = match symmetric {
                    Some(sym) => (format!("junction_{field_id}_{sym}"), format!("__fk_{sym}")),
                    None => (format!("junction_{field_id}"), format!("__fk_self_{field_id}")),
                };

                LinkStorage {
                    fk_host_table_name: format!("{}.{junction}", host.base_id()),
                    self_key_name,
                    foreign_key_name: format!("__fk_{field_id}"),
                }
            }
            (Relationship::ManyOne | Relationship::OneOne, _) => LinkStorage {
                fk_host_table_name: host.db_table_name().to_string(),
                self_key_name: "__id".to_string(),
                foreign_key_name: format!("__fk_{field_id}"),
            },
            (Relationship::OneMany, false) => {
                let Some(sym) = symmetric else {
                    return Err(Error::invariant(
                        "link.symmetric_missing",
                        format!("two-way link `{field_id}` has no symmetric field"),
                    ));
                };

                LinkStorage {
                    fk_host_table_name: foreign.db_table_name().to_string(),
                    self_key_name: format!("__fk_{sym}"),
                    foreign_key_name: "__id".to_string(),
                }
            }
        };

        Ok(storage)
    }

    /// Builds the field mirroring this link in the foreign table.
    ///
    /// The mirror points back at the host table, inverts the relationship,
    /// shares the storage with key roles swapped and takes a name derived
    /// from the host table's name that is free in the foreign table.
    pub fn build_symmetric_field(
        &self,
        field_id: &FieldId,
        host: &Table,
        foreign: ForeignTable<'_>,
    ) -> Result<Field> {
        if self.config.is_one_way {
            return Err(Error::validation(
                "link.one_way_has_no_symmetric",
                format!("link `{field_id}` is one-way and has no symmetric field"),
            ));
        }

        if foreign.id() != &self.config.foreign_table_id {
            return Err(Error::unexpected(
                "link.foreign_table_mismatch",
                format!(
                    "link `{field_id}` points at `{}`, not `{}`",
                    self.config.foreign_table_id,
                    foreign.id()
                ),
            ));
        }

        let symmetric_id = self
            .config
            .symmetric_field_id
            .clone()
            .unwrap_or_else(FieldId::generate);
        let name = foreign.generate_field_name(host.name())?;

        let mut config = LinkConfig::new(
            self.config.relationship.inverse(),
            host.id().clone(),
            host.primary_field_id().clone(),
        )
        .with_symmetric_field_id(field_id.clone());

        if let Some(storage) = self.storage() {
            config = config.with_storage(storage.inverse());
        }

        Link::create(symmetric_id, name, config)
    }
}

impl ForeignTableRelatedField for Link {
    fn foreign_table_id(&self) -> &TableId {
        &self.config.foreign_table_id
    }

    fn validate_foreign_tables(&mut self, field_id: &FieldId, cx: &ResolveCx<'_>) -> Result<()> {
        let foreign = cx.foreign_table(&self.config.foreign_table_id)?;

        if foreign.field_by_id(&self.config.lookup_field_id).is_none() {
            return Err(Error::not_found(
                "link.lookup_field_not_found",
                format!(
                    "field `{}` does not exist in table `{}`",
                    self.config.lookup_field_id,
                    foreign.id()
                ),
            ));
        }

        for id in &self.config.visible_field_ids {
            if foreign.field_by_id(id).is_none() {
                return Err(Error::not_found(
                    "link.visible_field_not_found",
                    format!("field `{id}` does not exist in table `{}`", foreign.id()),
                ));
            }
        }

        if !self.config.is_one_way && self.config.symmetric_field_id.is_none() {
            let id = FieldId::generate();
            tracing::debug!(link = %field_id, symmetric = %id, "allocated symmetric field id");
            self.config.symmetric_field_id = Some(id);
        }

        // storage stays as first bound, including a mirror's swapped keys
        if !self.config.storage.is_set() {
            let storage = self.derive_storage(field_id, cx.host_table(), foreign)?;
            self.config.storage.set(storage, "link.storage_already_set")?;
        }

        Ok(())
    }

    fn dependency_ids(&self) -> Vec<FieldId> {
        vec![self.config.lookup_field_id.clone()]
    }
}

impl Field {
    /// See [`Link::build_symmetric_field`].
    pub fn build_symmetric_field(&self, host: &Table, foreign: ForeignTable<'_>) -> Result<Field> {
        let Some(link) = self.ty().as_link() else {
            return Err(Error::unexpected(
                "link.not_a_link",
                format!("field `{}` is a {}, not a link", self.id(), self.kind()),
            ));
        };

        link.build_symmetric_field(self.id(), host, foreign)
    }
}
