use super::{Field, Link};
use crate::schema::{FieldId, FieldName, ForeignTableRelatedField, ResolveCx, TableId};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

/// Addresses a field in a foreign table, optionally reached through a link
/// field of the host table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_field_id: Option<FieldId>,

    pub foreign_table_id: TableId,

    pub lookup_field_id: FieldId,
}

/// Whether the looked-up field has been read from the foreign table yet.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupState {
    Pending,
    Resolved { inner: Box<Field> },
}

/// Mirrors the values of a field in a linked table.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    options: LookupOptions,
    state: LookupState,

    /// Explicit multiplicity. When absent it is derived on resolution.
    is_multiple: Option<bool>,
}

impl LookupState {
    pub fn inner(&self) -> Option<&Field> {
        match self {
            Self::Resolved { inner } => Some(inner),
            Self::Pending => None,
        }
    }

    /// The resolved inner field, or an invariant error while pending.
    pub fn resolved(&self, field_id: &FieldId) -> Result<&Field> {
        self.inner().ok_or_else(|| {
            Error::invariant(
                "lookup.pending",
                format!("lookup `{field_id}` was read before its foreign table was resolved"),
            )
        })
    }

    /// Transitions to `Resolved` with a snapshot of `target`.
    ///
    /// Resolving again replaces the snapshot so that changes to the foreign
    /// field are picked up.
    pub(crate) fn resolve(&mut self, target: &Field) -> Result<()> {
        if target.is_pending() {
            return Err(Error::invariant(
                "lookup.target_pending",
                format!(
                    "cannot look up `{}` while it is itself unresolved",
                    target.id()
                ),
            ));
        }

        *self = Self::Resolved {
            inner: Box::new(target.clone()),
        };
        Ok(())
    }
}

impl LookupOptions {
    pub fn new(foreign_table_id: TableId, lookup_field_id: FieldId) -> LookupOptions {
        LookupOptions {
            link_field_id: None,
            foreign_table_id,
            lookup_field_id,
        }
    }

    pub fn through(mut self, link_field_id: FieldId) -> Self {
        self.link_field_id = Some(link_field_id);
        self
    }

    /// Checks that the link field, if any, exists in the host table and
    /// points at the same foreign table. Returns it.
    pub(crate) fn check_link<'a>(&self, cx: &ResolveCx<'a>) -> Result<Option<&'a Link>> {
        let Some(link_field_id) = &self.link_field_id else {
            return Ok(None);
        };

        let host = cx.host_table();

        let Some(field) = host.field(link_field_id) else {
            return Err(Error::not_found(
                "lookup.link_field_not_found",
                format!(
                    "link field `{link_field_id}` does not exist in table `{}`",
                    host.id()
                ),
            ));
        };

        let Some(link) = field.ty().as_link() else {
            return Err(Error::validation(
                "lookup.link_field_not_link",
                format!("field `{link_field_id}` is a {}, not a link", field.kind()),
            ));
        };

        if link.config().foreign_table_id() != &self.foreign_table_id {
            return Err(Error::validation(
                "lookup.foreign_table_mismatch",
                format!(
                    "link `{link_field_id}` points at `{}`, not `{}`",
                    link.config().foreign_table_id(),
                    self.foreign_table_id
                ),
            ));
        }

        Ok(Some(link))
    }

    /// Finds the target field in the foreign table.
    pub(crate) fn target<'a>(&self, cx: &ResolveCx<'a>) -> Result<&'a Field> {
        let foreign = cx.foreign_table(&self.foreign_table_id)?;

        foreign.field_by_id(&self.lookup_field_id).ok_or_else(|| {
            Error::not_found(
                "lookup.field_not_found",
                format!(
                    "field `{}` does not exist in table `{}`",
                    self.lookup_field_id, self.foreign_table_id
                ),
            )
        })
    }

    pub(crate) fn dependency_ids(&self) -> Vec<FieldId> {
        self.link_field_id
            .iter()
            .chain(Some(&self.lookup_field_id))
            .cloned()
            .collect()
    }
}

impl Lookup {
    /// Creates a lookup whose foreign tables have not been loaded yet.
    pub fn create_pending(id: FieldId, name: FieldName, options: LookupOptions) -> Result<Field> {
        Ok(Field::new(
            id,
            name,
            Lookup {
                options,
                state: LookupState::Pending,
                is_multiple: None,
            },
        ))
    }

    /// Restores a persisted lookup. A persisted multiplicity wins over the
    /// one derived on resolution.
    pub fn rehydrate(
        id: FieldId,
        name: FieldName,
        options: LookupOptions,
        is_multiple: Option<bool>,
    ) -> Result<Field> {
        Ok(Field::new(
            id,
            name,
            Lookup {
                options,
                state: LookupState::Pending,
                is_multiple,
            },
        ))
    }

    pub fn options(&self) -> &LookupOptions {
        &self.options
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn inner(&self) -> Option<&Field> {
        self.state.inner()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, LookupState::Pending)
    }

    /// Lookups are multiple unless told or resolved otherwise.
    pub fn is_multiple(&self) -> bool {
        self.is_multiple.unwrap_or(true)
    }

    pub fn is_multiple_override(&self) -> Option<bool> {
        self.is_multiple
    }
}

impl ForeignTableRelatedField for Lookup {
    fn foreign_table_id(&self) -> &TableId {
        &self.options.foreign_table_id
    }

    fn validate_foreign_tables(&mut self, _field_id: &FieldId, cx: &ResolveCx<'_>) -> Result<()> {
        let link = self.options.check_link(cx)?;
        let target = self.options.target(cx)?;

        self.state.resolve(target)?;

        if self.is_multiple.is_none() {
            let inner_multiple = target.value_type()?.is_multiple;
            self.is_multiple = Some(inner_multiple || link.map_or(true, Link::is_multiple));
        }

        Ok(())
    }

    fn dependency_ids(&self) -> Vec<FieldId> {
        self.options.dependency_ids()
    }
}
