//! Taxonomy index built from the flat division list.

use crate::model::ids::{DivisionId, OuId};
use crate::model::record::DivisionRecord;
use indexmap::IndexMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Organizational unit (parent group).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgUnit {
    pub id: OuId,
    pub name: String,
}

/// Division (leaf item) with its owning OU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Division {
    pub id: DivisionId,
    pub name: String,
    pub ou: OrgUnit,
}

/// One OU with its divisions in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionGroup {
    ou: OrgUnit,
    divisions: Vec<Division>,
}

impl DivisionGroup {
    pub fn ou(&self) -> &OrgUnit {
        &self.ou
    }

    pub fn divisions(&self) -> &[Division] {
        &self.divisions
    }

    pub fn contains(&self, division: &DivisionId) -> bool {
        self.divisions.iter().any(|item| &item.id == division)
    }
}

/// Taxonomy build errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    /// Division arrived without its owning OU reference.
    MissingParent { division: DivisionId },
}

impl Display for TaxonomyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParent { division } => {
                write!(f, "division {division} has no owning ou reference")
            }
        }
    }
}

impl Error for TaxonomyError {}

/// Read-only grouping of divisions keyed by OU id.
///
/// Group order follows the first appearance of each OU; division order
/// inside a group follows arrival order. Duplicate divisions in the input
/// are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyIndex {
    groups: IndexMap<OuId, DivisionGroup>,
}

impl TaxonomyIndex {
    /// Builds the index in one pass over `items`.
    ///
    /// # Errors
    /// - `MissingParent` for the first division lacking an OU reference.
    ///   No partial index is returned.
    pub fn build(items: impl IntoIterator<Item = DivisionRecord>) -> Result<Self, TaxonomyError> {
        let mut groups: IndexMap<OuId, DivisionGroup> = IndexMap::new();
        for item in items {
            let Some(ou) = item.ou else {
                return Err(TaxonomyError::MissingParent { division: item.id });
            };
            let ou = OrgUnit {
                id: ou.id,
                name: ou.name,
            };
            let group = groups
                .entry(ou.id.clone())
                .or_insert_with(|| DivisionGroup {
                    ou: ou.clone(),
                    divisions: Vec::new(),
                });
            group.divisions.push(Division {
                id: item.id,
                name: item.name,
                ou,
            });
        }
        Ok(Self { groups })
    }

    pub fn groups(&self) -> impl Iterator<Item = &DivisionGroup> {
        self.groups.values()
    }

    pub fn group(&self, ou: &OuId) -> Option<&DivisionGroup> {
        self.groups.get(ou)
    }

    /// Derived view of all OUs, in group order.
    pub fn org_units(&self) -> impl Iterator<Item = &OrgUnit> {
        self.groups.values().map(|group| &group.ou)
    }

    /// Returns the OU owning `division`, if the division is known.
    pub fn parent_of(&self, division: &DivisionId) -> Option<&OrgUnit> {
        self.groups
            .values()
            .find(|group| group.contains(division))
            .map(|group| &group.ou)
    }

    pub fn contains_division(&self, division: &DivisionId) -> bool {
        self.parent_of(division).is_some()
    }

    /// Number of OU groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of divisions across all groups, duplicates included.
    pub fn division_count(&self) -> usize {
        self.groups.values().map(|group| group.divisions.len()).sum()
    }
}
