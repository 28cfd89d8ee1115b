//! Division/OU membership held by an editable user.
//!
//! # Responsibility
//! - Hold the leaf set (`divisions`) and parent set (`ous`) of one user.
//! - Check invariant E1 against a taxonomy index.
//! - Re-derive the OU set from the selected divisions.
//!
//! # Invariants
//! - E1: an OU is in `ous` iff at least one of its divisions is in
//!   `divisions`.
//! - Both collections are sets; order carries no meaning and equality
//!   ignores it.

use crate::model::ids::{DivisionId, OuId, RecordId};
use crate::taxonomy::TaxonomyIndex;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Leaf and parent membership of one user.
#[derive(Debug, Clone, Default)]
pub struct Membership {
    divisions: Vec<DivisionId>,
    ous: Vec<OuId>,
}

/// E1 violation found by [`Membership::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipViolation {
    /// OU is listed but none of its divisions is selected.
    StaleOu(OuId),
    /// A division of this OU is selected but the OU is not listed.
    MissingOu(OuId),
}

impl Display for MembershipViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaleOu(id) => write!(f, "ou {id} is listed without any selected division"),
            Self::MissingOu(id) => write!(f, "ou {id} has selected divisions but is not listed"),
        }
    }
}

impl Error for MembershipViolation {}

/// OUs changed by [`Membership::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OuRepair {
    /// OUs appended because one of their divisions is selected.
    pub added: Vec<OuId>,
    /// OUs removed because none of their divisions is selected or the
    /// taxonomy does not know them.
    pub dropped: Vec<OuId>,
}

impl OuRepair {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.dropped.is_empty()
    }
}

impl Membership {
    pub fn new(divisions: Vec<DivisionId>, ous: Vec<OuId>) -> Self {
        Self { divisions, ous }
    }

    pub fn divisions(&self) -> &[DivisionId] {
        &self.divisions
    }

    pub fn ous(&self) -> &[OuId] {
        &self.ous
    }

    pub fn has_division(&self, id: &DivisionId) -> bool {
        self.divisions.contains(id)
    }

    pub fn has_ou(&self, id: &OuId) -> bool {
        self.ous.contains(id)
    }

    /// Checks E1 for every OU known to `index` and for every listed OU.
    ///
    /// Divisions unknown to the index are ignored; their owning OU cannot
    /// be determined. A listed OU unknown to the index owns no selectable
    /// division and is therefore stale.
    pub fn verify(&self, index: &TaxonomyIndex) -> Result<(), MembershipViolation> {
        for group in index.groups() {
            let selected = group
                .divisions()
                .iter()
                .any(|division| self.has_division(&division.id));
            let listed = self.has_ou(&group.ou().id);
            match (selected, listed) {
                (true, false) => {
                    return Err(MembershipViolation::MissingOu(group.ou().id.clone()))
                }
                (false, true) => {
                    return Err(MembershipViolation::StaleOu(group.ou().id.clone()))
                }
                _ => {}
            }
        }

        if let Some(unknown) = self.ous.iter().find(|ou| index.group(ou).is_none()) {
            return Err(MembershipViolation::StaleOu(unknown.clone()));
        }
        Ok(())
    }

    /// Rebuilds `ous` from `divisions` so E1 holds for every group.
    ///
    /// Listed OUs that still own a selected division keep their position;
    /// missing ones are appended in index order. Divisions are never touched.
    pub fn reconcile(&mut self, index: &TaxonomyIndex) -> OuRepair {
        let selected: Vec<&OuId> = index
            .groups()
            .filter(|group| {
                group
                    .divisions()
                    .iter()
                    .any(|division| self.divisions.contains(&division.id))
            })
            .map(|group| &group.ou().id)
            .collect();

        let mut repair = OuRepair::default();
        let mut ous = Vec::with_capacity(selected.len());
        for ou in &self.ous {
            if !selected.contains(&ou) {
                repair.dropped.push(ou.clone());
            } else if !ous.contains(ou) {
                ous.push(ou.clone());
            }
        }
        for ou in selected {
            if !ous.contains(ou) {
                ous.push(ou.clone());
                repair.added.push(ou.clone());
            }
        }
        self.ous = ous;
        repair
    }

    pub(crate) fn into_parts(self) -> (Vec<DivisionId>, Vec<OuId>) {
        (self.divisions, self.ous)
    }
}

impl PartialEq for Membership {
    fn eq(&self, other: &Self) -> bool {
        as_set(&self.divisions) == as_set(&other.divisions)
            && as_set(&self.ous) == as_set(&other.ous)
    }
}

impl Eq for Membership {}

fn as_set(ids: &[RecordId]) -> HashSet<&RecordId> {
    ids.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::{Membership, MembershipViolation, OuRepair};
    use crate::model::ids::RecordId;
    use crate::model::record::{DivisionRecord, OuRecord};
    use crate::taxonomy::TaxonomyIndex;

    fn ou(id: &str) -> OuRecord {
        OuRecord {
            id: id.into(),
            name: format!("OU {id}"),
        }
    }

    fn index() -> TaxonomyIndex {
        TaxonomyIndex::build(vec![
            DivisionRecord::new("d1", "Finance", ou("A")),
            DivisionRecord::new("d2", "Payroll", ou("A")),
            DivisionRecord::new("d3", "Hardware", ou("B")),
        ])
        .unwrap()
    }

    fn ids(values: &[&str]) -> Vec<RecordId> {
        values.iter().map(|value| RecordId::from(*value)).collect()
    }

    #[test]
    fn equality_ignores_order() {
        let left = Membership::new(ids(&["d1", "d3"]), ids(&["A", "B"]));
        let right = Membership::new(ids(&["d3", "d1"]), ids(&["B", "A"]));
        assert_eq!(left, right);
    }

    #[test]
    fn verify_accepts_consistent_membership() {
        let membership = Membership::new(ids(&["d2", "d3"]), ids(&["B", "A"]));
        assert_eq!(membership.verify(&index()), Ok(()));
        assert_eq!(Membership::default().verify(&index()), Ok(()));
    }

    #[test]
    fn verify_reports_stale_and_missing_ous() {
        let stale = Membership::new(ids(&["d1"]), ids(&["A", "B"]));
        assert_eq!(
            stale.verify(&index()),
            Err(MembershipViolation::StaleOu("B".into()))
        );

        let missing = Membership::new(ids(&["d3"]), Vec::new());
        assert_eq!(
            missing.verify(&index()),
            Err(MembershipViolation::MissingOu("B".into()))
        );

        let unknown = Membership::new(Vec::new(), ids(&["Z"]));
        assert_eq!(
            unknown.verify(&index()),
            Err(MembershipViolation::StaleOu("Z".into()))
        );
    }

    #[test]
    fn reconcile_drops_unknown_and_stale_ous_and_adds_missing_ones() {
        let mut membership = Membership::new(ids(&["d3"]), ids(&["A", "Z"]));

        let repair = membership.reconcile(&index());

        assert_eq!(
            repair,
            OuRepair {
                added: ids(&["B"]),
                dropped: ids(&["A", "Z"]),
            }
        );
        assert_eq!(membership.ous(), &ids(&["B"])[..]);
        assert_eq!(membership.divisions(), &ids(&["d3"])[..]);
        assert_eq!(membership.verify(&index()), Ok(()));
    }

    #[test]
    fn reconcile_keeps_consistent_membership_as_is() {
        let mut membership = Membership::new(ids(&["d3", "d1"]), ids(&["B", "A"]));

        assert!(membership.reconcile(&index()).is_empty());
        assert_eq!(membership.ous(), &ids(&["B", "A"])[..]);
    }
}
