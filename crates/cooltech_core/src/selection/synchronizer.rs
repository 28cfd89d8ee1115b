//! Division toggle and OU recomputation.

use crate::model::ids::{DivisionId, OuId};
use crate::model::membership::Membership;
use crate::taxonomy::TaxonomyIndex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Toggle precondition violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// OU is not present in the taxonomy index.
    UnknownOu(OuId),
    /// Division is unknown or belongs to a different OU.
    DivisionNotInOu { division: DivisionId, ou: OuId },
}

impl Display for SelectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownOu(id) => write!(f, "ou not found in taxonomy: {id}"),
            Self::DivisionNotInOu { division, ou } => {
                write!(f, "division {division} does not belong to ou {ou}")
            }
        }
    }
}

impl Error for SelectionError {}

/// Toggles `division` and recomputes membership of its owning `ou`.
///
/// # Contract
/// - `division` is removed if present (every occurrence), appended otherwise.
/// - `ou` is listed afterwards iff any of its divisions is still selected,
///   determined by re-scanning the OU's division list.
/// - Other OUs are left untouched; a division belongs to exactly one OU.
///
/// # Errors
/// - `UnknownOu` / `DivisionNotInOu` when the pair does not match the index.
///   The input membership is never modified.
pub fn toggle(
    state: &Membership,
    index: &TaxonomyIndex,
    division: &DivisionId,
    ou: &OuId,
) -> Result<Membership, SelectionError> {
    let group = index
        .group(ou)
        .ok_or_else(|| SelectionError::UnknownOu(ou.clone()))?;
    if !group.contains(division) {
        return Err(SelectionError::DivisionNotInOu {
            division: division.clone(),
            ou: ou.clone(),
        });
    }

    let mut divisions = state.divisions().to_vec();
    if state.has_division(division) {
        divisions.retain(|id| id != division);
    } else {
        divisions.push(division.clone());
    }

    let ou_still_selected = group
        .divisions()
        .iter()
        .any(|item| divisions.contains(&item.id));

    let mut ous = state.ous().to_vec();
    let listed = ous.iter().position(|id| id == ou);
    match (ou_still_selected, listed) {
        (true, None) => ous.push(ou.clone()),
        (false, Some(_)) => ous.retain(|id| id != ou),
        _ => {}
    }

    Ok(Membership::new(divisions, ous))
}

#[cfg(test)]
mod tests {
    use super::{toggle, SelectionError};
    use crate::model::ids::RecordId;
    use crate::model::membership::Membership;
    use crate::model::record::{DivisionRecord, OuRecord};
    use crate::taxonomy::TaxonomyIndex;

    fn index() -> TaxonomyIndex {
        let ou_a = OuRecord {
            id: "A".into(),
            name: "News management".to_string(),
        };
        let ou_b = OuRecord {
            id: "B".into(),
            name: "Software reviews".to_string(),
        };
        TaxonomyIndex::build(vec![
            DivisionRecord::new("1", "Finance", ou_a.clone()),
            DivisionRecord::new("2", "IT", ou_a),
            DivisionRecord::new("3", "Writing", ou_b),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_unknown_ou() {
        let err = toggle(&Membership::default(), &index(), &"1".into(), &"Z".into()).unwrap_err();
        assert_eq!(err, SelectionError::UnknownOu("Z".into()));
    }

    #[test]
    fn rejects_division_from_other_ou() {
        let err = toggle(&Membership::default(), &index(), &"3".into(), &"A".into()).unwrap_err();
        assert!(matches!(err, SelectionError::DivisionNotInOu { .. }));
    }

    #[test]
    fn removes_duplicate_occurrences_of_toggled_division() {
        let state = Membership::new(
            vec![RecordId::from("1"), RecordId::from("1")],
            vec![RecordId::from("A")],
        );
        let next = toggle(&state, &index(), &"1".into(), &"A".into()).unwrap();
        assert!(next.divisions().is_empty());
        assert!(next.ous().is_empty());
    }

    #[test]
    fn repairs_missing_ou_for_toggled_group() {
        let state = Membership::new(vec![RecordId::from("1")], Vec::new());
        let next = toggle(&state, &index(), &"2".into(), &"A".into()).unwrap();
        assert_eq!(next.ous(), &[RecordId::from("A")]);
    }
}
