use cooltech_core::{toggle, DivisionRecord, Membership, OuRecord, RecordId, TaxonomyIndex};
use proptest::prelude::*;

fn ou(id: &str) -> OuRecord {
    OuRecord {
        id: id.into(),
        name: format!("OU {id}"),
    }
}

/// Three OUs: A owns 1..=3, B owns 4..=5, C owns 6.
fn index() -> TaxonomyIndex {
    TaxonomyIndex::build(vec![
        DivisionRecord::new(1, "Finance", ou("A")),
        DivisionRecord::new(2, "IT", ou("A")),
        DivisionRecord::new(3, "Writing", ou("A")),
        DivisionRecord::new(4, "Development", ou("B")),
        DivisionRecord::new(5, "Support", ou("B")),
        DivisionRecord::new(6, "Payroll", ou("C")),
    ])
    .unwrap()
}

fn owner(division: i64) -> &'static str {
    match division {
        1..=3 => "A",
        4..=5 => "B",
        _ => "C",
    }
}

fn ids<T: Into<RecordId> + Copy>(values: &[T]) -> Vec<RecordId> {
    values.iter().map(|value| (*value).into()).collect()
}

#[test]
fn selecting_second_division_keeps_single_ou_entry() {
    let index = TaxonomyIndex::build(vec![
        DivisionRecord::new(1, "Finance", ou("A")),
        DivisionRecord::new(2, "IT", ou("A")),
    ])
    .unwrap();
    let state = Membership::new(ids(&[1]), ids(&["A"]));

    let next = toggle(&state, &index, &2.into(), &"A".into()).unwrap();

    assert_eq!(next.divisions(), ids(&[1, 2]).as_slice());
    assert_eq!(next.ous(), ids(&["A"]).as_slice());
}

#[test]
fn deselecting_last_division_removes_ou() {
    let index = TaxonomyIndex::build(vec![DivisionRecord::new(1, "Finance", ou("A"))]).unwrap();
    let state = Membership::new(ids(&[1]), ids(&["A"]));

    let next = toggle(&state, &index, &1.into(), &"A".into()).unwrap();

    assert!(next.divisions().is_empty());
    assert!(next.ous().is_empty());
}

#[test]
fn deselecting_one_of_two_keeps_ou() {
    let state = Membership::new(ids(&[1, 3]), ids(&["A"]));

    let next = toggle(&state, &index(), &3.into(), &"A".into()).unwrap();

    assert_eq!(next.divisions(), ids(&[1]).as_slice());
    assert_eq!(next.ous(), ids(&["A"]).as_slice());
}

#[test]
fn other_ous_are_untouched() {
    let state = Membership::new(ids(&[4]), ids(&["B"]));

    let next = toggle(&state, &index(), &6.into(), &"C".into()).unwrap();

    assert_eq!(next, Membership::new(ids(&[4, 6]), ids(&["B", "C"])));
}

#[test]
fn string_and_numeric_ids_address_the_same_division() {
    let state = Membership::new(ids(&[1]), ids(&["A"]));

    let next = toggle(&state, &index(), &"1".into(), &"A".into()).unwrap();

    assert!(next.divisions().is_empty());
    assert!(next.ous().is_empty());
}

#[test]
fn rejected_toggle_leaves_input_untouched() {
    let state = Membership::new(ids(&[1]), ids(&["A"]));
    let before = state.clone();

    assert!(toggle(&state, &index(), &4.into(), &"A".into()).is_err());
    assert_eq!(state, before);
}

proptest! {
    #[test]
    fn e1_holds_after_every_toggle(steps in proptest::collection::vec(1i64..=6, 0..40)) {
        let index = index();
        let mut state = Membership::default();
        for division in steps {
            state = toggle(&state, &index, &division.into(), &owner(division).into()).unwrap();
            prop_assert_eq!(state.verify(&index), Ok(()));
        }
    }

    #[test]
    fn double_toggle_restores_state(
        selected in proptest::collection::btree_set(1i64..=6, 0..6),
        division in 1i64..=6,
    ) {
        let index = index();
        let divisions: Vec<RecordId> = selected.iter().map(|id| RecordId::from(*id)).collect();
        let mut ous: Vec<RecordId> = Vec::new();
        for id in &selected {
            let parent = RecordId::from(owner(*id));
            if !ous.contains(&parent) {
                ous.push(parent);
            }
        }
        let state = Membership::new(divisions, ous);
        let ou_id = RecordId::from(owner(division));

        let once = toggle(&state, &index, &division.into(), &ou_id).unwrap();
        let twice = toggle(&once, &index, &division.into(), &ou_id).unwrap();
        prop_assert_eq!(twice, state);
    }
}
