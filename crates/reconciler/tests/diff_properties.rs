//! Properties of the planned action list.

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]

use std::collections::BTreeSet;

use proptest::prelude::*;
use tagsync_core::Attr;
use tagsync_model::{ResourceGroup, Variable};
use tagsync_reconciler::{Phase, ReconcileAction, diff};

fn names() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-e]{1,2}", 0..8)
}

fn desired(names: &BTreeSet<String>, changed: &BTreeSet<String>) -> Vec<Variable> {
    names
        .iter()
        .map(|name| {
            let variable = Variable::new(name.as_str(), "v");
            if changed.contains(name) {
                variable.with_notes("changed")
            } else {
                variable
            }
        })
        .collect()
}

fn tracked(names: &BTreeSet<String>) -> Vec<Variable> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut variable = Variable::new(name.as_str(), "v");
            variable.remote_id = Attr::value(i.to_string());
            variable
        })
        .collect()
}

proptest! {
    #[test]
    fn diff_matches_set_difference(
        wanted in names(),
        have in names(),
        changed in names(),
    ) {
        let d = ResourceGroup::from_objects(desired(&wanted, &changed)).unwrap();
        let s = ResourceGroup::from_objects(tracked(&have)).unwrap();

        let actions = diff(&d, &s);

        let of = |phase: Phase| -> BTreeSet<String> {
            actions
                .iter()
                .filter(|a| a.phase() == phase)
                .map(|a| a.name().to_string())
                .collect()
        };
        prop_assert_eq!(of(Phase::Delete), &have - &wanted);
        prop_assert_eq!(of(Phase::Create), &wanted - &have);
        let both = &wanted & &have;
        prop_assert_eq!(of(Phase::Update), &both & &changed);
    }

    #[test]
    fn diff_orders_phases(wanted in names(), have in names(), changed in names()) {
        let d = ResourceGroup::from_objects(desired(&wanted, &changed)).unwrap();
        let s = ResourceGroup::from_objects(tracked(&have)).unwrap();

        let rank = |action: &ReconcileAction| match action.phase() {
            Phase::Read | Phase::Delete => 0,
            Phase::Create => 1,
            Phase::Update => 2,
        };
        let ranks: Vec<u8> = diff(&d, &s).iter().map(rank).collect();
        prop_assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn diff_ignores_insertion_order(wanted in names(), changed in names()) {
        let forward = desired(&wanted, &changed);
        let mut backward = forward.clone();
        backward.reverse();
        let s = ResourceGroup::from_objects(tracked(&changed)).unwrap();

        prop_assert_eq!(
            diff(&ResourceGroup::from_objects(forward).unwrap(), &s),
            diff(&ResourceGroup::from_objects(backward).unwrap(), &s)
        );
    }
}
