//! Randomised checks of the matcher guarantees over generated rosters.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::cross_slot::match_cross_slot;
use crate::data::{ClassSection, InstructorId, SectionId};
use crate::policy::CapacityPolicy;
use crate::same_slot::match_same_slot;

const SLOTS: [&str; 4] = ["MW 9:00", "MW 10:30", "TTh 9:00", "TTh 1:00"];

/// Rosters where no instructor starts out teaching two sections at once.
fn roster_strategy() -> impl Strategy<Value = Vec<ClassSection>> {
    prop::collection::vec(
        (0..SLOTS.len(), 0..6u32, 0..60u32, 0..60u32, prop::option::of(0..5u32)),
        0..25,
    )
    .prop_map(|rows| {
        let mut taken: HashSet<(InstructorId, usize)> = HashSet::new();
        rows.into_iter()
            .enumerate()
            .map(|(i, (slot, room, enrollment, capacity, instructor))| ClassSection {
                id: i as SectionId,
                course_number: format!("CSCI{}", 1000 + i),
                room: format!("R{}", room),
                timeslot: SLOTS[slot].to_string(),
                enrollment,
                capacity,
                instructor_ids: instructor
                    .filter(|&p| taken.insert((p, slot)))
                    .into_iter()
                    .collect(),
            })
            .collect()
    })
}

fn policy_strategy() -> impl Strategy<Value = CapacityPolicy> {
    prop_oneof![Just(CapacityPolicy::TargetOnly), Just(CapacityPolicy::Mutual)]
}

fn by_id(roster: &[ClassSection]) -> HashMap<SectionId, &ClassSection> {
    roster.iter().map(|s| (s.id, s)).collect()
}

proptest! {
    #[test]
    fn prop_same_slot_targets_are_used_once_and_fit(
        roster in roster_strategy(),
        policy in policy_strategy(),
    ) {
        let outcome = match_same_slot(&roster, policy);
        let sections = by_id(&roster);
        let mut targets = HashSet::new();

        for group in &outcome.recommendations {
            prop_assert!(!group.recommendations.is_empty());
            for rec in &group.recommendations {
                prop_assert!(targets.insert(rec.target_id));
                let crowded = sections[&rec.crowded_id];
                let target = sections[&rec.target_id];
                prop_assert!(target.capacity >= crowded.enrollment);
                prop_assert_ne!(&target.room, &crowded.room);
                prop_assert_eq!(&target.timeslot, &group.timeslot);
                prop_assert_eq!(&crowded.timeslot, &group.timeslot);
            }
        }
    }

    #[test]
    fn prop_every_crowded_section_is_swapped_or_unresolved(
        roster in roster_strategy(),
        policy in policy_strategy(),
    ) {
        let outcome = match_same_slot(&roster, policy);
        let swapped: HashSet<SectionId> = outcome
            .recommendations
            .iter()
            .flat_map(|g| g.recommendations.iter().map(|r| r.crowded_id))
            .collect();
        let unresolved: HashSet<SectionId> = outcome.unresolved.iter().map(|s| s.id).collect();
        let crowded: HashSet<SectionId> = roster
            .iter()
            .filter(|s| s.is_overcrowded())
            .map(|s| s.id)
            .collect();

        prop_assert!(swapped.is_disjoint(&unresolved));
        prop_assert!(unresolved.is_subset(&crowded));
        let covered: HashSet<SectionId> = swapped.union(&unresolved).copied().collect();
        prop_assert_eq!(covered, crowded);
    }

    #[test]
    fn prop_cross_slot_swaps_never_double_book(
        roster in roster_strategy(),
        policy in policy_strategy(),
    ) {
        let same = match_same_slot(&roster, policy);
        let reserved = same.swapped_ids();
        let outcome = match_cross_slot(&same.unresolved, &roster, &reserved, policy);

        let mut touched = HashSet::new();
        for group in &outcome.recommendations {
            for rec in &group.recommendations {
                prop_assert!(touched.insert(rec.crowded_id));
                prop_assert!(touched.insert(rec.target_id));
                prop_assert!(!reserved.contains(&rec.target_id));
                prop_assert_eq!(rec.new_timeslot.as_deref(), Some(group.timeslot.as_str()));
            }
        }

        let mut after: Vec<ClassSection> = roster.clone();
        for update in &outcome.updates {
            prop_assert!(!reserved.contains(&update.id));
            let section = after.iter_mut().find(|s| s.id == update.id).unwrap();
            section.room = update.room.clone();
            section.timeslot = update.timeslot.clone();
            section.capacity = update.capacity;
        }

        let mut load: HashMap<(InstructorId, &str), usize> = HashMap::new();
        for section in &after {
            for &p in &section.instructor_ids {
                *load.entry((p, section.timeslot.as_str())).or_insert(0) += 1;
            }
        }
        prop_assert!(load.values().all(|&n| n <= 1));

        for section in &after {
            if touched.contains(&section.id) {
                let original = roster.iter().find(|s| s.id == section.id).unwrap();
                prop_assert_ne!(&section.timeslot, &original.timeslot);
            }
        }
    }

    #[test]
    fn prop_rosters_without_crowding_yield_nothing(
        roster in roster_strategy(),
        policy in policy_strategy(),
    ) {
        let roster: Vec<ClassSection> = roster
            .into_iter()
            .map(|mut s| {
                s.capacity = s.capacity.max(s.enrollment);
                s
            })
            .collect();

        let same = match_same_slot(&roster, policy);
        prop_assert!(same.recommendations.is_empty());
        prop_assert!(same.unresolved.is_empty());

        let cross = match_cross_slot(&same.unresolved, &roster, &HashSet::new(), policy);
        prop_assert!(cross.recommendations.is_empty());
        prop_assert!(cross.updates.is_empty());
    }
}
