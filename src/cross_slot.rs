use log::{debug, trace, warn};
use std::collections::{HashMap, HashSet};

use crate::data::{
    ClassSection, Recommendation, SectionId, SectionUpdate, SlotRecommendations, Timeslot,
    group_by_timeslot, push_grouped,
};
use crate::policy::CapacityPolicy;
use crate::schedule::InstructorSchedule;

/// Result of the cross-slot phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossSlotOutcome {
    /// Grouped by the timeslot the crowded section moves into.
    pub recommendations: Vec<SlotRecommendations>,
    /// Final room/timeslot/capacity of every section touched by a swap.
    pub updates: Vec<SectionUpdate>,
    /// Crowded sections for which no legal swap exists.
    pub unresolved: Vec<ClassSection>,
}

/// Finds swaps across timeslots for crowded sections the same-slot phase left over.
///
/// The two sections of a swap trade room, timeslot and capacity. A move is legal
/// only if none of the crowded section's instructors already teach in the new
/// timeslot and none of the target's instructors teach in the crowded section's
/// old one. Timeslots and candidates are tried in roster order and the first legal
/// partner wins. Sections in `reserved` (already part of an earlier swap in the
/// same run) are never moved. The roster is cloned; the caller's copy is never
/// touched.
pub fn match_cross_slot(
    unresolved: &[ClassSection],
    roster: &[ClassSection],
    reserved: &HashSet<SectionId>,
    policy: CapacityPolicy,
) -> CrossSlotOutcome {
    let mut working: Vec<ClassSection> = roster.to_vec();
    let index: HashMap<SectionId, usize> = working
        .iter()
        .enumerate()
        .map(|(pos, section)| (section.id, pos))
        .collect();
    // built once from the untouched roster; swapped sections are consumed anyway
    let slots: Vec<(Timeslot, Vec<usize>)> = group_by_timeslot(roster)
        .into_iter()
        .map(|(slot, members)| (slot, members.iter().map(|s| index[&s.id]).collect()))
        .collect();
    let mut schedule = InstructorSchedule::from_sections(&working);
    let mut consumed: HashSet<SectionId> = reserved.clone();
    let mut outcome = CrossSlotOutcome::default();

    for crowded in unresolved {
        if consumed.contains(&crowded.id) {
            trace!("{} already moved by an earlier swap", crowded);
            continue;
        }
        let Some(&c_pos) = index.get(&crowded.id) else {
            warn!("section {} is not on the roster, skipping", crowded.id);
            outcome.unresolved.push(crowded.clone());
            continue;
        };

        match find_partner(&working, &slots, &schedule, &consumed, c_pos, policy) {
            Some(t_pos) => {
                let rec = swap_sections(&mut working, &mut schedule, c_pos, t_pos);
                let destination = working[c_pos].timeslot.clone();
                debug!("{}: {}", destination, rec);
                consumed.insert(working[c_pos].id);
                consumed.insert(working[t_pos].id);
                outcome.updates.push(SectionUpdate::from(&working[c_pos]));
                outcome.updates.push(SectionUpdate::from(&working[t_pos]));
                push_grouped(&mut outcome.recommendations, &destination, rec);
            }
            None => {
                debug!("no cross-slot partner for {}", working[c_pos]);
                outcome.unresolved.push(working[c_pos].clone());
            }
        }
    }

    outcome
}

fn find_partner(
    working: &[ClassSection],
    slots: &[(Timeslot, Vec<usize>)],
    schedule: &InstructorSchedule,
    consumed: &HashSet<SectionId>,
    c_pos: usize,
    policy: CapacityPolicy,
) -> Option<usize> {
    let crowded = &working[c_pos];

    for (slot, members) in slots {
        if *slot == crowded.timeslot || schedule.any_busy(&crowded.instructor_ids, slot) {
            continue;
        }

        let found = members.iter().copied().find(|&t_pos| {
            let target = &working[t_pos];
            policy.allows(crowded, target)
                && !consumed.contains(&target.id)
                && target.room != crowded.room
                && !schedule.any_busy(&crowded.instructor_ids, &target.timeslot)
                && !schedule.any_busy(&target.instructor_ids, &crowded.timeslot)
        });
        if found.is_some() {
            return found;
        }
    }

    None
}

/// Trades room, timeslot and capacity between the two sections and moves their
/// instructors' commitments along with them.
fn swap_sections(
    working: &mut [ClassSection],
    schedule: &mut InstructorSchedule,
    c_pos: usize,
    t_pos: usize,
) -> Recommendation {
    let (old_slot, new_slot) = (
        working[c_pos].timeslot.clone(),
        working[t_pos].timeslot.clone(),
    );

    let rec = {
        let crowded = &working[c_pos];
        let target = &working[t_pos];
        Recommendation {
            crowded_id: crowded.id,
            crowded_course: crowded.course_number.clone(),
            crowded_room: crowded.room.clone(),
            target_id: target.id,
            target_course: target.course_number.clone(),
            target_room: target.room.clone(),
            reason: format!(
                "{} students need {}-seat room; moves from {} to {}",
                crowded.enrollment, target.capacity, old_slot, new_slot
            ),
            old_timeslot: Some(old_slot.clone()),
            new_timeslot: Some(new_slot.clone()),
        }
    };

    for &instructor in &working[c_pos].instructor_ids {
        schedule.reassign(instructor, &old_slot, &new_slot);
    }
    for &instructor in &working[t_pos].instructor_ids {
        schedule.reassign(instructor, &new_slot, &old_slot);
    }

    let (c_room, c_capacity) = (working[c_pos].room.clone(), working[c_pos].capacity);
    let target = &mut working[t_pos];
    let t_room = std::mem::replace(&mut target.room, c_room);
    let t_capacity = std::mem::replace(&mut target.capacity, c_capacity);
    target.timeslot = old_slot;

    let crowded = &mut working[c_pos];
    crowded.room = t_room;
    crowded.capacity = t_capacity;
    crowded.timeslot = new_slot;

    rec
}
