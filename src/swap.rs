use itertools::Itertools;
use log::info;

use crate::data::{ClassSection, SectionId, SectionUpdate};
use crate::error::EngineError;
use crate::policy::CapacityPolicy;

/// Sections the given section could trade rooms with in its own timeslot,
/// tightest fit first.
///
/// Remote sections (no enrollment, no capacity) are never offered. The
/// partner must seat the section's students; under `CapacityPolicy::TargetOnly`
/// the partner's own headcount may exceed the room it would receive, so only
/// `CapacityPolicy::Mutual` guarantees both sides fit.
pub fn possible_reassignments(
    roster: &[ClassSection],
    section_id: SectionId,
    policy: CapacityPolicy,
) -> Result<Vec<ClassSection>, EngineError> {
    let section = roster
        .iter()
        .find(|s| s.id == section_id)
        .ok_or(EngineError::UnknownSection(section_id))?;

    Ok(roster
        .iter()
        .filter(|other| {
            other.id != section.id
                && other.timeslot == section.timeslot
                && !other.is_remote()
                && policy.allows(section, other)
        })
        .sorted_by_key(|other| other.spare_seats())
        .cloned()
        .collect())
}

/// Trades room and capacity between two sections, and their timeslots as well when
/// `different_timeslot` is set. Returns the new values of both sections.
pub fn apply_swap(
    roster: &mut [ClassSection],
    crowded_id: SectionId,
    target_id: SectionId,
    different_timeslot: bool,
) -> Result<[SectionUpdate; 2], EngineError> {
    if crowded_id == target_id {
        return Err(EngineError::InvalidSwap(format!(
            "section {} cannot be swapped with itself",
            crowded_id
        )));
    }
    let c_pos = position(roster, crowded_id)?;
    let t_pos = position(roster, target_id)?;

    let (low, high) = (c_pos.min(t_pos), c_pos.max(t_pos));
    let (head, tail) = roster.split_at_mut(high);
    let (a, b) = (&mut head[low], &mut tail[0]);

    std::mem::swap(&mut a.room, &mut b.room);
    std::mem::swap(&mut a.capacity, &mut b.capacity);
    if different_timeslot {
        std::mem::swap(&mut a.timeslot, &mut b.timeslot);
    }
    info!(
        "Swapped sections {} and {}{}",
        crowded_id,
        target_id,
        if different_timeslot { " across timeslots" } else { "" }
    );

    Ok([
        SectionUpdate::from(&roster[c_pos]),
        SectionUpdate::from(&roster[t_pos]),
    ])
}

fn position(roster: &[ClassSection], id: SectionId) -> Result<usize, EngineError> {
    roster
        .iter()
        .position(|s| s.id == id)
        .ok_or(EngineError::UnknownSection(id))
}
