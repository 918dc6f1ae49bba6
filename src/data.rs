use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// Type aliases for clarity
pub type SectionId = u32;
pub type InstructorId = u32;
pub type Timeslot = String;
pub type RoomId = String;

/// One scheduled offering of a course in a room at a meeting pattern.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSection {
    pub id: SectionId,
    pub course_number: String,
    pub room: RoomId,
    pub timeslot: Timeslot,
    pub enrollment: u32,
    pub capacity: u32,
    #[serde(default)]
    pub instructor_ids: Vec<InstructorId>,
}

impl ClassSection {
    pub fn is_overcrowded(&self) -> bool {
        self.enrollment > self.capacity
    }

    /// Seats left in the room; negative when overcrowded.
    pub fn spare_seats(&self) -> i64 {
        i64::from(self.capacity) - i64::from(self.enrollment)
    }

    /// True if this section's room can hold `other`'s current headcount.
    pub fn can_absorb(&self, other: &ClassSection) -> bool {
        self.capacity >= other.enrollment
    }

    /// Remote offerings carry no enrollment and no room capacity.
    pub fn is_remote(&self) -> bool {
        self.enrollment == 0 && self.capacity == 0
    }
}

impl fmt::Display for ClassSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{} in {} at {} ({}/{})",
            self.course_number, self.id, self.room, self.timeslot, self.enrollment, self.capacity
        )
    }
}

/// A proposed room swap between a crowded section and a target section.
///
/// `old_timeslot`/`new_timeslot` are only set for cross-slot swaps and describe
/// where the crowded section moves from and to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub crowded_id: SectionId,
    pub crowded_course: String,
    pub crowded_room: RoomId,
    pub target_id: SectionId,
    pub target_course: String,
    pub target_room: RoomId,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_timeslot: Option<Timeslot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_timeslot: Option<Timeslot>,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "swap {} ({}) with {} ({}): {}",
            self.crowded_course, self.crowded_room, self.target_course, self.target_room, self.reason
        )
    }
}

/// Recommendations that belong to one timeslot, in the order they were found.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecommendations {
    pub timeslot: Timeslot,
    pub recommendations: Vec<Recommendation>,
}

/// New room/timeslot/capacity values a data-access layer must persist for a section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionUpdate {
    pub id: SectionId,
    pub room: RoomId,
    pub timeslot: Timeslot,
    pub capacity: u32,
}

impl From<&ClassSection> for SectionUpdate {
    fn from(section: &ClassSection) -> Self {
        Self {
            id: section.id,
            room: section.room.clone(),
            timeslot: section.timeslot.clone(),
            capacity: section.capacity,
        }
    }
}

/// The complete output of one matching run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapReport {
    pub same_slot_swaps: Vec<SlotRecommendations>,
    pub unresolved: Vec<ClassSection>,
    pub cross_slot_swaps: Vec<SlotRecommendations>,
    pub section_updates: Vec<SectionUpdate>,
    pub still_over_capacity: Vec<ClassSection>,
}

impl SwapReport {
    pub fn swap_count(&self) -> usize {
        self.same_slot_swaps
            .iter()
            .chain(&self.cross_slot_swaps)
            .map(|slot| slot.recommendations.len())
            .sum()
    }
}

/// A roster submitted for matching.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterInput {
    pub sections: Vec<ClassSection>,
}

/// A swap the operator accepted, applied to the submitted roster.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySwapInput {
    pub sections: Vec<ClassSection>,
    pub crowded_id: SectionId,
    pub target_id: SectionId,
    #[serde(default)]
    pub different_timeslot: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySwapOutput {
    pub sections: Vec<ClassSection>,
    pub updates: Vec<SectionUpdate>,
}

/// Partitions sections by timeslot. Timeslots keep the order in which they first
/// appear and sections keep their input order within a timeslot.
pub fn group_by_timeslot(sections: &[ClassSection]) -> Vec<(Timeslot, Vec<&ClassSection>)> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(Timeslot, Vec<&ClassSection>)> = Vec::new();
    for section in sections {
        let idx = *position.entry(section.timeslot.as_str()).or_insert_with(|| {
            groups.push((section.timeslot.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(section);
    }
    groups
}

/// Appends `rec` to the group for `timeslot`, opening a new group at the end if needed.
pub(crate) fn push_grouped(
    groups: &mut Vec<SlotRecommendations>,
    timeslot: &str,
    rec: Recommendation,
) {
    match groups.iter_mut().find(|g| g.timeslot == timeslot) {
        Some(group) => group.recommendations.push(rec),
        None => groups.push(SlotRecommendations {
            timeslot: timeslot.to_string(),
            recommendations: vec![rec],
        }),
    }
}

#[cfg(test)]
pub(crate) fn section(
    id: SectionId,
    course: &str,
    room: &str,
    timeslot: &str,
    enrollment: u32,
    capacity: u32,
    instructors: &[InstructorId],
) -> ClassSection {
    ClassSection {
        id,
        course_number: course.to_string(),
        room: room.to_string(),
        timeslot: timeslot.to_string(),
        enrollment,
        capacity,
        instructor_ids: instructors.to_vec(),
    }
}
