use std::collections::HashMap;

use crate::data::{ClassSection, InstructorId};

/// Which timeslots each instructor currently teaches in.
///
/// Counts sections per timeslot rather than storing a set, so moving one of two
/// sections an instructor teaches at the same time leaves them busy there.
#[derive(Debug, Clone, Default)]
pub struct InstructorSchedule {
    busy: HashMap<InstructorId, HashMap<String, usize>>,
}

impl InstructorSchedule {
    pub fn from_sections(sections: &[ClassSection]) -> Self {
        let mut schedule = Self::default();
        for section in sections {
            for &instructor in &section.instructor_ids {
                schedule.add(instructor, &section.timeslot);
            }
        }
        schedule
    }

    pub fn is_busy(&self, instructor: InstructorId, timeslot: &str) -> bool {
        self.busy
            .get(&instructor)
            .and_then(|slots| slots.get(timeslot))
            .is_some_and(|&count| count > 0)
    }

    /// A section with several instructors conflicts if any one of them is busy.
    pub fn any_busy(&self, instructors: &[InstructorId], timeslot: &str) -> bool {
        instructors.iter().any(|&i| self.is_busy(i, timeslot))
    }

    /// Moves one teaching commitment of `instructor` from `from` to `to`.
    pub fn reassign(&mut self, instructor: InstructorId, from: &str, to: &str) {
        if let Some(slots) = self.busy.get_mut(&instructor) {
            if let Some(count) = slots.get_mut(from) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    slots.remove(from);
                }
            }
        }
        self.add(instructor, to);
    }

    fn add(&mut self, instructor: InstructorId, timeslot: &str) {
        *self
            .busy
            .entry(instructor)
            .or_default()
            .entry(timeslot.to_string())
            .or_insert(0) += 1;
    }
}
