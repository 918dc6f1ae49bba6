use itertools::Itertools;
use log::{debug, trace};
use std::collections::HashSet;

use crate::data::{
    ClassSection, Recommendation, SectionId, SlotRecommendations, group_by_timeslot,
};
use crate::policy::CapacityPolicy;

/// Result of the same-slot phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SameSlotOutcome {
    pub recommendations: Vec<SlotRecommendations>,
    pub unresolved: Vec<ClassSection>,
}

impl SameSlotOutcome {
    /// Every section taking part in a recommended swap, on either side.
    pub fn swapped_ids(&self) -> HashSet<SectionId> {
        self.recommendations
            .iter()
            .flat_map(|g| &g.recommendations)
            .flat_map(|rec| [rec.crowded_id, rec.target_id])
            .collect()
    }
}

/// Pairs overcrowded sections with roomier sections meeting at the same time.
///
/// Each timeslot is handled on its own. Worst-crowded sections pick first and
/// take the roomiest acceptable partner; a section is used as a swap target at
/// most once per timeslot. Crowded sections left without a partner are returned
/// in `unresolved`.
pub fn match_same_slot(sections: &[ClassSection], policy: CapacityPolicy) -> SameSlotOutcome {
    let mut outcome = SameSlotOutcome::default();

    for (timeslot, classes) in group_by_timeslot(sections) {
        // stable sorts: ties keep input order
        let overfull: Vec<&ClassSection> = classes
            .iter()
            .copied()
            .filter(|c| c.is_overcrowded())
            .sorted_by(|a, b| b.enrollment.cmp(&a.enrollment))
            .collect();
        if overfull.is_empty() {
            continue;
        }
        trace!(
            "{}: {} overcrowded of {} sections",
            timeslot,
            overfull.len(),
            classes.len()
        );

        let mut spare: Vec<&ClassSection> = classes
            .iter()
            .copied()
            .sorted_by(|a, b| b.spare_seats().cmp(&a.spare_seats()))
            .collect();
        let mut used_target: HashSet<SectionId> = HashSet::new();
        let mut slot_recs = Vec::new();

        for crowded in overfull {
            let found = spare.iter().position(|target| {
                target.room != crowded.room
                    && policy.allows(crowded, target)
                    && !used_target.contains(&target.id)
            });

            match found {
                Some(pos) => {
                    let target = spare.remove(pos);
                    debug!("{}: {} -> room {}", timeslot, crowded, target.room);
                    used_target.insert(target.id);
                    slot_recs.push(Recommendation {
                        crowded_id: crowded.id,
                        crowded_course: crowded.course_number.clone(),
                        crowded_room: crowded.room.clone(),
                        target_id: target.id,
                        target_course: target.course_number.clone(),
                        target_room: target.room.clone(),
                        reason: format!(
                            "{} students need {}-seat room",
                            crowded.enrollment, target.capacity
                        ),
                        old_timeslot: None,
                        new_timeslot: None,
                    });
                }
                None => {
                    debug!("{}: no same-slot partner for {}", timeslot, crowded);
                    outcome.unresolved.push(crowded.clone());
                }
            }
        }

        if !slot_recs.is_empty() {
            outcome.recommendations.push(SlotRecommendations {
                timeslot,
                recommendations: slot_recs,
            });
        }
    }

    outcome
}
