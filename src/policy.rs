use serde::{Deserialize, Serialize};

use crate::data::ClassSection;

/// Decides which side of a swap must have room for the other.
///
/// `TargetOnly` only requires the target's room to hold the crowded section.
/// `Mutual` also requires the crowded section's current room to hold the target's
/// headcount, so the swap cannot overcrowd the target in turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapacityPolicy {
    #[default]
    TargetOnly,
    Mutual,
}

impl CapacityPolicy {
    pub fn allows(self, crowded: &ClassSection, target: &ClassSection) -> bool {
        match self {
            CapacityPolicy::TargetOnly => target.can_absorb(crowded),
            CapacityPolicy::Mutual => target.can_absorb(crowded) && crowded.can_absorb(target),
        }
    }
}
