use log::{info, trace};
use std::collections::HashSet;
use std::time::Instant;

use crate::audit::{AuditSink, SwapEvent, SwapPhase};
use crate::cross_slot::match_cross_slot;
use crate::data::{ClassSection, SlotRecommendations, SwapReport};
use crate::error::EngineError;
use crate::policy::CapacityPolicy;
use crate::same_slot::match_same_slot;

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    pub policy: CapacityPolicy,
}

/// Runs the same-slot phase, then the cross-slot phase on what is left over.
#[derive(Debug, Clone, Default)]
pub struct SwapEngine {
    config: EngineConfig,
}

impl SwapEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn policy(&self) -> CapacityPolicy {
        self.config.policy
    }

    /// Produces every swap recommendation for the roster.
    ///
    /// Nothing is audited here; pass the report to [`record_report`] for that.
    pub fn recommend(&self, roster: &[ClassSection]) -> Result<SwapReport, EngineError> {
        let start_time = Instant::now();
        validate_roster(roster)?;
        info!(
            "Matching {} sections ({} overcrowded) with {:?} capacity policy...",
            roster.len(),
            roster.iter().filter(|s| s.is_overcrowded()).count(),
            self.config.policy
        );

        let same_slot = match_same_slot(roster, self.config.policy);
        info!(
            "Same-slot phase: {} swaps, {} sections unresolved",
            count(&same_slot.recommendations),
            same_slot.unresolved.len()
        );

        // sections already paired in phase 1 keep their room
        let reserved = same_slot.swapped_ids();
        let cross_slot = match_cross_slot(
            &same_slot.unresolved,
            roster,
            &reserved,
            self.config.policy,
        );
        info!(
            "Cross-slot phase: {} swaps, {} sections still over capacity",
            count(&cross_slot.recommendations),
            cross_slot.unresolved.len()
        );

        let report = SwapReport {
            same_slot_swaps: same_slot.recommendations,
            unresolved: same_slot.unresolved,
            cross_slot_swaps: cross_slot.recommendations,
            section_updates: cross_slot.updates,
            still_over_capacity: cross_slot.unresolved,
        };
        info!(
            "Matching finished in {:.2?} with {} swaps",
            start_time.elapsed(),
            report.swap_count()
        );
        Ok(report)
    }
}

/// Writes one audit event per recommendation in `report`, same-slot swaps first.
pub fn record_report(audit: &mut dyn AuditSink, report: &SwapReport) -> Result<(), EngineError> {
    record_all(audit, SwapPhase::SameSlot, &report.same_slot_swaps)?;
    record_all(audit, SwapPhase::CrossSlot, &report.cross_slot_swaps)
}

/// Rejects rosters the matchers are not defined for.
pub fn validate_roster(roster: &[ClassSection]) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for section in roster {
        if !seen.insert(section.id) {
            return Err(invalid(section, "duplicate section id"));
        }
        if section.timeslot.trim().is_empty() {
            return Err(invalid(section, "missing timeslot"));
        }
        if section.room.trim().is_empty() {
            return Err(invalid(section, "missing room"));
        }
    }
    trace!("Roster of {} sections is valid", roster.len());
    Ok(())
}

fn invalid(section: &ClassSection, reason: &str) -> EngineError {
    EngineError::InvalidSection {
        id: section.id,
        reason: reason.to_string(),
    }
}

fn count(groups: &[SlotRecommendations]) -> usize {
    groups.iter().map(|g| g.recommendations.len()).sum()
}

// cross-slot events are logged under the slot the crowded section leaves
fn record_all(
    audit: &mut dyn AuditSink,
    phase: SwapPhase,
    groups: &[SlotRecommendations],
) -> Result<(), EngineError> {
    for group in groups {
        for rec in &group.recommendations {
            let timeslot = rec.old_timeslot.as_deref().unwrap_or(&group.timeslot);
            audit.record(&SwapEvent::from_recommendation(phase, timeslot, rec))?;
        }
    }
    Ok(())
}
