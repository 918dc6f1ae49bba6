use chrono::{DateTime, Local};
use log::info;
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::data::Recommendation;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwapPhase {
    SameSlot,
    CrossSlot,
    Manual,
}

impl fmt::Display for SwapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwapPhase::SameSlot => "same-slot",
            SwapPhase::CrossSlot => "cross-slot",
            SwapPhase::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// One accepted swap, as written to the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapEvent {
    pub at: DateTime<Local>,
    pub phase: SwapPhase,
    pub timeslot: String,
    pub crowded_course: String,
    pub crowded_room: String,
    pub target_course: String,
    pub target_room: String,
}

impl SwapEvent {
    pub fn from_recommendation(phase: SwapPhase, timeslot: &str, rec: &Recommendation) -> Self {
        Self {
            at: Local::now(),
            phase,
            timeslot: timeslot.to_string(),
            crowded_course: rec.crowded_course.clone(),
            crowded_room: rec.crowded_room.clone(),
            target_course: rec.target_course.clone(),
            target_room: rec.target_room.clone(),
        }
    }
}

impl fmt::Display for SwapEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {} ({}) <-> {} ({})",
            self.at.format("%Y-%m-%d %H:%M:%S"),
            self.phase,
            self.timeslot,
            self.crowded_course,
            self.crowded_room,
            self.target_course,
            self.target_room
        )
    }
}

/// Receives every swap the engine accepts, for operator review.
pub trait AuditSink {
    fn record(&mut self, event: &SwapEvent) -> Result<(), EngineError>;
}

/// Appends one line per event to a text file.
#[derive(Debug, Clone)]
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AuditSink for FileAuditSink {
    fn record(&mut self, event: &SwapEvent) -> Result<(), EngineError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", event)?;
        Ok(())
    }
}

/// Keeps events in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    pub events: Vec<SwapEvent>,
}

impl AuditSink for MemoryAuditSink {
    fn record(&mut self, event: &SwapEvent) -> Result<(), EngineError> {
        self.events.push(event.clone());
        Ok(())
    }
}

/// Writes events through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&mut self, event: &SwapEvent) -> Result<(), EngineError> {
        info!(target: "audit", "{}", event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event() -> SwapEvent {
        SwapEvent {
            at: Local.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap(),
            phase: SwapPhase::SameSlot,
            timeslot: "TTh 9:00".into(),
            crowded_course: "CSCI1010".into(),
            crowded_room: "PKI 160".into(),
            target_course: "CSCI1020".into(),
            target_room: "PKI 170".into(),
        }
    }

    #[test]
    fn renders_one_readable_line() {
        assert_eq!(
            event().to_string(),
            "[2025-10-01 09:00:00] same-slot TTh 9:00: CSCI1010 (PKI 160) <-> CSCI1020 (PKI 170)"
        );
    }

    #[test]
    fn file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swap_log.txt");
        let mut sink = FileAuditSink::new(&path);

        sink.record(&event()).unwrap();
        let mut second = event();
        second.phase = SwapPhase::CrossSlot;
        sink.record(&second).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("same-slot"));
        assert!(lines[1].contains("cross-slot"));
    }

    #[test]
    fn file_sink_reports_unwritable_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileAuditSink::new(dir.path().join("missing").join("log.txt"));
        assert!(matches!(sink.record(&event()), Err(EngineError::Audit(_))));
    }

    #[test]
    fn memory_sink_collects_events() {
        let mut sink = MemoryAuditSink::default();
        sink.record(&event()).unwrap();
        assert_eq!(sink.events, vec![event()]);
    }
}
