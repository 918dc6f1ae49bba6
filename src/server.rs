use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use chrono::Local;
use log::{error, info};
use std::sync::{Arc, Mutex};

use crate::audit::{AuditSink, FileAuditSink, LogAuditSink, SwapEvent, SwapPhase};
use crate::config::AppConfig;
use crate::data::{
    ApplySwapInput, ApplySwapOutput, ClassSection, RosterInput, SectionId, SwapReport,
};
use crate::engine::{SwapEngine, record_report};
use crate::error::EngineError;
use crate::swap;

type ApiError = (StatusCode, String);

pub struct AppState {
    engine: SwapEngine,
    audit: Mutex<Box<dyn AuditSink + Send>>,
}

impl AppState {
    pub fn new(engine: SwapEngine, audit: Box<dyn AuditSink + Send>) -> Self {
        Self {
            engine,
            audit: Mutex::new(audit),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let audit: Box<dyn AuditSink + Send> = match &config.audit_log {
            Some(path) => Box::new(FileAuditSink::new(path)),
            None => Box::new(LogAuditSink),
        };
        Self::new(SwapEngine::new(config.engine()), audit)
    }

    /// Runs `f` against the audit sink on the blocking pool, so file writes
    /// and the sink lock stay off the async workers.
    async fn with_audit<T: Send + 'static>(
        self: Arc<Self>,
        f: impl FnOnce(&mut dyn AuditSink) -> Result<T, EngineError> + Send + 'static,
    ) -> Result<T, ApiError> {
        tokio::task::spawn_blocking(move || {
            let mut audit = self.audit.lock().map_err(|_| audit_unavailable())?;
            f(&mut **audit).map_err(reject)
        })
        .await
        .map_err(|err| {
            error!("Audit task failed: {}", err);
            audit_unavailable()
        })?
    }
}

fn audit_unavailable() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "audit log is unavailable".to_string(),
    )
}

fn reject(err: EngineError) -> ApiError {
    let status = match &err {
        EngineError::UnknownSection(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidSection { .. } | EngineError::InvalidSwap(_) => {
            StatusCode::BAD_REQUEST
        }
        EngineError::Audit(_) | EngineError::Config(_) => {
            error!("{}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

async fn recommend_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<RosterInput>,
) -> Result<Json<SwapReport>, ApiError> {
    // matching runs unlocked; only the audit writes take the sink
    let report = state.engine.recommend(&input.sections).map_err(reject)?;
    state
        .with_audit(move |audit| record_report(audit, &report).map(|()| report))
        .await
        .map(Json)
}

/// Lists same-timeslot sections the crowded one could trade rooms with.
///
/// Uses the engine's configured policy. Under the default `target-only` policy a
/// listed partner may have more students than the crowded section's room seats;
/// configure `policy = "mutual"` to list only swaps where both sections fit.
async fn reassignments_handler(
    State(state): State<Arc<AppState>>,
    Path(section_id): Path<SectionId>,
    Json(input): Json<RosterInput>,
) -> Result<Json<Vec<ClassSection>>, ApiError> {
    swap::possible_reassignments(&input.sections, section_id, state.engine.policy())
        .map(Json)
        .map_err(reject)
}

async fn apply_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ApplySwapInput>,
) -> Result<Json<ApplySwapOutput>, ApiError> {
    let ApplySwapInput {
        mut sections,
        crowded_id,
        target_id,
        different_timeslot,
    } = input;

    let before = |id: SectionId| sections.iter().find(|s| s.id == id).cloned();
    let (crowded, target) = (before(crowded_id), before(target_id));
    let updates = swap::apply_swap(&mut sections, crowded_id, target_id, different_timeslot)
        .map_err(reject)?;

    // both exist, apply_swap checked
    if let (Some(crowded), Some(target)) = (crowded, target) {
        let event = SwapEvent {
            at: Local::now(),
            phase: SwapPhase::Manual,
            timeslot: crowded.timeslot,
            crowded_course: crowded.course_number,
            crowded_room: crowded.room,
            target_course: target.course_number,
            target_room: target.room,
        };
        state.with_audit(move |audit| audit.record(&event)).await?;
    }

    Ok(Json(ApplySwapOutput {
        sections,
        updates: updates.to_vec(),
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/swaps/recommend", post(recommend_handler))
        .route("/v1/swaps/apply", post(apply_handler))
        .route("/v1/sections/:id/reassignments", post(reassignments_handler))
        .with_state(state)
}

pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    let app = router(Arc::new(AppState::from_config(&config)));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
