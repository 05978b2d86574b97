//! HTTP handlers. Resolution misses degrade inside the generation route;
//! only the curriculum-browsing routes answer 404 for unknown subjects.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::curriculum::matcher::find_best_match;
use crate::curriculum::resolver::STRAND_MATCH_THRESHOLD;
use crate::generate::{GenerateError, LessonPlanRequest};
use crate::AppContext;

type JsonError = (StatusCode, Json<Value>);

fn error_body(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "success": false, "message": message.into() }))
}

/// GET / - service banner.
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "CBC Lesson Plan Generator API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "generate": "/generate-lesson-plan",
            "strands": "/strands/{subject}",
            "sub_strands": "/sub-strands/{subject}/{strand}",
            "curriculum": "/curriculum/{subject}",
            "metrics": "/metrics"
        }
    }))
}

/// GET /health - liveness plus backend and data-source readiness.
pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    match ctx.store.available_subjects() {
        Ok(subjects) => Json(json!({
            "status": "healthy",
            "generation": if ctx.generator.is_some() { "configured" } else { "disabled" },
            "curriculum_subjects": subjects.len(),
            "subjects": subjects,
        })),
        Err(e) => Json(json!({
            "status": "degraded",
            "generation": if ctx.generator.is_some() { "configured" } else { "disabled" },
            "message": e.to_string(),
        })),
    }
}

/// POST /generate-lesson-plan - the full pipeline.
pub async fn generate_lesson_plan(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<LessonPlanRequest>,
) -> Result<Json<Value>, JsonError> {
    let Some(generator) = &ctx.generator else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            error_body("generation disabled: completion backend not configured"),
        ));
    };

    match generator.generate(&request).await {
        Ok(plan) => Ok(Json(json!({
            "success": true,
            "message": "Lesson plan generated successfully",
            "lesson_plan": plan.lesson_plan,
            "subject_used": plan.subject_used,
            "strand_used": plan.strand_used,
            "sub_strand_used": plan.sub_strand_used,
            "curriculum_grounded": plan.curriculum_grounded,
            "tokens_used": plan.tokens_used,
        }))),
        Err(e) => Err((status_for(&e), error_body(e.to_string()))),
    }
}

fn status_for(e: &GenerateError) -> StatusCode {
    match e {
        GenerateError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        GenerateError::Backend(_) | GenerateError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        GenerateError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        GenerateError::Timeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

/// GET /strands/:subject - strand summaries for a subject.
pub async fn strands(
    State(ctx): State<Arc<AppContext>>,
    Path(subject): Path<String>,
) -> Result<Json<Value>, JsonError> {
    match ctx.store.load(&subject) {
        Ok(Some(loaded)) => {
            let strands: Vec<Value> = loaded
                .document
                .strands
                .iter()
                .map(|s| json!({ "id": s.id, "name": s.name, "code": s.code }))
                .collect();
            Ok(Json(json!({
                "success": true,
                "subject": loaded.subject,
                "strands": strands,
            })))
        }
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            error_body(format!("No curriculum found for subject '{subject}'")),
        )),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))),
    }
}

/// GET /sub-strands/:subject/:strand - sub-strand summaries within the
/// closest-matching strand.
pub async fn sub_strands(
    State(ctx): State<Arc<AppContext>>,
    Path((subject, strand)): Path<(String, String)>,
) -> Result<Json<Value>, JsonError> {
    let loaded = match ctx.store.load(&subject) {
        Ok(Some(loaded)) => loaded,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                error_body(format!("No curriculum found for subject '{subject}'")),
            ))
        }
        Err(e) => return Err((StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))),
    };

    let names: Vec<&str> = loaded
        .document
        .strands
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    let Some(m) = find_best_match(&strand, &names, STRAND_MATCH_THRESHOLD) else {
        return Ok(Json(json!({
            "success": false,
            "message": format!("Strand '{strand}' not found"),
        })));
    };

    let Some(matched) = loaded.document.strands.iter().find(|s| s.name == m.value) else {
        return Ok(Json(json!({
            "success": false,
            "message": format!("Strand '{strand}' not found"),
        })));
    };

    let sub_strands: Vec<Value> = matched
        .sub_strands
        .iter()
        .map(|ss| json!({ "id": ss.id, "name": ss.name, "topics": ss.topics }))
        .collect();
    Ok(Json(json!({
        "success": true,
        "subject": loaded.subject,
        "strand": matched.name,
        "sub_strands": sub_strands,
    })))
}

/// GET /curriculum/:subject - the complete document.
pub async fn curriculum(
    State(ctx): State<Arc<AppContext>>,
    Path(subject): Path<String>,
) -> Result<Json<Value>, JsonError> {
    match ctx.store.load(&subject) {
        Ok(Some(loaded)) => Ok(Json(json!({
            "success": true,
            "subject": loaded.subject,
            "curriculum": &*loaded.document,
        }))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            error_body(format!("No curriculum found for subject '{subject}'")),
        )),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))),
    }
}

/// GET /metrics - stage latency summary.
pub async fn metrics(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    Json(json!(ctx.metrics.summary()))
}
