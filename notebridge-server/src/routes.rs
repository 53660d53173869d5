use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use notebridge_core::{validate, AnalyzeOutcome, NotebookSnapshot, SessionError};

use crate::{ApiError, AppState};

pub(crate) async fn health(State(state): State<AppState>) -> Json<Value> {
    let integration = match (
        state.gateway.is_configured(),
        state.gateway.can_create_agents(),
    ) {
        (true, true) => "configured",
        // Credentials without a template: no session can be opened.
        (true, false) => "incomplete",
        (false, _) => "disabled",
    };
    Json(json!({
        "ok": true,
        "ts": Utc::now().to_rfc3339(),
        "analysis": state.orchestrator.state(),
        "lastOutcome": state.orchestrator.last_outcome(),
        "integration": integration,
    }))
}

pub(crate) async fn save_notebook(
    State(state): State<AppState>,
    payload: Result<Json<NotebookSnapshot>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(snapshot) = payload?;
    tracing::info!(
        notebook_id = ?snapshot.notebook_id,
        agent_id = ?snapshot.agent_id,
        saved_at = %snapshot.saved_at,
        "notebook save received"
    );

    let stored = state.notebooks.save(snapshot);

    // Side effects run one save at a time, and only for the snapshot that is
    // still current, so the mirror and the agent end on the newest save.
    let forwarded = {
        let _ordered = state.save_effects.lock().await;
        let current = state
            .notebooks
            .current()
            .is_some_and(|current| Arc::ptr_eq(&current, &stored));
        if current {
            if let Some(path) = &state.notebook_log {
                mirror_snapshot(path, &stored.value).await;
            }
            forward_snapshot(&state, &stored.value).await
        } else {
            tracing::debug!(saved_at = %stored.value.saved_at, "save superseded before its side effects ran");
            false
        }
    };

    Ok(Json(json!({
        "ok": true,
        "ts": stored.stored_at.to_rfc3339(),
        "received": stored.value,
        "forwarded": forwarded,
    })))
}

async fn forward_snapshot(state: &AppState, snapshot: &NotebookSnapshot) -> bool {
    if !state.gateway.is_configured() {
        return false;
    }
    let Some(session) = state.sessions.current() else {
        return false;
    };
    match state.gateway.forward_snapshot(snapshot, &session).await {
        Ok(()) => {
            tracing::debug!(agent_id = %session.agent_id, "notebook forwarded to agent");
            true
        }
        Err(err) => {
            tracing::warn!(agent_id = %session.agent_id, error = %err, "notebook forward failed");
            false
        }
    }
}

/// Replace the mirror file through a sibling temp file, so readers never see
/// a partly written snapshot.
async fn mirror_snapshot(path: &Path, snapshot: &NotebookSnapshot) {
    let bytes = match serde_json::to_vec_pretty(snapshot) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "failed to encode notebook mirror");
            return;
        }
    };
    let staging = staging_path(path);
    let written = match tokio::fs::write(&staging, bytes).await {
        Ok(()) => tokio::fs::rename(&staging, path).await,
        Err(err) => Err(err),
    };
    if let Err(err) = written {
        tracing::warn!(path = %path.display(), error = %err, "failed to write notebook mirror");
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| OsString::from("notebook"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// The run is spawned so that a client disconnect does not cancel it.
pub(crate) async fn analyze(State(state): State<AppState>) -> Result<Response, ApiError> {
    let orchestrator = state.orchestrator.clone();
    let outcome = tokio::spawn(async move { orchestrator.analyze().await })
        .await
        .map_err(|err| ApiError::internal("analysis_task", err.to_string()))??;

    Ok(match outcome {
        AnalyzeOutcome::Committed(published) => Json(&published.value).into_response(),
        AnalyzeOutcome::NotConfigured => Json(json!({
            "ok": true,
            "status": "not_configured",
            "message": "agent integration is not configured; no analysis was run",
        }))
        .into_response(),
    })
}

pub(crate) async fn read_result(State(state): State<AppState>) -> Response {
    match state.cache.read() {
        Some(published) => Json(&published.value).into_response(),
        None => Json(json!({ "status": "empty" })).into_response(),
    }
}

/// Development override: publish a hand-written result. It is validated like
/// an agent reply but does not take the single-flight slot.
pub(crate) async fn override_result(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = payload?;
    let result = validate(&payload)?;
    let published = state.cache.publish(result);
    tracing::info!("analysis result overridden");

    Ok(Json(json!({
        "ok": true,
        "ts": published.stored_at.to_rfc3339(),
        "status": "published",
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAgentRequest {
    notebook_id: Option<String>,
    meta: Option<Value>,
}

pub(crate) async fn create_agent(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateAgentRequest::default()
    } else {
        serde_json::from_slice::<CreateAgentRequest>(&body)
            .map_err(|err| ApiError::invalid("malformed_body", err.to_string()))?
    };
    tracing::info!(notebook_id = ?request.notebook_id, meta = ?request.meta, "agent create requested");

    let received = || {
        Json(json!({
            "ok": true,
            "event": "agent.create.received",
            "ts": Utc::now().to_rfc3339(),
            "notebookId": request.notebook_id,
        }))
    };
    if !state.gateway.is_configured() {
        return Ok(received());
    }

    match state
        .sessions
        .create_session(request.notebook_id.as_deref())
        .await
    {
        Ok(session) => Ok(Json(json!({
            "ok": true,
            "event": "agent.create.created",
            "ts": Utc::now().to_rfc3339(),
            "notebookId": request.notebook_id,
            "agentId": session.agent_id,
        }))),
        Err(SessionError::Unconfigured) => Ok(received()),
        Err(err) => Err(err.into()),
    }
}
