use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use notebridge_core::{AnalyzeError, GatewayError, SessionError, ValidationError};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<&'static str>,
}

/// Error response: a status code and a `{ error, message }` JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: code,
                message: message.into(),
                path: None,
                rule: None,
            },
        }
    }

    pub fn invalid(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, error = self.body.error, message = %self.body.message, "request failed");
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid("malformed_body", rejection.body_text())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let mut api = Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_failed",
            err.to_string(),
        );
        api.body.rule = Some(err.rule.code());
        api.body.path = Some(err.path);
        api
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let code = match &err {
            // Not produced by the current handlers, which answer a disabled
            // integration with a 200 status body before any error mapping.
            GatewayError::Unconfigured => {
                return Self::new(StatusCode::SERVICE_UNAVAILABLE, "not_configured", err.to_string())
            }
            GatewayError::Timeout(_) => "agent_timeout",
            GatewayError::Transport(_) => "agent_unreachable",
            GatewayError::Api { .. } => "agent_error",
            GatewayError::Unparseable(_) => "agent_unparseable",
        };
        Self::new(StatusCode::BAD_GATEWAY, code, err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Unconfigured => GatewayError::Unconfigured.into(),
            SessionError::Unreachable(err) => err.into(),
        }
    }
}

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        match err {
            AnalyzeError::Busy => Self::new(StatusCode::CONFLICT, "busy", err.to_string()),
            AnalyzeError::NoNotebook => {
                Self::new(StatusCode::NOT_FOUND, "no_notebook", err.to_string())
            }
            AnalyzeError::Validation(err) => err.into(),
            AnalyzeError::Gateway(err) => err.into(),
        }
    }
}
