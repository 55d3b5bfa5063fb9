//! Maps `EngineError`'s spec §7 taxonomy onto HTTP status codes. The engine
//! never knows about HTTP; this is the only place that translation happens.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use poker_engine::{EngineError, ErrorKind};

use crate::dto::ErrorBody;

pub struct AppError(pub EngineError);

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unavailable => StatusCode::NOT_FOUND,
            ErrorKind::ProtocolTiming => StatusCode::BAD_REQUEST,
            ErrorKind::ExternalTransient => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::InvariantViolation => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}
