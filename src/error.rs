//! Error taxonomy shared by every route, and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("Please provide coordinates as the `coords` query parameter.")]
    MissingInput,

    #[error("Coordinates must be a JSON array of {{lat, lon, population}} objects.")]
    MalformedJson(String),

    #[error("At least one coordinate is required.")]
    EmptyInput,

    #[error("Invalid coordinate format. Ensure lat, lon, and population are numbers.")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Could not generate a concave hull. Try increasing maxEdge.")]
    HullUnavailable,

    #[error("Could not generate Voronoi polygons. At least three distinct, non-collinear points are required.")]
    VoronoiUnavailable,

    #[error("Could not determine an optimal point for the given coordinates.")]
    OptimalPointUnavailable,

    #[error("An error occurred while processing the data.")]
    Unexpected(String),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::MissingInput => "MISSING_INPUT",
            ServiceError::MalformedJson(_) => "MALFORMED_JSON",
            ServiceError::EmptyInput => "EMPTY_INPUT",
            ServiceError::InvalidField { .. } => "INVALID_FIELD",
            ServiceError::HullUnavailable => "HULL_UNAVAILABLE",
            ServiceError::VoronoiUnavailable => "VORONOI_UNAVAILABLE",
            ServiceError::OptimalPointUnavailable => "OPTIMAL_POINT_UNAVAILABLE",
            ServiceError::Unexpected(_) => "UNEXPECTED_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing diagnostic. Internal errors never expose theirs.
    pub fn details(&self) -> Option<String> {
        match self {
            ServiceError::MalformedJson(diag) => Some(diag.clone()),
            ServiceError::InvalidField { index, field, reason } => {
                Some(format!("coords[{}].{}: {}", index, field, reason))
            }
            _ => None,
        }
    }
}

/// JSON body returned with every error status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&ServiceError> for ErrorBody {
    fn from(err: &ServiceError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
            details: err.details(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match &self {
            ServiceError::Unexpected(diag) => tracing::error!("Error processing coordinates: {}", diag),
            other => tracing::debug!(code = other.code(), "Rejected request: {}", other),
        }
        (self.status(), Json(ErrorBody::from(&self))).into_response()
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Unexpected(err.to_string())
    }
}
