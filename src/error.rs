use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed filter expression for '{key}': '{value}' ({reason})")]
    MalformedFilterExpression {
        key: String,
        value: String,
        reason: String,
    },

    #[error("missing study parameter when filtering by '{key}'")]
    MissingStudyContext { key: String },

    #[error("missing file parameter when filtering by '{key}'")]
    MissingFileContext { key: String },

    #[error("unsupported format field '{field}' in '{key}': only DP is permitted")]
    UnsupportedFormatField { key: String, field: String },

    #[error("unsupported filter '{key}': the search index cannot express it")]
    UnsupportedFilter { key: String },

    #[error("malformed facet expression '{facet}': {reason}")]
    MalformedFacetExpression { facet: String, reason: String },

    #[error("ambiguous parameters: {0}")]
    AmbiguousActionParams(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn malformed(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::MalformedFilterExpression {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_facet(facet: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedFacetExpression {
            facet: facet.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Error::MalformedFilterExpression { .. } => "MalformedFilterExpression",
            Error::MissingStudyContext { .. } => "MissingStudyContext",
            Error::MissingFileContext { .. } => "MissingFileContext",
            Error::UnsupportedFormatField { .. } => "UnsupportedFormatField",
            Error::UnsupportedFilter { .. } => "UnsupportedFilter",
            Error::MalformedFacetExpression { .. } => "MalformedFacetExpression",
            Error::AmbiguousActionParams(_) => "AmbiguousActionParams",
            Error::InvalidInput(_) => "InvalidInput",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                kind: self.kind(),
                message: self.to_string(),
            },
        };
        // every failure is a problem with the request
        (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
    }
}
