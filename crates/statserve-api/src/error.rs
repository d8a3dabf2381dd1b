use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Classified failure of a stats request.
///
/// The kind is decided once, at the call site that observed the failure;
/// status code and client message derive from it afterwards.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no such file or directory: {path}")]
    NotFound { path: String },
    #[error("access denied: {path}")]
    Forbidden { path: String },
    #[error("undecodable path: {path}")]
    BadRequest { path: String },
    #[error("not a valid API endpoint")]
    RouteNotFound,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Path the error refers to, when the failure involved the filesystem.
    pub fn path(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { path }
            | ApiError::Forbidden { path }
            | ApiError::BadRequest { path } => Some(path),
            _ => None,
        }
    }

    /// Client-facing message. Filesystem kinds use the canonical reason of
    /// their status code; internal failures expose the raw error text.
    pub fn message(&self) -> String {
        match self {
            ApiError::RouteNotFound => "not a valid API endpoint".to_string(),
            ApiError::Internal(msg) => msg.clone(),
            _ => self
                .status()
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    status: &'static str,
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorEnvelope {
            status: "error",
            code: status.as_u16(),
            path: self.path(),
            message: self.message(),
        };
        (status, Json(&body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_message_per_kind() {
        let nf = ApiError::NotFound { path: "/x".into() };
        assert_eq!(nf.status(), StatusCode::NOT_FOUND);
        assert_eq!(nf.message(), "Not Found");
        assert_eq!(nf.path(), Some("/x"));

        let fb = ApiError::Forbidden { path: "/y".into() };
        assert_eq!(fb.status(), StatusCode::FORBIDDEN);
        assert_eq!(fb.message(), "Forbidden");

        let br = ApiError::BadRequest { path: "my%FFfile".into() };
        assert_eq!(br.status(), StatusCode::BAD_REQUEST);
        assert_eq!(br.message(), "Bad Request");
        assert_eq!(br.path(), Some("my%FFfile"));

        let rn = ApiError::RouteNotFound;
        assert_eq!(rn.status(), StatusCode::NOT_FOUND);
        assert_eq!(rn.message(), "not a valid API endpoint");
        assert_eq!(rn.path(), None);

        let ie = ApiError::Internal("disk on fire".into());
        assert_eq!(ie.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ie.message(), "disk on fire");
        assert_eq!(ie.path(), None);
    }

    #[test]
    fn envelope_omits_missing_path() {
        let body = ErrorEnvelope {
            status: "error",
            code: 404,
            path: None,
            message: "not a valid API endpoint".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("path").is_none());
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], 404);
    }
}
