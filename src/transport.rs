//! The single fetch abstraction every view goes through.
//!
//! A [`Transport`] executes one [`ApiRequest`] and returns the decoded JSON
//! body, or the raw text as a JSON string for text downloads. The production implementation is [`crate::http::HttpTransport`];
//! tests substitute an in-memory transport.

use serde_json::Value;
use std::path::PathBuf;

use crate::query::QueryParams;

/// HTTP verbs the dashboard uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Which configured base URL a path is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseUrl {
    /// REST API base (`.../api`).
    Api,
    /// Server root, where `/stats` and `/health` live.
    Root,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    /// Multipart upload of a local file under the given form field.
    File { field: String, path: PathBuf },
}

/// How the response body is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    /// Returned verbatim as [`Value::String`] (CSV and file downloads).
    Text,
}

/// One REST call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub base: BaseUrl,
    pub path: String,
    /// Free-form path segments appended after `path`, percent-encoded when
    /// the URL is built.
    pub segments: Vec<String>,
    pub params: QueryParams,
    pub body: Body,
    pub response: ResponseFormat,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            base: BaseUrl::Api,
            path: path.into(),
            segments: Vec::new(),
            params: QueryParams::new(),
            body: Body::Empty,
            response: ResponseFormat::Json,
        }
    }

    pub fn post_json(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            body: Body::Json(body),
            ..Self::get(path)
        }
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self {
            method: Method::Put,
            ..Self::get(path)
        }
    }

    pub fn put_json(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            body: Body::Json(body),
            ..Self::get(path)
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            ..Self::get(path)
        }
    }

    pub fn upload(path: impl Into<String>, field: impl Into<String>, file: PathBuf) -> Self {
        Self {
            method: Method::Post,
            body: Body::File {
                field: field.into(),
                path: file,
            },
            ..Self::get(path)
        }
    }

    /// Resolves the path against the server root instead of the API base.
    pub fn at_root(mut self) -> Self {
        self.base = BaseUrl::Root;
        self
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    /// Appends one path segment taken from user data (a tag, an id).
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Reads the response as text instead of JSON.
    pub fn text_response(mut self) -> Self {
        self.response = ResponseFormat::Text;
        self
    }
}

/// Failures at the fetch boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server could not be reached or the connection broke.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with a non-2xx status.
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },
    /// The body was not the JSON shape we expected.
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid URL `{0}`")]
    InvalidUrl(String),
    /// A local file could not be read for upload or written after download.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ApiError {
    /// Message shown inline next to write actions.
    ///
    /// Server-reported errors show the server's message; everything else
    /// collapses to a generic network error.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Status { code, .. } => format!("Server returned HTTP {code}"),
            ApiError::Io { path, source } => format!("{}: {source}", path.display()),
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::InvalidUrl(_) => {
                "Network error: could not reach the server".to_string()
            }
        }
    }

    /// Extracts a human-readable message from an error body.
    ///
    /// The backend reports errors as `{"detail": ...}`; other services use
    /// `message` or `error`. Falls back to the raw body.
    pub fn message_from_body(body: &str) -> String {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            for key in ["detail", "message", "error"] {
                match value.get(key) {
                    Some(Value::String(s)) => return s.clone(),
                    Some(Value::Null) | None => {}
                    Some(other) => return other.to_string(),
                }
            }
        }
        body.trim().to_string()
    }
}

/// Executes REST calls. Implementations must be shareable across the
/// background fetch threads.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_detail_field() {
        assert_eq!(
            ApiError::message_from_body(r#"{"detail": "Task not found"}"#),
            "Task not found"
        );
        assert_eq!(ApiError::message_from_body(r#"{"error": "bad epoch_ids"}"#), "bad epoch_ids");
        assert_eq!(ApiError::message_from_body(" Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn user_message_hides_transport_details() {
        let err = ApiError::Transport("connection refused".into());
        assert_eq!(err.user_message(), "Network error: could not reach the server");
        let err = ApiError::Status {
            code: 400,
            message: "Invalid JSON".into(),
        };
        assert_eq!(err.user_message(), "Invalid JSON");
    }

    #[test]
    fn request_builders_compose() {
        let request = ApiRequest::get("/health").at_root().param("verbose", true);
        assert_eq!(request.base, BaseUrl::Root);
        assert_eq!(request.params, vec![("verbose".to_string(), "true".to_string())]);
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.response, ResponseFormat::Json);

        let request = ApiRequest::delete("/trajectories/t1/tags").segment("slow/retry");
        assert_eq!(request.method, Method::Delete);
        assert_eq!(request.segments, vec!["slow/retry".to_string()]);
        assert_eq!(ApiRequest::get("/export/csv").text_response().response, ResponseFormat::Text);
    }
}
