//! Error types for the backend client.

use std::fmt;

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Backend operations, named in generic failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /api/trendlines`
    ListTrendlines,
    /// `POST /api/trendlines`
    CreateTrendline,
    /// `PATCH /api/trendlines/:id`
    UpdateTrendline,
    /// `DELETE /api/trendlines/:id`
    DeleteTrendline,
    /// `GET /api/ohlc`
    FetchOhlc,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ListTrendlines => "fetch trendlines",
            Operation::CreateTrendline => "create trendline",
            Operation::UpdateTrendline => "update trendline",
            Operation::DeleteTrendline => "delete trendline",
            Operation::FetchOhlc => "fetch OHLC data",
        };
        f.write_str(name)
    }
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field path, dotted for nested fields (e.g. `startPrice`).
    pub field: String,
    /// Why the value was rejected.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Main error type for the backend client.
#[derive(Debug)]
pub enum Error {
    /// HTTP request failed
    Http(reqwest::Error),
    /// JSON serialization/deserialization error
    Json(serde_json::Error),
    /// URL parsing error
    UrlParse(url::ParseError),
    /// Request body rejected, with per-field detail
    Validation {
        /// Summary message.
        message: String,
        /// Rejected fields.
        fields: Vec<FieldError>,
    },
    /// The addressed record does not exist
    NotFound {
        /// Path of the missing resource.
        resource: String,
    },
    /// Non-success status that is neither a validation error nor a 404
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message or raw body.
        message: String,
    },
    /// Generic failure of a named operation
    Failed {
        /// The operation that failed.
        operation: Operation,
        /// Underlying cause, rendered.
        reason: String,
    },
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::UrlParse(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
            Error::UrlParse(e) => write!(f, "URL parse error: {e}"),
            Error::Validation { message, fields } => {
                write!(f, "{message}")?;
                for (i, field) in fields.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { ", " };
                    write!(f, "{sep}{field}")?;
                }
                Ok(())
            }
            Error::NotFound { resource } => write!(f, "Not found: {resource}"),
            Error::Status { status, message } => write!(f, "HTTP {status}: {message}"),
            Error::Failed { operation, reason } => write!(f, "Failed to {operation}: {reason}"),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::UrlParse(err)
    }
}

impl Error {
    /// Build a validation error from rejected fields.
    pub fn validation(fields: Vec<FieldError>) -> Self {
        Error::Validation {
            message: "Invalid trendline data".to_string(),
            fields,
        }
    }

    /// Attribute this error to `operation`.
    ///
    /// Validation and not-found errors keep their structure; everything else
    /// becomes [`Error::Failed`].
    pub fn in_operation(self, operation: Operation) -> Self {
        match self {
            Error::Validation { .. } | Error::NotFound { .. } | Error::Failed { .. } => self,
            other => Error::Failed {
                operation,
                reason: other.to_string(),
            },
        }
    }

    /// Check if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Rejected fields, empty unless this is a validation error.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Error::Validation { fields, .. } => fields,
            _ => &[],
        }
    }
}

/// Error body returned by the backend.
///
/// `errors` is present on validation failures; each issue carries a `path`
/// array of keys/indices and a `message`.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    errors: Vec<IssueBody>,
}

#[derive(Debug, serde::Deserialize)]
struct IssueBody {
    #[serde(default)]
    path: Vec<serde_json::Value>,
    message: String,
}

/// Map a non-success response to an [`Error`].
pub(crate) fn error_from_response(status: u16, body: &str, resource: &str) -> Error {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();

    match status {
        400 => {
            let (message, issues) = match parsed {
                Some(b) => (b.message, b.errors),
                None => ("Invalid trendline data".to_string(), Vec::new()),
            };
            let fields = issues
                .into_iter()
                .map(|issue| {
                    let field = issue
                        .path
                        .iter()
                        .map(|segment| match segment {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(".");
                    FieldError::new(field, issue.message)
                })
                .collect();
            Error::Validation { message, fields }
        }
        404 => Error::NotFound {
            resource: resource.to_string(),
        },
        _ => Error::Status {
            status,
            message: parsed.map_or_else(|| body.to_string(), |b| b.message),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_body_is_decoded_per_field() {
        let body = r#"{
            "message": "Invalid trendline data",
            "errors": [
                {"code": "invalid_type", "path": ["startPrice"], "message": "Expected number, received string"},
                {"code": "invalid_type", "path": ["end", 0], "message": "Required"}
            ]
        }"#;

        let err = error_from_response(400, body, "/api/trendlines");
        assert!(err.is_validation());
        let fields = err.field_errors();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "startPrice");
        assert_eq!(fields[0].message, "Expected number, received string");
        assert_eq!(fields[1].field, "end.0");
    }

    #[test]
    fn test_unparseable_400_is_still_validation() {
        let err = error_from_response(400, "bad request", "/api/trendlines");
        assert!(err.is_validation());
        assert!(err.field_errors().is_empty());
    }

    #[test]
    fn test_404_is_not_found() {
        let err = error_from_response(404, r#"{"message":"Trendline not found"}"#, "/api/trendlines/9");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: /api/trendlines/9");
    }

    #[test]
    fn test_500_keeps_server_message() {
        let err = error_from_response(500, r#"{"message":"Failed to fetch trendlines"}"#, "/api/trendlines");
        match err {
            Error::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Failed to fetch trendlines");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_in_operation_wraps_generic_failures() {
        let err = Error::Status {
            status: 502,
            message: "bad gateway".to_string(),
        }
        .in_operation(Operation::DeleteTrendline);

        assert_eq!(err.to_string(), "Failed to delete trendline: HTTP 502: bad gateway");
    }

    #[test]
    fn test_in_operation_keeps_structured_errors() {
        let err = Error::validation(vec![FieldError::new("color", "must be #RRGGBB")])
            .in_operation(Operation::CreateTrendline);
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Invalid trendline data: color: must be #RRGGBB");

        let err = Error::NotFound {
            resource: "/api/trendlines/1".to_string(),
        }
        .in_operation(Operation::UpdateTrendline);
        assert!(err.is_not_found());
    }
}
