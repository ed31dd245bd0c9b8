//! # Error Module
//!
//! Failure values that flow through the handler chain.
//!
//! A handler reports failure with a [`HandlerError`], which the dispatcher classifies:
//!
//! - [`HandlerError::NotImplemented`] - only meaningful from `index`/`create`, where it
//!   selects the `get`/`post` fallback. It is swallowed everywhere else.
//! - [`HandlerError::Response`] - a structured [`ErrorResponse`] that knows its own status
//!   code and body. The dispatcher writes it into the response and stops the chain.
//! - [`HandlerError::Opaque`] - anything else. The configured server-error handler renders
//!   the response, unless a handler had already claimed the response by setting a status,
//!   in which case the error is surfaced to the caller.
//!
//! Begin/Finish hook failures are not recovered and come back as [`LifecycleError`].

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Captured payload of a panic raised inside an extended handler.
#[derive(Debug, Clone, Serialize)]
pub struct Caught {
    /// Panic message (`&str`/`String` payloads), or a placeholder for other payload types
    pub message: String,
    /// Backtrace rendered at the recovery site, when capture is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,
}

impl Caught {
    /// Convert a `catch_unwind` payload into a `Caught`.
    #[must_use]
    pub fn from_payload(payload: &(dyn std::any::Any + Send), capture_backtrace: bool) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        let backtrace = capture_backtrace
            .then(|| std::backtrace::Backtrace::force_capture().to_string());

        Self { message, backtrace }
    }
}

impl fmt::Display for Caught {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.backtrace {
            Some(bt) => write!(f, "panic: {}\n{}", self.message, bt),
            None => write!(f, "panic: {}", self.message),
        }
    }
}

/// Structured error that renders itself as an HTTP response.
///
/// The serialized form is the response body:
///
/// ```json
/// {"status_code":404,"error":"not_found","description":"resource not found"}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    status_code: u16,
    error: Cow<'static, str>,
    description: Cow<'static, str>,
    #[serde(skip)]
    caught: Option<Caught>,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(
        status_code: u16,
        error: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            status_code,
            error: error.into(),
            description: description.into(),
            caught: None,
        }
    }

    #[must_use]
    pub fn bad_request() -> Self {
        Self::new(400, "bad_request", "bad request")
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(401, "unauthorized", "unauthorized")
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(403, "forbidden", "forbidden")
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::new(404, "not_found", "resource not found")
    }

    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::new(405, "method_not_allowed", "method not allowed")
    }

    #[must_use]
    pub fn server_error() -> Self {
        Self::new(500, "server_error", "internal server error")
    }

    /// Server error raised when an extended handler panics.
    #[must_use]
    pub fn server_error_panic() -> Self {
        Self::new(500, "server_error_panic", "internal server error")
    }

    #[must_use]
    pub fn not_implemented() -> Self {
        Self::new(501, "not_implemented", "not implemented")
    }

    /// Replace the human readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach a recovered panic payload.
    #[must_use]
    pub fn with_caught(mut self, caught: Caught) -> Self {
        self.caught = Some(caught);
        self
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    #[must_use]
    pub fn error(&self) -> &str {
        &self.error
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn caught(&self) -> Option<&Caught> {
        self.caught.as_ref()
    }

    /// JSON body for the response.
    #[must_use]
    pub fn to_body(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|_| self.description.as_bytes().to_vec())
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status_code, self.error, self.description)?;
        if let Some(caught) = &self.caught {
            write!(f, " ({caught})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorResponse {}

/// Failure returned by a handler entry point.
#[derive(Debug, Clone)]
pub enum HandlerError {
    /// Entry point is not implemented; selects the `get`/`post` fallback
    NotImplemented,
    /// Self-describing error mapped straight into the response
    Response(ErrorResponse),
    /// Error of unknown shape, rendered by the server-error handler
    Opaque(Arc<anyhow::Error>),
}

impl HandlerError {
    /// Wrap any error as an opaque handler failure.
    pub fn opaque<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        HandlerError::Opaque(Arc::new(err.into()))
    }

    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, HandlerError::NotImplemented)
    }

    /// Structured response carried by this error, if any.
    #[must_use]
    pub fn as_response(&self) -> Option<&ErrorResponse> {
        match self {
            HandlerError::Response(er) => Some(er),
            _ => None,
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::NotImplemented => write!(f, "not implemented"),
            HandlerError::Response(er) => write!(f, "{er}"),
            HandlerError::Opaque(err) => write!(f, "{err:#}"),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HandlerError::Response(er) => Some(er),
            HandlerError::Opaque(err) => Some(&***err),
            HandlerError::NotImplemented => None,
        }
    }
}

impl From<ErrorResponse> for HandlerError {
    fn from(er: ErrorResponse) -> Self {
        HandlerError::Response(er)
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        HandlerError::Opaque(Arc::new(err))
    }
}

/// Result type returned by every handler entry point.
pub type HandlerResult = Result<(), HandlerError>;

/// Failure of a Begin/Finish lifecycle hook. Fatal to the request.
#[derive(Debug, Clone)]
pub enum LifecycleError {
    Begin(HandlerError),
    Finish(HandlerError),
}

impl LifecycleError {
    /// The hook's underlying failure.
    #[must_use]
    pub fn handler_error(&self) -> &HandlerError {
        match self {
            LifecycleError::Begin(err) | LifecycleError::Finish(err) => err,
        }
    }
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::Begin(err) => write!(f, "begin hook failed: {err}"),
            LifecycleError::Finish(err) => write!(f, "finish hook failed: {err}"),
        }
    }
}

impl std::error::Error for LifecycleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.handler_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_body() {
        let body = ErrorResponse::not_found().to_body();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["status_code"], 404);
        assert_eq!(v["error"], "not_found");
        assert!(v.get("caught").is_none());
    }

    #[test]
    fn test_caught_from_payload() {
        let payload = std::panic::catch_unwind(|| {
            std::panic::panic_any("boom".to_string());
        })
        .unwrap_err();
        let caught = Caught::from_payload(payload.as_ref(), false);
        assert_eq!(caught.message, "boom");
        assert!(caught.backtrace.is_none());
    }

    #[test]
    fn test_anyhow_converts_to_opaque() {
        let err: HandlerError = anyhow::anyhow!("db down").into();
        assert!(matches!(err, HandlerError::Opaque(_)));
        assert_eq!(err.to_string(), "db down");
        assert!(err.as_response().is_none());
    }

    #[test]
    fn test_description_override() {
        let er = ErrorResponse::bad_request().with_description("missing field `name`");
        assert_eq!(er.to_string(), "400 bad_request: missing field `name`");
        let v: serde_json::Value = serde_json::from_slice(&er.to_body()).unwrap();
        assert_eq!(v["description"], "missing field `name`");
    }

    #[test]
    fn test_not_implemented_sentinel() {
        assert!(HandlerError::NotImplemented.is_not_implemented());
        let err: HandlerError = ErrorResponse::not_implemented().into();
        assert!(!err.is_not_implemented());
    }
}
