//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTML response conversion.

use std::collections::BTreeMap;

use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::api::flash::Flash;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Login required")]
    LoginRequired,

    #[error("{message}")]
    Forbidden {
        message: String,
        redirect_to: &'static str,
    },

    #[error("Invalid username or password")]
    InvalidCredentials,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    /// Unique constraint violated; the payload names what collided.
    #[error("{0} already exists")]
    Conflict(String),

    /// Delete refused because the row is still referenced.
    #[error("{0}")]
    Protected(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    /// Form input rejected; handlers re-render the form with these errors.
    #[error("Invalid form input: {0}")]
    Invalid(FieldErrors),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // External service errors
    #[error("Database error")]
    Database(#[source] DbErr),

    #[error("Session token error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Template error")]
    Template(#[from] tera::Error),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Malformed path parameters (a non-numeric order id) read as a missing page.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Unmatched path parameters: {}", rejection.body_text());
        AppError::NotFound
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => AppError::Protected(detail),
            _ => AppError::Database(err),
        }
    }
}

impl AppError {
    /// Get HTTP status code
    fn status(&self) -> StatusCode {
        match self {
            AppError::LoginRequired | AppError::Forbidden { .. } => StatusCode::SEE_OTHER,
            AppError::InvalidCredentials | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Protected(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::Invalid(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Database(_)
            | AppError::Template(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Jwt(e) => {
                tracing::error!("Session token error: {:?}", e);
                "Invalid or expired session".to_string()
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::LoginRequired => Redirect::to("/").into_response(),
            AppError::Forbidden {
                message,
                redirect_to,
            } => Flash::error(message).redirect(redirect_to),
            other => {
                let status = other.status();
                let body = format!(
                    "<!DOCTYPE html><html><head><title>{code}</title></head>\
                     <body><h1>{code}</h1><p>{message}</p><p><a href=\"/dashboard/\">Back</a></p></body></html>",
                    code = status,
                    message = tera::escape_html(&other.user_message()),
                );
                (status, Html(body)).into_response()
            }
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Inline form errors keyed by field name. `__all__` holds errors not tied
/// to a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub const NON_FIELD: &'static str = "__all__";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Fold `Validate` output in, using each error's message (or code).
    pub fn extend_validation(&mut self, result: Result<(), ValidationErrors>) {
        let Err(errors) = result else { return };
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                self.add(&field, message);
            }
        }
    }

    /// `Err(AppError::Invalid)` when anything was collected.
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Invalid(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn forbidden(redirect_to: &'static str) -> Self {
        AppError::Forbidden {
            message: "You do not have access to this page".to_string(),
            redirect_to,
        }
    }

    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn protected(msg: impl Into<String>) -> Self {
        AppError::Protected(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// True for unique-constraint failures, whichever layer detected them.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{LOCATION, SET_COOKIE};

    #[test]
    fn test_login_required_redirects_to_login() {
        let response = AppError::LoginRequired.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
    }

    #[test]
    fn test_forbidden_sets_flash_and_redirects() {
        let response = AppError::forbidden("/products/").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/products/");
        assert!(response.headers().get(SET_COOKIE).is_some());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::protected("in use").into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::internal("boom").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_field_errors_collects_validation() {
        use validator::Validate;

        #[derive(Validate)]
        struct Form {
            #[validate(length(min = 1, message = "Name is required"))]
            name: String,
        }

        let mut errors = FieldErrors::new();
        errors.extend_validation(Form { name: String::new() }.validate());
        errors.add("photo", "Only JPG, PNG and GIF formats are supported");

        assert_eq!(errors.get("name"), ["Name is required".to_string()]);
        assert!(errors.has("photo"));
        assert!(errors.get("missing").is_empty());
        assert!(matches!(errors.into_result(), Err(AppError::Invalid(_))));
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_non_constraint_db_error_stays_database() {
        let err = AppError::from(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, AppError::Database(_)));
    }
}
