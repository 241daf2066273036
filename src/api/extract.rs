//! Path extraction that renders the not-found page on malformed values.

use axum::extract::{FromRequestParts, Path};

use crate::errors::AppError;

/// `Path` whose rejection is `AppError::NotFound`
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct PagePath<T>(pub T);
