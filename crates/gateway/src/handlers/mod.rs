//! API handlers module

pub mod catalog;
pub mod health;
pub mod highlights;
pub mod views;

use aixiv_common::errors::AppError;
use validator::ValidationErrors;

/// Map validator output to the first offending field
pub(crate) fn validation_error(errors: ValidationErrors) -> AppError {
    let field = errors.field_errors().keys().next().map(|f| f.to_string());
    AppError::Validation {
        message: errors.to_string(),
        field,
    }
}
