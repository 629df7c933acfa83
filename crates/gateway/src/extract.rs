//! Extractors whose rejections render as the standard error body

use aixiv_common::errors::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// `Json` whose malformed or mistyped bodies are a 400 validation error
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` whose unparseable query strings are a 400 validation error
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// `Path` whose unparseable segments are a 400 validation error
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
