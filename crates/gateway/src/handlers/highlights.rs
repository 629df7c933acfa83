//! Home-page highlight cards

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use super::validation_error;
use crate::extract::AppQuery;
use crate::AppState;
use aixiv_catalog::Highlights;
use aixiv_common::errors::Result;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct HighlightParams {
    /// Cards per list; defaults to `catalog.highlight_count`
    #[validate(range(min = 1, max = 20))]
    pub count: Option<usize>,
}

pub async fn highlights(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HighlightParams>,
) -> Result<Json<Highlights>> {
    params.validate().map_err(validation_error)?;
    let count = params.count.unwrap_or(state.config.catalog.highlight_count);

    let records = state.source.fetch_all().await?;
    Ok(Json(Highlights::build(records, count, chrono::Utc::now())))
}
