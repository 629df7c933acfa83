//! View session handlers
//!
//! A view is a server-held list view: filter, ordering, and page over the
//! last successfully fetched catalog. Query changes refetch; page changes
//! re-slice what is already loaded.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::catalog::MAX_PAGE_SIZE;
use super::validation_error;
use crate::extract::{AppJson, AppPath};
use crate::views;
use crate::AppState;
use aixiv_catalog::{CatalogFilter, CatalogView, SortKey, ViewSnapshot};
use aixiv_common::errors::Result;

/// Create view request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateViewRequest {
    #[validate(range(min = 1, max = MAX_PAGE_SIZE))]
    pub page_size: Option<usize>,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub q: String,

    pub doc_type: Option<String>,

    pub status: Option<String>,

    pub sort: Option<String>,
}

/// Query change request; absent fields stay as they are
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateViewRequest {
    #[validate(length(max = 500))]
    pub q: Option<String>,

    pub doc_type: Option<String>,

    pub status: Option<String>,

    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: u32,
}

#[derive(Serialize)]
pub struct ViewResponse {
    pub view_id: Uuid,
    #[serde(flatten)]
    pub snapshot: ViewSnapshot,
}

fn parse_sort(raw: Option<&str>) -> Result<Option<SortKey>> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some),
    }
}

/// Create a view and run its first fetch
pub async fn create_view(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateViewRequest>,
) -> Result<(StatusCode, Json<ViewResponse>)> {
    request.validate().map_err(validation_error)?;

    let sort = parse_sort(request.sort.as_deref())?.unwrap_or_default();
    let view = CatalogView::new(request.page_size.unwrap_or(state.config.catalog.page_size))?
        .with_sort(sort)
        .with_filter(CatalogFilter {
            query: request.q,
            doc_type: request.doc_type,
            status: request.status,
        });

    let (view_id, session) = state.views.create(view).await?;
    let snapshot = views::refresh(&session, state.source.as_ref()).await;

    Ok((StatusCode::CREATED, Json(ViewResponse { view_id, snapshot })))
}

pub async fn get_view(
    State(state): State<AppState>,
    AppPath(view_id): AppPath<Uuid>,
) -> Result<Json<ViewResponse>> {
    let session = state.views.get(view_id).await?;
    let snapshot = session.lock().await.view.snapshot();
    Ok(Json(ViewResponse { view_id, snapshot }))
}

/// Change query, labels, or ordering; refetches when anything changed
pub async fn update_query(
    State(state): State<AppState>,
    AppPath(view_id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateViewRequest>,
) -> Result<Json<ViewResponse>> {
    request.validate().map_err(validation_error)?;
    let sort = parse_sort(request.sort.as_deref())?;

    let session = state.views.get(view_id).await?;
    let changed = {
        let mut s = session.lock().await;
        let mut filter = s.view.state().filter.clone();
        if let Some(q) = request.q {
            filter.query = q;
        }
        if let Some(doc_type) = request.doc_type {
            filter.doc_type = Some(doc_type);
        }
        if let Some(status) = request.status {
            filter.status = Some(status);
        }

        let filter_changed = s.view.set_filter(filter);
        let sort_changed = sort.is_some_and(|sort| s.view.set_sort(sort));
        filter_changed || sort_changed
    };

    let snapshot = if changed {
        views::refresh(&session, state.source.as_ref()).await
    } else {
        session.lock().await.view.snapshot()
    };

    Ok(Json(ViewResponse { view_id, snapshot }))
}

/// Navigate to another page without fetching
pub async fn set_page(
    State(state): State<AppState>,
    AppPath(view_id): AppPath<Uuid>,
    AppJson(request): AppJson<PageRequest>,
) -> Result<Json<ViewResponse>> {
    let session = state.views.get(view_id).await?;
    let snapshot = {
        let mut s = session.lock().await;
        s.view.set_page(request.page);
        s.view.snapshot()
    };
    Ok(Json(ViewResponse { view_id, snapshot }))
}

pub async fn retry(
    State(state): State<AppState>,
    AppPath(view_id): AppPath<Uuid>,
) -> Result<Json<ViewResponse>> {
    let session = state.views.get(view_id).await?;
    let snapshot = views::refresh(&session, state.source.as_ref()).await;
    Ok(Json(ViewResponse { view_id, snapshot }))
}

pub async fn delete_view(
    State(state): State<AppState>,
    AppPath(view_id): AppPath<Uuid>,
) -> Result<StatusCode> {
    state.views.remove(view_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
