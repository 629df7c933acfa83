//! One-shot catalog listing

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use super::validation_error;
use crate::extract::AppQuery;
use crate::AppState;
use aixiv_catalog::{pipeline, CatalogFilter, CatalogPage, CatalogQuery, SortKey};
use aixiv_common::errors::Result;

/// Largest page a client may ask for
pub const MAX_PAGE_SIZE: usize = 100;

/// `GET /catalog` query string
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CatalogParams {
    /// Free-text query
    #[serde(default)]
    #[validate(length(max = 500))]
    pub q: String,

    #[serde(rename = "type")]
    pub doc_type: Option<String>,

    pub status: Option<String>,

    pub sort: Option<String>,

    pub page: Option<u32>,

    #[validate(range(min = 1, max = MAX_PAGE_SIZE))]
    pub page_size: Option<usize>,
}

impl CatalogParams {
    /// Resolve against the configured default page size
    pub fn into_query(self, default_page_size: usize) -> Result<CatalogQuery> {
        let sort = match self.sort.as_deref() {
            None | Some("") => SortKey::default(),
            Some(raw) => raw.parse()?,
        };

        Ok(CatalogQuery {
            filter: CatalogFilter {
                query: self.q,
                doc_type: self.doc_type,
                status: self.status,
            },
            sort,
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(default_page_size),
        })
    }
}

/// Fetch the catalog and return one page of it
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<CatalogParams>,
) -> Result<Json<CatalogPage>> {
    params.validate().map_err(validation_error)?;
    let query = params.into_query(state.config.catalog.page_size)?;

    let records = state.source.fetch_all().await?;
    let page = pipeline::run(records, &query)?;

    tracing::debug!(
        q = %query.filter.query,
        sort = %query.sort,
        page = page.current_page,
        total_matching = page.total_matching,
        "Catalog page served"
    );

    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aixiv_common::AppError;

    #[test]
    fn test_defaults() {
        let query = CatalogParams::default().into_query(3).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 3);
        assert_eq!(query.sort, SortKey::Newest);
        assert!(query.filter.is_empty());
    }

    #[test]
    fn test_sort_and_labels() {
        let params = CatalogParams {
            q: "agents".into(),
            doc_type: Some("proposal".into()),
            sort: Some("most_cited".into()),
            page: Some(2),
            ..Default::default()
        };
        let query = params.into_query(3).unwrap();
        assert_eq!(query.sort, SortKey::MostCited);
        assert_eq!(query.filter.doc_type.as_deref(), Some("proposal"));
        assert_eq!(query.page, 2);
    }

    #[test]
    fn test_invalid_input() {
        let params = CatalogParams {
            sort: Some("random".into()),
            ..Default::default()
        };
        assert!(matches!(params.into_query(3), Err(AppError::InvalidSortKey { .. })));

        let params = CatalogParams {
            page_size: Some(MAX_PAGE_SIZE + 1),
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = CatalogParams {
            page_size: Some(0),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
