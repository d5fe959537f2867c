use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use resfind_core::{Coordinates, Resource, SearchRequest, SortBy};
use resfind_search::Degradation;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Default, Deserialize)]
pub(super) struct SearchQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub keyword: Option<String>,
    pub zip: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchQuery {
    fn into_request(self) -> Result<SearchRequest, String> {
        let coords = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            (None, None) => None,
            _ => return Err("lat and lon must be given together".to_string()),
        };
        let sort_by = match self.sort.as_deref().map(str::trim) {
            None | Some("") => SortBy::default(),
            Some(raw) => raw.parse::<SortBy>()?,
        };
        let offset = usize::try_from(self.offset.unwrap_or(0))
            .map_err(|_| "offset must not be negative".to_string())?;

        Ok(SearchRequest {
            category_id: self.category,
            subcategory_id: self.subcategory,
            keyword: self.keyword,
            zip_code: self.zip,
            coords,
            sort_by,
            limit: Some(normalize_limit(self.limit)),
            offset,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchData {
    pub resources: Vec<Resource>,
    pub total: usize,
    pub limit: Option<usize>,
    pub offset: usize,
    pub sort_applied: SortBy,
    pub origin: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degradation>,
}

pub(super) async fn search_resources(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let Query(query) =
        query.map_err(|rejection| ApiError::validation(req_id.0.clone(), rejection.body_text()))?;
    let request = query
        .into_request()
        .map_err(|message| ApiError::validation(req_id.0.clone(), message))?;

    let ranked = state
        .engine
        .rank_detailed(&request)
        .await
        .map_err(|e| ApiError::validation(req_id.0.clone(), e.to_string()))?;

    Ok(Json(ApiResponse {
        data: SearchData {
            resources: ranked.resources,
            total: ranked.total,
            limit: request.limit,
            offset: request.offset,
            sort_applied: ranked.sort_applied,
            origin: ranked.origin,
            degraded: ranked.degraded,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
