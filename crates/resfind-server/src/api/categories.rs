use axum::{extract::State, Extension, Json};
use resfind_core::{Category, Subcategory};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CategoryItem {
    pub id: String,
    pub label: String,
    pub taxonomy_code: Option<String>,
    pub keywords: Vec<String>,
    pub subcategories: Vec<SubcategoryItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SubcategoryItem {
    pub id: String,
    pub label: String,
    pub taxonomy_code: Option<String>,
}

impl From<&Subcategory> for SubcategoryItem {
    fn from(sub: &Subcategory) -> Self {
        Self {
            id: sub.id.clone(),
            label: sub.label.clone(),
            taxonomy_code: sub.taxonomy_code.clone(),
        }
    }
}

impl From<&Category> for CategoryItem {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            label: category.label.clone(),
            taxonomy_code: category.vocabulary.taxonomy_code().map(str::to_string),
            keywords: category.vocabulary.keywords().to_vec(),
            subcategories: category
                .subcategories
                .iter()
                .map(SubcategoryItem::from)
                .collect(),
        }
    }
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<CategoryItem>>> {
    let data = state
        .engine
        .taxonomy()
        .categories()
        .iter()
        .map(CategoryItem::from)
        .collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}
