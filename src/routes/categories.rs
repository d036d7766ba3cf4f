use axum::{
    Json, Router,
    extract::{Path, State},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    catalog::Category,
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
};

/// Storefront metadata for one product category.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub product_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<CategoryInfo>)]
    pub items: Vec<CategoryInfo>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_categories))
        .route("/{id}", axum::routing::get(get_category))
}

fn describe(category: Category) -> (&'static str, &'static str) {
    match category {
        Category::Face => (
            "Face",
            "Foundation, concealer, blush, and other face makeup products",
        ),
        Category::Lips => (
            "Lips",
            "Lipsticks, lip balms, lip glosses, and lip care products",
        ),
        Category::Skincare => (
            "Skincare",
            "Cleansers, toners, serums, moisturizers, and treatments",
        ),
        Category::Hair => (
            "Hair",
            "Shampoos, conditioners, hair masks, and styling products",
        ),
        Category::Body => ("Body", "Body lotions, scrubs, oils, and bath products"),
    }
}

fn info(category: Category, product_count: i64) -> CategoryInfo {
    let (name, description) = describe(category);
    CategoryInfo {
        id: category.as_str().to_string(),
        name: name.to_string(),
        description: description.to_string(),
        image: format!("/assets/categories/{}.jpg", category.as_str()),
        product_count,
    }
}

async fn active_counts(state: &AppState) -> AppResult<Vec<(String, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT category, COUNT(*) FROM products WHERE is_active GROUP BY category",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(rows)
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let counts = active_counts(&state).await?;
    let items = Category::ALL
        .into_iter()
        .map(|category| {
            let count = counts
                .iter()
                .find(|(slug, _)| slug == category.as_str())
                .map_or(0, |(_, count)| *count);
            info(category, count)
        })
        .collect();

    Ok(Json(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<CategoryInfo>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<CategoryInfo>>> {
    let category = match Category::parse(&id) {
        Some(category) => category,
        None => return Err(AppError::NotFound),
    };

    let counts = active_counts(&state).await?;
    let count = counts
        .iter()
        .find(|(slug, _)| slug == category.as_str())
        .map_or(0, |(_, count)| *count);

    Ok(Json(ApiResponse::success(
        "Category",
        info(category, count),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_metadata() {
        for category in Category::ALL {
            let info = info(category, 3);
            assert_eq!(info.id, category.as_str());
            assert!(!info.name.is_empty());
            assert!(!info.description.is_empty());
            assert!(info.image.ends_with(".jpg"));
            assert_eq!(info.product_count, 3);
        }
    }
}
