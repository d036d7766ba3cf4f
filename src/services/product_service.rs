use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    catalog::{Category, CategorySelector},
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, FieldError, Meta},
    routes::params::ProductListQuery,
    state::AppState,
};

const FEATURED_LIMIT: u64 = 8;

pub async fn list_products(
    state: &AppState,
    query: ProductListQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(Column::IsActive.eq(true));

    if let Some(raw) = query.category.as_ref().filter(|s| !s.is_empty()) {
        match CategorySelector::parse(raw) {
            CategorySelector::All => {}
            CategorySelector::Only(category) => {
                condition = condition.add(Column::Category.eq(category.as_str()));
            }
            // An unrecognized category matches nothing.
            CategorySelector::Unknown => {
                let meta = Meta::new(page, limit, 0);
                return Ok(ApiResponse::success(
                    "Products",
                    ProductList { items: vec![] },
                    Some(meta),
                ));
            }
        }
    }

    if let Some(featured) = query.featured {
        condition = condition.add(Column::Featured.eq(featured));
    }

    if let Some(search) = query.search.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn featured_products(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let items = Products::find()
        .filter(
            Condition::all()
                .add(Column::Featured.eq(true))
                .add(Column::IsActive.eq(true))
                .add(Column::InStock.eq(true)),
        )
        .order_by_desc(Column::CreatedAt)
        .limit(FEATURED_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Featured products",
        ProductList { items },
        None,
    ))
}

pub async fn products_by_category(
    state: &AppState,
    category: &str,
) -> AppResult<ApiResponse<ProductList>> {
    let items = Products::find()
        .filter(
            Condition::all()
                .add(Column::Category.eq(category))
                .add(Column::IsActive.eq(true))
                .add(Column::InStock.eq(true)),
        )
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success("Products", ProductList { items }, None))
}

pub async fn search_products(state: &AppState, q: &str) -> AppResult<ApiResponse<ProductList>> {
    let pattern = like_pattern(q);
    let items = Products::find()
        .filter(
            Condition::all()
                .add(Column::IsActive.eq(true))
                .add(Column::InStock.eq(true))
                .add(
                    Condition::any()
                        .add(Expr::col(Column::Name).ilike(pattern.clone()))
                        .add(Expr::col(Column::Description).ilike(pattern)),
                ),
        )
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success("Search results", ProductList { items }, None))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let result = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", result, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    validate_product_fields(&payload.name, &payload.description, payload.price, &payload.category)?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        price: Set(payload.price),
        category: Set(payload.category.trim().to_lowercase()),
        images: Set(serde_json::json!(payload.images)),
        ingredients: Set(serde_json::json!(payload.ingredients)),
        usage: Set(payload.usage),
        rating: Set(0.0),
        reviews: Set(0),
        in_stock: Set(true),
        stock_quantity: Set(payload.stock_quantity.unwrap_or(0)),
        featured: Set(payload.featured.unwrap_or(false)),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    tracing::info!(product_id = %product.id, "product created");
    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    // Validate the merged result, not just the patch, so an update cannot
    // push a product past the limits create enforces.
    let name = payload.name.as_deref().unwrap_or(&existing.name);
    let description = payload
        .description
        .as_deref()
        .unwrap_or(&existing.description);
    let price = payload.price.unwrap_or(existing.price);
    let category = payload.category.as_deref().unwrap_or(&existing.category);
    validate_product_fields(name, description, price, category)?;

    let mut active: ActiveModel = existing.clone().into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(category) = payload.category {
        active.category = Set(category.trim().to_lowercase());
    }
    if let Some(images) = payload.images {
        active.images = Set(serde_json::json!(images));
    }
    if let Some(ingredients) = payload.ingredients {
        active.ingredients = Set(serde_json::json!(ingredients));
    }
    if let Some(usage) = payload.usage {
        active.usage = Set(usage);
    }
    if let Some(stock_quantity) = payload.stock_quantity {
        active.stock_quantity = Set(stock_quantity);
    }
    if let Some(in_stock) = payload.in_stock {
        active.in_stock = Set(in_stock);
    }
    if let Some(featured) = payload.featured {
        active.featured = Set(featured);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    tracing::info!(product_id = %product.id, "product updated");
    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(product_id = %id, "product deleted");
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Build an ILIKE pattern from user input, escaping the LIKE wildcards so a
/// query of `%` or `_` matches those literal characters instead of
/// everything.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn validate_product_fields(
    name: &str,
    description: &str,
    price: i64,
    category: &str,
) -> AppResult<()> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Product name is required"));
    } else if name.len() > 100 {
        errors.push(FieldError::new(
            "name",
            "Product name cannot exceed 100 characters",
        ));
    }
    if description.trim().is_empty() {
        errors.push(FieldError::new(
            "description",
            "Product description is required",
        ));
    } else if description.len() > 500 {
        errors.push(FieldError::new(
            "description",
            "Description cannot exceed 500 characters",
        ));
    }
    if price < 0 {
        errors.push(FieldError::new("price", "Price cannot be negative"));
    }
    if Category::parse(category).is_none() {
        errors.push(FieldError::new("category", "Invalid product category"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        category: model.category,
        images: serde_json::from_value(model.images).unwrap_or_default(),
        ingredients: serde_json::from_value(model.ingredients).unwrap_or_default(),
        usage: model.usage,
        rating: model.rating,
        reviews: model.reviews,
        in_stock: model.in_stock,
        stock_quantity: model.stock_quantity,
        featured: model.featured,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("aloe"), "%aloe%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("lip_balm"), "%lip\\_balm%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(like_pattern("  serum  "), "%serum%");
    }

    #[test]
    fn product_field_limits() {
        assert!(validate_product_fields("Lip Balm", "Soft matte balm", 299, "lips").is_ok());

        let long_name = "x".repeat(101);
        assert!(validate_product_fields(&long_name, "desc", 100, "lips").is_err());

        let long_description = "x".repeat(501);
        assert!(validate_product_fields("Lip Balm", &long_description, 100, "lips").is_err());

        assert!(validate_product_fields("Lip Balm", "desc", -1, "lips").is_err());
        assert!(validate_product_fields("Lip Balm", "desc", 100, "perfume").is_err());
    }
}
