use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub usage: String,
    pub stock_quantity: Option<i32>,
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
    pub usage: Option<String>,
    pub stock_quantity: Option<i32>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
