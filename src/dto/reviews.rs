use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Review;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub title: Option<String>,
    pub comment: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ReviewList {
    #[schema(value_type = Vec<Review>)]
    pub items: Vec<Review>,
}
