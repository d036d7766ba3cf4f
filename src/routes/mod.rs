use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod contact;
pub mod doc;
pub mod health;
pub mod newsletter;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/reviews", reviews::router())
        .nest("/orders", orders::router())
        .nest("/contact", contact::router())
        .nest("/newsletter", newsletter::router())
        .nest("/auth", auth::router())
}
