pub mod auth_service;
pub mod contact_service;
pub mod newsletter_service;
pub mod order_service;
pub mod product_service;
pub mod review_service;
