pub mod auth;
pub mod contact;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod reviews;
