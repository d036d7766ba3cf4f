use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::NewsletterSubscriber;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UnsubscribeRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriberList {
    pub subscribers: Vec<NewsletterSubscriber>,
    pub total: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendNewsletterRequest {
    pub subject: String,
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendReport {
    pub sent: i64,
}
