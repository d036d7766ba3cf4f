use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::ContactMessage;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RespondContactRequest {
    pub response: String,
    pub assigned_to: Option<String>,
}

#[derive(Debug, serde::Serialize, ToSchema)]
#[serde(transparent)]
pub struct ContactList {
    #[schema(value_type = Vec<ContactMessage>)]
    pub items: Vec<ContactMessage>,
}
