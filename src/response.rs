use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

/// One field-scoped validation failure, surfaced inline by the storefront.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
            meta,
        }
    }

    pub fn failure(message: impl Into<String>, errors: Option<Vec<FieldError>>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
            meta: None,
        }
    }
}
