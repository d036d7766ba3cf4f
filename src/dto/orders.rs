use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddressPayload {
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemPayload {
    pub product_id: Uuid,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer: CustomerPayload,
    pub shipping_address: ShippingAddressPayload,
    pub items: Vec<OrderItemPayload>,
    pub payment_method: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusBreakdown {
    pub status: String,
    pub count: i64,
    pub total_value: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStats {
    pub total_orders: i64,
    pub total_revenue: i64,
    pub status_breakdown: Vec<StatusBreakdown>,
}
