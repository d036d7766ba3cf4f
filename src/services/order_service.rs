use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use sea_orm::ActiveValue::{NotSet, Set};
use uuid::Uuid;

use crate::{
    checkout::{PaymentMethod, Totals, is_valid_email},
    dto::orders::{
        CreateOrderRequest, OrderList, OrderStats, OrderWithItems, StatusBreakdown,
        UpdateOrderStatusRequest,
    },
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Customer, Order, OrderItem, Pricing, ShippingAddress},
    response::{ApiResponse, FieldError, Meta},
    state::AppState,
};

pub const ORDER_STATUSES: [&str; 6] = [
    "pending",
    "confirmed",
    "processing",
    "shipped",
    "delivered",
    "cancelled",
];

pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    validate_order_payload(&payload)?;

    // Totals are recomputed from the submitted line snapshots; client-sent
    // pricing is never trusted.
    let subtotal: i64 = payload
        .items
        .iter()
        .map(|item| item.price * i64::from(item.quantity))
        .sum();
    let totals = Totals::from_subtotal(subtotal);

    let txn = state.orm.begin().await?;

    let existing = Orders::find().count(&txn).await?;
    let order_id = Uuid::new_v4();
    let order_number = build_order_number(existing);

    let order = OrderActive {
        id: Set(order_id),
        order_number: Set(order_number),
        first_name: Set(payload.customer.first_name.trim().to_string()),
        last_name: Set(payload.customer.last_name.trim().to_string()),
        email: Set(payload.customer.email.trim().to_lowercase()),
        phone: Set(payload.customer.phone.trim().to_string()),
        address: Set(payload.shipping_address.address.trim().to_string()),
        city: Set(payload.shipping_address.city.trim().to_string()),
        pincode: Set(payload.shipping_address.pincode.trim().to_string()),
        state: Set(payload.shipping_address.state.clone()),
        country: Set(payload
            .shipping_address
            .country
            .clone()
            .unwrap_or_else(|| "India".to_string())),
        subtotal: Set(totals.subtotal),
        shipping: Set(totals.shipping),
        total: Set(totals.total),
        payment_method: Set(payload.payment_method.trim().to_lowercase()),
        payment_status: Set("pending".into()),
        status: Set("pending".into()),
        tracking_number: Set(None),
        notes: Set(payload.notes.clone()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        let inserted = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            name: Set(item.name.clone()),
            price: Set(item.price),
            quantity: Set(item.quantity),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(inserted));
    }

    txn.commit().await?;

    tracing::info!(order_id = %order.id, order_number = %order.order_number, total = order.total, "order created");

    Ok(ApiResponse::success(
        "Order created successfully",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders_by_email(
    state: &AppState,
    email: &str,
) -> AppResult<ApiResponse<OrderList>> {
    let orders: Vec<Order> = Orders::find()
        .filter(OrderCol::Email.eq(email.trim().to_lowercase()))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let total = orders.len() as i64;
    let meta = Meta::new(1, total.max(1), total);
    Ok(ApiResponse::success("Orders", OrderList { items: orders }, Some(meta)))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let status = payload.status.trim().to_lowercase();
    if !ORDER_STATUSES.contains(&status.as_str()) {
        return Err(AppError::Validation(vec![FieldError::new(
            "status",
            "Invalid status",
        )]));
    }

    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let mut active: OrderActive = order.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = %order.id, status = %order.status, "order status updated");

    Ok(ApiResponse::success(
        "Order status updated successfully",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn order_stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderStats>> {
    ensure_admin(user)?;

    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*), COALESCE(SUM(total), 0) FROM orders GROUP BY status",
    )
    .fetch_all(&state.pool)
    .await?;

    let total_orders: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&state.pool)
        .await?;
    let total_revenue: (i64,) = sqlx::query_as("SELECT COALESCE(SUM(total), 0) FROM orders")
        .fetch_one(&state.pool)
        .await?;

    let status_breakdown = rows
        .into_iter()
        .map(|(status, count, total_value)| StatusBreakdown {
            status,
            count,
            total_value,
        })
        .collect();

    Ok(ApiResponse::success(
        "Order statistics",
        OrderStats {
            total_orders: total_orders.0,
            total_revenue: total_revenue.0,
            status_breakdown,
        },
        None,
    ))
}

fn validate_order_payload(payload: &CreateOrderRequest) -> AppResult<()> {
    let mut errors = Vec::new();
    let mut require = |field: &str, value: &str, message: &str| {
        if value.trim().is_empty() {
            errors.push(FieldError::new(field, message));
        }
    };

    require(
        "customer.first_name",
        &payload.customer.first_name,
        "First name is required",
    );
    require(
        "customer.last_name",
        &payload.customer.last_name,
        "Last name is required",
    );
    require(
        "customer.phone",
        &payload.customer.phone,
        "Phone number is required",
    );
    require(
        "shipping_address.address",
        &payload.shipping_address.address,
        "Address is required",
    );
    require(
        "shipping_address.city",
        &payload.shipping_address.city,
        "City is required",
    );
    require(
        "shipping_address.pincode",
        &payload.shipping_address.pincode,
        "PIN code is required",
    );

    if !is_valid_email(&payload.customer.email) {
        errors.push(FieldError::new("customer.email", "Valid email is required"));
    }

    if PaymentMethod::parse(&payload.payment_method).is_none() {
        errors.push(FieldError::new("payment_method", "Invalid payment method"));
    }

    if payload.items.is_empty() {
        errors.push(FieldError::new("items", "At least one item is required"));
    }
    for (idx, item) in payload.items.iter().enumerate() {
        if item.quantity < 1 {
            errors.push(FieldError::new(
                format!("items[{idx}].quantity"),
                "Quantity must be at least 1",
            ));
        }
        if item.price < 0 {
            errors.push(FieldError::new(
                format!("items[{idx}].price"),
                "Price cannot be negative",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn build_order_number(existing_orders: u64) -> String {
    format!("CB{}{:04}", Utc::now().timestamp_millis(), existing_orders)
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        order_number: model.order_number,
        customer: Customer {
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
        },
        shipping_address: ShippingAddress {
            address: model.address,
            city: model.city,
            pincode: model.pincode,
            state: model.state,
            country: model.country,
        },
        pricing: Pricing {
            subtotal: model.subtotal,
            shipping: model.shipping,
            total: model.total,
        },
        payment_method: model.payment_method,
        payment_status: model.payment_status,
        status: model.status,
        tracking_number: model.tracking_number,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        name: model.name,
        price: model.price,
        quantity: model.quantity,
    }
}
