use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, UserInfo},
        contact::{ContactList, CreateContactRequest, RespondContactRequest},
        newsletter::{
            SendNewsletterRequest, SendReport, SubscribeRequest, SubscriberList,
            UnsubscribeRequest,
        },
        orders::{
            CreateOrderRequest, CustomerPayload, OrderItemPayload, OrderList, OrderStats,
            OrderWithItems, ShippingAddressPayload, StatusBreakdown, UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
    },
    models::{ContactMessage, NewsletterSubscriber, Order, OrderItem, Product, Review, User},
    response::{ApiResponse, FieldError, Meta},
    routes::{
        auth, categories, contact, health, newsletter, orders, params, products, reviews,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        products::list_products,
        products::featured_products,
        products::products_by_category,
        products::search_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        categories::list_categories,
        categories::get_category,
        reviews::list_reviews,
        reviews::add_review,
        reviews::update_review,
        reviews::delete_review,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        orders::order_stats,
        contact::submit_contact,
        contact::list_contacts,
        contact::get_contact,
        contact::respond_contact,
        newsletter::subscribe,
        newsletter::unsubscribe,
        newsletter::list_subscribers,
        newsletter::send_newsletter
    ),
    components(
        schemas(
            User,
            Product,
            Order,
            OrderItem,
            ContactMessage,
            NewsletterSubscriber,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UserInfo,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            Review,
            CreateReviewRequest,
            UpdateReviewRequest,
            ReviewList,
            categories::CategoryInfo,
            categories::CategoryList,
            CreateOrderRequest,
            CustomerPayload,
            ShippingAddressPayload,
            OrderItemPayload,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            StatusBreakdown,
            OrderStats,
            CreateContactRequest,
            RespondContactRequest,
            ContactList,
            SubscribeRequest,
            UnsubscribeRequest,
            SubscriberList,
            SendNewsletterRequest,
            SendReport,
            params::Pagination,
            params::ProductListQuery,
            Meta,
            FieldError,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Review>,
            ApiResponse<ReviewList>,
            ApiResponse<categories::CategoryInfo>,
            ApiResponse<categories::CategoryList>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderStats>,
            ApiResponse<ContactMessage>,
            ApiResponse<ContactList>,
            ApiResponse<SubscriberList>,
            ApiResponse<SendReport>,
            ApiResponse<User>,
            ApiResponse<LoginResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Categories", description = "Category metadata endpoints"),
        (name = "Reviews", description = "Product review endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Contact", description = "Contact form endpoints"),
        (name = "Newsletter", description = "Newsletter endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
