//! Checkout orchestration: field-scoped validation of the shipping/payment
//! form, fixed-fee totals over a cart snapshot, and assembly of the single
//! create-order request. A draft is only produced when validation passes;
//! the cart is cleared by the caller after the order request succeeds.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cart::{Cart, CartLine};
use crate::dto::orders::{
    CreateOrderRequest, CustomerPayload, OrderItemPayload, ShippingAddressPayload,
};
use crate::response::FieldError;

/// Flat shipping fee in rupees; not computed from weight or distance.
pub const SHIPPING_FEE: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Upi,
    Cod,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Cod => "cod",
        }
    }

    pub fn parse(raw: &str) -> Option<PaymentMethod> {
        match raw.trim().to_lowercase().as_str() {
            "card" => Some(PaymentMethod::Card),
            "upi" => Some(PaymentMethod::Upi),
            "cod" => Some(PaymentMethod::Cod),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
    pub holder_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub payment_method: PaymentMethod,
    pub card: Option<CardDetails>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Totals {
    pub subtotal: i64,
    pub shipping: i64,
    pub total: i64,
}

impl Totals {
    pub fn from_subtotal(subtotal: i64) -> Self {
        Self {
            subtotal,
            shipping: SHIPPING_FEE,
            total: subtotal + SHIPPING_FEE,
        }
    }
}

pub fn cart_totals(cart: &Cart) -> Totals {
    Totals::from_subtotal(cart.total_price())
}

/// `local@domain.tld` shape check, the same bar the storefront form applies.
pub fn is_valid_email(raw: &str) -> bool {
    let raw = raw.trim();
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    if domain.contains('@') || domain.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn validate_form(form: &CheckoutForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let mut require = |field: &str, value: &str, message: &str| {
        if value.trim().is_empty() {
            errors.push(FieldError::new(field, message));
        }
    };

    require("first_name", &form.first_name, "First name is required");
    require("last_name", &form.last_name, "Last name is required");
    require("phone", &form.phone, "Phone number is required");
    require("address", &form.address, "Address is required");
    require("city", &form.city, "City is required");
    require("pincode", &form.pincode, "PIN code is required");

    if form.email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(&form.email) {
        errors.push(FieldError::new(
            "email",
            "Please enter a valid email address",
        ));
    }

    if form.payment_method == PaymentMethod::Card {
        let card = form.card.clone().unwrap_or_default();
        if card.number.trim().is_empty() {
            errors.push(FieldError::new("card_number", "Card number is required"));
        }
        if card.expiry.trim().is_empty() {
            errors.push(FieldError::new("card_expiry", "Card expiry is required"));
        }
        if card.cvv.trim().is_empty() {
            errors.push(FieldError::new("card_cvv", "CVV is required"));
        }
        if card.holder_name.trim().is_empty() {
            errors.push(FieldError::new(
                "card_holder_name",
                "Cardholder name is required",
            ));
        }
    }

    errors
}

/// A validated order, ready to submit. Items are a snapshot of the cart at
/// draft time, priced with the add-time prices.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub form: CheckoutForm,
    pub items: Vec<CartLine>,
    pub totals: Totals,
}

impl OrderDraft {
    pub fn into_request(self) -> CreateOrderRequest {
        CreateOrderRequest {
            customer: CustomerPayload {
                first_name: self.form.first_name,
                last_name: self.form.last_name,
                email: self.form.email,
                phone: self.form.phone,
            },
            shipping_address: ShippingAddressPayload {
                address: self.form.address,
                city: self.form.city,
                pincode: self.form.pincode,
                state: self.form.state,
                country: self.form.country,
            },
            items: self
                .items
                .into_iter()
                .map(|line| OrderItemPayload {
                    product_id: line.product_id,
                    name: line.name,
                    price: line.price,
                    quantity: line.quantity,
                })
                .collect(),
            payment_method: self.form.payment_method.as_str().to_string(),
            notes: self.form.notes,
        }
    }
}

/// Validate the form against the current cart and produce the order draft.
/// Validation failures block submission; no order request leaves this
/// function's caller until the draft exists.
pub fn prepare_order(cart: &Cart, form: &CheckoutForm) -> Result<OrderDraft, Vec<FieldError>> {
    let mut errors = validate_form(form);
    if cart.is_empty() {
        errors.push(FieldError::new("items", "Cart is empty"));
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(OrderDraft {
        form: form.clone(),
        items: cart.lines().to_vec(),
        totals: cart_totals(cart),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use chrono::Utc;
    use uuid::Uuid;

    fn product(name: &str, price: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            price,
            category: "skincare".to_string(),
            images: vec![],
            ingredients: vec![],
            usage: String::new(),
            rating: 4.5,
            reviews: 0,
            in_stock: true,
            stock_quantity: 10,
            featured: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            address: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            pincode: "560001".to_string(),
            state: Some("Karnataka".to_string()),
            country: None,
            payment_method: PaymentMethod::Cod,
            card: None,
            notes: None,
        }
    }

    #[test]
    fn totals_add_the_fixed_shipping_fee() {
        let shampoo = product("Herbal Shampoo", 499);
        let oil = product("Hair Oil", 649);
        let mut cart = Cart::new();
        cart.add_item(&shampoo, 1);
        cart.add_item(&oil, 2);

        assert_eq!(cart.total_items(), 3);
        let totals = cart_totals(&cart);
        assert_eq!(totals.subtotal, 1797);
        assert_eq!(totals.total, 1847);
    }

    #[test]
    fn missing_email_blocks_the_order() {
        let mut cart = Cart::new();
        cart.add_item(&product("Lip Balm", 299), 1);
        let before = cart.clone();

        let mut form = valid_form();
        form.email = String::new();

        let err = prepare_order(&cart, &form).unwrap_err();
        assert!(err.iter().any(|e| e.field == "email"));
        // Failed validation leaves the cart untouched.
        assert_eq!(cart, before);
    }

    #[test]
    fn malformed_email_is_field_scoped() {
        let mut form = valid_form();
        form.email = "not-an-email".to_string();
        let errors = validate_form(&form);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@shop.co.in"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user @example.com"));
        assert!(!is_valid_email("user@exa mple.com"));
    }

    #[test]
    fn card_fields_required_only_for_card_payments() {
        let mut form = valid_form();
        form.payment_method = PaymentMethod::Card;
        form.card = None;

        let errors = validate_form(&form);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"card_number"));
        assert!(fields.contains(&"card_expiry"));
        assert!(fields.contains(&"card_cvv"));
        assert!(fields.contains(&"card_holder_name"));

        form.payment_method = PaymentMethod::Upi;
        assert!(validate_form(&form).is_empty());
    }

    #[test]
    fn empty_cart_cannot_check_out() {
        let err = prepare_order(&Cart::new(), &valid_form()).unwrap_err();
        assert!(err.iter().any(|e| e.field == "items"));
    }

    #[test]
    fn draft_snapshots_lines_and_builds_the_request() {
        let shampoo = product("Herbal Shampoo", 499);
        let mut cart = Cart::new();
        cart.add_item(&shampoo, 2);

        let draft = prepare_order(&cart, &valid_form()).unwrap();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.totals.total, 998 + SHIPPING_FEE);

        let request = draft.into_request();
        assert_eq!(request.items[0].product_id, shampoo.id);
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.payment_method, "cod");
    }
}
