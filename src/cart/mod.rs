//! Client-side shopping cart: an ordered collection of line items keyed by
//! product id, with quantity-merge semantics and price-lock-at-add. All
//! mutations go through [`Cart::apply`], a pure transition function; the
//! named methods are thin wrappers over it.

pub mod store;

pub use store::{CartSession, CartStore};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

/// One row in the cart. Display fields are copied from the product at
/// add-time, so later catalog price changes do not alter cart totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub price: i64,
    pub category: String,
    pub quantity: i32,
}

impl CartLine {
    pub fn from_product(product: &Product, quantity: i32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            category: product.category.clone(),
            quantity,
        }
    }

    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand {
    Add { line: CartLine },
    UpdateQuantity { product_id: Uuid, quantity: i32 },
    Remove { product_id: Uuid },
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from persisted lines. Duplicate product ids are merged
    /// and non-positive quantities dropped so the stored-state invariants
    /// hold even if the persisted payload predates them.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.apply(CartCommand::Add { line });
        }
        cart
    }

    /// The single state transition. Insertion order is display order.
    pub fn apply(&mut self, command: CartCommand) {
        match command {
            CartCommand::Add { line } => {
                if line.quantity < 1 {
                    return;
                }
                match self
                    .lines
                    .iter_mut()
                    .find(|l| l.product_id == line.product_id)
                {
                    Some(existing) => existing.quantity += line.quantity,
                    None => self.lines.push(line),
                }
            }
            CartCommand::UpdateQuantity {
                product_id,
                quantity,
            } => {
                if quantity <= 0 {
                    self.lines.retain(|l| l.product_id != product_id);
                } else if let Some(line) =
                    self.lines.iter_mut().find(|l| l.product_id == product_id)
                {
                    line.quantity = quantity;
                }
            }
            CartCommand::Remove { product_id } => {
                self.lines.retain(|l| l.product_id != product_id);
            }
            CartCommand::Clear => self.lines.clear(),
        }
    }

    pub fn add_item(&mut self, product: &Product, quantity: i32) {
        self.apply(CartCommand::Add {
            line: CartLine::from_product(product, quantity),
        });
    }

    pub fn update_quantity(&mut self, product_id: Uuid, quantity: i32) {
        self.apply(CartCommand::UpdateQuantity {
            product_id,
            quantity,
        });
    }

    pub fn remove_item(&mut self, product_id: Uuid) {
        self.apply(CartCommand::Remove { product_id });
    }

    pub fn clear(&mut self) {
        self.apply(CartCommand::Clear);
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }

    /// Sum of price x quantity across lines, using add-time prices.
    pub fn total_price(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn item_quantity(&self, product_id: Uuid) -> i32 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.quantity)
    }

    pub fn contains(&self, product_id: Uuid) -> bool {
        self.lines.iter().any(|l| l.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

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

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let serum = product("Vitamin C Serum", 1299);
        let mut cart = Cart::new();
        cart.add_item(&serum, 1);
        cart.add_item(&serum, 1);
        cart.add_item(&serum, 3);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.item_quantity(serum.id), 5);
    }

    #[test]
    fn add_with_non_positive_quantity_is_a_noop() {
        let balm = product("Lip Balm", 299);
        let mut cart = Cart::new();
        cart.add_item(&balm, 0);
        cart.add_item(&balm, -2);

        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_to_zero_or_below_removes_the_line() {
        let balm = product("Lip Balm", 299);
        let mask = product("Clay Mask", 549);
        let mut cart = Cart::new();
        cart.add_item(&balm, 2);
        cart.add_item(&mask, 1);

        cart.update_quantity(balm.id, 0);
        assert!(!cart.contains(balm.id));

        cart.update_quantity(mask.id, -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_for_missing_product_is_a_noop() {
        let balm = product("Lip Balm", 299);
        let mut cart = Cart::new();
        cart.add_item(&balm, 1);
        cart.update_quantity(Uuid::new_v4(), 4);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.item_quantity(balm.id), 1);
    }

    #[test]
    fn totals_use_price_captured_at_add_time() {
        let mut serum = product("Vitamin C Serum", 1299);
        let mut cart = Cart::new();
        cart.add_item(&serum, 2);

        // Catalog price change after add must not affect the cart.
        serum.price = 1499;
        assert_eq!(cart.total_price(), 2598);
    }

    #[test]
    fn totals_for_mixed_cart() {
        let shampoo = product("Herbal Shampoo", 499);
        let oil = product("Hair Oil", 649);
        let mut cart = Cart::new();
        cart.add_item(&shampoo, 1);
        cart.add_item(&oil, 2);

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), 499 + 1298);
    }

    #[test]
    fn remove_and_clear() {
        let balm = product("Lip Balm", 299);
        let mask = product("Clay Mask", 549);
        let mut cart = Cart::new();
        cart.add_item(&balm, 1);
        cart.add_item(&mask, 1);

        cart.remove_item(balm.id);
        assert_eq!(cart.lines().len(), 1);

        // Removing an absent product changes nothing.
        cart.remove_item(balm.id);
        assert_eq!(cart.lines().len(), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), 0);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let a = product("A", 100);
        let b = product("B", 200);
        let c = product("C", 300);
        let mut cart = Cart::new();
        cart.add_item(&a, 1);
        cart.add_item(&b, 1);
        cart.add_item(&c, 1);
        cart.add_item(&a, 1);

        let names: Vec<&str> = cart.lines().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn from_lines_normalizes_duplicates_and_bad_quantities() {
        let id = Uuid::new_v4();
        let line = |qty: i32| CartLine {
            product_id: id,
            name: "Lip Balm".to_string(),
            price: 299,
            category: "lips".to_string(),
            quantity: qty,
        };

        let cart = Cart::from_lines(vec![line(2), line(0), line(3)]);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.item_quantity(id), 5);
    }
}
