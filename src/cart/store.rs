//! Durable cart storage: one JSON file holding the serialized line array,
//! read once at startup and overwritten after every mutation
//! (last-write-wins, no merge).

use std::fs;
use std::path::{Path, PathBuf};

use crate::cart::{Cart, CartLine};
use crate::models::Product;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CartStore {
    path: PathBuf,
}

impl CartStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rehydrate the cart. A missing or unparsable file yields an empty
    /// cart; corrupted state is discarded, never an error.
    pub fn load(&self) -> Cart {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Cart::new(),
        };
        match serde_json::from_str::<Vec<CartLine>>(&raw) {
            Ok(lines) => Cart::from_lines(lines),
            Err(err) => {
                tracing::warn!(error = %err, path = %self.path.display(), "discarding unparsable cart state");
                Cart::new()
            }
        }
    }

    pub fn save(&self, cart: &Cart) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(cart.lines())?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// A cart bound to its durable store: every mutation is applied in memory
/// and then written through. A failed write keeps the in-memory state
/// (mutations are local-first) and is only logged.
#[derive(Debug)]
pub struct CartSession {
    cart: Cart,
    store: CartStore,
}

impl CartSession {
    pub fn open(store: CartStore) -> Self {
        let cart = store.load();
        Self { cart, store }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn add_item(&mut self, product: &Product, quantity: i32) {
        self.cart.add_item(product, quantity);
        self.persist();
    }

    pub fn update_quantity(&mut self, product_id: Uuid, quantity: i32) {
        self.cart.update_quantity(product_id, quantity);
        self.persist();
    }

    pub fn remove_item(&mut self, product_id: Uuid) {
        self.cart.remove_item(product_id);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.cart) {
            tracing::warn!(error = %err, "failed to persist cart");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn temp_store(tag: &str) -> CartStore {
        let path = std::env::temp_dir()
            .join("chandra-bella-tests")
            .join(format!("{tag}-{}.json", Uuid::new_v4()));
        CartStore::new(path)
    }

    fn product(name: &str, price: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            price,
            category: "body".to_string(),
            images: vec![],
            ingredients: vec![],
            usage: String::new(),
            rating: 4.0,
            reviews: 0,
            in_stock: true,
            stock_quantity: 5,
            featured: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_file_loads_empty_cart() {
        let store = temp_store("missing");
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupted_file_loads_empty_cart() {
        let store = temp_store("corrupt");
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json at all").unwrap();

        assert!(store.load().is_empty());
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn session_round_trips_across_reload() {
        let store = temp_store("roundtrip");
        let scrub = product("Body Scrub", 399);

        let mut session = CartSession::open(store.clone());
        session.add_item(&scrub, 2);

        let reopened = CartSession::open(store.clone());
        assert_eq!(reopened.cart().item_quantity(scrub.id), 2);
        assert_eq!(reopened.cart().total_price(), 798);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn clear_persists_an_empty_cart() {
        let store = temp_store("clear");
        let scrub = product("Body Scrub", 399);

        let mut session = CartSession::open(store.clone());
        session.add_item(&scrub, 1);
        session.clear();

        assert!(CartSession::open(store.clone()).cart().is_empty());
        let _ = fs::remove_file(store.path());
    }
}
