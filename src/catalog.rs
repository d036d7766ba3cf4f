//! Pure catalog filtering and search. Filters are an unordered conjunction
//! over the full product list; a text query also yields a relevance score
//! used for the search sort order.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::models::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Face,
    Lips,
    Skincare,
    Hair,
    Body,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Face,
        Category::Lips,
        Category::Skincare,
        Category::Hair,
        Category::Body,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Face => "face",
            Category::Lips => "lips",
            Category::Skincare => "skincare",
            Category::Hair => "hair",
            Category::Body => "body",
        }
    }

    pub fn parse(raw: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == raw.trim().to_lowercase())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category narrowing. Both `""` and `"all"` mean "no category filter";
/// any other unrecognized value matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySelector {
    #[default]
    All,
    Only(Category),
    Unknown,
}

impl CategorySelector {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() || normalized == "all" {
            return CategorySelector::All;
        }
        match Category::parse(&normalized) {
            Some(category) => CategorySelector::Only(category),
            None => CategorySelector::Unknown,
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategorySelector::All => true,
            CategorySelector::Only(wanted) => wanted.as_str() == category,
            CategorySelector::Unknown => false,
        }
    }
}

/// The fixed price brackets from the storefront filter bar, with their
/// literal boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PriceBracket {
    #[serde(rename = "0-500")]
    UpTo500,
    #[serde(rename = "500-800")]
    To800,
    #[serde(rename = "800-1200")]
    To1200,
    #[serde(rename = "1200+")]
    Above1200,
}

impl PriceBracket {
    pub fn contains(&self, price: i64) -> bool {
        match self {
            PriceBracket::UpTo500 => price <= 500,
            PriceBracket::To800 => price > 500 && price <= 800,
            PriceBracket::To1200 => price > 800 && price <= 1200,
            PriceBracket::Above1200 => price > 1200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Newest,
    Name,
    PriceLow,
    PriceHigh,
    Rating,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub query: Option<String>,
    pub category: CategorySelector,
    pub price: Option<PriceBracket>,
    pub min_rating: Option<f64>,
}

impl CatalogFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(query) = self.active_query() {
            if match_score(product, query) == 0 {
                return false;
            }
        }
        if !self.category.matches(&product.category) {
            return false;
        }
        if let Some(bracket) = self.price {
            if !bracket.contains(product.price) {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            if product.rating < min_rating {
                return false;
            }
        }
        true
    }

    /// Narrow the catalog and order the result: by relevance when a text
    /// query is active, newest-first otherwise.
    pub fn apply(&self, catalog: &[Product]) -> Vec<Product> {
        let mut results: Vec<Product> = catalog
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        match self.active_query() {
            Some(query) => {
                results.sort_by_key(|p| std::cmp::Reverse(match_score(p, query)));
            }
            None => sort_products(&mut results, SortKey::Newest),
        }
        results
    }

    /// An empty or whitespace query means "no text filter", not "no results".
    fn active_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// Relevance score for a text query: name match counts most, then
/// description, then each matching ingredient. Zero means no match.
pub fn match_score(product: &Product, query: &str) -> u32 {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return 0;
    }

    let mut score = 0;
    if product.name.to_lowercase().contains(&needle) {
        score += 100;
    }
    if product.description.to_lowercase().contains(&needle) {
        score += 50;
    }
    for ingredient in &product.ingredients {
        if ingredient.to_lowercase().contains(&needle) {
            score += 30;
        }
    }
    score
}

pub fn sort_products(products: &mut [Product], key: SortKey) {
    match key {
        SortKey::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::PriceLow => products.sort_by_key(|p| p.price),
        SortKey::PriceHigh => products.sort_by_key(|p| std::cmp::Reverse(p.price)),
        SortKey::Rating => {
            products.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn product(name: &str, category: &str, price: i64, rating: f64, age_days: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{name} for natural beauty"),
            price,
            category: category.to_string(),
            images: vec![],
            ingredients: vec!["Aloe Vera".to_string(), "Rose Water".to_string()],
            usage: String::new(),
            rating,
            reviews: 10,
            in_stock: true,
            stock_quantity: 5,
            featured: false,
            is_active: true,
            created_at: Utc::now() - Duration::days(age_days),
            updated_at: Utc::now(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("Radiant Glow Foundation", "face", 899, 4.8, 5),
            product("Himalayan Clay Face Mask", "face", 549, 4.9, 4),
            product("Organic Tinted Lip Balm", "lips", 299, 4.6, 3),
            product("Vitamin C Brightening Serum", "skincare", 1299, 4.7, 2),
            product("Herbal Shampoo", "hair", 499, 4.2, 1),
        ]
    }

    #[test]
    fn filters_are_a_conjunction_regardless_of_order() {
        let items = catalog();
        let filter = CatalogFilter {
            category: CategorySelector::parse("face"),
            min_rating: Some(4.85),
            ..Default::default()
        };

        let results = filter.apply(&items);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Himalayan Clay Face Mask");

        // Same predicates, evaluated one at a time in the opposite order.
        let by_rating: Vec<&Product> = items.iter().filter(|p| p.rating >= 4.85).collect();
        let by_both: Vec<&&Product> = by_rating.iter().filter(|p| p.category == "face").collect();
        assert_eq!(by_both.len(), results.len());
    }

    #[test]
    fn price_brackets_use_literal_boundaries() {
        assert!(PriceBracket::UpTo500.contains(500));
        assert!(!PriceBracket::UpTo500.contains(501));
        assert!(PriceBracket::To800.contains(501));
        assert!(PriceBracket::To800.contains(800));
        assert!(!PriceBracket::To800.contains(801));
        assert!(PriceBracket::To1200.contains(1200));
        assert!(!PriceBracket::To1200.contains(1201));
        assert!(PriceBracket::Above1200.contains(1201));
        assert!(!PriceBracket::Above1200.contains(1200));
    }

    #[test]
    fn empty_query_applies_no_text_filter() {
        let items = catalog();
        let filter = CatalogFilter {
            query: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&items).len(), items.len());
    }

    #[test]
    fn all_and_empty_string_are_no_category_filter() {
        assert_eq!(CategorySelector::parse(""), CategorySelector::All);
        assert_eq!(CategorySelector::parse("all"), CategorySelector::All);
        assert_eq!(CategorySelector::parse(" ALL "), CategorySelector::All);
    }

    #[test]
    fn unknown_category_yields_no_results() {
        let items = catalog();
        let filter = CatalogFilter {
            category: CategorySelector::parse("perfume"),
            ..Default::default()
        };
        assert!(filter.apply(&items).is_empty());
    }

    #[test]
    fn text_query_matches_name_description_and_ingredients() {
        let items = catalog();

        let by_name = CatalogFilter {
            query: Some("serum".to_string()),
            ..Default::default()
        };
        assert_eq!(by_name.apply(&items).len(), 1);

        // Every test product lists Aloe Vera as an ingredient.
        let by_ingredient = CatalogFilter {
            query: Some("aloe".to_string()),
            ..Default::default()
        };
        assert_eq!(by_ingredient.apply(&items).len(), items.len());
    }

    #[test]
    fn search_results_are_ordered_by_relevance() {
        let mut items = catalog();
        items.push(product("Aloe Vera Gel", "skincare", 349, 4.4, 0));

        let filter = CatalogFilter {
            query: Some("aloe".to_string()),
            ..Default::default()
        };
        let results = filter.apply(&items);
        // Name + description + ingredient beats ingredient-only matches.
        assert_eq!(results[0].name, "Aloe Vera Gel");
    }

    #[test]
    fn default_sort_is_newest_first() {
        let items = catalog();
        let results = CatalogFilter::default().apply(&items);
        assert_eq!(results[0].name, "Herbal Shampoo");
    }

    #[test]
    fn explicit_sort_keys() {
        let mut items = catalog();
        sort_products(&mut items, SortKey::PriceLow);
        assert_eq!(items.first().unwrap().price, 299);
        sort_products(&mut items, SortKey::PriceHigh);
        assert_eq!(items.first().unwrap().price, 1299);
        sort_products(&mut items, SortKey::Rating);
        assert_eq!(items.first().unwrap().rating, 4.9);
    }
}
