use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use chandra_bella_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_account(&pool, "Admin", "admin@chandrabella.in", "admin123", "admin").await?;
    let user_id = ensure_account(&pool, "Demo User", "user@chandrabella.in", "user123", "user").await?;
    let seeded = seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}, products: {seeded}");
    Ok(())
}

async fn ensure_account(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(user_id)
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
    category: &'static str,
    images: &'static [&'static str],
    ingredients: &'static [&'static str],
    usage: &'static str,
    rating: f64,
    reviews: i32,
    stock_quantity: i32,
    featured: bool,
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Radiant Glow Foundation",
        description: "Lightweight liquid foundation with turmeric extract for a natural glow",
        price: 899,
        category: "face",
        images: &["/images/products/radiant-glow-foundation.jpg"],
        ingredients: &["Turmeric Extract", "Aloe Vera", "Vitamin E"],
        usage: "Apply evenly on cleansed face with fingertips or a sponge",
        rating: 4.5,
        reviews: 128,
        stock_quantity: 50,
        featured: true,
    },
    SeedProduct {
        name: "Himalayan Clay Face Mask",
        description: "Deep cleansing clay mask with minerals from the Himalayas",
        price: 549,
        category: "face",
        images: &["/images/products/himalayan-clay-mask.jpg"],
        ingredients: &["Himalayan Clay", "Neem", "Tea Tree Oil"],
        usage: "Apply a thin layer, leave for 15 minutes, rinse with warm water",
        rating: 4.7,
        reviews: 89,
        stock_quantity: 35,
        featured: true,
    },
    SeedProduct {
        name: "Vitamin C Brightening Serum",
        description: "Concentrated serum with natural vitamin C for brighter skin",
        price: 1299,
        category: "skincare",
        images: &["/images/products/vitamin-c-serum.jpg"],
        ingredients: &["Vitamin C", "Hyaluronic Acid", "Rose Water"],
        usage: "Apply 2 to 3 drops on clean face before moisturizer",
        rating: 4.8,
        reviews: 210,
        stock_quantity: 40,
        featured: true,
    },
    SeedProduct {
        name: "Organic Tinted Lip Balm",
        description: "Moisturizing lip balm with a hint of natural rose tint",
        price: 299,
        category: "lips",
        images: &["/images/products/tinted-lip-balm.jpg"],
        ingredients: &["Shea Butter", "Beeswax", "Rose Extract"],
        usage: "Apply directly on lips as needed",
        rating: 4.3,
        reviews: 156,
        stock_quantity: 100,
        featured: false,
    },
    SeedProduct {
        name: "Matte Liquid Lipstick",
        description: "Long lasting matte lipstick enriched with jojoba oil",
        price: 699,
        category: "lips",
        images: &["/images/products/matte-liquid-lipstick.jpg"],
        ingredients: &["Jojoba Oil", "Vitamin E", "Natural Pigments"],
        usage: "Apply from the center of the lips outward",
        rating: 4.4,
        reviews: 97,
        stock_quantity: 60,
        featured: true,
    },
    SeedProduct {
        name: "Herbal Anti-Dandruff Shampoo",
        description: "Gentle herbal shampoo that soothes the scalp and fights dandruff",
        price: 499,
        category: "hair",
        images: &["/images/products/herbal-shampoo.jpg"],
        ingredients: &["Bhringraj", "Amla", "Tea Tree Oil"],
        usage: "Massage into wet hair, lather and rinse thoroughly",
        rating: 4.2,
        reviews: 74,
        stock_quantity: 80,
        featured: false,
    },
    SeedProduct {
        name: "Nourishing Hair Oil",
        description: "Cold pressed oil blend for stronger, shinier hair",
        price: 649,
        category: "hair",
        images: &["/images/products/nourishing-hair-oil.jpg"],
        ingredients: &["Coconut Oil", "Bhringraj", "Hibiscus"],
        usage: "Warm slightly and massage into scalp, leave for an hour before washing",
        rating: 4.6,
        reviews: 143,
        stock_quantity: 70,
        featured: true,
    },
    SeedProduct {
        name: "Lavender Body Butter",
        description: "Rich body butter with calming lavender for all day hydration",
        price: 799,
        category: "body",
        images: &["/images/products/lavender-body-butter.jpg"],
        ingredients: &["Shea Butter", "Cocoa Butter", "Lavender Oil"],
        usage: "Massage onto damp skin after bathing",
        rating: 4.5,
        reviews: 62,
        stock_quantity: 45,
        featured: false,
    },
];

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<usize> {
    for product in CATALOG {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, price, category, images, ingredients, usage,
                 rating, reviews, in_stock, stock_quantity, featured, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, $11, $12, TRUE)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.name)
        .bind(product.description)
        .bind(product.price)
        .bind(product.category)
        .bind(serde_json::json!(product.images))
        .bind(serde_json::json!(product.ingredients))
        .bind(product.usage)
        .bind(product.rating)
        .bind(product.reviews)
        .bind(product.stock_quantity)
        .bind(product.featured)
        .execute(pool)
        .await?;
    }
    Ok(CATALOG.len())
}
