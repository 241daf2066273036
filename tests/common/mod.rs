//! Shared fixtures: an in-memory SQLite database with a small catalog.

#![allow(dead_code)]

use std::path::Path;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use shop_backend::config::Config;
use shop_backend::domain::{
    Lookup, LookupKind, Order, OrderInput, OrderStatus, Password, Product, ProductInput, Role,
};
use shop_backend::infra::{
    AccountRepository, AccountStore, LookupRepository, LookupStore, Migrator, OrderRepository,
    OrderStore, ProductRepository, ProductStore,
};

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const PASSWORD: &str = "password123";

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = SeaDatabase::connect(options).await.expect("sqlite connection");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

pub fn test_config(media_root: &Path) -> Config {
    Config::new("sqlite::memory:", JWT_SECRET, media_root.to_path_buf())
}

/// Reference rows and products every test starts from
pub struct Catalog {
    pub women: Lookup,
    pub men: Lookup,
    pub kari: Lookup,
    pub tozzi: Lookup,
    pub rieker: Lookup,
    pub supplier_kari: Lookup,
    pub supplier_plus: Lookup,
    pub point: Lookup,
    pub boots: Product,
    pub sneakers: Product,
    pub slippers: Product,
}

async fn lookup(db: &DatabaseConnection, kind: LookupKind, name: &str) -> Lookup {
    LookupStore::new(db.clone())
        .create(kind, name.to_string())
        .await
        .expect("lookup row")
}

pub fn product_input(
    article: &str,
    name: &str,
    price: i64,
    discount: i64,
    quantity: i32,
    refs: (&Lookup, &Lookup, &Lookup),
) -> ProductInput {
    let (supplier, manufacturer, category) = refs;
    ProductInput {
        article: article.to_string(),
        name: name.to_string(),
        unit: "pcs.".to_string(),
        price: Decimal::new(price, 0),
        supplier_id: supplier.id,
        manufacturer_id: manufacturer.id,
        category_id: category.id,
        discount: Decimal::new(discount, 0),
        quantity,
        description: format!("{} for every day", name),
    }
}

pub async fn seed_catalog(db: &DatabaseConnection) -> Catalog {
    let women = lookup(db, LookupKind::Category, "Women's shoes").await;
    let men = lookup(db, LookupKind::Category, "Men's shoes").await;
    let kari = lookup(db, LookupKind::Manufacturer, "Kari").await;
    let tozzi = lookup(db, LookupKind::Manufacturer, "Marco Tozzi").await;
    let rieker = lookup(db, LookupKind::Manufacturer, "Rieker").await;
    let supplier_kari = lookup(db, LookupKind::Supplier, "Kari").await;
    let supplier_plus = lookup(db, LookupKind::Supplier, "Obuv Plus").await;
    let point = lookup(db, LookupKind::DeliveryPoint, "420151, Lesnoy, 32 Vishnevaya St.").await;

    let products = ProductStore::new(db.clone());
    let boots = products
        .create(
            product_input("A112T4", "Ankle boots", 4990, 3, 6, (&supplier_kari, &kari, &women)),
            None,
        )
        .await
        .expect("boots");
    let sneakers = products
        .create(
            product_input("F635R4", "Sneakers", 3244, 20, 0, (&supplier_plus, &tozzi, &men)),
            None,
        )
        .await
        .expect("sneakers");
    let slippers = products
        .create(
            product_input("H782T5", "Slippers", 499, 0, 6, (&supplier_kari, &rieker, &men)),
            None,
        )
        .await
        .expect("slippers");

    Catalog {
        women,
        men,
        kari,
        tozzi,
        rieker,
        supplier_kari,
        supplier_plus,
        point,
        boots,
        sneakers,
        slippers,
    }
}

pub fn order_input(order_number: i32, point: Option<&Lookup>) -> OrderInput {
    OrderInput {
        order_number,
        order_date: Utc.with_ymd_and_hms(2025, 2, 27, 10, 0, 0).unwrap(),
        delivery_date: Utc.with_ymd_and_hms(2025, 4, 20, 12, 0, 0).unwrap(),
        delivery_point_id: point.map(|p| p.id),
        customer_name: "Ivan Stepanov".to_string(),
        code: 901,
        status: OrderStatus::Pending,
    }
}

pub async fn create_order(db: &DatabaseConnection, order_number: i32, point: Option<&Lookup>) -> Order {
    OrderStore::new(db.clone())
        .create(order_input(order_number, point))
        .await
        .expect("order")
}

/// Account with a profile of the given role; the username doubles as the role name.
pub async fn create_user(db: &DatabaseConnection, role: Role) -> String {
    let username = role.as_str().to_string();
    let hash = Password::new(PASSWORD).expect("hash").into_string();
    AccountStore::new(db.clone())
        .create_with_profile(username.clone(), hash, role, format!("Test {}", role.label()))
        .await
        .expect("user");
    username
}

/// Account that has no shop profile
pub async fn create_bare_account(db: &DatabaseConnection, username: &str) {
    let hash = Password::new(PASSWORD).expect("hash").into_string();
    AccountStore::new(db.clone())
        .create(username.to_string(), hash)
        .await
        .expect("account");
}
