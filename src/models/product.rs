use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::store::ContentStore;

/// Marketing catalog entry managed from the admin panel.
#[derive(Clone, Serialize, Debug)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub image: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        price_cents: i64,
        image: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            price_cents,
            image,
            deleted_at: None,
            updated_at: now,
            created_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Products shown on the public site; soft-deleted rows are filtered out.
pub async fn list_active_products(store: &ContentStore) -> Vec<Product> {
    store
        .products
        .read()
        .await
        .iter()
        .filter(|product| product.is_active())
        .cloned()
        .collect()
}

/// Everything, for the admin table.
pub async fn list_products(store: &ContentStore) -> Vec<Product> {
    store.products.read().await.clone()
}

pub async fn find_product_by_id(store: &ContentStore, id: Uuid) -> Option<Product> {
    store
        .products
        .read()
        .await
        .iter()
        .find(|product| product.id == id)
        .cloned()
}

pub async fn create_product(store: &ContentStore, product: Product) -> Product {
    store.products.write().await.push(product.clone());
    product
}

pub async fn update_product(
    store: &ContentStore,
    id: Uuid,
    name: String,
    description: String,
    category: String,
    price_cents: i64,
) -> Result<Product> {
    let mut products = store.products.write().await;
    let product = products
        .iter_mut()
        .find(|product| product.id == id)
        .ok_or_else(|| anyhow::anyhow!("product not found"))?;

    product.name = name;
    product.description = description;
    product.category = category;
    product.price_cents = price_cents;
    product.updated_at = Utc::now();

    Ok(product.clone())
}

pub async fn delete_product(store: &ContentStore, id: Uuid) -> Result<Product> {
    let mut products = store.products.write().await;
    let product = products
        .iter_mut()
        .find(|product| product.id == id)
        .ok_or_else(|| anyhow::anyhow!("product not found"))?;

    product.deleted_at = Some(Utc::now());
    product.updated_at = Utc::now();

    Ok(product.clone())
}
