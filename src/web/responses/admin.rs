use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::product::Product;
use crate::models::user::AdminUser;

/// Row shape the admin users table consumes.
#[derive(Serialize, Debug)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub login_name: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&AdminUser> for AdminUserRow {
    fn from(user: &AdminUser) -> Self {
        AdminUserRow {
            id: user.id,
            login_name: user.login_name.clone(),
            name: user.display_name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            status: if user.is_active() { "Active" } else { "Inactive" }.to_string(),
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct AdminUserListResponse {
    pub users: Vec<AdminUserRow>,
}

#[derive(Serialize, Debug)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        ProductRow {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price_cents: product.price_cents,
            status: if product.is_active() {
                "Active"
            } else {
                "Inactive"
            }
            .to_string(),
            created_at: product.created_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ProductListResponse {
    pub products: Vec<ProductRow>,
}
