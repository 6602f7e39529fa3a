use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use minijinja::context;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_error::AppError;
use crate::models::product::{
    create_product, delete_product, find_product_by_id, list_products, update_product, Product,
};
use crate::models::user::{
    create_admin_user, delete_admin_user, find_admin_user_by_id, list_admin_users,
    update_admin_user, AdminUserDraft, AuthSession, Role,
};
use crate::web::responses::{AdminUserListResponse, AdminUserRow, ProductListResponse, ProductRow};
use crate::web::state::AppState;

pub async fn dashboard(
    auth_session: AuthSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let template: minijinja::Template<'_, '_> = state.env.get_template("admin/dashboard.jinja")?;
    let rendered = template.render(context! {
        current_user => auth_session.user,
    })?;

    Ok(Html(rendered).into_response())
}

pub async fn users_page(
    auth_session: AuthSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let users: Vec<AdminUserRow> = list_admin_users(&state.content)
        .await
        .iter()
        .map(AdminUserRow::from)
        .collect();

    let template: minijinja::Template<'_, '_> = state.env.get_template("admin/users.jinja")?;
    let rendered = template.render(context! {
        current_user => auth_session.user,
        users,
    })?;

    Ok(Html(rendered).into_response())
}

pub async fn products_page(
    auth_session: AuthSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let products: Vec<ProductRow> = list_products(&state.content)
        .await
        .iter()
        .map(ProductRow::from)
        .collect();

    let template: minijinja::Template<'_, '_> = state.env.get_template("admin/products.jinja")?;
    let rendered = template.render(context! {
        current_user => auth_session.user,
        products,
    })?;

    Ok(Html(rendered).into_response())
}

// JSON CRUD API consumed by the panel's tables

pub async fn list_users_json(
    State(state): State<AppState>,
) -> Result<Json<AdminUserListResponse>, AppError> {
    let users = list_admin_users(&state.content)
        .await
        .iter()
        .map(AdminUserRow::from)
        .collect();

    Ok(Json(AdminUserListResponse { users }))
}

pub async fn get_user_json(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = find_admin_user_by_id(&state.content, id)
        .await
        .ok_or_else(|| AppError::NotFound("Admin user".to_string()))?;

    Ok(Json(AdminUserRow::from(&user)).into_response())
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub login_name: String,
    pub password: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

pub async fn create_user_json(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let draft = AdminUserDraft::new(
        request.login_name,
        request.password,
        request.display_name,
        request.email,
        request.role,
    )
    .map_err(|err| AppError::InvalidFormData(err.to_string()))?;

    let user = create_admin_user(&state.content, draft)
        .await
        .map_err(|err| AppError::InvalidFormData(err.to_string()))?;

    Ok((StatusCode::CREATED, Json(AdminUserRow::from(&user))).into_response())
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

pub async fn update_user_json(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = update_admin_user(
        &state.content,
        id,
        request.display_name,
        request.email,
        request.role,
    )
    .await
    .map_err(|_| AppError::NotFound("Admin user".to_string()))?;

    Ok(Json(AdminUserRow::from(&user)).into_response())
}

pub async fn delete_user_json(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = delete_admin_user(&state.content, id)
        .await
        .map_err(|_| AppError::NotFound("Admin user".to_string()))?;

    Ok(Json(AdminUserRow::from(&user)).into_response())
}

pub async fn list_products_json(
    State(state): State<AppState>,
) -> Result<Json<ProductListResponse>, AppError> {
    let products = list_products(&state.content)
        .await
        .iter()
        .map(ProductRow::from)
        .collect();

    Ok(Json(ProductListResponse { products }))
}

pub async fn get_product_json(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = find_product_by_id(&state.content, id)
        .await
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    Ok(Json(ProductRow::from(&product)).into_response())
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
}

pub async fn create_product_json(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidFormData(
            "product name must not be empty".to_string(),
        ));
    }

    let product = create_product(
        &state.content,
        Product::new(
            request.name,
            request.description,
            request.category,
            request.price_cents,
            None,
        ),
    )
    .await;

    Ok((StatusCode::CREATED, Json(ProductRow::from(&product))).into_response())
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
}

pub async fn update_product_json(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let product = update_product(
        &state.content,
        id,
        request.name,
        request.description,
        request.category,
        request.price_cents,
    )
    .await
    .map_err(|_| AppError::NotFound("Product".to_string()))?;

    Ok(Json(ProductRow::from(&product)).into_response())
}

pub async fn delete_product_json(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = delete_product(&state.content, id)
        .await
        .map_err(|_| AppError::NotFound("Product".to_string()))?;

    Ok(Json(ProductRow::from(&product)).into_response())
}
