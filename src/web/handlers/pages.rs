use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect};
use axum_messages::Messages;
use minijinja::context;
use serde::Deserialize;
use uuid::Uuid;

use super::ExtractLocale;
use crate::app_error::AppError;
use crate::locale::message;
use crate::models::product::{find_product_by_id, list_active_products};
use crate::models::store::search_content;
use crate::web::context::CommonContext;
use crate::web::state::AppState;

pub async fn home(
    State(state): State<AppState>,
    ExtractLocale(locale): ExtractLocale,
) -> Result<impl IntoResponse, AppError> {
    let common_ctx = CommonContext::build(&state.content).await;
    let featured: Vec<_> = list_active_products(&state.content)
        .await
        .into_iter()
        .take(3)
        .collect();

    let template: minijinja::Template<'_, '_> = state.env.get_template("home.jinja")?;
    let rendered = template.render(context! {
        locale => locale.as_str(),
        featured_products => featured,
        unread_notification_count => common_ctx.unread_notification_count,
        ftl_lang => locale.as_str(),
    })?;

    Ok(Html(rendered).into_response())
}

pub async fn about(
    State(state): State<AppState>,
    ExtractLocale(locale): ExtractLocale,
) -> Result<impl IntoResponse, AppError> {
    let template: minijinja::Template<'_, '_> = state.env.get_template("about.jinja")?;
    let rendered = template.render(context! {
        locale => locale.as_str(),
        ftl_lang => locale.as_str(),
    })?;

    Ok(Html(rendered).into_response())
}

pub async fn contact(
    State(state): State<AppState>,
    ExtractLocale(locale): ExtractLocale,
    messages: Messages,
) -> Result<impl IntoResponse, AppError> {
    let template: minijinja::Template<'_, '_> = state.env.get_template("contact.jinja")?;
    let rendered = template.render(context! {
        locale => locale.as_str(),
        messages => messages.into_iter().collect::<Vec<_>>(),
        ftl_lang => locale.as_str(),
    })?;

    Ok(Html(rendered).into_response())
}

#[derive(Deserialize)]
pub struct ContactForm {
    name: String,
    email: String,
    message: String,
}

pub async fn do_contact(
    ExtractLocale(locale): ExtractLocale,
    messages: Messages,
    axum::Form(form): axum::Form<ContactForm>,
) -> Result<impl IntoResponse, AppError> {
    let complete = !form.name.trim().is_empty()
        && !form.email.trim().is_empty()
        && !form.message.trim().is_empty();

    if complete {
        messages.success(message(locale, "contact-success"));
    } else {
        messages.error(message(locale, "contact-error-missing"));
    }

    Ok(Redirect::to(&format!("/{}/contact", locale)).into_response())
}

pub async fn products(
    State(state): State<AppState>,
    ExtractLocale(locale): ExtractLocale,
) -> Result<impl IntoResponse, AppError> {
    let products = list_active_products(&state.content).await;

    let template: minijinja::Template<'_, '_> = state.env.get_template("products.jinja")?;
    let rendered = template.render(context! {
        locale => locale.as_str(),
        products,
        ftl_lang => locale.as_str(),
    })?;

    Ok(Html(rendered).into_response())
}

pub async fn product_detail(
    State(state): State<AppState>,
    ExtractLocale(locale): ExtractLocale,
    Path((_, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let product = find_product_by_id(&state.content, id)
        .await
        .filter(|product| product.is_active())
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    let template: minijinja::Template<'_, '_> = state.env.get_template("product.jinja")?;
    let rendered = template.render(context! {
        locale => locale.as_str(),
        product,
        ftl_lang => locale.as_str(),
    })?;

    Ok(Html(rendered).into_response())
}

#[derive(Deserialize)]
pub struct SearchPageQuery {
    #[serde(default)]
    q: String,
}

/// Server-rendered results page; the dropdown's "see all" target.
pub async fn search_page(
    State(state): State<AppState>,
    ExtractLocale(locale): ExtractLocale,
    Query(query): Query<SearchPageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let results = search_content(&state.content, &query.q, 20).await;

    let template: minijinja::Template<'_, '_> = state.env.get_template("search.jinja")?;
    let rendered = template.render(context! {
        locale => locale.as_str(),
        query => query.q,
        results,
        ftl_lang => locale.as_str(),
    })?;

    Ok(Html(rendered).into_response())
}
