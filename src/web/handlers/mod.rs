use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use minijinja::context;

use super::state::AppState;
use crate::app_error::AppError;
use crate::locale::Locale;

pub mod admin;
pub mod auth;
pub mod community;
pub mod downloads;
pub mod language;
pub mod pages;
pub mod search;

pub async fn handler_404(
    State(state): State<AppState>,
    ExtractLocale(locale): ExtractLocale,
) -> Result<impl IntoResponse, AppError> {
    let template: minijinja::Template<'_, '_> = state.env.get_template("404.jinja")?;
    let rendered: String = template.render(context! {
        ftl_lang => locale.as_str(),
    })?;

    Ok((StatusCode::NOT_FOUND, Html(rendered)).into_response())
}

/// Extractor that provides the locale resolved for this request.
///
/// The locale router places it in the request extensions; handlers reached
/// without the middleware (tests, mostly) fall back to parsing the first path
/// segment, then the default locale.
pub struct ExtractLocale(pub Locale);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractLocale
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(locale) = parts.extensions.get::<Locale>() {
            return Ok(ExtractLocale(*locale));
        }

        let first_segment = parts
            .uri
            .path()
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or("");

        Ok(ExtractLocale(
            Locale::from_code(first_segment).unwrap_or_default(),
        ))
    }
}
