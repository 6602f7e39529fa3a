use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::app_error::AppError;
use crate::locale::Locale;
use crate::web::locale_router::LANG_COOKIE;
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct LanguageForm {
    pub language: Option<String>,
    /// Site path to return to, usually the page the switcher was on.
    pub next: Option<String>,
}

/// Persist the visitor's language choice and send them back to the same page
/// under the new locale prefix.
pub async fn save_language(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LanguageForm>,
) -> Result<impl IntoResponse, AppError> {
    let locale = form
        .language
        .as_deref()
        .and_then(Locale::from_code)
        .unwrap_or(state.config.default_locale);

    let cookie = Cookie::build((LANG_COOKIE, locale.as_str().to_string()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(365))
        .build();
    let jar = jar.add(cookie);

    let target = match form.next.as_deref() {
        Some(next) if next.starts_with('/') => swap_locale_prefix(next, locale),
        _ => format!("/{}/home", locale),
    };

    Ok((jar, Redirect::to(&target)).into_response())
}

/// Replace (or insert) the locale prefix on a site path.
fn swap_locale_prefix(path: &str, locale: Locale) -> String {
    let trimmed = path.trim_start_matches('/');
    let mut segments = trimmed.splitn(2, '/');
    let first = segments.next().unwrap_or("");
    let rest = segments.next().unwrap_or("");

    if Locale::from_code(first).is_some() {
        if rest.is_empty() {
            format!("/{}/home", locale)
        } else {
            format!("/{}/{}", locale, rest)
        }
    } else if trimmed.is_empty() {
        format!("/{}/home", locale)
    } else {
        format!("/{}/{}", locale, trimmed)
    }
}
