use axum::extract::{Request, State};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use super::state::AppState;
use crate::locale::{negotiate, Locale};

/// Cookie holding the visitor's persisted language choice.
pub const LANG_COOKIE: &str = "lang";

/// Namespaces that bypass locale handling entirely. Anything with a dot in it
/// is treated as a static asset request and skipped as well.
const RESERVED_PREFIXES: [&str; 3] = ["/api", "/static", "/admin"];

/// Middleware in front of the whole site router.
///
/// A bare `/{locale}` is redirected to that locale's home. A path already
/// prefixed with a supported locale is tagged (request extension) and passed
/// through. Everything else is negotiated — persisted cookie, then
/// Accept-Language, then the configured default — and redirected to the
/// locale-prefixed equivalent; there is no failure path.
pub async fn localize(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if is_reserved(&path) {
        return next.run(request).await;
    }

    // bare locale root: /{locale} -> /{locale}/home
    if let Some(locale) = Locale::from_code(path.trim_start_matches('/')) {
        let target = with_query(&request, &format!("/{}/home", locale));
        return Redirect::temporary(&target).into_response();
    }

    // already prefixed: tag the request so rendering picks the right bundle
    let first_segment = path.trim_start_matches('/').split('/').next().unwrap_or("");
    if let Some(locale) = Locale::from_code(first_segment) {
        let mut request = request;
        request.extensions_mut().insert(locale);
        return next.run(request).await;
    }

    // unprefixed (including `/`): negotiate and redirect
    let preferred = jar
        .get(LANG_COOKIE)
        .and_then(|cookie| Locale::from_code(cookie.value()));
    let accept_language = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let locale = negotiate(accept_language, preferred, state.config.default_locale);

    let target = if path == "/" {
        format!("/{}/home", locale)
    } else {
        format!("/{}{}", locale, path)
    };
    Redirect::temporary(&with_query(&request, &target)).into_response()
}

fn with_query(request: &Request, path: &str) -> String {
    match request.uri().query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    }
}

fn is_reserved(path: &str) -> bool {
    if path.contains('.') {
        return true;
    }
    RESERVED_PREFIXES
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::Extension;
    use axum::http::{header, Request, StatusCode};
    use axum::middleware;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    async fn echo_locale(Extension(locale): Extension<Locale>) -> String {
        locale.to_string()
    }

    fn test_router() -> Router {
        let state = AppState::for_tests();
        Router::new()
            .route("/api/anything", get(|| async { "api" }))
            .route("/admin/anything", get(|| async { "admin" }))
            .route("/:locale/home", get(echo_locale))
            .fallback(|| async { StatusCode::NOT_FOUND })
            .layer(middleware::from_fn_with_state(state.clone(), localize))
            .with_state(state)
    }

    async fn send(router: Router, request: Request<Body>) -> axum::response::Response {
        router.oneshot(request).await.unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .expect("expected a redirect")
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn bare_locale_roots_redirect_to_home() {
        for locale in Locale::ALL {
            let response = send(test_router(), get_req(&format!("/{}", locale))).await;
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
            assert_eq!(location(&response), format!("/{}/home", locale));
        }
    }

    #[tokio::test]
    async fn root_goes_through_negotiation_not_the_bare_rule() {
        let response = send(test_router(), get_req("/")).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/en/home");
    }

    #[tokio::test]
    async fn root_honors_the_accept_language_header() {
        let request = Request::builder()
            .uri("/")
            .header(header::ACCEPT_LANGUAGE, "ja,en;q=0.8")
            .body(Body::empty())
            .unwrap();
        let response = send(test_router(), request).await;
        assert_eq!(location(&response), "/ja/home");
    }

    #[tokio::test]
    async fn cookie_preference_beats_the_header() {
        let request = Request::builder()
            .uri("/about")
            .header(header::ACCEPT_LANGUAGE, "ja")
            .header(header::COOKIE, "lang=ko")
            .body(Body::empty())
            .unwrap();
        let response = send(test_router(), request).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/ko/about");
    }

    #[tokio::test]
    async fn reserved_prefixes_are_never_rewritten() {
        let response = send(test_router(), get_req("/api/anything")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(test_router(), get_req("/admin/anything")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn dotted_paths_are_treated_as_assets() {
        let response = send(test_router(), get_req("/favicon.ico")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn prefixed_paths_are_tagged_with_their_locale() {
        use http_body_util::BodyExt;

        let response = send(test_router(), get_req("/th/home")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"th");
    }

    #[tokio::test]
    async fn redirects_preserve_the_query_string() {
        let response = send(test_router(), get_req("/search?q=cats")).await;
        assert_eq!(location(&response), "/en/search?q=cats");

        let response = send(test_router(), get_req("/ja?ref=nav")).await;
        assert_eq!(location(&response), "/ja/home?ref=nav");
    }

    #[tokio::test]
    async fn unknown_prefixes_negotiate_like_any_other_path() {
        let response = send(test_router(), get_req("/xyz/abc")).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/en/xyz/abc");
    }
}
