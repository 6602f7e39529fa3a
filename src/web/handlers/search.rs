use axum::extract::Query;
use axum::response::IntoResponse;
use axum::{extract::State, response::Json};
use serde::Deserialize;

use crate::app_error::AppError;
use crate::models::store::search_content;
use crate::web::responses::SearchResponse;
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default)]
    limit: Option<i64>,
}

pub async fn search_json(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 50) as usize;
    let results = search_content(&state.content, &query.q, limit).await;

    Ok(Json(SearchResponse { results }).into_response())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::web::state::AppState;

    fn test_router() -> Router {
        Router::new()
            .route("/api/search", get(search_json))
            .with_state(AppState::for_tests())
    }

    async fn body_json(uri: &str) -> serde_json::Value {
        let response = test_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn returns_ranked_results() {
        let json = body_json("/api/search?q=sarah").await;
        let results = json["results"].as_array().unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0]["kind"], "user");
        assert_eq!(results[0]["title"], "Sarah Johnson");
    }

    #[tokio::test]
    async fn limit_is_capped() {
        let json = body_json("/api/search?q=e&limit=1000").await;
        assert!(json["results"].as_array().unwrap().len() <= 50);

        let json = body_json("/api/search?q=e&limit=2").await;
        assert!(json["results"].as_array().unwrap().len() <= 2);
    }

    #[tokio::test]
    async fn empty_query_returns_no_results() {
        let json = body_json("/api/search?q=").await;
        assert!(json["results"].as_array().unwrap().is_empty());
    }
}
