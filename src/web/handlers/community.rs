use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Json};
use minijinja::context;
use serde::Deserialize;
use uuid::Uuid;

use super::ExtractLocale;
use crate::app_error::AppError;
use crate::models::download::{list_downloads, total_speed};
use crate::models::notification::{
    dismiss_notification, get_unread_count, list_notifications, mark_all_notifications_read,
    mark_notification_read,
};
use crate::models::post::{list_feed, toggle_like};
use crate::models::topic::list_trending;
use crate::models::user::list_members;
use crate::web::responses::{
    FeedResponse, LikeResponse, MarkedResponse, NotificationsResponse, PaginationMeta, PostView,
    TrendingResponse,
};
use crate::web::state::AppState;

pub async fn community(
    State(state): State<AppState>,
    ExtractLocale(locale): ExtractLocale,
) -> Result<impl IntoResponse, AppError> {
    let store = &state.content;

    let (posts, has_more) = list_feed(store, 10, 0).await;
    let members = list_members(store).await;
    let posts: Vec<PostView> = posts
        .into_iter()
        .map(|post| PostView::build(post, &members))
        .collect();

    let topics = list_trending(store).await;
    let notifications = list_notifications(store).await;
    let unread_notification_count = get_unread_count(store).await;
    let downloads = list_downloads(store).await;
    let download_speed = total_speed(store).await;

    let template: minijinja::Template<'_, '_> = state.env.get_template("community.jinja")?;
    let rendered = template.render(context! {
        locale => locale.as_str(),
        posts,
        has_more,
        topics,
        notifications,
        unread_notification_count,
        downloads,
        download_speed,
        ftl_lang => locale.as_str(),
    })?;

    Ok(Html(rendered).into_response())
}

#[derive(Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_feed_limit")]
    pub limit: i64,
}

fn default_feed_limit() -> i64 {
    10
}

pub async fn feed_json(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, AppError> {
    let limit = query.limit.clamp(1, 50);
    let offset = query.offset.max(0);

    let (posts, has_more) = list_feed(&state.content, limit, offset).await;
    let members = list_members(&state.content).await;
    let posts: Vec<PostView> = posts
        .into_iter()
        .map(|post| PostView::build(post, &members))
        .collect();

    Ok(Json(FeedResponse {
        posts,
        pagination: PaginationMeta {
            offset,
            limit,
            total: None,
            has_more,
        },
    }))
}

pub async fn trending_json(
    State(state): State<AppState>,
) -> Result<Json<TrendingResponse>, AppError> {
    let topics = list_trending(&state.content).await;
    Ok(Json(TrendingResponse { topics }))
}

pub async fn notifications_json(
    State(state): State<AppState>,
) -> Result<Json<NotificationsResponse>, AppError> {
    let notifications = list_notifications(&state.content).await;
    let unread_count = get_unread_count(&state.content).await;

    Ok(Json(NotificationsResponse {
        notifications,
        unread_count,
    }))
}

pub async fn do_mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let notification = mark_notification_read(&state.content, id)
        .await
        .map_err(|_| AppError::NotFound("Notification".to_string()))?;

    Ok(Json(notification).into_response())
}

pub async fn do_mark_all_notifications_read(
    State(state): State<AppState>,
) -> Result<Json<MarkedResponse>, AppError> {
    let marked = mark_all_notifications_read(&state.content).await;
    Ok(Json(MarkedResponse { marked }))
}

pub async fn do_dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    dismiss_notification(&state.content, id)
        .await
        .map_err(|_| AppError::NotFound("Notification".to_string()))?;

    Ok(Json(serde_json::json!({ "dismissed": true })).into_response())
}

pub async fn do_toggle_post_like(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeResponse>, AppError> {
    let post = toggle_like(&state.content, id)
        .await
        .map_err(|_| AppError::NotFound("Post".to_string()))?;

    Ok(Json(LikeResponse {
        id: post.id,
        liked: post.liked,
        likes: post.stats.likes,
    }))
}
