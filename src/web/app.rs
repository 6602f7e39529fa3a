use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use axum_login::{login_required, AuthManagerLayerBuilder};
use axum_messages::MessagesManagerLayer;
use std::net::SocketAddr;
use time::Duration;
use tokio::signal;
use tokio::task::AbortHandle;
use tower_http::services::ServeDir;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use super::state::AppState;
use crate::models::download::advance_downloads;
use crate::models::store::ContentStore;
use crate::models::user::Backend;
use crate::web::handlers::admin::{
    create_product_json, create_user_json, dashboard, delete_product_json, delete_user_json,
    get_product_json, get_user_json, list_products_json, list_users_json, products_page,
    update_product_json, update_user_json, users_page,
};
use crate::web::handlers::auth::{do_login, do_logout, login};
use crate::web::handlers::community::{
    community, do_dismiss_notification, do_mark_all_notifications_read, do_mark_notification_read,
    do_toggle_post_like, feed_json, notifications_json, trending_json,
};
use crate::web::handlers::downloads::{
    do_cancel_download, do_clear_completed, do_pause_download, do_resume_download,
    do_retry_download, downloads_json,
};
use crate::web::handlers::handler_404;
use crate::web::handlers::language::save_language;
use crate::web::handlers::pages::{
    about, contact, do_contact, home, product_detail, products, search_page,
};
use crate::web::handlers::search::search_json;
use crate::web::locale_router::localize;

pub struct App {
    state: AppState,
}

impl App {
    pub async fn new(state: AppState) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self { state })
    }

    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        let authn_backend = Backend {
            store: self.state.content.clone(),
        };

        let session_store = MemoryStore::default();
        let session_layer = SessionManagerLayer::new(session_store)
            .with_secure(self.state.config.env == "production")
            .with_same_site(SameSite::Lax)
            .with_expiry(Expiry::OnInactivity(Duration::seconds(60 * 60 * 24)));

        let auth_layer = AuthManagerLayerBuilder::new(authn_backend, session_layer).build();

        // mock transfer progress, advanced in the background until shutdown
        let simulator_task = tokio::task::spawn(run_download_simulator(
            self.state.content.clone(),
            self.state.config.download_tick,
        ));

        let static_router = Router::new().nest_service("/static", ServeDir::new("static"));

        let admin_router = Router::new()
            .route("/admin", get(dashboard))
            .route("/admin/users", get(users_page))
            .route("/admin/products", get(products_page))
            .route("/admin/api/users", get(list_users_json))
            .route("/admin/api/users", post(create_user_json))
            .route("/admin/api/users/:id", get(get_user_json))
            .route("/admin/api/users/:id", put(update_user_json))
            .route("/admin/api/users/:id", delete(delete_user_json))
            .route("/admin/api/products", get(list_products_json))
            .route("/admin/api/products", post(create_product_json))
            .route("/admin/api/products/:id", get(get_product_json))
            .route("/admin/api/products/:id", put(update_product_json))
            .route("/admin/api/products/:id", delete(delete_product_json))
            .route("/admin/logout", post(do_logout))
            .route_layer(login_required!(Backend, login_url = "/admin/login"));

        let api_router = Router::new()
            .route("/api/search", get(search_json))
            .route("/api/locale", post(save_language))
            .route("/api/community/feed", get(feed_json))
            .route("/api/community/trending", get(trending_json))
            .route("/api/community/notifications", get(notifications_json))
            .route(
                "/api/community/notifications/read-all",
                post(do_mark_all_notifications_read),
            )
            .route(
                "/api/community/notifications/:id/read",
                post(do_mark_notification_read),
            )
            .route(
                "/api/community/notifications/:id",
                delete(do_dismiss_notification),
            )
            .route("/api/posts/:id/like", post(do_toggle_post_like))
            .route("/api/downloads", get(downloads_json))
            .route("/api/downloads/clear-completed", post(do_clear_completed))
            .route("/api/downloads/:id/resume", post(do_resume_download))
            .route("/api/downloads/:id/pause", post(do_pause_download))
            .route("/api/downloads/:id/retry", post(do_retry_download))
            .route("/api/downloads/:id", delete(do_cancel_download));

        let addr: SocketAddr = self.state.config.listen_addr.parse()?;

        let app = Router::new()
            .route("/:locale/home", get(home))
            .route("/:locale/about", get(about))
            .route("/:locale/contact", get(contact))
            .route("/:locale/contact", post(do_contact))
            .route("/:locale/products", get(products))
            .route("/:locale/products/:id", get(product_detail))
            .route("/:locale/community", get(community))
            .route("/:locale/search", get(search_page))
            .route("/admin/login", get(login))
            .route("/admin/login", post(do_login))
            .fallback(handler_404)
            .merge(admin_router)
            .merge(api_router)
            .layer(MessagesManagerLayer)
            .layer(auth_layer)
            .layer(middleware::from_fn_with_state(self.state.clone(), localize))
            .with_state(self.state)
            .merge(static_router);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("listening on {}", addr);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal(simulator_task.abort_handle()))
            .await?;

        // the simulator only ends via abort
        let _ = simulator_task.await;

        Ok(())
    }
}

async fn run_download_simulator(store: Arc<ContentStore>, period: std::time::Duration) {
    let mut interval = tokio::time::interval(period);
    // the first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        advance_downloads(&store, period).await;
    }
}

async fn shutdown_signal(simulator_abort_handle: AbortHandle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { simulator_abort_handle.abort() },
        _ = terminate => { simulator_abort_handle.abort() },
    }
}
