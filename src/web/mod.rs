pub mod app;
pub mod context;
pub mod handlers;
pub mod locale_router;
pub mod responses;
pub mod state;
