pub mod admin;
pub mod community;
pub mod search;

pub use admin::*;
pub use community::*;
pub use search::*;

use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct PaginationMeta {
    pub offset: i64,
    pub limit: i64,
    pub total: Option<i64>,
    pub has_more: bool,
}
