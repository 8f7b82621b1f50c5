use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// External timing-provider URL tracked for a competition.
///
/// `url` is the configured template, `current_url` the presently resolved
/// address; `sync_index` counts through candidate URLs during a sync run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UrlSync {
    pub url_sync_id: i32,
    pub competition_id: i32,
    pub kind: String,
    pub url: String,
    pub current_url: Option<String>,
    pub sync_index: i32,
    pub expires: Option<chrono::NaiveDateTime>,
}
