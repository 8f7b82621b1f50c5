use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Editorial content page, optionally attached to a competition, unique
/// per (url, language).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FlatPage {
    pub flat_page_id: i32,
    pub url: String,
    pub title: String,
    pub content: String,
    pub enable_comments: bool,
    pub competition_id: Option<i32>,
    pub ordering: i32,
    pub is_published: bool,
    pub language: String,
}
