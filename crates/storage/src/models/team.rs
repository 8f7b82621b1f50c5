use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A registered team, tied to the distance it competes on.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    pub team_id: i32,
    pub distance_id: i32,
    pub title: String,
    pub slug: String,
    pub is_featured: bool,
    pub country: Option<String>,
    pub contact_person: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}
