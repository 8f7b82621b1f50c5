use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A rider registered for one distance of one competition.
///
/// `team_id` points at a registered team when the rider belongs to one;
/// `team_name` is the free text entered at registration and is what the
/// team-by-name report groups on, through its slugged form.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Participant {
    pub participant_id: i32,
    pub competition_id: i32,
    pub distance_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub slug: String,
    pub birthday: Option<chrono::NaiveDate>,
    pub gender: Option<String>,
    pub number: Option<i32>,
    pub group_name: Option<String>,
    pub team_id: Option<i32>,
    pub team_name: Option<String>,
    pub team_name_slug: Option<String>,
    pub bike_brand: Option<String>,
    pub is_competing: bool,
    pub created_at: chrono::NaiveDateTime,
}
