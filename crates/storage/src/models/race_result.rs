use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A finish record for one participant in one competition or stage.
///
/// `time` is NULL for riders who did not finish; such rows sort after
/// every finisher. `leader_color`/`leader_text` mark jersey leaders and
/// surface as a badge next to the rider's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RaceResult {
    pub result_id: i32,
    pub competition_id: i32,
    pub participant_id: i32,
    pub time: Option<chrono::NaiveTime>,
    pub place_distance: Option<i32>,
    pub place_group: Option<i32>,
    pub points_distance: Option<Decimal>,
    pub points_group: Option<Decimal>,
    pub status: Option<String>,
    pub leader_color: Option<String>,
    pub leader_text: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub modified_at: chrono::NaiveDateTime,
}
