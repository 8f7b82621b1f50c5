use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Intermediate split time for a result, numbered from 1.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LapResult {
    pub lap_result_id: i32,
    pub result_id: i32,
    pub lap_index: i32,
    pub time: Option<chrono::NaiveTime>,
}
