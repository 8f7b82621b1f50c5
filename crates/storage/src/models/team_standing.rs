use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Team points per stage slot plus the running total, one row per team
/// per series. Upserted by the team recalculation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamStanding {
    pub team_standing_id: i32,
    pub competition_id: i32,
    pub team_id: i32,
    pub points1: Option<Decimal>,
    pub points2: Option<Decimal>,
    pub points3: Option<Decimal>,
    pub points4: Option<Decimal>,
    pub points5: Option<Decimal>,
    pub points6: Option<Decimal>,
    pub points7: Option<Decimal>,
    pub points_total: Decimal,
}
