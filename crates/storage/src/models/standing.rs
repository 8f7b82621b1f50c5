use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Aggregated series standing for one participant across the stages of a
/// multi-stage competition. Rewritten wholesale on every recalculation.
///
/// Stage points are stored in seven fixed columns, one per stage slot,
/// mirroring the maximum series length.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Standing {
    pub standing_id: i32,
    pub competition_id: i32,
    pub distance_id: i32,
    pub participant_id: i32,
    pub distance_place: Option<i32>,
    pub group_place: Option<i32>,
    pub group_points1: Option<Decimal>,
    pub group_points2: Option<Decimal>,
    pub group_points3: Option<Decimal>,
    pub group_points4: Option<Decimal>,
    pub group_points5: Option<Decimal>,
    pub group_points6: Option<Decimal>,
    pub group_points7: Option<Decimal>,
    pub group_total: Decimal,
    pub distance_points1: Option<Decimal>,
    pub distance_points2: Option<Decimal>,
    pub distance_points3: Option<Decimal>,
    pub distance_points4: Option<Decimal>,
    pub distance_points5: Option<Decimal>,
    pub distance_points6: Option<Decimal>,
    pub distance_points7: Option<Decimal>,
    pub distance_total: Decimal,
}

/// Number of stage point columns carried by standings rows.
pub const STAGE_SLOTS: usize = 7;
