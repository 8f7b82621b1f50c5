use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{LapResult, Participant, RaceResult};

/// Query string accepted by result listings, public and manager side.
///
/// `number` stays a raw string here: a non-numeric value is reported as a
/// validation warning and the filter is skipped, it never fails the
/// request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ResultListQuery {
    #[serde(flatten)]
    pub pagination: super::common::PaginationParams,
    pub distance: Option<i32>,
    pub group: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub number: Option<String>,
}

/// Resolved filter the repository layer executes. Built by the web layer
/// from a [`ResultListQuery`] after number parsing and slug folding.
#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
    pub competition_ids: Vec<i32>,
    pub distance_id: Option<i32>,
    pub group: Option<String>,
    pub search: Option<String>,
    /// The public list also matches free-text team names; the manager
    /// list only matches rider slug and bib number.
    pub search_teams: bool,
    pub status: Option<String>,
    pub number: Option<i32>,
    /// How many intermediate split columns to fetch (0, 1 or 4).
    pub lap_columns: u8,
}

/// One row of a result table: the finish record joined with the rider
/// and, when present, their registered team and split times.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ResultRow {
    pub result_id: i32,
    pub competition_id: i32,
    pub time: Option<NaiveTime>,
    pub place_distance: Option<i32>,
    pub place_group: Option<i32>,
    pub points_distance: Option<Decimal>,
    pub points_group: Option<Decimal>,
    pub status: Option<String>,
    pub leader_color: Option<String>,
    pub leader_text: Option<String>,
    pub participant_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub slug: String,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<String>,
    pub number: Option<i32>,
    pub group_name: Option<String>,
    pub bike_brand: Option<String>,
    pub team_id: Option<i32>,
    pub team_title: Option<String>,
    pub team_name: Option<String>,
    pub l1: Option<NaiveTime>,
    pub l2: Option<NaiveTime>,
    pub l3: Option<NaiveTime>,
    pub l4: Option<NaiveTime>,
}

impl ResultRow {
    /// Registered team title when linked, otherwise the free-text team
    /// name from registration.
    pub fn display_team(&self) -> Option<&str> {
        self.team_title
            .as_deref()
            .or(self.team_name.as_deref())
            .filter(|t| !t.is_empty())
    }
}

/// A single result with its rider and split times, as edited by the
/// manager screens.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultDetailResponse {
    pub result: RaceResult,
    pub participant: Participant,
    pub laps: Vec<LapResult>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LapEntry {
    #[validate(range(min = 1, max = 20, message = "lap index must be between 1 and 20"))]
    pub lap_index: i32,
    #[schema(value_type = Option<String>, example = "01:02:03")]
    pub time: Option<NaiveTime>,
}

/// Create/update payload for one result. Laps replace the stored set
/// wholesale.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveResultRequest {
    pub participant_id: i32,

    #[schema(value_type = Option<String>, example = "02:15:47")]
    pub time: Option<NaiveTime>,

    #[validate(length(max = 32))]
    pub status: Option<String>,

    pub place_distance: Option<i32>,
    pub place_group: Option<i32>,
    pub points_distance: Option<Decimal>,
    pub points_group: Option<Decimal>,

    #[validate(length(max = 32))]
    pub leader_color: Option<String>,
    #[validate(length(max = 255))]
    pub leader_text: Option<String>,

    #[validate(nested)]
    #[serde(default)]
    pub laps: Vec<LapEntry>,
}
