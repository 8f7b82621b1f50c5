use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::Team;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TeamListQuery {
    #[serde(flatten)]
    pub pagination: super::common::PaginationParams,
    pub distance: Option<i32>,
}

/// Query for the unpaginated team views, which only pick a distance.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct DistanceQuery {
    pub distance: Option<i32>,
}

/// A roster member together with the application kind for the stage being
/// viewed. `kind` is NULL when the member has not been applied for it.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RosterMember {
    pub member_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub slug: String,
    pub birthday: Option<NaiveDate>,
    pub kind: Option<i16>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamDetailResponse {
    pub team: Team,
    pub members: Vec<RosterMember>,
}

/// One roster line in a team update. Without `member_id` a new member is
/// created; `kind` sets the application for the competition being edited.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RosterEntryRequest {
    pub member_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub kind: i16,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateTeamRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 64))]
    pub country: Option<String>,
    #[validate(length(max = 255))]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[validate(nested)]
    #[serde(default)]
    pub members: Vec<RosterEntryRequest>,
}

/// Flat row of the stage team-result query, one line per scoring member.
#[derive(Debug, Clone, FromRow)]
pub struct StageTeamResultRow {
    pub team_id: i32,
    pub team_title: String,
    pub is_featured: bool,
    pub stage_points: Option<Decimal>,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub number: Option<i32>,
    pub member_points: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamResultMember {
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub number: Option<i32>,
    pub points: Option<Decimal>,
}

/// A team's scoring line-up at one stage, ordered by stage points.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamStageResult {
    pub team_id: i32,
    pub team_title: String,
    pub is_featured: bool,
    pub stage_points: Option<Decimal>,
    pub members: Vec<TeamResultMember>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeamStandingRow {
    pub team_standing_id: i32,
    pub team_id: i32,
    pub team_title: String,
    pub is_featured: bool,
    pub points1: Option<Decimal>,
    pub points2: Option<Decimal>,
    pub points3: Option<Decimal>,
    pub points4: Option<Decimal>,
    pub points5: Option<Decimal>,
    pub points6: Option<Decimal>,
    pub points7: Option<Decimal>,
    pub points_total: Decimal,
}

impl TeamStandingRow {
    pub fn points(&self, slot: usize) -> Option<Decimal> {
        match slot {
            1 => self.points1,
            2 => self.points2,
            3 => self.points3,
            4 => self.points4,
            5 => self.points5,
            6 => self.points6,
            7 => self.points7,
            _ => None,
        }
    }
}

/// Flat row of the team-by-name report query. The member columns come
/// from a LEFT JOIN and are NULL-able as a unit.
#[derive(Debug, Clone, FromRow)]
pub struct TeamByNameRow {
    pub team_name_slug: String,
    pub qualifier_count: i64,
    pub total_seconds: Option<i64>,
    pub team_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub number: Option<i32>,
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamByNameMember {
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub number: Option<i32>,
    #[schema(value_type = Option<String>, example = "01:02:03")]
    pub time: Option<NaiveTime>,
}

/// Informal team built from matching free-text team names: at least two
/// finishers, scored by the sum of its best four times.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamByNameGroup {
    pub team_name: String,
    pub team_name_slug: String,
    pub qualifier_count: i64,
    pub total_seconds: i64,
    pub members: Vec<TeamByNameMember>,
}

/// One member application for a stage, as shown on the manager's
/// application list.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeamApplicationRow {
    pub application_id: i32,
    pub competition_id: i32,
    pub team_id: i32,
    pub team_title: String,
    pub member_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub kind: i16,
    pub participant_id: Option<i32>,
    pub number: Option<i32>,
}

/// Flat row backing [`StageApplication`] grouping.
#[derive(Debug, Clone, FromRow)]
pub struct AppliedMemberRow {
    pub competition_id: i32,
    pub application_id: i32,
    pub member_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub kind: i16,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppliedMember {
    pub application_id: i32,
    pub member_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub kind: i16,
}

/// A team's applications for one stage of the series.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StageApplication {
    pub competition_id: i32,
    pub competition_name: String,
    pub competition_date: NaiveDate,
    pub members: Vec<AppliedMember>,
}
