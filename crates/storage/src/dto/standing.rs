use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct StandingListQuery {
    #[serde(flatten)]
    pub pagination: super::common::PaginationParams,
    pub distance: Option<i32>,
    pub group: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StandingFilter {
    pub competition_ids: Vec<i32>,
    pub distance_id: Option<i32>,
    pub group: Option<String>,
    pub search: Option<String>,
}

/// One row of a series standing table: accumulated points joined with
/// the rider.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StandingRow {
    pub standing_id: i32,
    pub distance_id: i32,
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
    pub participant_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub slug: String,
    pub birthday: Option<NaiveDate>,
    pub number: Option<i32>,
    pub group_name: Option<String>,
    pub team_id: Option<i32>,
    pub team_title: Option<String>,
    pub team_name: Option<String>,
}

impl StandingRow {
    pub fn display_team(&self) -> Option<&str> {
        self.team_title
            .as_deref()
            .or(self.team_name.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn group_points(&self, slot: usize) -> Option<Decimal> {
        match slot {
            1 => self.group_points1,
            2 => self.group_points2,
            3 => self.group_points3,
            4 => self.group_points4,
            5 => self.group_points5,
            6 => self.group_points6,
            7 => self.group_points7,
            _ => None,
        }
    }

    pub fn distance_points(&self, slot: usize) -> Option<Decimal> {
        match slot {
            1 => self.distance_points1,
            2 => self.distance_points2,
            3 => self.distance_points3,
            4 => self.distance_points4,
            5 => self.distance_points5,
            6 => self.distance_points6,
            7 => self.distance_points7,
            _ => None,
        }
    }
}
