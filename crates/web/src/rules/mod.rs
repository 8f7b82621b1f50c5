//! Competition rule sets.
//!
//! Every competition row names its rule set in `processing_class`. The
//! rule set decides which table layout a listing renders, how standings
//! and team points are recomputed, and whether finisher diplomas exist.
//! An unregistered or missing key renders the whole competition
//! unreachable, the same way a missing row would.

pub mod road_race;
pub mod stage_series;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::collections::HashMap;
use storage::dto::result::ResultDetailResponse;
use storage::models::{Competition, Distance, STAGE_SLOTS};
use storage::repository::competition::CompetitionRepository;
use storage::services::standings::current_stage_slot;

use crate::error::WebError;
use crate::tables::{ResultTableKind, StandingTableKind};

pub const STAGE_SERIES: &str = "stage_series";
pub const ROAD_RACE: &str = "road_race";

/// The competition being viewed together with its series family: the
/// top level row and the stages hanging off it, in calendar order.
#[derive(Debug, Clone)]
pub struct CompetitionContext {
    pub competition: Competition,
    pub series: Competition,
    pub stages: Vec<Competition>,
}

impl CompetitionContext {
    pub async fn load(pool: &PgPool, competition_id: i32) -> Result<Self, WebError> {
        let repo = CompetitionRepository::new(pool);

        let competition = repo.find_by_id(competition_id).await?;
        let series = match competition.parent_id {
            Some(parent_id) => repo.find_by_id(parent_id).await?,
            None => competition.clone(),
        };
        let stages = repo.children(series.competition_id).await?;

        Ok(Self {
            competition,
            series,
            stages,
        })
    }

    pub fn is_series_page(&self) -> bool {
        self.competition.competition_id == self.series.competition_id
    }

    /// Ids whose results belong on this page: the viewed competition
    /// plus, on a series page, all of its stages.
    pub fn family_ids(&self) -> Vec<i32> {
        let mut ids = vec![self.competition.competition_id];
        if self.is_series_page() {
            ids.extend(self.stages.iter().map(|s| s.competition_id));
        }
        ids
    }

    /// Stage slot (1..=7) the page refers to: the viewed stage's
    /// position in the calendar, or on the series page the latest stage
    /// already raced.
    pub fn stage_slot(&self, today: NaiveDate) -> usize {
        if let Some(position) = self
            .stages
            .iter()
            .position(|s| s.competition_id == self.competition.competition_id)
        {
            return (position + 1).min(STAGE_SLOTS);
        }

        let dates: Vec<NaiveDate> = self.stages.iter().map(|s| s.competition_date).collect();
        current_stage_slot(&dates, today)
    }

    pub fn stage_names(&self) -> HashMap<i32, String> {
        self.stages
            .iter()
            .map(|s| (s.competition_id, s.name.clone()))
            .collect()
    }

    pub fn have_diploma(&self) -> bool {
        self.competition.have_diploma() || self.series.have_diploma()
    }

    /// Configured age groups for a distance; stages inherit them from
    /// the series row.
    pub fn groups_for(&self, distance_id: i32) -> Vec<String> {
        self.series.groups_for_distance(distance_id)
    }

    fn processing_key(&self) -> Option<&str> {
        self.competition
            .processing_class
            .as_deref()
            .or(self.series.processing_class.as_deref())
    }
}

#[async_trait]
pub trait CompetitionRules: Send + Sync {
    fn context(&self) -> &CompetitionContext;

    /// Age groups offered on a distance, as configured in params.
    fn groups(&self, distance_id: i32) -> Vec<String>;

    fn result_table(&self, distance: &Distance, group: Option<&str>) -> ResultTableKind;

    fn standing_table(&self, distance: &Distance, group: Option<&str>) -> StandingTableKind;

    /// Stage slot used for team results and point columns.
    fn stage_index(&self, today: NaiveDate) -> usize;

    /// Wholesale recomputation of the series standings. Returns the
    /// number of standing rows written.
    async fn recalculate_standings(&self, pool: &PgPool) -> Result<u64, WebError>;

    /// Recompute the stage points of a single team.
    async fn recalculate_team_result(&self, pool: &PgPool, team_id: i32) -> Result<(), WebError>;

    /// Render the finisher diploma, when this rule set offers one.
    fn generate_diploma(&self, detail: &ResultDetailResponse) -> Result<Vec<u8>, WebError>;
}

/// Maps the stored `processing_class` to its rule set.
pub fn resolve(context: CompetitionContext) -> Result<Box<dyn CompetitionRules>, WebError> {
    let key = context.processing_key().map(str::to_string);

    match key.as_deref() {
        Some(STAGE_SERIES) => Ok(Box::new(stage_series::StageSeriesRules::new(context))),
        Some(ROAD_RACE) => Ok(Box::new(road_race::RoadRaceRules::new(context))),
        key => {
            tracing::warn!(
                competition_id = context.competition.competition_id,
                processing_class = ?key,
                "no rule set registered for competition"
            );
            Err(WebError::NotFound)
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use storage::models::Competition;

    pub fn competition(
        id: i32,
        parent_id: Option<i32>,
        date: (i32, u32, u32),
        processing_class: Option<&str>,
        params: serde_json::Value,
    ) -> Competition {
        Competition {
            competition_id: id,
            name: format!("Competition {}", id),
            slug: format!("competition-{}", id),
            level: if parent_id.is_some() { 2 } else { 1 },
            parent_id,
            competition_date: chrono::NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            processing_class: processing_class.map(String::from),
            params,
            created_at: chrono::NaiveDate::from_ymd_opt(date.0, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    pub fn distance(id: i32, kind: Option<&str>) -> storage::models::Distance {
        storage::models::Distance {
            distance_id: id,
            competition_id: 1,
            name: format!("Distance {}", id),
            kind: kind.map(String::from),
            can_have_teams: false,
            ordering: id,
        }
    }

    pub fn result_detail(time: Option<chrono::NaiveTime>) -> super::ResultDetailResponse {
        let midnight = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        super::ResultDetailResponse {
            result: storage::models::RaceResult {
                result_id: 1,
                competition_id: 10,
                participant_id: 100,
                time,
                place_distance: Some(3),
                place_group: Some(1),
                points_distance: None,
                points_group: None,
                status: None,
                leader_color: None,
                leader_text: None,
                created_at: midnight,
                modified_at: midnight,
            },
            participant: storage::models::Participant {
                participant_id: 100,
                competition_id: 10,
                distance_id: 5,
                first_name: "Anna".to_string(),
                last_name: "Ozola".to_string(),
                slug: "anna-ozola".to_string(),
                birthday: None,
                gender: None,
                number: Some(21),
                group_name: None,
                team_id: None,
                team_name: None,
                team_name_slug: None,
                bike_brand: None,
                is_competing: true,
                created_at: midnight,
            },
            laps: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::competition;
    use super::*;

    fn series_context() -> CompetitionContext {
        let series = competition(1, None, (2024, 5, 1), Some(STAGE_SERIES), serde_json::json!({}));
        let stages = vec![
            competition(10, Some(1), (2024, 5, 1), None, serde_json::json!({})),
            competition(11, Some(1), (2024, 6, 1), None, serde_json::json!({})),
            competition(12, Some(1), (2024, 7, 1), None, serde_json::json!({})),
        ];

        CompetitionContext {
            competition: series.clone(),
            series,
            stages,
        }
    }

    #[test]
    fn test_series_page_family_covers_stages() {
        let context = series_context();

        assert!(context.is_series_page());
        assert_eq!(context.family_ids(), vec![1, 10, 11, 12]);
    }

    #[test]
    fn test_stage_page_family_is_only_itself() {
        let mut context = series_context();
        context.competition = context.stages[1].clone();

        assert!(!context.is_series_page());
        assert_eq!(context.family_ids(), vec![11]);
    }

    #[test]
    fn test_stage_slot_is_calendar_position_on_stage_page() {
        let mut context = series_context();
        context.competition = context.stages[2].clone();

        let today = chrono::NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        assert_eq!(context.stage_slot(today), 3);
    }

    #[test]
    fn test_stage_slot_follows_calendar_on_series_page() {
        let context = series_context();

        let mid_season = chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(context.stage_slot(mid_season), 2);
    }

    #[test]
    fn test_resolve_rejects_unknown_class() {
        let mut context = series_context();
        context.competition.processing_class = Some("legacy_cup".to_string());
        context.series.processing_class = Some("legacy_cup".to_string());

        assert!(matches!(resolve(context), Err(WebError::NotFound)));
    }

    #[test]
    fn test_resolve_rejects_missing_class() {
        let mut context = series_context();
        context.competition.processing_class = None;
        context.series.processing_class = None;

        assert!(matches!(resolve(context), Err(WebError::NotFound)));
    }

    #[test]
    fn test_stage_inherits_class_from_series() {
        let mut context = series_context();
        context.competition = context.stages[0].clone();

        assert!(resolve(context).is_ok());
    }
}
