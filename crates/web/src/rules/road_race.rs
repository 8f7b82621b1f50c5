use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use storage::dto::result::ResultDetailResponse;
use storage::models::Distance;

use super::{CompetitionContext, CompetitionRules};
use crate::error::WebError;
use crate::reports::pdf;
use crate::tables::{ResultTableKind, StandingTableKind};

/// Single-day road events: split-time result tables keyed by distance
/// kind, finisher diplomas, no accumulated standings or team points.
pub struct RoadRaceRules {
    context: CompetitionContext,
}

impl RoadRaceRules {
    pub fn new(context: CompetitionContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl CompetitionRules for RoadRaceRules {
    fn context(&self) -> &CompetitionContext {
        &self.context
    }

    fn groups(&self, distance_id: i32) -> Vec<String> {
        self.context.groups_for(distance_id)
    }

    fn result_table(&self, distance: &Distance, group: Option<&str>) -> ResultTableKind {
        if group.is_some() {
            ResultTableKind::RoadGroup
        } else if distance.is_folk() {
            ResultTableKind::RoadOneSplit
        } else if distance.is_sport() {
            ResultTableKind::RoadFourSplits
        } else {
            ResultTableKind::Road
        }
    }

    fn standing_table(&self, _distance: &Distance, group: Option<&str>) -> StandingTableKind {
        if group.is_some() {
            StandingTableKind::Group
        } else {
            StandingTableKind::Distance
        }
    }

    fn stage_index(&self, _today: NaiveDate) -> usize {
        1
    }

    async fn recalculate_standings(&self, _pool: &PgPool) -> Result<u64, WebError> {
        // Nothing accumulates across stages for a one-day race.
        Ok(0)
    }

    async fn recalculate_team_result(&self, _pool: &PgPool, _team_id: i32) -> Result<(), WebError> {
        Ok(())
    }

    fn generate_diploma(&self, detail: &ResultDetailResponse) -> Result<Vec<u8>, WebError> {
        if !self.context.have_diploma() {
            return Err(WebError::NotFound);
        }
        if detail.result.time.is_none() {
            return Err(WebError::NotFound);
        }

        Ok(pdf::render_diploma(&self.context.competition, detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{competition, distance, result_detail};
    use crate::rules::ROAD_RACE;

    fn rules(params: serde_json::Value) -> RoadRaceRules {
        let event = competition(1, None, (2024, 9, 8), Some(ROAD_RACE), params);

        RoadRaceRules::new(CompetitionContext {
            competition: event.clone(),
            series: event,
            stages: Vec::new(),
        })
    }

    #[test]
    fn test_table_kind_follows_distance_kind() {
        let rules = rules(serde_json::json!({}));

        assert_eq!(
            rules.result_table(&distance(1, Some("folk")), None),
            ResultTableKind::RoadOneSplit
        );
        assert_eq!(
            rules.result_table(&distance(2, Some("sport")), None),
            ResultTableKind::RoadFourSplits
        );
        assert_eq!(
            rules.result_table(&distance(3, None), None),
            ResultTableKind::Road
        );
        assert_eq!(
            rules.result_table(&distance(2, Some("sport")), Some("M-18")),
            ResultTableKind::RoadGroup
        );
    }

    #[test]
    fn test_diploma_requires_param() {
        let rules = rules(serde_json::json!({}));
        let detail = result_detail(chrono::NaiveTime::from_hms_opt(1, 2, 3));

        assert!(matches!(
            rules.generate_diploma(&detail),
            Err(WebError::NotFound)
        ));
    }

    #[test]
    fn test_diploma_requires_finish_time() {
        let rules = rules(serde_json::json!({"have_diploma": true}));
        let detail = result_detail(None);

        assert!(matches!(
            rules.generate_diploma(&detail),
            Err(WebError::NotFound)
        ));
    }

    #[test]
    fn test_diploma_renders_for_finisher() {
        let rules = rules(serde_json::json!({"have_diploma": true}));
        let detail = result_detail(chrono::NaiveTime::from_hms_opt(1, 2, 3));

        let bytes = rules.generate_diploma(&detail).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
