use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use storage::dto::result::ResultDetailResponse;
use storage::models::Distance;
use storage::services::standings;

use super::{CompetitionContext, CompetitionRules};
use crate::error::WebError;
use crate::tables::{ResultTableKind, StandingTableKind};

/// Multi-stage series: grouped results per stage, accumulated individual
/// and team standings on the series page, no diplomas.
pub struct StageSeriesRules {
    context: CompetitionContext,
}

impl StageSeriesRules {
    pub fn new(context: CompetitionContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl CompetitionRules for StageSeriesRules {
    fn context(&self) -> &CompetitionContext {
        &self.context
    }

    fn groups(&self, distance_id: i32) -> Vec<String> {
        self.context.groups_for(distance_id)
    }

    fn result_table(&self, _distance: &Distance, group: Option<&str>) -> ResultTableKind {
        if group.is_some() {
            ResultTableKind::Group
        } else if self.context.is_series_page() && !self.context.stages.is_empty() {
            ResultTableKind::ChildrenGroup
        } else {
            ResultTableKind::Distance
        }
    }

    fn standing_table(&self, distance: &Distance, group: Option<&str>) -> StandingTableKind {
        if group.is_some() {
            StandingTableKind::Group
        } else if !self.groups(distance.distance_id).is_empty() {
            StandingTableKind::ChildrenGroup
        } else {
            StandingTableKind::Distance
        }
    }

    fn stage_index(&self, today: NaiveDate) -> usize {
        self.context.stage_slot(today)
    }

    async fn recalculate_standings(&self, pool: &PgPool) -> Result<u64, WebError> {
        let written =
            standings::recalculate_competition(pool, self.context.series.competition_id).await?;
        Ok(written)
    }

    async fn recalculate_team_result(&self, pool: &PgPool, team_id: i32) -> Result<(), WebError> {
        standings::recalculate_team(pool, team_id).await?;
        Ok(())
    }

    fn generate_diploma(&self, _detail: &ResultDetailResponse) -> Result<Vec<u8>, WebError> {
        Err(WebError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{competition, distance};
    use crate::rules::STAGE_SERIES;

    fn rules(on_series_page: bool) -> StageSeriesRules {
        let series = competition(
            1,
            None,
            (2024, 5, 1),
            Some(STAGE_SERIES),
            serde_json::json!({"groups": {"5": ["M-18", "W-18"]}}),
        );
        let stages = vec![
            competition(10, Some(1), (2024, 5, 1), None, serde_json::json!({})),
            competition(11, Some(1), (2024, 6, 1), None, serde_json::json!({})),
        ];
        let viewed = if on_series_page {
            series.clone()
        } else {
            stages[0].clone()
        };

        StageSeriesRules::new(CompetitionContext {
            competition: viewed,
            series,
            stages,
        })
    }

    #[test]
    fn test_group_filter_selects_group_table() {
        let rules = rules(false);

        let kind = rules.result_table(&distance(5, None), Some("M-18"));
        assert_eq!(kind, ResultTableKind::Group);
    }

    #[test]
    fn test_series_page_selects_children_table() {
        let rules = rules(true);

        let kind = rules.result_table(&distance(5, None), None);
        assert_eq!(kind, ResultTableKind::ChildrenGroup);
    }

    #[test]
    fn test_stage_page_selects_distance_table() {
        let rules = rules(false);

        let kind = rules.result_table(&distance(5, None), None);
        assert_eq!(kind, ResultTableKind::Distance);
    }

    #[test]
    fn test_standing_table_shows_group_places_when_groups_exist() {
        let rules = rules(true);

        assert_eq!(
            rules.standing_table(&distance(5, None), None),
            StandingTableKind::ChildrenGroup
        );
        assert_eq!(
            rules.standing_table(&distance(6, None), None),
            StandingTableKind::Distance
        );
        assert_eq!(
            rules.standing_table(&distance(5, None), Some("M-18")),
            StandingTableKind::Group
        );
    }

    #[test]
    fn test_groups_come_from_series_params() {
        let rules = rules(false);

        assert_eq!(rules.groups(5), vec!["M-18", "W-18"]);
        assert!(rules.groups(6).is_empty());
    }

    #[test]
    fn test_no_diploma_for_series() {
        let rules = rules(false);
        let detail = crate::rules::fixtures::result_detail(None);

        assert!(matches!(
            rules.generate_diploma(&detail),
            Err(WebError::NotFound)
        ));
    }
}
