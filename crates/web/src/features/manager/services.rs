use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use storage::dto::result::{ResultDetailResponse, ResultFilter, ResultListQuery, SaveResultRequest};
use storage::dto::team::{StageApplication, TeamApplicationRow, TeamDetailResponse, UpdateTeamRequest};
use storage::dto::url_sync::UpdateUrlSyncRequest;
use storage::models::{Competition, Distance, Team, UrlSync};
use storage::repository::competition::{CompetitionRepository, DistanceScope};
use storage::repository::result::ResultRepository;
use storage::repository::team::TeamRepository;
use storage::repository::url_sync::UrlSyncRepository;
use utoipa::ToSchema;

use crate::error::WebError;
use crate::features::results::services::{empty_table, select_distance};
use crate::reports::{self, ReportAction};
use crate::rules::{self, CompetitionContext};
use crate::tables::results::{result_table, ResultTableContext};
use crate::tables::TableDocument;

pub const NUMBER_WARNING: &str = "In number field you can enter only number";

#[derive(Debug, Serialize, ToSchema)]
pub struct ManageResultListResponse {
    pub competition: Competition,
    pub distances: Vec<Distance>,
    pub distance_id: Option<i32>,
    pub groups: Vec<String>,
    /// User-facing filter problems. Malformed filters never fail the
    /// request, they are skipped and reported here.
    pub warnings: Vec<String>,
    pub table: TableDocument,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportRequest {
    /// One of the report action names, e.g. `results_groups`.
    pub action: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecalculateResponse {
    /// Standing rows written by the recomputation.
    pub recalculated: u64,
}

/// Result list as the manager sees it: same table the public gets, but
/// with the status and bib-number filters and without team-name search.
pub async fn result_list(
    pool: &PgPool,
    competition_id: i32,
    query: &ResultListQuery,
) -> Result<ManageResultListResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;
    let ctx = rules.context();

    let distances = CompetitionRepository::new(pool)
        .distances(ctx.series.competition_id, DistanceScope::All)
        .await?;
    let Some(distance) = select_distance(&distances, query.distance) else {
        return Ok(ManageResultListResponse {
            competition: ctx.competition.clone(),
            distances,
            distance_id: None,
            groups: Vec::new(),
            warnings: Vec::new(),
            table: empty_table(),
        });
    };

    let mut warnings = Vec::new();
    let number = parse_number_filter(query.number.as_deref(), &mut warnings);

    let group = query.group.as_deref();
    let kind = rules.result_table(&distance, group);

    let filter = ResultFilter {
        competition_ids: ctx.family_ids(),
        distance_id: Some(distance.distance_id),
        group: query.group.clone(),
        search: query.search.clone(),
        search_teams: false,
        status: query.status.clone().filter(|s| !s.is_empty()),
        number,
        lap_columns: kind.lap_columns(),
    };
    let rows = ResultRepository::new(pool).list(&filter).await?;

    let table_ctx = ResultTableContext {
        competition_id: ctx.competition.competition_id,
        have_diploma: ctx.have_diploma(),
        stage_names: ctx.stage_names(),
    };
    let table = result_table(kind, &table_ctx, rows, query.pagination.page);

    Ok(ManageResultListResponse {
        competition: ctx.competition.clone(),
        groups: rules.groups(distance.distance_id),
        distances,
        distance_id: Some(distance.distance_id),
        warnings,
        table,
    })
}

pub async fn create_result(
    pool: &PgPool,
    competition_id: i32,
    req: &SaveResultRequest,
) -> Result<ResultDetailResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;

    let detail = ResultRepository::new(pool)
        .create(rules.context().competition.competition_id, req)
        .await?;

    let recalculated = rules.recalculate_standings(pool).await?;
    tracing::debug!(competition_id, recalculated, "standings recomputed after result save");

    Ok(detail)
}

pub async fn get_result(
    pool: &PgPool,
    competition_id: i32,
    result_id: i32,
) -> Result<ResultDetailResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;

    let detail = ResultRepository::new(pool).find_detail(result_id).await?;
    if !context.family_ids().contains(&detail.result.competition_id) {
        return Err(WebError::NotFound);
    }

    Ok(detail)
}

pub async fn update_result(
    pool: &PgPool,
    competition_id: i32,
    result_id: i32,
    req: &SaveResultRequest,
) -> Result<ResultDetailResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;

    let repo = ResultRepository::new(pool);
    let existing = repo.find_detail(result_id).await?;
    if !rules
        .context()
        .family_ids()
        .contains(&existing.result.competition_id)
    {
        return Err(WebError::NotFound);
    }

    let detail = repo.update(result_id, req).await?;

    let recalculated = rules.recalculate_standings(pool).await?;
    tracing::debug!(competition_id, recalculated, "standings recomputed after result save");

    Ok(detail)
}

/// Builds the requested PDF report. The action name is resolved before
/// anything else; an unknown action is a missing resource, not a bad
/// request.
pub async fn build_report(
    pool: &PgPool,
    competition_id: i32,
    req: &ReportRequest,
    today: NaiveDate,
) -> Result<(String, Vec<u8>), WebError> {
    let action = ReportAction::parse(&req.action).ok_or(WebError::NotFound)?;

    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;

    let bytes = reports::build_report(pool, rules.as_ref(), action, today).await?;

    Ok((action.file_name(), bytes))
}

pub async fn team_list(pool: &PgPool, competition_id: i32) -> Result<Vec<Team>, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;

    let teams = TeamRepository::new(pool)
        .list_for_competition(context.series.competition_id)
        .await?;

    Ok(teams)
}

pub async fn team_detail(
    pool: &PgPool,
    competition_id: i32,
    team_id: i32,
) -> Result<TeamDetailResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;

    let detail = TeamRepository::new(pool)
        .find_detail(team_id, context.competition.competition_id)
        .await?;

    Ok(detail)
}

pub async fn update_team(
    pool: &PgPool,
    competition_id: i32,
    team_id: i32,
    req: &UpdateTeamRequest,
) -> Result<TeamDetailResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;

    let detail = TeamRepository::new(pool)
        .update_with_roster(team_id, rules.context().competition.competition_id, req)
        .await?;

    rules.recalculate_team_result(pool, team_id).await?;

    Ok(detail)
}

pub async fn team_applications(
    pool: &PgPool,
    competition_id: i32,
    team_id: i32,
    today: NaiveDate,
) -> Result<Vec<StageApplication>, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;

    let stages = visible_stages(&context.stages, today);
    let applications = TeamRepository::new(pool)
        .stage_applications(team_id, &stages)
        .await?;

    Ok(applications)
}

pub async fn applications(
    pool: &PgPool,
    competition_id: i32,
) -> Result<Vec<TeamApplicationRow>, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;

    let rows = TeamRepository::new(pool)
        .applications_for_competitions(&context.family_ids())
        .await?;

    Ok(rows)
}

pub async fn url_sync_list(pool: &PgPool, competition_id: i32) -> Result<Vec<UrlSync>, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;

    let syncs = UrlSyncRepository::new(pool)
        .list_for_competitions(&context.family_ids())
        .await?;

    Ok(syncs)
}

pub async fn url_sync_detail(
    pool: &PgPool,
    competition_id: i32,
    url_sync_id: i32,
) -> Result<UrlSync, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;

    let sync = UrlSyncRepository::new(pool).find_by_id(url_sync_id).await?;
    if !context.family_ids().contains(&sync.competition_id) {
        return Err(WebError::NotFound);
    }

    Ok(sync)
}

pub async fn update_url_sync(
    pool: &PgPool,
    competition_id: i32,
    url_sync_id: i32,
    req: &UpdateUrlSyncRequest,
) -> Result<UrlSync, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;

    let repo = UrlSyncRepository::new(pool);
    let existing = repo.find_by_id(url_sync_id).await?;
    if !context.family_ids().contains(&existing.competition_id) {
        return Err(WebError::NotFound);
    }

    let sync = repo.update(url_sync_id, req).await?;

    Ok(sync)
}

pub async fn recalculate_standings(
    pool: &PgPool,
    competition_id: i32,
) -> Result<RecalculateResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;

    let recalculated = rules.recalculate_standings(pool).await?;
    tracing::info!(competition_id, recalculated, "standings recomputed on request");

    Ok(RecalculateResponse { recalculated })
}

/// Stages whose applications the manager may open: every stage already
/// raced plus the next one coming up.
fn visible_stages(stages: &[Competition], today: NaiveDate) -> Vec<Competition> {
    let mut visible = Vec::new();
    for stage in stages {
        visible.push(stage.clone());
        if stage.competition_date > today {
            break;
        }
    }
    visible
}

fn parse_number_filter(raw: Option<&str>, warnings: &mut Vec<String>) -> Option<i32> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

    match raw.parse::<i32>() {
        Ok(number) => Some(number),
        Err(_) => {
            warnings.push(NUMBER_WARNING.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::competition;

    #[test]
    fn test_parse_number_filter_accepts_digits() {
        let mut warnings = Vec::new();

        assert_eq!(parse_number_filter(Some("1500"), &mut warnings), Some(1500));
        assert_eq!(parse_number_filter(Some(" 7 "), &mut warnings), Some(7));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parse_number_filter_warns_once_and_skips() {
        let mut warnings = Vec::new();

        assert_eq!(parse_number_filter(Some("15a"), &mut warnings), None);
        assert_eq!(warnings, vec![NUMBER_WARNING.to_string()]);
    }

    #[test]
    fn test_parse_number_filter_ignores_empty_input() {
        let mut warnings = Vec::new();

        assert_eq!(parse_number_filter(None, &mut warnings), None);
        assert_eq!(parse_number_filter(Some("   "), &mut warnings), None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_visible_stages_stop_after_first_future_stage() {
        let stages = vec![
            competition(10, Some(1), (2024, 5, 1), None, serde_json::json!({})),
            competition(11, Some(1), (2024, 6, 1), None, serde_json::json!({})),
            competition(12, Some(1), (2024, 7, 1), None, serde_json::json!({})),
            competition(13, Some(1), (2024, 8, 1), None, serde_json::json!({})),
        ];

        let today = chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let visible = visible_stages(&stages, today);

        let ids: Vec<i32> = visible.iter().map(|s| s.competition_id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn test_visible_stages_cover_a_finished_season() {
        let stages = vec![
            competition(10, Some(1), (2024, 5, 1), None, serde_json::json!({})),
            competition(11, Some(1), (2024, 6, 1), None, serde_json::json!({})),
        ];

        let today = chrono::NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        assert_eq!(visible_stages(&stages, today).len(), 2);
    }
}
