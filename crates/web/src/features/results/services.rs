use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use storage::dto::competition::{ArchiveYear, CompetitionDetailResponse};
use storage::dto::result::{ResultFilter, ResultListQuery};
use storage::dto::standing::{StandingFilter, StandingListQuery};
use storage::models::{Competition, Distance};
use storage::repository::competition::{CompetitionRepository, DistanceScope};
use storage::repository::result::ResultRepository;
use storage::repository::standing::StandingRepository;
use utoipa::ToSchema;

use crate::error::WebError;
use crate::rules::{self, CompetitionContext};
use crate::tables::results::{result_table, ResultTableContext};
use crate::tables::standings::{standing_table, StandingTableContext};
use crate::tables::TableDocument;

#[derive(Debug, Serialize, ToSchema)]
pub struct ResultListResponse {
    pub competition: Competition,
    pub distances: Vec<Distance>,
    /// The distance actually rendered; None when nothing has results yet.
    pub distance_id: Option<i32>,
    pub groups: Vec<String>,
    pub table: TableDocument,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StandingListResponse {
    pub competition: Competition,
    pub distances: Vec<Distance>,
    pub distance_id: Option<i32>,
    pub groups: Vec<String>,
    pub table: TableDocument,
}

pub async fn archive(pool: &PgPool, today: NaiveDate) -> Result<Vec<ArchiveYear>, WebError> {
    let years = CompetitionRepository::new(pool).archive(today).await?;
    Ok(years)
}

pub async fn list_competitions(pool: &PgPool) -> Result<Vec<Competition>, WebError> {
    let competitions = CompetitionRepository::new(pool).list().await?;
    Ok(competitions)
}

pub async fn competition_detail(
    pool: &PgPool,
    competition_id: i32,
) -> Result<CompetitionDetailResponse, WebError> {
    let detail = CompetitionRepository::new(pool)
        .find_detail(competition_id)
        .await?;
    Ok(detail)
}

pub async fn result_list(
    pool: &PgPool,
    competition_id: i32,
    query: &ResultListQuery,
) -> Result<ResultListResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;
    let ctx = rules.context();

    let distances = CompetitionRepository::new(pool)
        .distances(ctx.series.competition_id, DistanceScope::WithResults)
        .await?;
    let Some(distance) = select_distance(&distances, query.distance) else {
        return Ok(ResultListResponse {
            competition: ctx.competition.clone(),
            distances,
            distance_id: None,
            groups: Vec::new(),
            table: empty_table(),
        });
    };

    let group = query.group.as_deref();
    let kind = rules.result_table(&distance, group);

    let filter = ResultFilter {
        competition_ids: ctx.family_ids(),
        distance_id: Some(distance.distance_id),
        group: query.group.clone(),
        search: query.search.clone(),
        search_teams: true,
        lap_columns: kind.lap_columns(),
        ..Default::default()
    };
    let rows = ResultRepository::new(pool).list(&filter).await?;

    let table_ctx = ResultTableContext {
        competition_id: ctx.competition.competition_id,
        have_diploma: ctx.have_diploma(),
        stage_names: ctx.stage_names(),
    };
    let table = result_table(kind, &table_ctx, rows, query.pagination.page);

    Ok(ResultListResponse {
        competition: ctx.competition.clone(),
        groups: rules.groups(distance.distance_id),
        distances,
        distance_id: Some(distance.distance_id),
        table,
    })
}

pub async fn standing_list(
    pool: &PgPool,
    competition_id: i32,
    query: &StandingListQuery,
) -> Result<StandingListResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;
    let ctx = rules.context();

    let distances = CompetitionRepository::new(pool)
        .distances(ctx.series.competition_id, DistanceScope::WithResults)
        .await?;
    let Some(distance) = select_distance(&distances, query.distance) else {
        return Ok(StandingListResponse {
            competition: ctx.competition.clone(),
            distances,
            distance_id: None,
            groups: Vec::new(),
            table: empty_table(),
        });
    };

    let group = query.group.as_deref();
    let kind = rules.standing_table(&distance, group);

    // Standings live on the series row, never on a stage.
    let filter = StandingFilter {
        competition_ids: vec![ctx.series.competition_id],
        distance_id: Some(distance.distance_id),
        group: query.group.clone(),
        search: query.search.clone(),
    };
    let rows = StandingRepository::new(pool).list(&filter).await?;

    let table_ctx = StandingTableContext {
        competition_id: ctx.competition.competition_id,
        stage_count: ctx.stages.len().max(1),
    };
    let table = standing_table(kind, &table_ctx, rows, query.pagination.page);

    Ok(StandingListResponse {
        competition: ctx.competition.clone(),
        groups: rules.groups(distance.distance_id),
        distances,
        distance_id: Some(distance.distance_id),
        table,
    })
}

/// Renders the finisher diploma for one result of the competition
/// family. Callers answer 404 for every failure here.
pub async fn diploma(
    pool: &PgPool,
    competition_id: i32,
    result_id: i32,
) -> Result<(String, Vec<u8>), WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;

    let detail = ResultRepository::new(pool).find_detail(result_id).await?;
    if !rules
        .context()
        .family_ids()
        .contains(&detail.result.competition_id)
    {
        return Err(WebError::NotFound);
    }

    let bytes = rules.generate_diploma(&detail)?;
    Ok((format!("{}.pdf", detail.participant.slug), bytes))
}

pub(crate) fn select_distance(distances: &[Distance], requested: Option<i32>) -> Option<Distance> {
    match requested {
        Some(distance_id) => distances
            .iter()
            .find(|d| d.distance_id == distance_id)
            .cloned(),
        None => distances.first().cloned(),
    }
}

pub(crate) fn empty_table() -> TableDocument {
    TableDocument::paged("distance", Vec::new(), Vec::new(), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::distance;

    #[test]
    fn test_select_distance_prefers_the_requested_one() {
        let distances = vec![distance(1, None), distance(2, None)];

        assert_eq!(
            select_distance(&distances, Some(2)).map(|d| d.distance_id),
            Some(2)
        );
        assert_eq!(
            select_distance(&distances, None).map(|d| d.distance_id),
            Some(1)
        );
        assert!(select_distance(&distances, Some(9)).is_none());
        assert!(select_distance(&[], None).is_none());
    }
}
