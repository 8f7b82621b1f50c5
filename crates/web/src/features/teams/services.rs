use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use storage::dto::common::{PaginationMeta, PaginationParams, TABLE_PAGE_SIZE};
use storage::dto::team::{TeamByNameGroup, TeamDetailResponse, TeamStageResult};
use storage::models::{Competition, Distance, Team};
use storage::repository::competition::{CompetitionRepository, DistanceScope};
use storage::repository::team::TeamRepository;
use storage::repository::team_standing::TeamStandingRepository;
use utoipa::ToSchema;

use crate::cache::{self, ReportCache};
use crate::error::WebError;
use crate::features::results::services::select_distance;
use crate::rules::{self, CompetitionContext};
use crate::tables::teams::team_standing_table;
use crate::tables::TableDocument;

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamResultsResponse {
    pub competition: Competition,
    pub distances: Vec<Distance>,
    pub distance_id: Option<i32>,
    /// The stage whose line-ups are shown; None outside the season.
    pub stage: Option<Competition>,
    pub teams: Vec<TeamStageResult>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamStandingsResponse {
    pub competition: Competition,
    pub distances: Vec<Distance>,
    pub distance_id: Option<i32>,
    pub table: TableDocument,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamListResponse {
    pub competition: Competition,
    pub distances: Vec<Distance>,
    pub distance_id: Option<i32>,
    pub teams: Vec<Team>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamsByNameResponse {
    pub competition: Competition,
    pub distances: Vec<Distance>,
    pub distance_id: Option<i32>,
    pub teams: Vec<TeamByNameGroup>,
}

/// Teams of the current stage with their scoring line-ups.
pub async fn team_results(
    pool: &PgPool,
    competition_id: i32,
    requested_distance: Option<i32>,
    today: NaiveDate,
) -> Result<TeamResultsResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;
    let ctx = rules.context();

    let distances = team_distances(pool, ctx.series.competition_id).await?;
    let Some(distance) = select_distance(&distances, requested_distance) else {
        return Ok(TeamResultsResponse {
            competition: ctx.competition.clone(),
            distances,
            distance_id: None,
            stage: None,
            teams: Vec::new(),
        });
    };

    let slot = rules.stage_index(today);
    let stage = ctx.stages.get(slot.saturating_sub(1)).cloned();

    let teams = match &stage {
        Some(stage) => {
            TeamStandingRepository::new(pool)
                .stage_results(
                    stage.competition_id,
                    ctx.series.competition_id,
                    distance.distance_id,
                    slot,
                )
                .await?
        }
        None => Vec::new(),
    };

    Ok(TeamResultsResponse {
        competition: ctx.competition.clone(),
        distances,
        distance_id: Some(distance.distance_id),
        stage,
        teams,
    })
}

pub async fn team_standings(
    pool: &PgPool,
    competition_id: i32,
    requested_distance: Option<i32>,
    page: u32,
) -> Result<TeamStandingsResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;
    let ctx = rules.context();

    let distances = team_distances(pool, ctx.series.competition_id).await?;
    let Some(distance) = select_distance(&distances, requested_distance) else {
        return Ok(TeamStandingsResponse {
            competition: ctx.competition.clone(),
            distances,
            distance_id: None,
            table: TableDocument::paged("team_standings", Vec::new(), Vec::new(), 1),
        });
    };

    let rows = TeamStandingRepository::new(pool)
        .standings(ctx.series.competition_id, distance.distance_id)
        .await?;

    let table = team_standing_table(
        ctx.competition.competition_id,
        ctx.stages.len().max(1),
        rows,
        page,
    );

    Ok(TeamStandingsResponse {
        competition: ctx.competition.clone(),
        distances,
        distance_id: Some(distance.distance_id),
        table,
    })
}

pub async fn team_list(
    pool: &PgPool,
    competition_id: i32,
    requested_distance: Option<i32>,
    pagination: &PaginationParams,
) -> Result<TeamListResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;
    let ctx = rules.context();

    let distances = team_distances(pool, ctx.series.competition_id).await?;
    let Some(distance) = select_distance(&distances, requested_distance) else {
        return Ok(TeamListResponse {
            competition: ctx.competition.clone(),
            distances,
            distance_id: None,
            teams: Vec::new(),
            pagination: PaginationMeta::new(1, TABLE_PAGE_SIZE, 0),
        });
    };

    let teams = TeamRepository::new(pool)
        .list_by_distance(distance.distance_id)
        .await?;
    let (teams, pagination) = paginate_teams(teams, pagination.page);

    Ok(TeamListResponse {
        competition: ctx.competition.clone(),
        distances,
        distance_id: Some(distance.distance_id),
        teams,
        pagination,
    })
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

/// Informal teams grouped by the free-text name riders entered at
/// registration. Served from [`ReportCache`] because the aggregation is
/// the heaviest query on race day.
pub async fn teams_by_name(
    pool: &PgPool,
    report_cache: &ReportCache,
    competition_id: i32,
    requested_distance: Option<i32>,
    today: NaiveDate,
) -> Result<TeamsByNameResponse, WebError> {
    let context = CompetitionContext::load(pool, competition_id).await?;
    let rules = rules::resolve(context)?;
    let ctx = rules.context();

    let distances = CompetitionRepository::new(pool)
        .distances(ctx.series.competition_id, DistanceScope::WithResults)
        .await?;
    let Some(distance) = select_distance(&distances, requested_distance) else {
        return Ok(TeamsByNameResponse {
            competition: ctx.competition.clone(),
            distances,
            distance_id: None,
            teams: Vec::new(),
        });
    };

    let key = cache::cache_key(ctx.competition.competition_id, distance.distance_id);
    let teams = match report_cache.get(&key) {
        Some(cached) => cached,
        None => {
            let groups = TeamStandingRepository::new(pool)
                .by_name(distance.distance_id)
                .await?;
            let ttl = cache::ttl_for(ctx.competition.competition_date, today);
            report_cache.insert(key, groups.clone(), ttl);
            groups
        }
    };

    Ok(TeamsByNameResponse {
        competition: ctx.competition.clone(),
        distances,
        distance_id: Some(distance.distance_id),
        teams,
    })
}

async fn team_distances(pool: &PgPool, series_id: i32) -> Result<Vec<Distance>, WebError> {
    let distances = CompetitionRepository::new(pool)
        .distances(series_id, DistanceScope::WithTeams)
        .await?;
    Ok(distances)
}

fn paginate_teams(teams: Vec<Team>, page: u32) -> (Vec<Team>, PaginationMeta) {
    let pagination = PaginationMeta::new(page, TABLE_PAGE_SIZE, teams.len() as i64);

    let offset = (page.saturating_sub(1) as usize) * TABLE_PAGE_SIZE as usize;
    let teams = teams
        .into_iter()
        .skip(offset)
        .take(TABLE_PAGE_SIZE as usize)
        .collect();

    (teams, pagination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn team(team_id: i32) -> Team {
        Team {
            team_id,
            distance_id: 1,
            title: format!("Team {}", team_id),
            slug: format!("team-{}", team_id),
            is_featured: false,
            country: None,
            contact_person: None,
            created_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_paginate_teams_slices_and_counts() {
        let teams: Vec<Team> = (1..=250).map(team).collect();

        let (page_two, meta) = paginate_teams(teams, 2);

        assert_eq!(page_two.len(), 50);
        assert_eq!(page_two[0].team_id, 201);
        assert_eq!(meta.total_items, 250);
        assert_eq!(meta.total_pages, 2);
    }

    #[test]
    fn test_paginate_teams_past_the_end() {
        let (rest, meta) = paginate_teams(vec![team(1)], 9);

        assert!(rest.is_empty());
        assert_eq!(meta.total_items, 1);
    }
}
