use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;

use crate::dto::competition::{ArchiveCompetition, ArchiveYear, CompetitionDetailResponse};
use crate::error::{Result, StorageError};
use crate::models::{Competition, Distance};

/// Which distances of a competition to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceScope {
    All,
    /// Only distances that already have at least one result.
    WithResults,
    /// Only distances that allow team competition.
    WithTeams,
}

/// Repository for competition pages and their distances
pub struct CompetitionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetitionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List top level competitions, newest first.
    pub async fn list(&self) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(
            r#"
            SELECT * FROM competitions
            WHERE level = 1
            ORDER BY competition_date DESC, competition_id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(competitions)
    }

    pub async fn find_by_id(&self, competition_id: i32) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(
            "SELECT * FROM competitions WHERE competition_id = $1",
        )
        .bind(competition_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(competition)
    }

    /// Stages of a series, in calendar order.
    pub async fn children(&self, competition_id: i32) -> Result<Vec<Competition>> {
        let children = sqlx::query_as::<_, Competition>(
            r#"
            SELECT * FROM competitions
            WHERE parent_id = $1
            ORDER BY competition_date, competition_id
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(children)
    }

    /// Detail view: the competition, its stages and the distances that
    /// already have something to show.
    pub async fn find_detail(&self, competition_id: i32) -> Result<CompetitionDetailResponse> {
        let competition = self.find_by_id(competition_id).await?;
        let children = self.children(competition_id).await?;

        // Distances always belong to the top of the series.
        let top_id = competition.parent_id.unwrap_or(competition.competition_id);
        let distances = self.distances(top_id, DistanceScope::WithResults).await?;

        Ok(CompetitionDetailResponse {
            competition,
            children,
            distances,
        })
    }

    pub async fn distances(&self, competition_id: i32, scope: DistanceScope) -> Result<Vec<Distance>> {
        let sql = match scope {
            DistanceScope::All => {
                r#"
                SELECT * FROM distances
                WHERE competition_id = $1
                ORDER BY ordering, distance_id
                "#
            }
            DistanceScope::WithResults => {
                r#"
                SELECT * FROM distances d
                WHERE d.competition_id = $1
                  AND EXISTS (
                    SELECT 1 FROM participants p
                    JOIN results r ON r.participant_id = p.participant_id
                    WHERE p.distance_id = d.distance_id
                  )
                ORDER BY d.ordering, d.distance_id
                "#
            }
            DistanceScope::WithTeams => {
                r#"
                SELECT * FROM distances
                WHERE competition_id = $1 AND can_have_teams IS TRUE
                ORDER BY ordering, distance_id
                "#
            }
        };

        let distances = sqlx::query_as::<_, Distance>(sql)
            .bind(competition_id)
            .fetch_all(self.pool)
            .await?;

        Ok(distances)
    }

    pub async fn find_distance(&self, distance_id: i32) -> Result<Distance> {
        let distance = sqlx::query_as::<_, Distance>(
            "SELECT * FROM distances WHERE distance_id = $1",
        )
        .bind(distance_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(distance)
    }

    /// Season archive: every year from the first recorded result up to
    /// the current one, newest first, with each year's top level
    /// competitions annotated by their result count.
    pub async fn archive(&self, today: NaiveDate) -> Result<Vec<ArchiveYear>> {
        let first_year: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT MIN(EXTRACT(YEAR FROM c.competition_date))::int
            FROM results r
            JOIN competitions c ON c.competition_id = r.competition_id
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        let Some(first_year) = first_year else {
            return Ok(Vec::new());
        };

        let mut years = Vec::new();
        for year in (first_year..=today.year()).rev() {
            let competitions = self.archive_year(year).await?;
            years.push(ArchiveYear { year, competitions });
        }

        Ok(years)
    }

    async fn archive_year(&self, year: i32) -> Result<Vec<ArchiveCompetition>> {
        let competitions = sqlx::query_as::<_, ArchiveCompetition>(
            r#"
            SELECT c.competition_id, c.name, c.slug, c.competition_date,
                   (SELECT COUNT(*) FROM results r
                     WHERE r.competition_id IN (
                       SELECT x.competition_id FROM competitions x
                       WHERE x.competition_id = c.competition_id OR x.parent_id = c.competition_id
                     )) AS have_results
            FROM competitions c
            WHERE c.level = 1
              AND (EXTRACT(YEAR FROM c.competition_date)::int = $1
                OR EXISTS (
                  SELECT 1 FROM competitions ch
                  WHERE ch.parent_id = c.competition_id
                    AND EXTRACT(YEAR FROM ch.competition_date)::int = $1
                ))
            ORDER BY c.competition_date, c.competition_id
            "#,
        )
        .bind(year)
        .fetch_all(self.pool)
        .await?;

        Ok(competitions)
    }
}
