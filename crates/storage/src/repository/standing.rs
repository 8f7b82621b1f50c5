use rust_decimal::Decimal;
use sqlx::{PgPool, QueryBuilder};

use crate::dto::standing::{StandingFilter, StandingRow};
use crate::error::Result;
use crate::models::STAGE_SLOTS;

/// A standing row as produced by recalculation, before it has a database
/// identity.
#[derive(Debug, Clone)]
pub struct NewStanding {
    pub distance_id: i32,
    pub participant_id: i32,
    pub distance_place: Option<i32>,
    pub group_place: Option<i32>,
    pub group_points: [Option<Decimal>; STAGE_SLOTS],
    pub group_total: Decimal,
    pub distance_points: [Option<Decimal>; STAGE_SLOTS],
    pub distance_total: Decimal,
}

/// Repository for series standings
pub struct StandingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StandingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &StandingFilter) -> Result<Vec<StandingRow>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT s.standing_id, s.distance_id, s.distance_place, s.group_place,
                   s.group_points1, s.group_points2, s.group_points3, s.group_points4,
                   s.group_points5, s.group_points6, s.group_points7, s.group_total,
                   s.distance_points1, s.distance_points2, s.distance_points3,
                   s.distance_points4, s.distance_points5, s.distance_points6,
                   s.distance_points7, s.distance_total,
                   p.participant_id, p.first_name, p.last_name, p.slug, p.birthday,
                   p.number, p.group_name, p.team_id, t.title AS team_title, p.team_name
            FROM standings s
            JOIN participants p ON p.participant_id = s.participant_id
            LEFT JOIN teams t ON t.team_id = p.team_id
            WHERE s.competition_id = ANY(
            "#,
        );
        query.push_bind(filter.competition_ids.clone());
        query.push(")");

        if let Some(distance_id) = filter.distance_id {
            query.push(" AND s.distance_id = ");
            query.push_bind(distance_id);
        }

        if let Some(ref group) = filter.group {
            query.push(" AND p.group_name = ");
            query.push_bind(group.clone());
        }

        if let Some(ref search) = filter.search {
            let slug_pattern = format!("%{}%", crate::slug::slugify(search));
            let raw_pattern = format!("%{}%", search);

            query.push(" AND (p.slug LIKE ");
            query.push_bind(slug_pattern.clone());
            query.push(" OR CAST(p.number AS TEXT) LIKE ");
            query.push_bind(slug_pattern);
            query.push(" OR p.team_name ILIKE ");
            query.push_bind(raw_pattern);
            query.push(")");
        }

        query.push(" ORDER BY s.distance_total DESC, p.slug ASC");

        let rows: Vec<StandingRow> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(rows)
    }

    /// Replace every standing of a series in one transaction. The
    /// recalculation always rewrites the whole set, partial updates do
    /// not exist.
    pub async fn replace_for_competition(
        &self,
        competition_id: i32,
        standings: &[NewStanding],
    ) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM standings WHERE competition_id = $1")
            .bind(competition_id)
            .execute(&mut *tx)
            .await?;

        let mut written = 0u64;
        for standing in standings {
            sqlx::query(
                r#"
                INSERT INTO standings (competition_id, distance_id, participant_id,
                                       distance_place, group_place,
                                       group_points1, group_points2, group_points3,
                                       group_points4, group_points5, group_points6,
                                       group_points7, group_total,
                                       distance_points1, distance_points2, distance_points3,
                                       distance_points4, distance_points5, distance_points6,
                                       distance_points7, distance_total)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                        $14, $15, $16, $17, $18, $19, $20, $21)
                "#,
            )
            .bind(competition_id)
            .bind(standing.distance_id)
            .bind(standing.participant_id)
            .bind(standing.distance_place)
            .bind(standing.group_place)
            .bind(standing.group_points[0])
            .bind(standing.group_points[1])
            .bind(standing.group_points[2])
            .bind(standing.group_points[3])
            .bind(standing.group_points[4])
            .bind(standing.group_points[5])
            .bind(standing.group_points[6])
            .bind(standing.group_total)
            .bind(standing.distance_points[0])
            .bind(standing.distance_points[1])
            .bind(standing.distance_points[2])
            .bind(standing.distance_points[3])
            .bind(standing.distance_points[4])
            .bind(standing.distance_points[5])
            .bind(standing.distance_points[6])
            .bind(standing.distance_total)
            .execute(&mut *tx)
            .await?;
            written += 1;
        }

        tx.commit().await?;

        Ok(written)
    }
}
