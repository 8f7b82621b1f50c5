use sqlx::{PgPool, QueryBuilder};

use crate::dto::result::{ResultDetailResponse, ResultFilter, ResultRow, SaveResultRequest};
use crate::error::{Result, StorageError};
use crate::models::{LapResult, Participant, RaceResult};

/// Repository for finish results and their split times
pub struct ResultRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResultRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch result rows for a competition family, joined with riders and
    /// registered teams. Split columns are only selected when the filter
    /// asks for them; the rest come back as NULL so the row shape stays
    /// fixed.
    pub async fn list(&self, filter: &ResultFilter) -> Result<Vec<ResultRow>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT r.result_id, r.competition_id, r.time, r.place_distance, r.place_group,
                   r.points_distance, r.points_group, r.status, r.leader_color, r.leader_text,
                   p.participant_id, p.first_name, p.last_name, p.slug, p.birthday, p.gender,
                   p.number, p.group_name, p.bike_brand, p.team_id, t.title AS team_title,
                   p.team_name
            "#,
        );

        for (idx, column) in ["l1", "l2", "l3", "l4"].iter().enumerate() {
            if (idx as u8) < filter.lap_columns {
                query.push(format!(
                    ", (SELECT lr.time FROM lap_results lr \
                       WHERE lr.result_id = r.result_id AND lr.lap_index = {}) AS {}",
                    idx + 1,
                    column
                ));
            } else {
                query.push(format!(", NULL::time AS {}", column));
            }
        }

        query.push(
            r#"
            FROM results r
            JOIN participants p ON p.participant_id = r.participant_id
            LEFT JOIN teams t ON t.team_id = p.team_id
            WHERE r.competition_id = ANY(
            "#,
        );
        query.push_bind(filter.competition_ids.clone());
        query.push(")");

        if let Some(distance_id) = filter.distance_id {
            query.push(" AND p.distance_id = ");
            query.push_bind(distance_id);
        }

        if let Some(ref group) = filter.group {
            query.push(" AND p.group_name = ");
            query.push_bind(group.clone());
        }

        if let Some(ref status) = filter.status {
            query.push(" AND r.status = ");
            query.push_bind(status.clone());
        }

        if let Some(number) = filter.number {
            query.push(" AND p.number = ");
            query.push_bind(number);
        }

        if let Some(ref search) = filter.search {
            let slug_pattern = format!("%{}%", crate::slug::slugify(search));

            query.push(" AND (p.slug LIKE ");
            query.push_bind(slug_pattern.clone());
            query.push(" OR CAST(p.number AS TEXT) LIKE ");
            query.push_bind(slug_pattern);
            if filter.search_teams {
                query.push(" OR p.team_name ILIKE ");
                query.push_bind(format!("%{}%", search));
            }
            query.push(")");
        }

        query.push(" ORDER BY r.time ASC NULLS LAST, p.slug ASC");

        let rows: Vec<ResultRow> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(rows)
    }

    pub async fn find_detail(&self, result_id: i32) -> Result<ResultDetailResponse> {
        let result = sqlx::query_as::<_, RaceResult>(
            "SELECT * FROM results WHERE result_id = $1",
        )
        .bind(result_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        let participant = sqlx::query_as::<_, Participant>(
            "SELECT * FROM participants WHERE participant_id = $1",
        )
        .bind(result.participant_id)
        .fetch_one(self.pool)
        .await?;

        let laps = self.laps(result_id).await?;

        Ok(ResultDetailResponse {
            result,
            participant,
            laps,
        })
    }

    pub async fn laps(&self, result_id: i32) -> Result<Vec<LapResult>> {
        let laps = sqlx::query_as::<_, LapResult>(
            "SELECT * FROM lap_results WHERE result_id = $1 ORDER BY lap_index",
        )
        .bind(result_id)
        .fetch_all(self.pool)
        .await?;

        Ok(laps)
    }

    pub async fn create(
        &self,
        competition_id: i32,
        request: &SaveResultRequest,
    ) -> Result<ResultDetailResponse> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query_as::<_, RaceResult>(
            r#"
            INSERT INTO results (competition_id, participant_id, time, place_distance,
                                 place_group, points_distance, points_group, status,
                                 leader_color, leader_text)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(competition_id)
        .bind(request.participant_id)
        .bind(request.time)
        .bind(request.place_distance)
        .bind(request.place_group)
        .bind(request.points_distance)
        .bind(request.points_group)
        .bind(request.status.as_deref())
        .bind(request.leader_color.as_deref())
        .bind(request.leader_text.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            StorageError::from(e).on_conflict("participant already has a result here")
        })?;

        Self::replace_laps(&mut tx, result.result_id, request).await?;

        tx.commit().await?;

        self.find_detail(result.result_id).await
    }

    pub async fn update(
        &self,
        result_id: i32,
        request: &SaveResultRequest,
    ) -> Result<ResultDetailResponse> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query_as::<_, RaceResult>(
            r#"
            UPDATE results
            SET participant_id = $2, time = $3, place_distance = $4, place_group = $5,
                points_distance = $6, points_group = $7, status = $8, leader_color = $9,
                leader_text = $10, modified_at = NOW()
            WHERE result_id = $1
            RETURNING *
            "#,
        )
        .bind(result_id)
        .bind(request.participant_id)
        .bind(request.time)
        .bind(request.place_distance)
        .bind(request.place_group)
        .bind(request.points_distance)
        .bind(request.points_group)
        .bind(request.status.as_deref())
        .bind(request.leader_color.as_deref())
        .bind(request.leader_text.as_deref())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        Self::replace_laps(&mut tx, result_id, request).await?;

        tx.commit().await?;

        self.find_detail(result.result_id).await
    }

    async fn replace_laps(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        result_id: i32,
        request: &SaveResultRequest,
    ) -> Result<()> {
        sqlx::query("DELETE FROM lap_results WHERE result_id = $1")
            .bind(result_id)
            .execute(&mut **tx)
            .await?;

        for lap in &request.laps {
            sqlx::query(
                "INSERT INTO lap_results (result_id, lap_index, time) VALUES ($1, $2, $3)",
            )
            .bind(result_id)
            .bind(lap.lap_index)
            .bind(lap.time)
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::from(e).on_conflict("duplicate lap index"))?;
        }

        Ok(())
    }
}
