use sqlx::{PgPool, QueryBuilder};

use crate::dto::team::{
    StageTeamResultRow, TeamByNameGroup, TeamByNameMember, TeamByNameRow, TeamResultMember,
    TeamStageResult, TeamStandingRow,
};
use crate::error::Result;
use crate::models::{KIND_PARTICIPANT, STAGE_SLOTS};

/// Repository for team points: stored standings, per-stage line-ups and
/// the informal team-by-name report
pub struct TeamStandingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamStandingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Season team table for one distance, best total first.
    pub async fn standings(
        &self,
        competition_id: i32,
        distance_id: i32,
    ) -> Result<Vec<TeamStandingRow>> {
        let rows = sqlx::query_as::<_, TeamStandingRow>(
            r#"
            SELECT ts.team_standing_id, ts.team_id, t.title AS team_title, t.is_featured,
                   ts.points1, ts.points2, ts.points3, ts.points4, ts.points5,
                   ts.points6, ts.points7, ts.points_total
            FROM team_standings ts
            JOIN teams t ON t.team_id = ts.team_id
            WHERE ts.competition_id = $1 AND t.distance_id = $2
            ORDER BY ts.points_total DESC, t.is_featured DESC, t.title
            "#,
        )
        .bind(competition_id)
        .bind(distance_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Teams at one stage with their scoring members, ordered by the
    /// stage's point column. `stage_slot` picks which of the seven point
    /// columns belongs to this stage.
    pub async fn stage_results(
        &self,
        stage_id: i32,
        series_id: i32,
        distance_id: i32,
        stage_slot: usize,
    ) -> Result<Vec<TeamStageResult>> {
        let slot = stage_slot.clamp(1, STAGE_SLOTS);

        let mut query = QueryBuilder::new("SELECT t.team_id, t.title AS team_title, t.is_featured, ");
        query.push(format!("ts.points{} AS stage_points, ", slot));
        query.push(
            r#"
                   m.first_name, m.last_name, m.birthday, p.number,
                   r.points_distance AS member_points
            FROM teams t
            JOIN team_standings ts ON ts.team_id = t.team_id AND ts.competition_id =
            "#,
        );
        query.push_bind(series_id);
        query.push(
            r#"
            JOIN members m ON m.team_id = t.team_id
            JOIN member_applications ma ON ma.member_id = m.member_id
                 AND ma.competition_id =
            "#,
        );
        query.push_bind(stage_id);
        query.push(" AND ma.kind = ");
        query.push_bind(KIND_PARTICIPANT);
        query.push(
            r#"
            JOIN participants p ON p.participant_id = ma.participant_id
            LEFT JOIN results r ON r.participant_id = p.participant_id
                 AND r.competition_id =
            "#,
        );
        query.push_bind(stage_id);
        query.push(" WHERE t.distance_id = ");
        query.push_bind(distance_id);
        query.push(format!(
            r#"
            ORDER BY ts.points{} DESC NULLS LAST, t.is_featured DESC, t.title,
                     r.points_distance DESC NULLS LAST, p.number
            "#,
            slot
        ));

        let rows: Vec<StageTeamResultRow> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(group_stage_results(rows))
    }

    /// Informal teams assembled from matching free-text team names.
    ///
    /// A name qualifies with at least two finishers; empty and "-" names
    /// never group. Each team is scored by its best four times, and only
    /// those four riders are listed.
    pub async fn by_name(&self, distance_id: i32) -> Result<Vec<TeamByNameGroup>> {
        let rows = sqlx::query_as::<_, TeamByNameRow>(
            r#"
            SELECT team.team_name_slug, team.counter AS qualifier_count,
                   team.total_seconds, p2.team_name, p2.first_name, p2.last_name,
                   p2.birthday, p2.number, p2.time
            FROM (
                SELECT kopa.team_name_slug, COUNT(*) AS counter,
                       EXTRACT(EPOCH FROM SUM(kopa.time::interval))::bigint AS total_seconds
                FROM (
                    SELECT ranked.team_name_slug, ranked.time
                    FROM (
                        SELECT a.team_name_slug, r.time,
                               ROW_NUMBER() OVER (
                                   PARTITION BY a.team_name_slug ORDER BY r.time
                               ) AS row_no
                        FROM participants a
                        JOIN results r ON r.participant_id = a.participant_id
                        WHERE a.team_name_slug IS NOT NULL
                          AND a.team_name_slug <> ''
                          AND a.team_name_slug <> '-'
                          AND r.time IS NOT NULL
                          AND a.is_competing IS TRUE
                          AND a.distance_id = $1
                    ) ranked
                    WHERE ranked.row_no <= 4
                ) kopa
                GROUP BY kopa.team_name_slug
                HAVING COUNT(*) > 1
            ) team
            LEFT JOIN (
                SELECT a.team_name, a.team_name_slug, a.first_name, a.last_name,
                       a.birthday, a.number, r.time,
                       ROW_NUMBER() OVER (
                           PARTITION BY a.team_name_slug ORDER BY r.time
                       ) AS row_no
                FROM participants a
                JOIN results r ON r.participant_id = a.participant_id
                WHERE a.team_name_slug IS NOT NULL
                  AND a.team_name_slug <> ''
                  AND a.team_name_slug <> '-'
                  AND r.time IS NOT NULL
                  AND a.is_competing IS TRUE
                  AND a.distance_id = $2
            ) p2 ON p2.team_name_slug = team.team_name_slug AND p2.row_no <= 4
            ORDER BY team.counter DESC, team.total_seconds ASC, team.team_name_slug, p2.time
            "#,
        )
        .bind(distance_id)
        .bind(distance_id)
        .fetch_all(self.pool)
        .await?;

        Ok(group_by_name(rows))
    }
}

/// Folds ordered flat rows into one entry per team, members in row order.
fn group_stage_results(rows: Vec<StageTeamResultRow>) -> Vec<TeamStageResult> {
    let mut teams: Vec<TeamStageResult> = Vec::new();

    for row in rows {
        let member = TeamResultMember {
            first_name: row.first_name,
            last_name: row.last_name,
            birthday: row.birthday,
            number: row.number,
            points: row.member_points,
        };

        match teams.last_mut() {
            Some(team) if team.team_id == row.team_id => team.members.push(member),
            _ => teams.push(TeamStageResult {
                team_id: row.team_id,
                team_title: row.team_title,
                is_featured: row.is_featured,
                stage_points: row.stage_points,
                members: vec![member],
            }),
        }
    }

    teams
}

/// Folds ordered flat rows into one group per team name slug.
fn group_by_name(rows: Vec<TeamByNameRow>) -> Vec<TeamByNameGroup> {
    let mut groups: Vec<TeamByNameGroup> = Vec::new();

    for row in rows {
        if groups
            .last()
            .map(|g| g.team_name_slug != row.team_name_slug)
            .unwrap_or(true)
        {
            groups.push(TeamByNameGroup {
                team_name: row.team_name.clone().unwrap_or_else(|| row.team_name_slug.clone()),
                team_name_slug: row.team_name_slug.clone(),
                qualifier_count: row.qualifier_count,
                total_seconds: row.total_seconds.unwrap_or(0),
                members: Vec::new(),
            });
        }

        if let (Some(group), Some(first_name), Some(last_name)) =
            (groups.last_mut(), row.first_name, row.last_name)
        {
            group.members.push(TeamByNameMember {
                first_name,
                last_name,
                birthday: row.birthday,
                number: row.number,
                time: row.time,
            });
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rust_decimal::Decimal;

    fn stage_row(team_id: i32, title: &str, last_name: &str, points: i64) -> StageTeamResultRow {
        StageTeamResultRow {
            team_id,
            team_title: title.to_string(),
            is_featured: false,
            stage_points: Some(Decimal::from(points)),
            first_name: "Anna".to_string(),
            last_name: last_name.to_string(),
            birthday: None,
            number: Some(10),
            member_points: Some(Decimal::from(points)),
        }
    }

    #[test]
    fn test_group_stage_results_folds_members() {
        let rows = vec![
            stage_row(1, "Alpha", "Ozola", 50),
            stage_row(1, "Alpha", "Liepa", 40),
            stage_row(2, "Beta", "Egle", 30),
        ];

        let grouped = group_stage_results(rows);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].team_title, "Alpha");
        assert_eq!(grouped[0].members.len(), 2);
        assert_eq!(grouped[1].members.len(), 1);
    }

    fn by_name_row(slug: &str, count: i64, last_name: Option<&str>) -> TeamByNameRow {
        TeamByNameRow {
            team_name_slug: slug.to_string(),
            qualifier_count: count,
            total_seconds: Some(7200),
            team_name: Some(slug.to_uppercase()),
            first_name: last_name.map(|_| "Anna".to_string()),
            last_name: last_name.map(String::from),
            birthday: None,
            number: Some(7),
            time: last_name.map(|_| NaiveTime::from_hms_opt(1, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_group_by_name_splits_on_slug() {
        let rows = vec![
            by_name_row("velo-club", 3, Some("Ozola")),
            by_name_row("velo-club", 3, Some("Liepa")),
            by_name_row("cfa", 2, Some("Egle")),
        ];

        let grouped = group_by_name(rows);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].team_name_slug, "velo-club");
        assert_eq!(grouped[0].qualifier_count, 3);
        assert_eq!(grouped[0].members.len(), 2);
        assert_eq!(grouped[1].team_name_slug, "cfa");
        assert_eq!(grouped[1].members.len(), 1);
    }

    #[test]
    fn test_group_by_name_tolerates_missing_member_columns() {
        let grouped = group_by_name(vec![by_name_row("velo-club", 2, None)]);

        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].members.is_empty());
    }
}
