use sqlx::PgPool;

use crate::dto::team::{
    AppliedMember, AppliedMemberRow, RosterMember, StageApplication, TeamApplicationRow,
    TeamDetailResponse, UpdateTeamRequest,
};
use crate::error::{Result, StorageError};
use crate::models::{Competition, Team, KIND_PARTICIPANT, KIND_RESERVE};

/// Repository for registered teams, their rosters and stage applications
pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_distance(&self, distance_id: i32) -> Result<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT * FROM teams
            WHERE distance_id = $1
            ORDER BY is_featured DESC, title
            "#,
        )
        .bind(distance_id)
        .fetch_all(self.pool)
        .await?;

        Ok(teams)
    }

    /// Every team registered on any distance of a competition.
    pub async fn list_for_competition(&self, competition_id: i32) -> Result<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.* FROM teams t
            JOIN distances d ON d.distance_id = t.distance_id
            WHERE d.competition_id = $1
            ORDER BY t.is_featured DESC, t.title
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(teams)
    }

    pub async fn find_by_id(&self, team_id: i32) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE team_id = $1")
            .bind(team_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;

        Ok(team)
    }

    /// A team with its roster; each member carries the application kind
    /// for the given competition, NULL when not applied there.
    pub async fn find_detail(
        &self,
        team_id: i32,
        competition_id: i32,
    ) -> Result<TeamDetailResponse> {
        let team = self.find_by_id(team_id).await?;

        let members = sqlx::query_as::<_, RosterMember>(
            r#"
            SELECT m.member_id, m.first_name, m.last_name, m.slug, m.birthday, ma.kind
            FROM members m
            LEFT JOIN member_applications ma
              ON ma.member_id = m.member_id AND ma.competition_id = $2
            WHERE m.team_id = $1
            ORDER BY ma.kind ASC NULLS LAST, m.last_name, m.first_name
            "#,
        )
        .bind(team_id)
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(TeamDetailResponse { team, members })
    }

    /// Apply a roster edit: team fields, member upserts, and the
    /// application kind per member for the competition being edited.
    /// Members never get deleted here.
    pub async fn update_with_roster(
        &self,
        team_id: i32,
        competition_id: i32,
        request: &UpdateTeamRequest,
    ) -> Result<TeamDetailResponse> {
        for entry in &request.members {
            if entry.kind != KIND_PARTICIPANT && entry.kind != KIND_RESERVE {
                return Err(StorageError::ConstraintViolation(format!(
                    "kind must be {} (participant) or {} (reserve)",
                    KIND_PARTICIPANT, KIND_RESERVE
                )));
            }
        }

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE teams
            SET title = $2, slug = $3, country = $4, contact_person = $5, is_featured = $6
            WHERE team_id = $1
            "#,
        )
        .bind(team_id)
        .bind(&request.title)
        .bind(crate::slug::slugify(&request.title))
        .bind(request.country.as_deref())
        .bind(request.contact_person.as_deref())
        .bind(request.is_featured)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        for entry in &request.members {
            let member_id = match entry.member_id {
                Some(member_id) => {
                    let result = sqlx::query(
                        r#"
                        UPDATE members
                        SET first_name = $3, last_name = $4, slug = $5, birthday = $6
                        WHERE member_id = $1 AND team_id = $2
                        "#,
                    )
                    .bind(member_id)
                    .bind(team_id)
                    .bind(&entry.first_name)
                    .bind(&entry.last_name)
                    .bind(crate::slug::slugify(&format!(
                        "{} {}",
                        entry.first_name, entry.last_name
                    )))
                    .bind(entry.birthday)
                    .execute(&mut *tx)
                    .await?;

                    if result.rows_affected() == 0 {
                        return Err(StorageError::ConstraintViolation(format!(
                            "member {} does not belong to team {}",
                            member_id, team_id
                        )));
                    }
                    member_id
                }
                None => {
                    sqlx::query_scalar::<_, i32>(
                        r#"
                        INSERT INTO members (team_id, first_name, last_name, slug, birthday)
                        VALUES ($1, $2, $3, $4, $5)
                        RETURNING member_id
                        "#,
                    )
                    .bind(team_id)
                    .bind(&entry.first_name)
                    .bind(&entry.last_name)
                    .bind(crate::slug::slugify(&format!(
                        "{} {}",
                        entry.first_name, entry.last_name
                    )))
                    .bind(entry.birthday)
                    .fetch_one(&mut *tx)
                    .await?
                }
            };

            sqlx::query(
                r#"
                INSERT INTO member_applications (member_id, competition_id, kind)
                VALUES ($1, $2, $3)
                ON CONFLICT (member_id, competition_id) DO UPDATE SET kind = EXCLUDED.kind
                "#,
            )
            .bind(member_id)
            .bind(competition_id)
            .bind(entry.kind)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_detail(team_id, competition_id).await
    }

    /// Per-stage applications of one team, grouped in stage order.
    pub async fn stage_applications(
        &self,
        team_id: i32,
        stages: &[Competition],
    ) -> Result<Vec<StageApplication>> {
        let stage_ids: Vec<i32> = stages.iter().map(|s| s.competition_id).collect();

        let rows = sqlx::query_as::<_, AppliedMemberRow>(
            r#"
            SELECT ma.competition_id, ma.application_id, ma.member_id,
                   m.first_name, m.last_name, ma.kind
            FROM member_applications ma
            JOIN members m ON m.member_id = ma.member_id
            WHERE m.team_id = $1 AND ma.competition_id = ANY($2)
            ORDER BY ma.competition_id, m.last_name, m.first_name
            "#,
        )
        .bind(team_id)
        .bind(stage_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(group_applications(stages, rows))
    }

    /// Every application across a competition family, for the manager's
    /// overview.
    pub async fn applications_for_competitions(
        &self,
        competition_ids: &[i32],
    ) -> Result<Vec<TeamApplicationRow>> {
        let rows = sqlx::query_as::<_, TeamApplicationRow>(
            r#"
            SELECT ma.application_id, ma.competition_id, t.team_id, t.title AS team_title,
                   m.member_id, m.first_name, m.last_name, m.birthday, ma.kind,
                   ma.participant_id, p.number
            FROM member_applications ma
            JOIN members m ON m.member_id = ma.member_id
            JOIN teams t ON t.team_id = m.team_id
            LEFT JOIN participants p ON p.participant_id = ma.participant_id
            WHERE ma.competition_id = ANY($1)
            ORDER BY ma.competition_id, t.title, ma.kind, m.last_name, m.first_name
            "#,
        )
        .bind(competition_ids.to_vec())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// Groups flat application rows under their stage, keeping the stage
/// order of `stages` and emitting empty stages too.
fn group_applications(
    stages: &[Competition],
    rows: Vec<AppliedMemberRow>,
) -> Vec<StageApplication> {
    stages
        .iter()
        .map(|stage| {
            let members = rows
                .iter()
                .filter(|r| r.competition_id == stage.competition_id)
                .map(|r| AppliedMember {
                    application_id: r.application_id,
                    member_id: r.member_id,
                    first_name: r.first_name.clone(),
                    last_name: r.last_name.clone(),
                    kind: r.kind,
                })
                .collect();

            StageApplication {
                competition_id: stage.competition_id,
                competition_name: stage.name.clone(),
                competition_date: stage.competition_date,
                members,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: i32, name: &str, date: (i32, u32, u32)) -> Competition {
        Competition {
            competition_id: id,
            name: name.to_string(),
            slug: crate::slug::slugify(name),
            level: 2,
            parent_id: Some(1),
            competition_date: chrono::NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            processing_class: Some("stage_series".to_string()),
            params: serde_json::json!({}),
            created_at: chrono::NaiveDate::from_ymd_opt(date.0, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn row(competition_id: i32, application_id: i32, last_name: &str) -> AppliedMemberRow {
        AppliedMemberRow {
            competition_id,
            application_id,
            member_id: application_id + 100,
            first_name: "Anna".to_string(),
            last_name: last_name.to_string(),
            kind: KIND_PARTICIPANT,
        }
    }

    #[test]
    fn test_group_applications_keeps_stage_order() {
        let stages = vec![
            stage(10, "Stage 1", (2024, 5, 1)),
            stage(11, "Stage 2", (2024, 6, 1)),
        ];
        let rows = vec![row(11, 1, "Liepa"), row(10, 2, "Ozola")];

        let grouped = group_applications(&stages, rows);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].competition_id, 10);
        assert_eq!(grouped[0].members.len(), 1);
        assert_eq!(grouped[0].members[0].last_name, "Ozola");
        assert_eq!(grouped[1].competition_id, 11);
        assert_eq!(grouped[1].members[0].last_name, "Liepa");
    }

    #[test]
    fn test_group_applications_emits_empty_stages() {
        let stages = vec![
            stage(10, "Stage 1", (2024, 5, 1)),
            stage(11, "Stage 2", (2024, 6, 1)),
        ];

        let grouped = group_applications(&stages, vec![row(10, 1, "Ozola")]);

        assert_eq!(grouped.len(), 2);
        assert!(grouped[1].members.is_empty());
    }
}
