use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::error::Result;
use crate::models::{Competition, KIND_PARTICIPANT, STAGE_SLOTS};
use crate::repository::competition::CompetitionRepository;
use crate::repository::standing::{NewStanding, StandingRepository};
use crate::repository::team::TeamRepository;

/// Which of the seven stage point slots a stage occupies, given the stage
/// calendar. The answer is the slot of the last stage that has already
/// been ridden, clamped into 1..=7 so pre-season pages show the first
/// stage and over-long calendars never overflow the point columns.
pub fn current_stage_slot(stage_dates: &[NaiveDate], today: NaiveDate) -> usize {
    let ridden = stage_dates.iter().filter(|d| **d <= today).count();
    ridden.clamp(1, STAGE_SLOTS)
}

/// Recalculates the standings of a whole series from its stage results,
/// rewriting the stored rows. `competition_id` may name the series or any
/// of its stages. Returns the number of standing rows written.
pub async fn recalculate_competition(pool: &PgPool, competition_id: i32) -> Result<u64> {
    let competitions = CompetitionRepository::new(pool);

    let competition = competitions.find_by_id(competition_id).await?;
    let series_id = competition.parent_id.unwrap_or(competition.competition_id);
    let series = if series_id == competition.competition_id {
        competition
    } else {
        competitions.find_by_id(series_id).await?
    };

    let mut stages = competitions.children(series_id).await?;
    if stages.is_empty() {
        stages.push(series);
    }

    let slots = stage_slots(&stages);

    let rows = sqlx::query_as::<_, StagePointsRow>(
        r#"
        SELECT r.competition_id, r.points_distance, r.points_group,
               p.participant_id, p.distance_id, p.group_name, p.slug
        FROM results r
        JOIN participants p ON p.participant_id = r.participant_id
        WHERE r.competition_id = ANY($1)
        "#,
    )
    .bind(slots.keys().copied().collect::<Vec<i32>>())
    .fetch_all(pool)
    .await?;

    let standings = compute_standings(&slots, rows);

    let written = StandingRepository::new(pool)
        .replace_for_competition(series_id, &standings)
        .await?;

    tracing::info!(
        competition_id = series_id,
        rows = written,
        "standings recalculated"
    );

    Ok(written)
}

/// Recalculates one team's stage points and season total from its
/// applied members' results. Each stage counts the team's best four
/// scoring rides.
pub async fn recalculate_team(pool: &PgPool, team_id: i32) -> Result<()> {
    let competitions = CompetitionRepository::new(pool);

    let team = TeamRepository::new(pool).find_by_id(team_id).await?;
    let distance = competitions.find_distance(team.distance_id).await?;
    let series_id = distance.competition_id;

    let mut stages = competitions.children(series_id).await?;
    if stages.is_empty() {
        stages.push(competitions.find_by_id(series_id).await?);
    }

    let mut points: [Option<Decimal>; STAGE_SLOTS] = Default::default();
    for (idx, stage) in stages.iter().take(STAGE_SLOTS).enumerate() {
        let best: Vec<Decimal> = sqlx::query_scalar(
            r#"
            SELECT r.points_distance
            FROM member_applications ma
            JOIN members m ON m.member_id = ma.member_id
            JOIN results r ON r.participant_id = ma.participant_id
                 AND r.competition_id = ma.competition_id
            WHERE m.team_id = $1 AND ma.competition_id = $2 AND ma.kind = $3
              AND r.points_distance IS NOT NULL
            ORDER BY r.points_distance DESC
            LIMIT 4
            "#,
        )
        .bind(team_id)
        .bind(stage.competition_id)
        .bind(KIND_PARTICIPANT)
        .fetch_all(pool)
        .await?;

        if !best.is_empty() {
            points[idx] = Some(best.iter().copied().sum());
        }
    }

    let total: Decimal = points.iter().flatten().copied().sum();

    sqlx::query(
        r#"
        INSERT INTO team_standings (competition_id, team_id, points1, points2, points3,
                                    points4, points5, points6, points7, points_total)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (competition_id, team_id) DO UPDATE
        SET points1 = EXCLUDED.points1, points2 = EXCLUDED.points2,
            points3 = EXCLUDED.points3, points4 = EXCLUDED.points4,
            points5 = EXCLUDED.points5, points6 = EXCLUDED.points6,
            points7 = EXCLUDED.points7, points_total = EXCLUDED.points_total
        "#,
    )
    .bind(series_id)
    .bind(team_id)
    .bind(points[0])
    .bind(points[1])
    .bind(points[2])
    .bind(points[3])
    .bind(points[4])
    .bind(points[5])
    .bind(points[6])
    .bind(total)
    .execute(pool)
    .await?;

    tracing::info!(team_id, competition_id = series_id, "team standing recalculated");

    Ok(())
}

fn stage_slots(stages: &[Competition]) -> HashMap<i32, usize> {
    stages
        .iter()
        .take(STAGE_SLOTS)
        .enumerate()
        .map(|(idx, stage)| (stage.competition_id, idx + 1))
        .collect()
}

#[derive(Debug, Clone, FromRow)]
struct StagePointsRow {
    competition_id: i32,
    points_distance: Option<Decimal>,
    points_group: Option<Decimal>,
    participant_id: i32,
    distance_id: i32,
    group_name: Option<String>,
    slug: String,
}

#[derive(Debug)]
struct Draft {
    distance_id: i32,
    group_name: Option<String>,
    slug: String,
    distance_points: [Option<Decimal>; STAGE_SLOTS],
    group_points: [Option<Decimal>; STAGE_SLOTS],
}

/// Pure core of the recalculation: folds per-stage points into one draft
/// per participant, totals them, and ranks within distance and within
/// (distance, group). Ties rank by rider slug so reruns are stable.
fn compute_standings(
    slots: &HashMap<i32, usize>,
    rows: Vec<StagePointsRow>,
) -> Vec<NewStanding> {
    let mut drafts: BTreeMap<i32, Draft> = BTreeMap::new();

    for row in rows {
        let Some(&slot) = slots.get(&row.competition_id) else {
            continue;
        };

        let draft = drafts.entry(row.participant_id).or_insert_with(|| Draft {
            distance_id: row.distance_id,
            group_name: row.group_name.clone(),
            slug: row.slug.clone(),
            distance_points: Default::default(),
            group_points: Default::default(),
        });

        draft.distance_points[slot - 1] = row.points_distance;
        draft.group_points[slot - 1] = row.points_group;
    }

    let mut entries: Vec<(NewStanding, RankKey)> = drafts
        .into_iter()
        .map(|(participant_id, draft)| {
            let standing = NewStanding {
                distance_id: draft.distance_id,
                participant_id,
                distance_place: None,
                group_place: None,
                group_total: draft.group_points.iter().flatten().copied().sum(),
                group_points: draft.group_points,
                distance_total: draft.distance_points.iter().flatten().copied().sum(),
                distance_points: draft.distance_points,
            };
            let key = RankKey {
                group_name: draft.group_name,
                slug: draft.slug,
            };
            (standing, key)
        })
        .collect();

    assign_places(&mut entries);

    entries.into_iter().map(|(standing, _)| standing).collect()
}

#[derive(Debug)]
struct RankKey {
    group_name: Option<String>,
    slug: String,
}

/// Ranks standings by total points, descending, within each distance and
/// within each (distance, group) pairing. Riders without a group get no
/// group place. Ties break on rider slug so reruns are stable.
fn assign_places(entries: &mut [(NewStanding, RankKey)]) {
    let mut by_distance: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    let mut by_group: BTreeMap<(i32, String), Vec<usize>> = BTreeMap::new();

    for (idx, (standing, key)) in entries.iter().enumerate() {
        by_distance.entry(standing.distance_id).or_default().push(idx);
        if let Some(ref group) = key.group_name {
            by_group
                .entry((standing.distance_id, group.clone()))
                .or_default()
                .push(idx);
        }
    }

    for indices in by_distance.values() {
        let mut ordered = indices.clone();
        ordered.sort_by(|&a, &b| {
            entries[b]
                .0
                .distance_total
                .cmp(&entries[a].0.distance_total)
                .then_with(|| entries[a].1.slug.cmp(&entries[b].1.slug))
        });
        for (place, idx) in ordered.into_iter().enumerate() {
            entries[idx].0.distance_place = Some((place + 1) as i32);
        }
    }

    for indices in by_group.values() {
        let mut ordered = indices.clone();
        ordered.sort_by(|&a, &b| {
            entries[b]
                .0
                .group_total
                .cmp(&entries[a].0.group_total)
                .then_with(|| entries[a].1.slug.cmp(&entries[b].1.slug))
        });
        for (place, idx) in ordered.into_iter().enumerate() {
            entries[idx].0.group_place = Some((place + 1) as i32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        competition_id: i32,
        participant_id: i32,
        slug: &str,
        distance_points: i64,
        group_points: i64,
    ) -> StagePointsRow {
        StagePointsRow {
            competition_id,
            points_distance: Some(Decimal::from(distance_points)),
            points_group: Some(Decimal::from(group_points)),
            participant_id,
            distance_id: 5,
            group_name: Some("M-18".to_string()),
            slug: slug.to_string(),
        }
    }

    fn slots_for(ids: &[i32]) -> HashMap<i32, usize> {
        ids.iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx + 1))
            .collect()
    }

    #[test]
    fn test_points_accumulate_across_stages() {
        let slots = slots_for(&[10, 11]);
        let rows = vec![row(10, 1, "anna", 40, 20), row(11, 1, "anna", 35, 18)];

        let standings = compute_standings(&slots, rows);

        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].distance_points[0], Some(Decimal::from(40)));
        assert_eq!(standings[0].distance_points[1], Some(Decimal::from(35)));
        assert_eq!(standings[0].distance_total, Decimal::from(75));
        assert_eq!(standings[0].group_total, Decimal::from(38));
    }

    #[test]
    fn test_places_rank_by_total_descending() {
        let slots = slots_for(&[10]);
        let rows = vec![
            row(10, 1, "anna", 30, 30),
            row(10, 2, "berta", 50, 50),
            row(10, 3, "cilda", 40, 40),
        ];

        let standings = compute_standings(&slots, rows);

        let place_of = |pid: i32| {
            standings
                .iter()
                .find(|s| s.participant_id == pid)
                .and_then(|s| s.distance_place)
        };
        assert_eq!(place_of(2), Some(1));
        assert_eq!(place_of(3), Some(2));
        assert_eq!(place_of(1), Some(3));
    }

    #[test]
    fn test_results_from_unknown_stage_are_ignored() {
        let slots = slots_for(&[10]);
        let rows = vec![row(10, 1, "anna", 30, 30), row(99, 1, "anna", 500, 500)];

        let standings = compute_standings(&slots, rows);

        assert_eq!(standings[0].distance_total, Decimal::from(30));
    }

    #[test]
    fn test_group_places_rank_within_group() {
        let slots = slots_for(&[10]);
        let mut rows = vec![row(10, 1, "anna", 30, 10), row(10, 2, "berta", 20, 60)];
        rows[1].group_name = Some("W-18".to_string());

        let standings = compute_standings(&slots, rows);

        // Both lead the distance table order but group points rank
        // independently of distance points.
        let berta = standings.iter().find(|s| s.participant_id == 2).unwrap();
        assert_eq!(berta.group_place, Some(1));
    }

    #[test]
    fn test_current_stage_slot() {
        let dates: Vec<NaiveDate> = [(2024, 5, 1), (2024, 6, 1), (2024, 7, 1)]
            .iter()
            .map(|(y, m, d)| NaiveDate::from_ymd_opt(*y, *m, *d).unwrap())
            .collect();

        let mid_season = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(current_stage_slot(&dates, mid_season), 2);

        let pre_season = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert_eq!(current_stage_slot(&dates, pre_season), 1);

        let post_season = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(current_stage_slot(&dates, post_season), 3);
    }

    #[test]
    fn test_current_stage_slot_clamps_to_seven() {
        let dates: Vec<NaiveDate> = (1..=9)
            .map(|m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap())
            .collect();

        let today = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(current_stage_slot(&dates, today), 7);
    }
}
