use storage::dto::team::TeamStandingRow;
use storage::models::STAGE_SLOTS;

use super::{fmt_points, TableCell, TableColumn, TableDocument};

/// The one fixed team table: series team standings ordered by total
/// points, featured teams winning ties before the title does.
pub fn team_standing_table(
    competition_id: i32,
    stage_count: usize,
    mut rows: Vec<TeamStandingRow>,
    page: u32,
) -> TableDocument {
    let slots = stage_count.clamp(1, STAGE_SLOTS);

    rows.sort_by(|a, b| {
        b.points_total
            .cmp(&a.points_total)
            .then_with(|| b.is_featured.cmp(&a.is_featured))
            .then_with(|| a.team_title.cmp(&b.team_title))
    });

    let mut columns = vec![
        TableColumn::new("place", "Place"),
        TableColumn::new("team", "Team"),
    ];
    for slot in 1..=slots {
        columns.push(TableColumn::new(
            &format!("points{}", slot),
            &format!("Stage {}", slot),
        ));
    }
    columns.push(TableColumn::new("total", "Total"));

    let cells = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut cells = vec![
                TableCell::text((index + 1).to_string()),
                TableCell::text(row.team_title.clone()).with_link(Some(format!(
                    "/api/competitions/{}/teams/{}",
                    competition_id, row.team_id
                ))),
            ];
            for slot in 1..=slots {
                cells.push(TableCell::text(fmt_points(row.points(slot))));
            }
            cells.push(TableCell::text(fmt_points(Some(row.points_total))));
            cells
        })
        .collect();

    TableDocument::paged("team_standings", columns, cells, page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn row(title: &str, total: i64, is_featured: bool) -> TeamStandingRow {
        TeamStandingRow {
            team_standing_id: 1,
            team_id: 7,
            team_title: title.to_string(),
            is_featured,
            points1: Some(Decimal::from(total)),
            points2: None,
            points3: None,
            points4: None,
            points5: None,
            points6: None,
            points7: None,
            points_total: Decimal::from(total),
        }
    }

    #[test]
    fn test_places_are_a_running_counter() {
        let rows = vec![
            row("Third", 10, false),
            row("First", 30, false),
            row("Second", 20, false),
        ];

        let table = team_standing_table(10, 2, rows, 1);

        assert_eq!(table.rows[0][0].text, "1");
        assert_eq!(table.rows[0][1].text, "First");
        assert_eq!(table.rows[2][0].text, "3");
        assert_eq!(table.rows[2][1].text, "Third");
    }

    #[test]
    fn test_featured_team_wins_point_ties() {
        let rows = vec![row("Alpha", 20, false), row("Zeta", 20, true)];

        let table = team_standing_table(10, 1, rows, 1);

        assert_eq!(table.rows[0][1].text, "Zeta");
    }

    #[test]
    fn test_team_cell_links_to_public_team() {
        let table = team_standing_table(10, 1, vec![row("Alpha", 5, false)], 1);

        assert_eq!(
            table.rows[0][1].link.as_deref(),
            Some("/api/competitions/10/teams/7")
        );
    }
}
