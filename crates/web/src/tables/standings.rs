use storage::dto::standing::StandingRow;
use storage::models::STAGE_SLOTS;

use super::{
    fmt_place, fmt_points, fmt_text, fmt_year, StandingTableKind, TableCell, TableColumn,
    TableDocument,
};

pub struct StandingTableContext {
    pub competition_id: i32,
    /// How many stage point columns to show, capped at the seven slots
    /// the standings keep.
    pub stage_count: usize,
}

impl StandingTableContext {
    fn slots(&self) -> usize {
        self.stage_count.clamp(1, STAGE_SLOTS)
    }
}

pub fn standing_table(
    kind: StandingTableKind,
    ctx: &StandingTableContext,
    mut rows: Vec<StandingRow>,
    page: u32,
) -> TableDocument {
    let grouped = kind == StandingTableKind::Group;

    rows.sort_by(|a, b| {
        let (a_total, b_total) = if grouped {
            (a.group_total, b.group_total)
        } else {
            (a.distance_total, b.distance_total)
        };
        b_total.cmp(&a_total).then_with(|| a.slug.cmp(&b.slug))
    });

    let columns = columns(kind, ctx.slots());
    let cells = rows.iter().map(|row| row_cells(kind, ctx, row)).collect();

    TableDocument::paged(kind.as_str(), columns, cells, page)
}

fn columns(kind: StandingTableKind, slots: usize) -> Vec<TableColumn> {
    let mut columns = vec![
        TableColumn::new("place", "Place"),
        TableColumn::new("number", "Number"),
        TableColumn::new("last_name", "Last name"),
        TableColumn::new("first_name", "First name"),
        TableColumn::new("year", "Year"),
    ];

    if kind != StandingTableKind::Group {
        columns.push(TableColumn::new("group", "Group"));
    }
    if kind == StandingTableKind::ChildrenGroup {
        columns.push(TableColumn::new("group_place", "Group place"));
    }

    columns.push(TableColumn::new("team", "Team"));

    for slot in 1..=slots {
        columns.push(TableColumn::new(
            &format!("points{}", slot),
            &format!("Stage {}", slot),
        ));
    }
    columns.push(TableColumn::new("total", "Total"));

    columns
}

fn row_cells(
    kind: StandingTableKind,
    ctx: &StandingTableContext,
    row: &StandingRow,
) -> Vec<TableCell> {
    let grouped = kind == StandingTableKind::Group;

    let place = if grouped {
        row.group_place
    } else {
        row.distance_place
    };

    let mut cells = vec![
        TableCell::text(fmt_place(place)),
        TableCell::text(fmt_place(row.number)),
        TableCell::text(row.last_name.clone()),
        TableCell::text(row.first_name.clone()),
        TableCell::text(fmt_year(row.birthday)),
    ];

    if kind != StandingTableKind::Group {
        cells.push(TableCell::text(fmt_text(row.group_name.as_deref())));
    }
    if kind == StandingTableKind::ChildrenGroup {
        cells.push(TableCell::text(fmt_place(row.group_place)));
    }

    let team_link = row
        .team_id
        .map(|team_id| format!("/api/competitions/{}/teams/{}", ctx.competition_id, team_id));
    cells.push(TableCell::text(fmt_text(row.display_team())).with_link(team_link));

    for slot in 1..=ctx.slots() {
        let points = if grouped {
            row.group_points(slot)
        } else {
            row.distance_points(slot)
        };
        cells.push(TableCell::text(fmt_points(points)));
    }

    let total = if grouped {
        row.group_total
    } else {
        row.distance_total
    };
    cells.push(TableCell::text(fmt_points(Some(total))));

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn row(slug: &str, group_total: i64, distance_total: i64) -> StandingRow {
        StandingRow {
            standing_id: 1,
            distance_id: 5,
            distance_place: Some(1),
            group_place: Some(1),
            group_points1: Some(Decimal::from(group_total)),
            group_points2: None,
            group_points3: None,
            group_points4: None,
            group_points5: None,
            group_points6: None,
            group_points7: None,
            group_total: Decimal::from(group_total),
            distance_points1: Some(Decimal::from(distance_total)),
            distance_points2: None,
            distance_points3: None,
            distance_points4: None,
            distance_points5: None,
            distance_points6: None,
            distance_points7: None,
            distance_total: Decimal::from(distance_total),
            participant_id: 100,
            first_name: "Anna".to_string(),
            last_name: "Ozola".to_string(),
            slug: slug.to_string(),
            birthday: None,
            number: Some(21),
            group_name: Some("M-18".to_string()),
            team_id: None,
            team_title: None,
            team_name: None,
        }
    }

    fn ctx(stage_count: usize) -> StandingTableContext {
        StandingTableContext {
            competition_id: 10,
            stage_count,
        }
    }

    #[test]
    fn test_group_table_sorts_by_group_total() {
        let rows = vec![row("a", 10, 99), row("b", 30, 1), row("c", 20, 50)];

        let table = standing_table(StandingTableKind::Group, &ctx(3), rows, 1);

        let totals: Vec<&str> = table
            .rows
            .iter()
            .map(|r| r.last().map(|c| c.text.as_str()).unwrap_or(""))
            .collect();
        assert_eq!(totals, vec!["30", "20", "10"]);
    }

    #[test]
    fn test_distance_table_sorts_by_distance_total() {
        let rows = vec![row("a", 99, 10), row("b", 1, 30)];

        let table = standing_table(StandingTableKind::Distance, &ctx(1), rows, 1);

        let totals: Vec<&str> = table
            .rows
            .iter()
            .map(|r| r.last().map(|c| c.text.as_str()).unwrap_or(""))
            .collect();
        assert_eq!(totals, vec!["30", "10"]);
    }

    #[test]
    fn test_stage_columns_follow_stage_count() {
        let table = standing_table(StandingTableKind::Group, &ctx(5), vec![row("a", 1, 1)], 1);
        let keys: Vec<&str> = table.columns.iter().map(|c| c.key.as_str()).collect();

        assert!(keys.contains(&"points5"));
        assert!(!keys.contains(&"points6"));
    }

    #[test]
    fn test_stage_columns_cap_at_seven() {
        let table = standing_table(StandingTableKind::Group, &ctx(12), vec![row("a", 1, 1)], 1);
        let keys: Vec<&str> = table.columns.iter().map(|c| c.key.as_str()).collect();

        assert!(keys.contains(&"points7"));
        assert!(!keys.contains(&"points8"));
    }

    #[test]
    fn test_children_group_shows_group_place_column() {
        let table = standing_table(
            StandingTableKind::ChildrenGroup,
            &ctx(2),
            vec![row("a", 1, 1)],
            1,
        );
        let keys: Vec<&str> = table.columns.iter().map(|c| c.key.as_str()).collect();

        assert!(keys.contains(&"group_place"));
        assert_eq!(table.kind, "children_group");
    }
}
