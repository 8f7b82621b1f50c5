use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveTime;
use storage::dto::result::ResultRow;

use super::{
    fmt_place, fmt_points, fmt_text, fmt_time, fmt_year, Badge, ResultTableKind, TableCell,
    TableColumn, TableDocument,
};

/// Everything the row formatter needs besides the rows themselves.
pub struct ResultTableContext {
    pub competition_id: i32,
    pub have_diploma: bool,
    /// Stage names by competition id, for the series-wide table.
    pub stage_names: HashMap<i32, String>,
}

pub fn result_table(
    kind: ResultTableKind,
    ctx: &ResultTableContext,
    mut rows: Vec<ResultRow>,
    page: u32,
) -> TableDocument {
    sort_rows(kind, &mut rows);

    let columns = columns(kind);
    let cells = rows.iter().map(|row| row_cells(kind, ctx, row)).collect();

    TableDocument::paged(kind.as_str(), columns, cells, page)
}

fn columns(kind: ResultTableKind) -> Vec<TableColumn> {
    let mut columns = Vec::new();

    if kind == ResultTableKind::ChildrenGroup {
        columns.push(TableColumn::new("stage", "Stage"));
    }

    columns.push(TableColumn::new("place", "Place"));
    columns.push(TableColumn::new("number", "Number"));
    columns.push(TableColumn::new("last_name", "Last name"));
    columns.push(TableColumn::new("first_name", "First name"));
    columns.push(TableColumn::new("year", "Year"));

    if matches!(kind, ResultTableKind::Distance | ResultTableKind::Road) {
        columns.push(TableColumn::new("group", "Group"));
    }

    if matches!(
        kind,
        ResultTableKind::Road | ResultTableKind::RoadOneSplit | ResultTableKind::RoadFourSplits
            | ResultTableKind::RoadGroup
    ) {
        columns.push(TableColumn::new("bike_brand", "Bike"));
    }

    columns.push(TableColumn::new("team", "Team"));

    for lap in 1..=kind.lap_columns() {
        columns.push(TableColumn::new(
            &format!("l{}", lap),
            &format!("Lap {}", lap),
        ));
    }

    columns.push(TableColumn::new("time", "Time"));

    if matches!(
        kind,
        ResultTableKind::Group | ResultTableKind::ChildrenGroup | ResultTableKind::Distance
    ) {
        columns.push(TableColumn::new("points", "Points"));
    }

    columns
}

fn row_cells(kind: ResultTableKind, ctx: &ResultTableContext, row: &ResultRow) -> Vec<TableCell> {
    let grouped = matches!(
        kind,
        ResultTableKind::Group | ResultTableKind::ChildrenGroup | ResultTableKind::RoadGroup
    );

    let mut cells = Vec::new();

    if kind == ResultTableKind::ChildrenGroup {
        let stage = ctx
            .stage_names
            .get(&row.competition_id)
            .map(String::as_str);
        cells.push(TableCell::text(fmt_text(stage)));
    }

    let place = if grouped {
        row.place_group
    } else {
        row.place_distance
    };
    cells.push(TableCell::text(fmt_place(place)));
    cells.push(TableCell::text(fmt_place(row.number)));
    cells.push(last_name_cell(ctx, row));
    cells.push(TableCell::text(row.first_name.clone()));
    cells.push(TableCell::text(fmt_year(row.birthday)));

    if matches!(kind, ResultTableKind::Distance | ResultTableKind::Road) {
        cells.push(TableCell::text(fmt_text(row.group_name.as_deref())));
    }

    if matches!(
        kind,
        ResultTableKind::Road | ResultTableKind::RoadOneSplit | ResultTableKind::RoadFourSplits
            | ResultTableKind::RoadGroup
    ) {
        cells.push(TableCell::text(fmt_text(row.bike_brand.as_deref())));
    }

    cells.push(team_cell(ctx, row));

    for lap in 1..=kind.lap_columns() {
        let time = match lap {
            1 => row.l1,
            2 => row.l2,
            3 => row.l3,
            _ => row.l4,
        };
        cells.push(TableCell::text(fmt_time(time)));
    }

    cells.push(TableCell::text(fmt_time(row.time)));

    if matches!(
        kind,
        ResultTableKind::Group | ResultTableKind::ChildrenGroup | ResultTableKind::Distance
    ) {
        let points = if grouped {
            row.points_group
        } else {
            row.points_distance
        };
        cells.push(TableCell::text(fmt_points(points)));
    }

    cells
}

/// Last name carries the leader badge and, when the competition hands
/// out diplomas, a link to the finisher's diploma.
fn last_name_cell(ctx: &ResultTableContext, row: &ResultRow) -> TableCell {
    let badge = match (row.leader_color.as_deref(), row.leader_text.as_deref()) {
        (Some(color), Some(text)) => Some(Badge {
            color: color.to_string(),
            text: text.to_string(),
        }),
        _ => None,
    };

    let link = if ctx.have_diploma && row.time.is_some() {
        Some(format!(
            "/api/competitions/{}/results/{}/diploma",
            ctx.competition_id, row.result_id
        ))
    } else {
        None
    };

    TableCell::text(row.last_name.clone())
        .with_link(link)
        .with_badge(badge)
}

fn team_cell(ctx: &ResultTableContext, row: &ResultRow) -> TableCell {
    let link = row
        .team_id
        .map(|team_id| format!("/api/competitions/{}/teams/{}", ctx.competition_id, team_id));

    TableCell::text(fmt_text(row.display_team())).with_link(link)
}

fn sort_rows(kind: ResultTableKind, rows: &mut [ResultRow]) {
    match kind {
        ResultTableKind::RoadFourSplits => rows.sort_by(cmp_four_splits),
        _ => rows.sort_by(|a, b| {
            asc_nulls_last(a.time, b.time).then_with(|| a.slug.cmp(&b.slug))
        }),
    }
}

/// Finish time first, then later splits before earlier ones. Riders on
/// the same finish time are separated by who was faster deeper into the
/// race.
fn cmp_four_splits(a: &ResultRow, b: &ResultRow) -> Ordering {
    asc_nulls_last(a.time, b.time)
        .then_with(|| asc_nulls_last(a.l4, b.l4))
        .then_with(|| asc_nulls_last(a.l3, b.l3))
        .then_with(|| asc_nulls_last(a.l2, b.l2))
        .then_with(|| asc_nulls_last(a.l1, b.l1))
        .then_with(|| a.slug.cmp(&b.slug))
}

fn asc_nulls_last(a: Option<NaiveTime>, b: Option<NaiveTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn time(h: u32, m: u32, s: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, s)
    }

    fn row(slug: &str) -> ResultRow {
        ResultRow {
            result_id: 1,
            competition_id: 10,
            time: time(1, 2, 3),
            place_distance: Some(1),
            place_group: Some(1),
            points_distance: None,
            points_group: None,
            status: None,
            leader_color: None,
            leader_text: None,
            participant_id: 100,
            first_name: "Anna".to_string(),
            last_name: "Ozola".to_string(),
            slug: slug.to_string(),
            birthday: None,
            gender: None,
            number: Some(15),
            group_name: None,
            bike_brand: None,
            team_id: None,
            team_title: None,
            team_name: None,
            l1: None,
            l2: None,
            l3: None,
            l4: None,
        }
    }

    fn ctx() -> ResultTableContext {
        ResultTableContext {
            competition_id: 10,
            have_diploma: false,
            stage_names: HashMap::new(),
        }
    }

    #[test]
    fn test_four_splits_breaks_ties_on_late_laps() {
        let mut slow_finish = row("a");
        slow_finish.l4 = time(0, 50, 0);

        let mut fast_l4 = row("b");
        fast_l4.l4 = time(0, 45, 0);

        let mut no_l4 = row("c");
        no_l4.l4 = None;

        let mut rows = vec![slow_finish, no_l4, fast_l4];
        sort_rows(ResultTableKind::RoadFourSplits, &mut rows);

        assert_eq!(rows[0].slug, "b");
        assert_eq!(rows[1].slug, "a");
        assert_eq!(rows[2].slug, "c");
    }

    #[test]
    fn test_default_sort_puts_missing_times_last() {
        let mut did_not_finish = row("a");
        did_not_finish.time = None;

        let finished = row("b");

        let mut rows = vec![did_not_finish, finished];
        sort_rows(ResultTableKind::Distance, &mut rows);

        assert_eq!(rows[0].slug, "b");
        assert_eq!(rows[1].slug, "a");
    }

    #[test]
    fn test_leader_badge_needs_color_and_text() {
        let mut leader = row("a");
        leader.leader_color = Some("yellow".to_string());
        leader.leader_text = Some("GC leader".to_string());

        let cell = last_name_cell(&ctx(), &leader);
        let badge = cell.badge.unwrap();
        assert_eq!(badge.color, "yellow");
        assert_eq!(badge.text, "GC leader");

        let mut color_only = row("b");
        color_only.leader_color = Some("yellow".to_string());
        assert!(last_name_cell(&ctx(), &color_only).badge.is_none());
    }

    #[test]
    fn test_diploma_link_requires_flag_and_finish() {
        let mut context = ctx();
        context.have_diploma = true;

        let finished = row("a");
        let cell = last_name_cell(&context, &finished);
        assert_eq!(
            cell.link.as_deref(),
            Some("/api/competitions/10/results/1/diploma")
        );

        let mut unfinished = row("b");
        unfinished.time = None;
        assert!(last_name_cell(&context, &unfinished).link.is_none());

        assert!(last_name_cell(&ctx(), &row("c")).link.is_none());
    }

    #[test]
    fn test_team_cell_falls_back_to_free_text_name() {
        let mut registered = row("a");
        registered.team_id = Some(7);
        registered.team_title = Some("Velo Club".to_string());
        registered.team_name = Some("SCRATCHED".to_string());

        let cell = team_cell(&ctx(), &registered);
        assert_eq!(cell.text, "Velo Club");
        assert_eq!(cell.link.as_deref(), Some("/api/competitions/10/teams/7"));

        let mut free_text = row("b");
        free_text.team_name = Some("KOLESO".to_string());
        let cell = team_cell(&ctx(), &free_text);
        assert_eq!(cell.text, "KOLESO");
        assert!(cell.link.is_none());

        assert_eq!(team_cell(&ctx(), &row("c")).text, "-");
    }

    #[test]
    fn test_children_group_table_shows_stage_name() {
        let mut context = ctx();
        context.stage_names.insert(10, "Stage 3".to_string());

        let table = result_table(ResultTableKind::ChildrenGroup, &context, vec![row("a")], 1);

        assert_eq!(table.columns[0].key, "stage");
        assert_eq!(table.rows[0][0].text, "Stage 3");
    }

    #[test]
    fn test_four_splits_has_all_lap_columns() {
        let table = result_table(ResultTableKind::RoadFourSplits, &ctx(), vec![row("a")], 1);

        let keys: Vec<&str> = table.columns.iter().map(|c| c.key.as_str()).collect();
        assert!(keys.contains(&"l1"));
        assert!(keys.contains(&"l4"));
        assert_eq!(table.kind, "road_four_splits");
    }
}
