//! Printable result reports.
//!
//! The manager's report dispatcher accepts a fixed action vocabulary and
//! answers with a PDF built from the same table documents the public
//! listings serve.

pub mod pdf;

use chrono::NaiveDate;
use sqlx::PgPool;
use storage::dto::result::ResultFilter;
use storage::dto::standing::StandingFilter;
use storage::dto::team::TeamStageResult;
use storage::repository::competition::{CompetitionRepository, DistanceScope};
use storage::repository::result::ResultRepository;
use storage::repository::standing::StandingRepository;
use storage::repository::team_standing::TeamStandingRepository;

use crate::error::WebError;
use crate::rules::{CompetitionContext, CompetitionRules};
use crate::tables::results::{result_table, ResultTableContext};
use crate::tables::standings::{standing_table, StandingTableContext};
use crate::tables::teams::team_standing_table;
use crate::tables::{fmt_points, TableDocument};

use self::pdf::PdfSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    Groups,
    GroupsTop20,
    Gender,
    Distance,
    DistanceTop20,
    Standings,
    StandingsTop20,
    StandingsGroups,
    StandingsGroupsTop20,
    Team,
    TeamStandings,
}

impl ReportAction {
    /// The dispatcher's whole vocabulary; anything else is treated as a
    /// missing resource.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "results_groups" => Some(ReportAction::Groups),
            "results_groups_top20" => Some(ReportAction::GroupsTop20),
            "results_gender" => Some(ReportAction::Gender),
            "results_distance" => Some(ReportAction::Distance),
            "results_distance_top20" => Some(ReportAction::DistanceTop20),
            "results_standings" => Some(ReportAction::Standings),
            "results_standings_top20" => Some(ReportAction::StandingsTop20),
            "results_standings_groups" => Some(ReportAction::StandingsGroups),
            "results_standings_groups_top20" => Some(ReportAction::StandingsGroupsTop20),
            "results_team" => Some(ReportAction::Team),
            "results_team_standings" => Some(ReportAction::TeamStandings),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportAction::Groups => "results_groups",
            ReportAction::GroupsTop20 => "results_groups_top20",
            ReportAction::Gender => "results_gender",
            ReportAction::Distance => "results_distance",
            ReportAction::DistanceTop20 => "results_distance_top20",
            ReportAction::Standings => "results_standings",
            ReportAction::StandingsTop20 => "results_standings_top20",
            ReportAction::StandingsGroups => "results_standings_groups",
            ReportAction::StandingsGroupsTop20 => "results_standings_groups_top20",
            ReportAction::Team => "results_team",
            ReportAction::TeamStandings => "results_team_standings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportAction::Groups => "Results by group",
            ReportAction::GroupsTop20 => "Results by group, top 20",
            ReportAction::Gender => "Results by gender",
            ReportAction::Distance => "Results by distance",
            ReportAction::DistanceTop20 => "Results by distance, top 20",
            ReportAction::Standings => "Standings",
            ReportAction::StandingsTop20 => "Standings, top 20",
            ReportAction::StandingsGroups => "Standings by group",
            ReportAction::StandingsGroupsTop20 => "Standings by group, top 20",
            ReportAction::Team => "Team results",
            ReportAction::TeamStandings => "Team standings",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.as_str())
    }

    fn top20(&self) -> bool {
        matches!(
            self,
            ReportAction::GroupsTop20
                | ReportAction::DistanceTop20
                | ReportAction::StandingsTop20
                | ReportAction::StandingsGroupsTop20
        )
    }
}

pub async fn build_report(
    pool: &PgPool,
    rules: &dyn CompetitionRules,
    action: ReportAction,
    today: NaiveDate,
) -> Result<Vec<u8>, WebError> {
    let top20 = action.top20();

    let sections = match action {
        ReportAction::Groups | ReportAction::GroupsTop20 => {
            results_by_groups(pool, rules, top20).await?
        }
        ReportAction::Gender => results_by_gender(pool, rules).await?,
        ReportAction::Distance | ReportAction::DistanceTop20 => {
            results_by_distance(pool, rules, top20).await?
        }
        ReportAction::Standings | ReportAction::StandingsTop20 => {
            standings_by_distance(pool, rules, top20).await?
        }
        ReportAction::StandingsGroups | ReportAction::StandingsGroupsTop20 => {
            standings_by_groups(pool, rules, top20).await?
        }
        ReportAction::Team => team_results(pool, rules, today).await?,
        ReportAction::TeamStandings => team_standings(pool, rules).await?,
    };

    let title = format!("{} - {}", rules.context().competition.name, action.label());
    Ok(pdf::render_report(&title, &sections))
}

async fn results_by_groups(
    pool: &PgPool,
    rules: &dyn CompetitionRules,
    top20: bool,
) -> Result<Vec<PdfSection>, WebError> {
    let ctx = rules.context();
    let distances = CompetitionRepository::new(pool)
        .distances(ctx.series.competition_id, DistanceScope::WithResults)
        .await?;
    let results = ResultRepository::new(pool);

    let mut sections = Vec::new();
    for distance in &distances {
        for group in rules.groups(distance.distance_id) {
            let kind = rules.result_table(distance, Some(&group));
            let filter = ResultFilter {
                competition_ids: ctx.family_ids(),
                distance_id: Some(distance.distance_id),
                group: Some(group.clone()),
                lap_columns: kind.lap_columns(),
                ..Default::default()
            };
            let rows = results.list(&filter).await?;
            let table = result_table(kind, &table_context(ctx), rows, 1);

            sections.push(section(
                format!("{} / {}", distance.name, group),
                maybe_top20(table, top20),
            ));
        }
    }

    Ok(sections)
}

async fn results_by_gender(
    pool: &PgPool,
    rules: &dyn CompetitionRules,
) -> Result<Vec<PdfSection>, WebError> {
    let ctx = rules.context();
    let distances = CompetitionRepository::new(pool)
        .distances(ctx.series.competition_id, DistanceScope::WithResults)
        .await?;
    let results = ResultRepository::new(pool);

    let mut sections = Vec::new();
    for distance in &distances {
        let kind = rules.result_table(distance, None);
        let filter = ResultFilter {
            competition_ids: ctx.family_ids(),
            distance_id: Some(distance.distance_id),
            lap_columns: kind.lap_columns(),
            ..Default::default()
        };
        let rows = results.list(&filter).await?;

        for (code, label) in [("M", "Men"), ("F", "Women")] {
            let subset: Vec<_> = rows
                .iter()
                .filter(|row| row.gender.as_deref() == Some(code))
                .cloned()
                .collect();
            if subset.is_empty() {
                continue;
            }

            let table = result_table(kind, &table_context(ctx), subset, 1);
            sections.push(section(format!("{} / {}", distance.name, label), table));
        }
    }

    Ok(sections)
}

async fn results_by_distance(
    pool: &PgPool,
    rules: &dyn CompetitionRules,
    top20: bool,
) -> Result<Vec<PdfSection>, WebError> {
    let ctx = rules.context();
    let distances = CompetitionRepository::new(pool)
        .distances(ctx.series.competition_id, DistanceScope::WithResults)
        .await?;
    let results = ResultRepository::new(pool);

    let mut sections = Vec::new();
    for distance in &distances {
        let kind = rules.result_table(distance, None);
        let filter = ResultFilter {
            competition_ids: ctx.family_ids(),
            distance_id: Some(distance.distance_id),
            lap_columns: kind.lap_columns(),
            ..Default::default()
        };
        let rows = results.list(&filter).await?;
        let table = result_table(kind, &table_context(ctx), rows, 1);

        sections.push(section(distance.name.clone(), maybe_top20(table, top20)));
    }

    Ok(sections)
}

async fn standings_by_distance(
    pool: &PgPool,
    rules: &dyn CompetitionRules,
    top20: bool,
) -> Result<Vec<PdfSection>, WebError> {
    let ctx = rules.context();
    let distances = CompetitionRepository::new(pool)
        .distances(ctx.series.competition_id, DistanceScope::WithResults)
        .await?;
    let standings = StandingRepository::new(pool);

    let mut sections = Vec::new();
    for distance in &distances {
        let kind = rules.standing_table(distance, None);
        let filter = StandingFilter {
            competition_ids: vec![ctx.series.competition_id],
            distance_id: Some(distance.distance_id),
            ..Default::default()
        };
        let rows = standings.list(&filter).await?;
        let table = standing_table(kind, &standing_context(ctx), rows, 1);

        sections.push(section(distance.name.clone(), maybe_top20(table, top20)));
    }

    Ok(sections)
}

async fn standings_by_groups(
    pool: &PgPool,
    rules: &dyn CompetitionRules,
    top20: bool,
) -> Result<Vec<PdfSection>, WebError> {
    let ctx = rules.context();
    let distances = CompetitionRepository::new(pool)
        .distances(ctx.series.competition_id, DistanceScope::WithResults)
        .await?;
    let standings = StandingRepository::new(pool);

    let mut sections = Vec::new();
    for distance in &distances {
        for group in rules.groups(distance.distance_id) {
            let kind = rules.standing_table(distance, Some(&group));
            let filter = StandingFilter {
                competition_ids: vec![ctx.series.competition_id],
                distance_id: Some(distance.distance_id),
                group: Some(group.clone()),
                ..Default::default()
            };
            let rows = standings.list(&filter).await?;
            let table = standing_table(kind, &standing_context(ctx), rows, 1);

            sections.push(section(
                format!("{} / {}", distance.name, group),
                maybe_top20(table, top20),
            ));
        }
    }

    Ok(sections)
}

async fn team_results(
    pool: &PgPool,
    rules: &dyn CompetitionRules,
    today: NaiveDate,
) -> Result<Vec<PdfSection>, WebError> {
    let ctx = rules.context();
    let slot = rules.stage_index(today);
    let Some(stage) = ctx.stages.get(slot.saturating_sub(1)) else {
        return Ok(Vec::new());
    };

    let distances = CompetitionRepository::new(pool)
        .distances(ctx.series.competition_id, DistanceScope::WithTeams)
        .await?;
    let repo = TeamStandingRepository::new(pool);

    let mut sections = Vec::new();
    for distance in &distances {
        let teams = repo
            .stage_results(
                stage.competition_id,
                ctx.series.competition_id,
                distance.distance_id,
                slot,
            )
            .await?;

        sections.push(PdfSection {
            title: format!("{} / {}", distance.name, stage.name),
            lines: team_lines(&teams),
        });
    }

    Ok(sections)
}

async fn team_standings(
    pool: &PgPool,
    rules: &dyn CompetitionRules,
) -> Result<Vec<PdfSection>, WebError> {
    let ctx = rules.context();
    let distances = CompetitionRepository::new(pool)
        .distances(ctx.series.competition_id, DistanceScope::WithTeams)
        .await?;
    let repo = TeamStandingRepository::new(pool);

    let mut sections = Vec::new();
    for distance in &distances {
        let rows = repo
            .standings(ctx.series.competition_id, distance.distance_id)
            .await?;
        let table = team_standing_table(
            ctx.competition.competition_id,
            ctx.stages.len().max(1),
            rows,
            1,
        );

        sections.push(section(distance.name.clone(), table));
    }

    Ok(sections)
}

fn table_context(ctx: &CompetitionContext) -> ResultTableContext {
    ResultTableContext {
        competition_id: ctx.competition.competition_id,
        have_diploma: ctx.have_diploma(),
        stage_names: ctx.stage_names(),
    }
}

fn standing_context(ctx: &CompetitionContext) -> StandingTableContext {
    StandingTableContext {
        competition_id: ctx.competition.competition_id,
        stage_count: ctx.stages.len().max(1),
    }
}

fn maybe_top20(table: TableDocument, top20: bool) -> TableDocument {
    if top20 {
        table.truncated(20)
    } else {
        table
    }
}

fn section(title: String, table: TableDocument) -> PdfSection {
    PdfSection {
        title,
        lines: table_lines(&table),
    }
}

/// Pads every column to its widest cell so the Courier pages line up.
fn table_lines(table: &TableDocument) -> Vec<String> {
    let mut widths: Vec<usize> = table
        .columns
        .iter()
        .map(|column| column.label.chars().count())
        .collect();
    for row in &table.rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.text.chars().count());
            }
        }
    }

    let header = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| pad(&column.label, widths[index]))
        .collect::<Vec<_>>()
        .join("  ");

    let mut lines = vec![header];
    for row in &table.rows {
        lines.push(
            row.iter()
                .enumerate()
                .map(|(index, cell)| pad(&cell.text, widths.get(index).copied().unwrap_or(0)))
                .collect::<Vec<_>>()
                .join("  "),
        );
    }

    lines
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

fn team_lines(teams: &[TeamStageResult]) -> Vec<String> {
    let mut lines = Vec::new();

    for (index, team) in teams.iter().enumerate() {
        lines.push(format!(
            "{}. {}  {}",
            index + 1,
            team.team_title,
            fmt_points(team.stage_points)
        ));
        for member in &team.members {
            let number = member
                .number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!(
                "    {}  {} {}  {}",
                number,
                member.first_name,
                member.last_name,
                fmt_points(member.points)
            ));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{TableCell, TableColumn};

    #[test]
    fn test_parse_accepts_the_whole_vocabulary() {
        let actions = [
            "results_groups",
            "results_groups_top20",
            "results_gender",
            "results_distance",
            "results_distance_top20",
            "results_standings",
            "results_standings_top20",
            "results_standings_groups",
            "results_standings_groups_top20",
            "results_team",
            "results_team_standings",
        ];

        for name in actions {
            let action = ReportAction::parse(name).unwrap();
            assert_eq!(action.as_str(), name);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_actions() {
        assert!(ReportAction::parse("not_a_real_action").is_none());
        assert!(ReportAction::parse("").is_none());
        assert!(ReportAction::parse("RESULTS_GROUPS").is_none());
    }

    #[test]
    fn test_file_name_follows_action() {
        assert_eq!(ReportAction::Gender.file_name(), "results_gender.pdf");
    }

    #[test]
    fn test_top20_variants() {
        assert!(ReportAction::GroupsTop20.top20());
        assert!(ReportAction::StandingsGroupsTop20.top20());
        assert!(!ReportAction::Team.top20());
    }

    #[test]
    fn test_table_lines_pad_to_widest_cell() {
        let table = TableDocument::paged(
            "distance",
            vec![
                TableColumn::new("place", "P"),
                TableColumn::new("name", "Name"),
            ],
            vec![
                vec![TableCell::text("1"), TableCell::text("Ozola")],
                vec![TableCell::text("12"), TableCell::text("Liepa")],
            ],
            1,
        );

        let lines = table_lines(&table);

        assert_eq!(lines[0], "P   Name ");
        assert_eq!(lines[1], "1   Ozola");
        assert_eq!(lines[2], "12  Liepa");
    }
}
