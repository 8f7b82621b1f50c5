//! Table rendering layer.
//!
//! Every public listing and every PDF report is built from the same
//! [`TableDocument`]: a declared column set plus ordered, formatted rows.
//! Sorting and pagination happen here, in memory, so the orderings
//! declared per table kind are the single source of truth for both the
//! HTTP and the PDF output.

pub mod results;
pub mod standings;
pub mod teams;

use chrono::{Datelike, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use storage::dto::common::{PaginationMeta, TABLE_PAGE_SIZE};
use utoipa::ToSchema;

/// Which result table to render, chosen by the competition's rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTableKind {
    /// One group of a stage-series distance.
    Group,
    /// Series page: stage results of all children, with a stage column.
    ChildrenGroup,
    /// Whole distance of a single stage.
    Distance,
    /// Road race without splits.
    Road,
    /// Road race with one split column.
    RoadOneSplit,
    /// Road race with four split columns and the late-split tie-break.
    RoadFourSplits,
    /// One group of a road race.
    RoadGroup,
}

impl ResultTableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultTableKind::Group => "group",
            ResultTableKind::ChildrenGroup => "children_group",
            ResultTableKind::Distance => "distance",
            ResultTableKind::Road => "road",
            ResultTableKind::RoadOneSplit => "road_one_split",
            ResultTableKind::RoadFourSplits => "road_four_splits",
            ResultTableKind::RoadGroup => "road_group",
        }
    }

    /// How many lap columns the row query has to fetch for this table.
    pub fn lap_columns(&self) -> u8 {
        match self {
            ResultTableKind::RoadOneSplit => 1,
            ResultTableKind::RoadFourSplits => 4,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandingTableKind {
    Distance,
    Group,
    /// Distance standing that also shows the group place column.
    ChildrenGroup,
}

impl StandingTableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StandingTableKind::Distance => "distance",
            StandingTableKind::Group => "group",
            StandingTableKind::ChildrenGroup => "children_group",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TableColumn {
    pub key: String,
    pub label: String,
}

impl TableColumn {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// Leader jersey annotation attached to a rider cell.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Badge {
    pub color: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TableCell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
}

impl TableCell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
            badge: None,
        }
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    pub fn with_badge(mut self, badge: Option<Badge>) -> Self {
        self.badge = badge;
        self
    }
}

/// A rendered table: columns, one formatted page of rows, and the
/// pagination envelope describing the full set.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TableDocument {
    pub kind: String,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<TableCell>>,
    pub pagination: PaginationMeta,
}

impl TableDocument {
    /// Keeps only the requested page of `rows`.
    pub fn paged(
        kind: &str,
        columns: Vec<TableColumn>,
        rows: Vec<Vec<TableCell>>,
        page: u32,
    ) -> Self {
        let total_items = rows.len() as i64;
        let pagination = PaginationMeta::new(page, TABLE_PAGE_SIZE, total_items);

        let offset = (page.saturating_sub(1) as usize) * TABLE_PAGE_SIZE as usize;
        let rows = rows
            .into_iter()
            .skip(offset)
            .take(TABLE_PAGE_SIZE as usize)
            .collect();

        Self {
            kind: kind.to_string(),
            columns,
            rows,
            pagination,
        }
    }

    /// Drops everything past the first `limit` rows. Used by the top-20
    /// report variants.
    pub fn truncated(mut self, limit: usize) -> Self {
        self.rows.truncate(limit);
        self
    }
}

pub fn fmt_time(time: Option<NaiveTime>) -> String {
    match time {
        Some(time) => time.format("%H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

pub fn fmt_year(birthday: Option<NaiveDate>) -> String {
    match birthday {
        Some(birthday) => birthday.year().to_string(),
        None => "-".to_string(),
    }
}

pub fn fmt_place(place: Option<i32>) -> String {
    match place {
        Some(place) => place.to_string(),
        None => "-".to_string(),
    }
}

pub fn fmt_points(points: Option<Decimal>) -> String {
    match points {
        Some(points) => points.normalize().to_string(),
        None => "-".to_string(),
    }
}

pub fn fmt_text(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_time() {
        let time = NaiveTime::from_hms_opt(1, 2, 3).unwrap();

        assert_eq!(fmt_time(Some(time)), "01:02:03");
        assert_eq!(fmt_time(None), "-");
    }

    #[test]
    fn test_fmt_year() {
        let birthday = NaiveDate::from_ymd_opt(1987, 5, 20).unwrap();

        assert_eq!(fmt_year(Some(birthday)), "1987");
        assert_eq!(fmt_year(None), "-");
    }

    #[test]
    fn test_fmt_points_normalizes_trailing_zeroes() {
        assert_eq!(fmt_points(Some(Decimal::new(12_50, 2))), "12.5");
        assert_eq!(fmt_points(None), "-");
    }

    #[test]
    fn test_paged_slices_rows() {
        let rows: Vec<Vec<TableCell>> = (0..450)
            .map(|i| vec![TableCell::text(i.to_string())])
            .collect();

        let page = TableDocument::paged("distance", Vec::new(), rows, 3);

        assert_eq!(page.rows.len(), 50);
        assert_eq!(page.rows[0][0].text, "400");
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.total_items, 450);
    }

    #[test]
    fn test_paged_past_the_end_is_empty() {
        let rows = vec![vec![TableCell::text("only")]];

        let page = TableDocument::paged("distance", Vec::new(), rows, 5);

        assert!(page.rows.is_empty());
        assert_eq!(page.pagination.total_items, 1);
    }
}
