use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{Competition, Distance};

/// One competition in the archive listing, annotated with whether any
/// results exist for it or its stages.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ArchiveCompetition {
    pub competition_id: i32,
    pub name: String,
    pub slug: String,
    pub competition_date: NaiveDate,
    pub have_results: i64,
}

/// Competitions of a single season, newest season first in the archive.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArchiveYear {
    pub year: i32,
    pub competitions: Vec<ArchiveCompetition>,
}

/// Full competition context: the page itself, its stages and the
/// distances riders can enter.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompetitionDetailResponse {
    pub competition: Competition,
    pub children: Vec<Competition>,
    pub distances: Vec<Distance>,
}
