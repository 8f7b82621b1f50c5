use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A distance offered by a competition (e.g. sport, folk, children).
///
/// `kind` drives which result table layout a road race renders: "folk"
/// distances record one intermediate split, "sport" distances four.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Distance {
    pub distance_id: i32,
    pub competition_id: i32,
    pub name: String,
    pub kind: Option<String>,
    pub can_have_teams: bool,
    pub ordering: i32,
}

impl Distance {
    pub fn is_folk(&self) -> bool {
        self.kind.as_deref() == Some("folk")
    }

    pub fn is_sport(&self) -> bool {
        self.kind.as_deref() == Some("sport")
    }
}
