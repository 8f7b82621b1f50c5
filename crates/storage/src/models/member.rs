use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Application kind: the member rides for team points at this stage.
pub const KIND_PARTICIPANT: i16 = 1;
/// Application kind: the member is on the reserve list for this stage.
pub const KIND_RESERVE: i16 = 2;

/// A rider on a team's roster.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub member_id: i32,
    pub team_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub slug: String,
    pub birthday: Option<chrono::NaiveDate>,
}

/// Stage application of a member: whether they ride as a scoring
/// participant or a reserve, and the participant record they map to once
/// registration is matched.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MemberApplication {
    pub application_id: i32,
    pub member_id: i32,
    pub competition_id: i32,
    pub kind: i16,
    pub participant_id: Option<i32>,
}
