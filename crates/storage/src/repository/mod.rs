pub mod competition;
pub mod flat_page;
pub mod result;
pub mod standing;
pub mod team;
pub mod team_standing;
pub mod url_sync;
