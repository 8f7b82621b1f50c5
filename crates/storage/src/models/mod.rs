pub mod competition;
pub mod distance;
pub mod flat_page;
pub mod lap_result;
pub mod member;
pub mod participant;
pub mod race_result;
pub mod standing;
pub mod team;
pub mod team_standing;
pub mod url_sync;

pub use competition::Competition;
pub use distance::Distance;
pub use flat_page::FlatPage;
pub use lap_result::LapResult;
pub use member::{Member, MemberApplication, KIND_PARTICIPANT, KIND_RESERVE};
pub use participant::Participant;
pub use race_result::RaceResult;
pub use standing::{Standing, STAGE_SLOTS};
pub use team::Team;
pub use team_standing::TeamStanding;
pub use url_sync::UrlSync;
