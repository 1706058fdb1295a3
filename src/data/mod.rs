pub mod model;
pub mod schedule;
pub mod snapshot;
pub mod validator;

pub use model::{League, Pairing, Stadium, Team, TimeSlot};
pub use schedule::Schedule;
pub use snapshot::LeagueSnapshot;
pub use validator::DomainValidator;
