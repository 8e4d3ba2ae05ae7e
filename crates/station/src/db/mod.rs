mod observations;
mod sqlite;

pub use observations::{NewObservation, Observation, ObservationData};
pub use sqlite::{Database, DatabaseWriter};
