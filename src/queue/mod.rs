pub mod inserter;
pub mod snapshot;

pub use inserter::{InsertOutcome, PositionInserter};
pub use snapshot::{is_logically_queued, QueueSnapshot};
