pub mod config;
pub mod errors;
pub mod ids;
pub mod journal;
pub mod judge;
pub mod model;
pub mod query;
pub mod report;
pub mod storage;

pub use errors::{ErrorKind, RecordError, RecordResult};
pub use journal::{Journal, NewEntry};
pub use model::{Evaluation, EvaluationRecord, RecordId, Score};
pub use storage::RecordStore;
