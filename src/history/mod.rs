mod entry;
mod error;
mod file;
mod stats;
mod store;

pub use entry::Entry;
pub use error::{HistoryError, HistoryResult};
pub use stats::Stats;
pub use store::{Appended, HistoryStore};
