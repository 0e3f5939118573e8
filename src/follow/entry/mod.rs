mod entry;
mod severity;

pub use entry::Entry;
pub use severity::Severity;
