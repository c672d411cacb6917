pub mod observers;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use observers::{CallLog, DataOne, DataTwo, Observer};
pub use setup::init_tracing;
