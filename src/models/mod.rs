pub mod report;

// Re-export from report.rs so we can do "use crate::models::*;"
pub use report::*;
