mod engine;
mod error;
mod types;

pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode, Result};
pub use types::{
    BlockOutcome, BlockReport, BlockSummary, Finding, Report, SectionSummary,
};
