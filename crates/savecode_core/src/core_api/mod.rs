mod engine;
mod error;
mod types;

pub use engine::{Analysis, AnalysisSource, Engine, StorageConfig};
pub use error::{CoreError, CoreErrorCode};
pub use types::{
    CharacterGroup, FallbackReason, JobGroup, LoadOutcome, MAX_ITEM_SLOTS, SaveCodeRecord,
    UNKNOWN_VALUE,
};
