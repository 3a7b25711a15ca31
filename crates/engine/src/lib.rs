pub mod amount_index;
pub mod assign;
pub mod context;
pub mod engine;
pub mod extract;
pub mod mapping;
pub mod report;
pub mod strategy;
pub mod tracker;

pub use amount_index::{AmountIndex, CandidatePair};
pub use context::RunContext;
pub use engine::{EngineError, EngineOptions, FileData, MatchEngine};
pub use mapping::{AccountMapping, MappingError};
pub use report::ReconOutcome;
pub use strategy::manual::{ManualCandidate, ManualConfirmation};
pub use tracker::{FileSide, UnmatchedTracker};
