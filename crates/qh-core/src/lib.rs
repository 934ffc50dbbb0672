pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod sheet;

pub use config::{
    AggregateConfig, DuplicatePolicy, OutputConfig, PipelineConfig, SourceLang, TableConfig,
    MAX_SLOTS,
};
pub use error::{QhError, Result};
pub use io::Artifact;
pub use model::{
    normalize_name, Candidate, ANONYMIZED_MARKER, Direction, EntryKind, HeaderEntry, Observation, ObservedValue,
    Status,
};
pub use sheet::{AggregateSummary, BucketSummary, CurationSheet};

/// ID 0 is never assigned; it tells the codec there was no static match.
pub const RESERVED_ID: u8 = 0;
