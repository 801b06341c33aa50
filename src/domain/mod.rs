//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - source identities and their series kind (`SourceId`, `SeriesKind`)
//! - normalized daily records (`InfectionRecord`, `DeathRecord`, ...)
//! - the immutable, date-ordered `Series` container
//! - static taxonomy tables (age brackets, prefectures)

pub mod series;
pub mod taxonomy;
pub mod types;

pub use series::*;
pub use taxonomy::*;
pub use types::*;
