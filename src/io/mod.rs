//! Input/output helpers.
//!
//! - CSV ingest + normalization (`ingest`)
//! - view exports (JSON/CSV) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
