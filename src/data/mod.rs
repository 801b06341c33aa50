//! Data access: byte sources (directory, HTTP, in-memory) and the
//! all-or-nothing multi-source loader.

pub mod dataset;
pub mod http;
pub mod source;

pub use dataset::*;
pub use http::*;
pub use source::*;
