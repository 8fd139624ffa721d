//! The import pipeline: header resolution, row normalization, username
//! resolution, duplicate guarding, account creation, and batch reporting.

pub mod header;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod username;

pub use header::{resolve_headers, HeaderMap};
pub use normalize::{normalize_row, Normalized, NormalizedRecord};
pub use pipeline::Importer;
pub use report::{ImportReport, RowFailure};
pub use username::{resolve_username, MAX_USERNAME_PROBES};
