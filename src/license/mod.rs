//! License label normalization and aggregation.
//!
//! - [`spdx`]: maps free-text license labels (and `license + exception`
//!   labels) to SPDX identifiers via an exact-match table.
//! - [`exception`]: the separate table of SPDX exception spellings.
//! - [`catalog`]: resolves a whole manifest into a deduplicated
//!   [`LicenseCatalog`](catalog::LicenseCatalog), failing on any unknown label.

pub mod catalog;
pub mod exception;
pub mod spdx;
