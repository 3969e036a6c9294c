//! Async HTTP collaborators of the publish pipeline.
//!
//! - [`teamcity`]: downloads the distribution archive from the build server,
//!   reusing an archive that is already on disk.
//! - [`maven`]: existence probe, uploads with checksums, and
//!   `maven-metadata.xml` maintenance for the target Maven repository.

pub mod maven;
pub mod teamcity;
