//! # Services
//!
//! Collaborators around the counting core: the read-only device-name
//! directory and the periodic statistics reporter.

pub mod directory;
pub mod reporter;
