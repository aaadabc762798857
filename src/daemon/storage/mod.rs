//! Durable storage of the session report.
//!  - There is exactly one snapshot file per session, named after the session start.
//!  - Every flush replaces the whole file, it always holds the latest cumulative state.

pub mod snapshot_writer;
