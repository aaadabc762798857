//! Background key press counter. Presses are aggregated per key in memory and periodically
//! written into a small plain text report, so a day of typing can be inspected at a glance.
//!

pub mod cli;
pub mod daemon;
pub mod desktop;
pub mod keyboard_api;
pub mod utils;
