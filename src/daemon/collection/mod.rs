//! Sources of key press events. Collectors only forward events into a channel, all counting and
//! persistence happens on the other side of it.

use std::sync::Arc;

pub mod collector;
pub mod lines;

/// One discrete press of a key, identified by its human readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Arc<str>,
}

impl KeyEvent {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self { key: key.into() }
    }
}
