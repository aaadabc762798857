use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};

/// Represents an entity responsible for providing local wall-clock time and sleeping across the
/// application. This allows time to be faked during testing.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Current local wall-clock time. Reports and snapshot names are built from it.
    fn time(&self) -> NaiveDateTime;

    async fn sleep(&self, duration: Duration);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
