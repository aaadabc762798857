use chrono::{Datelike, Duration, NaiveDateTime, Timelike};

/// A single run of the daemon. Only the start moment is kept, everything else is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    start: NaiveDateTime,
}

impl Session {
    pub fn new(start: NaiveDateTime) -> Self {
        Self { start }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Time since the start of the session. A clock that went backwards yields zero.
    pub fn elapsed(&self, now: NaiveDateTime) -> Duration {
        (now - self.start).max(Duration::zero())
    }

    /// Name of the snapshot file. It stays the same for the whole session, so every flush
    /// overwrites the previous one.
    pub fn snapshot_file_name(&self) -> String {
        format!(
            "KeystrokeCount_{}-T-{}-{}-{}.txt",
            self.start.day(),
            self.start.hour(),
            self.start.minute(),
            self.start.second()
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use crate::utils::clock::test_clock::TEST_START_DATE;

    use super::Session;

    #[test]
    fn test_snapshot_file_name_is_unpadded() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 4)
            .unwrap()
            .and_hms_opt(7, 3, 9)
            .unwrap();
        assert_eq!(
            Session::new(start).snapshot_file_name(),
            "KeystrokeCount_4-T-7-3-9.txt"
        );
    }

    #[test]
    fn test_snapshot_file_name_depends_only_on_start() {
        let session = Session::new(TEST_START_DATE);
        assert_eq!(session.snapshot_file_name(), "KeystrokeCount_4-T-9-5-30.txt");
        assert_eq!(session.snapshot_file_name(), session.snapshot_file_name());
    }

    #[test]
    fn test_elapsed() {
        let session = Session::new(TEST_START_DATE);
        assert_eq!(
            session.elapsed(TEST_START_DATE + Duration::minutes(90)),
            Duration::minutes(90)
        );
        assert_eq!(
            session.elapsed(TEST_START_DATE - Duration::minutes(1)),
            Duration::zero()
        );
    }
}
