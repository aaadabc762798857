use std::fmt::Write;

use chrono::{Datelike, Month, NaiveDateTime, Timelike};

use crate::daemon::counting::{session::Session, store::CounterSnapshot};

/// Renders the plain text report stored in the snapshot file.
///
/// ```text
/// Total key presses: 4
/// Ran for 12 minutes (0hr) - Started: 2018-JULY-4 9:05
///
/// 'a' - 3
/// 'b' - 1
/// ```
///
/// The output only depends on the arguments, so rendering the same snapshot at the same moment
/// always produces the same text.
pub fn render(snapshot: &CounterSnapshot, session: &Session, now: NaiveDateTime) -> String {
    let mut report = String::new();
    // Writing into a String can't fail.
    let _ = write_report(&mut report, snapshot, session, now);
    report
}

fn write_report(
    out: &mut impl Write,
    snapshot: &CounterSnapshot,
    session: &Session,
    now: NaiveDateTime,
) -> std::fmt::Result {
    writeln!(out, "Total key presses: {}", snapshot.total())?;

    let elapsed = session.elapsed(now);
    writeln!(
        out,
        "Ran for {} minutes ({}hr) - Started: {}",
        elapsed.num_minutes(),
        elapsed.num_hours(),
        format_start(session.start())
    )?;
    writeln!(out)?;

    for (key, count) in snapshot.ranked() {
        writeln!(out, "'{key}' - {count}")?;
    }
    Ok(())
}

/// `2024-JANUARY-4 9:05`. Only the minute is padded.
fn format_start(start: NaiveDateTime) -> String {
    let month = u8::try_from(start.month())
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .map(|month| month.name().to_uppercase())
        .unwrap_or_else(|| start.month().to_string());

    format!(
        "{}-{}-{} {}:{:02}",
        start.year(),
        month,
        start.day(),
        start.hour(),
        start.minute()
    )
}
