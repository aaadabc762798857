use std::{env, path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

pub const CLI_PREFIX: &str = "cli";
pub const DAEMON_PREFIX: &str = "daemon";

/// Overrides the level when no `--log-filter` is given.
pub const LOG_ENV_VAR: &str = "KEYCOUNT_LOG";

// Per press events are logged at trace, so a day of typing at the default level stays small.
const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;
const MAX_LOG_FILES: usize = 5;

/// Filter directive limited to this crate. An explicit level wins over `env_level`.
fn filter_directive(log_level: Option<LevelFilter>, env_level: Option<String>) -> String {
    let level = log_level
        .map(|v| v.to_string())
        .or(env_level.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
}

/// Logs are written into `<app_dir>/logs/<prefix>.<date>`, rotated daily. `show_std` mirrors
/// them to stdout.
pub fn enable_logging(
    prefix: &str,
    app_dir: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .build(app_dir.join("logs"))?;

    let stdout = std::io::stdout.with_filter(move |_| show_std);
    let directive = filter_directive(log_level, env::var(LOG_ENV_VAR).ok());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&directive)?)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .with_writer(stdout.and(appender))
        .compact()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .try_init();
});

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::filter_directive;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(None, None), "keycount=info");
        assert_eq!(filter_directive(None, Some("debug".into())), "keycount=debug");
        assert_eq!(filter_directive(None, Some(" ".into())), "keycount=info");
        assert_eq!(
            filter_directive(Some(LevelFilter::TRACE), Some("debug".into())),
            "keycount=trace"
        );
    }
}
