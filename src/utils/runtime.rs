use anyhow::Result;

/// Runtime used by the daemon. Key press handlers are dispatched as separate tasks, so they
/// need worker threads to actually run next to the collector.
pub fn multi_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
