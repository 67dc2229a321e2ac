//! Tracing setup

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

fn env_filter() -> EnvFilter {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        from_env
    } else if cfg!(debug_assertions) {
        EnvFilter::new("info,market_client=debug,market_admin=debug")
    } else {
        EnvFilter::new("warn")
    }
}

/// Console logging on stderr, plus a daily file under `log_dir` if given
///
/// Stdout is left to command output. The returned guard flushes the file
/// writer and must live until exit.
pub fn init(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let console_layer = fmt::layer()
        .with_timer(LocalTimer)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(console_layer)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log directory {}: {}", dir.display(), e))?;
    let file_appender = rolling::daily(dir, "market-admin.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_timer(LocalTimer)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(non_blocking_file);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::debug!(path = %dir.display(), "File logging enabled");
    Ok(Some(guard))
}
