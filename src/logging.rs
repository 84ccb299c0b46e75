use tracing::Level;
use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Initialize logging with configurable settings
///
/// `RUST_LOG` wins over `level` when set. Calling this more than once is a
/// no-op after the first subscriber is installed.
pub fn init_logging(level: Level, json_output: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("schema_tuner={},warn", level)));

    if json_output {
        let fmt_layer = fmt::layer()
            .json()
            .with_timer(SystemTime)
            .with_target(true)
            .with_thread_names(true)
            .with_writer(std::io::stderr);

        let _ = Registry::default().with(env_filter).with(fmt_layer).try_init();
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(SystemTime)
            .with_target(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr);

        let _ = Registry::default().with(env_filter).with(fmt_layer).try_init();
    }
}

/// Per-table progress event
#[macro_export]
macro_rules! log_table_phase {
    ($table:expr, $phase:expr) => {
        tracing::debug!(table = %$table, phase = ?$phase, "Table phase")
    };
}
