use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a `tracing` filter, e.g. `gnome_window_calls=debug`.
pub const LOG_ENV: &str = "GNOME_WINDOW_CALLS_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "gnome_window_calls=debug"
    } else {
        "gnome_window_calls=info"
    }
}

pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}
