use std::env;

use tracing_subscriber::EnvFilter;

/// Log to stderr so records never interleave with the prompt on stdout.
/// `CLO_LOG` takes precedence over `--verbose`.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = env::var("CLO_LOG").unwrap_or_else(|_| default.to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
