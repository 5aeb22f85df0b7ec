use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `--verbose` means `debug` and the
/// configured level applies. `--quiet` installs nothing.
pub fn setup_logging(verbose: bool, quiet: bool, configured_level: &str) {
    if quiet {
        return;
    }

    let level = if verbose { "debug" } else { configured_level };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
