// Logging for the CLI, powered by tracing-subscriber.
//
// condo-link logs through the `log` facade; a `tracing_log::LogTracer`
// bridge routes those records into the subscriber. Output goes to stderr so
// it never mixes with table or JSON output on stdout.

use tracing_subscriber::EnvFilter;

/// Filter directives for the given verbosity. `RUST_LOG` wins when set.
fn build_env_filter(verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = if verbose { "debug" } else { "warn" };
    let mut directives = vec![level.to_string()];

    // Suppress noisy third-party crates
    let noisy: &[(&str, &str)] = &[
        ("hyper", "warn"),
        ("hyper_util", "warn"),
        ("reqwest", "warn"),
        ("rustls", "warn"),
        ("h2", "warn"),
    ];
    for (target, lvl) in noisy {
        directives.push(format!("{}={}", target, lvl));
    }

    EnvFilter::new(directives.join(","))
}

/// Initialize console logging.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .try_init();

    // Bridge `log` crate → tracing (ok() in case already initialized)
    tracing_log::LogTracer::init().ok();

    tracing::trace!("Logging initialized: verbose={}, first={}", verbose, installed.is_ok());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(false);
        init_logging(true);
        log::warn!("[TEST] routed through the bridge");
    }
}
