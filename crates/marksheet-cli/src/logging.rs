use tracing_subscriber::EnvFilter;

/// Default filter for the given verbosity flags.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "marksheet=warn,marksheet_parse=warn",
        (false, 0) => "marksheet=info,marksheet_parse=warn",
        (false, 1) => "marksheet=debug,marksheet_parse=debug",
        (false, _) => "marksheet=trace,marksheet_parse=trace",
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the flags.
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_pick_level() {
        assert_eq!(default_directive(0, false), "marksheet=info,marksheet_parse=warn");
        assert_eq!(default_directive(1, false), "marksheet=debug,marksheet_parse=debug");
        assert_eq!(default_directive(3, false), "marksheet=trace,marksheet_parse=trace");
        assert_eq!(default_directive(0, true), "marksheet=warn,marksheet_parse=warn");
    }
}
