//! Tests for global tracing setup

#[cfg(test)]
mod tests {
    use voxtile::io::logging::{DEFAULT_FILTER, QUIET_FILTER, init_tracing};

    // Tests the subscriber is only installed once per process
    // Verified by removing the initialisation guard
    #[test]
    fn test_init_tracing_once() {
        init_tracing(QUIET_FILTER);
        assert!(!init_tracing(QUIET_FILTER));
        assert!(!init_tracing(DEFAULT_FILTER));
    }

    // Tests filter directives parse as tracing filters
    // Verified by using a level name tracing does not know
    #[test]
    fn test_filters_parse() {
        for directive in [DEFAULT_FILTER, QUIET_FILTER] {
            assert!(tracing_subscriber::EnvFilter::try_new(directive).is_ok());
        }
    }
}
