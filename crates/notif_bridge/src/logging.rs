use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Later calls, or a host that already
/// installed one, leave the existing subscriber in place.
///
/// An unparsable `filter` falls back to `info`; the parse error is handed back
/// so the caller can log it once a subscriber exists.
pub fn init(filter: &str) -> Result<(), ParseError> {
    let (env_filter, outcome) = match EnvFilter::try_new(filter) {
        Ok(env_filter) => (env_filter, Ok(())),
        Err(err) => (EnvFilter::new("info"), Err(err)),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init();
    outcome
}
