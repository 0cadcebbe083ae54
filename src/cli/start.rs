use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;

/// Map the `-v` count (or `MARQUEE_LOG_LEVEL`) to a tracing level.
const fn verbosity_level(verbosity: u8) -> Option<tracing::Level> {
    match verbosity {
        0 => None,
        1 => Some(tracing::Level::WARN),
        2 => Some(tracing::Level::INFO),
        3 => Some(tracing::Level::DEBUG),
        _ => Some(tracing::Level::TRACE),
    }
}

/// Parse arguments, install logging and return the action to run.
///
/// # Errors
///
/// Returns an error if telemetry cannot be initialized or the arguments do
/// not describe a runnable server.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(verbosity_level(
        matches
            .get_one::<u8>(commands::logging::ARG_VERBOSITY)
            .copied()
            .unwrap_or(0),
    ))?;

    dispatch::handler(&matches)
}

#[cfg(test)]
mod tests {
    use super::verbosity_level;
    use tracing::Level;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(verbosity_level(0), None);
        assert_eq!(verbosity_level(1), Some(Level::WARN));
        assert_eq!(verbosity_level(2), Some(Level::INFO));
        assert_eq!(verbosity_level(3), Some(Level::DEBUG));
        assert_eq!(verbosity_level(4), Some(Level::TRACE));
        assert_eq!(verbosity_level(9), Some(Level::TRACE));
    }
}
