use clap::{Arg, ArgAction, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept a level name or its index so `MARQUEE_LOG_LEVEL=debug` and
/// `MARQUEE_LOG_LEVEL=3` mean the same thing.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> Result<u8, String> {
        let level = level.trim().to_lowercase();
        if let Ok(index) = level.parse::<u8>() {
            return if usize::from(index) < LEVELS.len() {
                Ok(index)
            } else {
                Err(format!("log level index must be below {}", LEVELS.len()))
            };
        }
        LEVELS
            .iter()
            .position(|name| *name == level)
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| format!("invalid log level, expected one of {}", LEVELS.join(", ")))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("MARQUEE_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
