use crate::cli::{
    actions::Action,
    commands::{
        self,
        logging::{ARG_LOG_JSON, ARG_VERBOSITY},
    },
    dispatch::handler,
    telemetry,
};
use anyhow::Result;

/// Start the CLI
/// # Errors
/// Returns an error if logging cannot be initialized or arguments are inconsistent.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity = matches.get_one::<u8>(ARG_VERBOSITY).map_or(0, |&v| v);
    telemetry::init(
        Some(telemetry::level_from_verbosity(verbosity)),
        matches.get_flag(ARG_LOG_JSON),
    )?;

    let action = handler(&matches)?;

    Ok(action)
}
