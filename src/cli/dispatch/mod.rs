use crate::cli::{
    actions::{shell::Args, Action},
    commands::demo::{ARG_DEMO_EMAIL, ARG_DEMO_PASSWORD, ARG_RESTORE},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let email_domain = matches
        .get_one::<String>("email-domain")
        .cloned()
        .context("missing required argument: --email-domain")?;

    let millis = |name: &str| matches.get_one::<u64>(name).copied().unwrap_or_default();

    let demo_email = matches.get_one::<String>(ARG_DEMO_EMAIL).cloned();
    let demo_password = match &demo_email {
        Some(_) => Some(
            matches
                .get_one::<String>(ARG_DEMO_PASSWORD)
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --demo-password")?,
        ),
        None => None,
    };

    let resolve_timeout = match millis("resolve-timeout") {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };

    Ok(Action::Shell(Args {
        email_domain,
        reply_delay: Duration::from_millis(millis("reply-delay")),
        splash: Duration::from_millis(millis("splash")),
        resolve_timeout,
        demo_email,
        demo_password,
        restore: matches.get_flag(ARG_RESTORE),
    }))
}
