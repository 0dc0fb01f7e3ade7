pub mod demo;
pub mod logging;

use crate::auth::validation::DEFAULT_EMAIL_DOMAIN;
use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("aikta")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("email-domain")
                .long("email-domain")
                .help("Email suffix accepted by the sign-up form")
                .default_value(DEFAULT_EMAIL_DOMAIN)
                .env("AIKTA_EMAIL_DOMAIN"),
        )
        .arg(
            Arg::new("reply-delay")
                .long("reply-delay")
                .help("Milliseconds before the assistant replies")
                .default_value("1500")
                .env("AIKTA_REPLY_DELAY")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("splash")
                .long("splash")
                .help("Minimum milliseconds the splash stays up after startup")
                .default_value("2000")
                .env("AIKTA_SPLASH")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("resolve-timeout")
                .long("resolve-timeout")
                .help("Milliseconds to wait for the identity provider before assuming signed out (0 waits forever)")
                .default_value("0")
                .env("AIKTA_RESOLVE_TIMEOUT")
                .value_parser(clap::value_parser!(u64)),
        );

    let command = demo::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chat, splash};
    use std::time::Duration;

    const ENV_VARS: [&str; 9] = [
        "AIKTA_EMAIL_DOMAIN",
        "AIKTA_REPLY_DELAY",
        "AIKTA_SPLASH",
        "AIKTA_RESOLVE_TIMEOUT",
        "AIKTA_DEMO_EMAIL",
        "AIKTA_DEMO_PASSWORD",
        "AIKTA_RESTORE",
        "AIKTA_LOG_LEVEL",
        "AIKTA_LOG_JSON",
    ];

    // Runs `f` with every AIKTA_* variable unset except `overrides`.
    fn with_env<F: FnOnce()>(overrides: &[(&str, &str)], f: F) {
        let vars: Vec<(&str, Option<&str>)> = ENV_VARS
            .iter()
            .map(|key| {
                let value = overrides
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, value)| *value);
                (*key, value)
            })
            .collect();
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "aikta");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        with_env(&[], || {
            let matches = new().get_matches_from(vec!["aikta"]);
            assert_eq!(
                matches.get_one::<String>("email-domain").map(String::as_str),
                Some("@nitsri.ac.in")
            );
            assert_eq!(matches.get_one::<u64>("reply-delay").copied(), Some(1500));
            assert_eq!(matches.get_one::<u64>("splash").copied(), Some(2000));
            assert_eq!(matches.get_one::<u64>("resolve-timeout").copied(), Some(0));
            assert!(!matches.get_flag(demo::ARG_RESTORE));
            assert!(!matches.get_flag(logging::ARG_LOG_JSON));
        });
    }

    #[test]
    fn test_defaults_match_runtime_constants() {
        with_env(&[], || {
            let matches = new().get_matches_from(vec!["aikta"]);
            assert_eq!(
                matches
                    .get_one::<u64>("splash")
                    .copied()
                    .map(Duration::from_millis),
                Some(splash::DEFAULT_SPLASH)
            );
            assert_eq!(
                matches
                    .get_one::<u64>("reply-delay")
                    .copied()
                    .map(Duration::from_millis),
                Some(chat::DEFAULT_REPLY_DELAY)
            );
        });
    }

    #[test]
    fn test_check_env() {
        with_env(
            &[
                ("AIKTA_EMAIL_DOMAIN", "@example.edu"),
                ("AIKTA_REPLY_DELAY", "10"),
                ("AIKTA_RESOLVE_TIMEOUT", "3000"),
                ("AIKTA_DEMO_EMAIL", "demo@example.edu"),
                ("AIKTA_DEMO_PASSWORD", "secret1"),
                ("AIKTA_RESTORE", "true"),
                ("AIKTA_LOG_LEVEL", "info"),
                ("AIKTA_LOG_JSON", "true"),
            ],
            || {
                let matches = new().get_matches_from(vec!["aikta"]);
                assert_eq!(
                    matches.get_one::<String>("email-domain").map(String::as_str),
                    Some("@example.edu")
                );
                assert_eq!(matches.get_one::<u64>("reply-delay").copied(), Some(10));
                assert_eq!(
                    matches.get_one::<u64>("resolve-timeout").copied(),
                    Some(3000)
                );
                assert_eq!(
                    matches
                        .get_one::<String>(demo::ARG_DEMO_EMAIL)
                        .map(String::as_str),
                    Some("demo@example.edu")
                );
                assert!(matches.get_flag(demo::ARG_RESTORE));
                assert!(matches.get_flag(logging::ARG_LOG_JSON));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_demo_email_requires_password() {
        with_env(&[], || {
            let result = new().try_get_matches_from(vec![
                "aikta",
                "--demo-email",
                "demo@nitsri.ac.in",
            ]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_log_level_verbosity() {
        with_env(&[], || {
            for index in 0..5_u8 {
                let mut args = vec!["aikta".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(usize::from(index))));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(index)
                );
            }
        });
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, level) in levels.iter().enumerate() {
            with_env(&[("AIKTA_LOG_LEVEL", *level)], || {
                let matches = new().get_matches_from(vec!["aikta"]);
                assert_eq!(
                    matches
                        .get_one::<u8>(logging::ARG_VERBOSITY)
                        .map(|v| usize::from(*v)),
                    Some(index)
                );
            });
        }
    }
}
