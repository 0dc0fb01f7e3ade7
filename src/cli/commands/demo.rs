use clap::{Arg, ArgAction, Command};

pub const ARG_DEMO_EMAIL: &str = "demo-email";
pub const ARG_DEMO_PASSWORD: &str = "demo-password";
pub const ARG_RESTORE: &str = "restore";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DEMO_EMAIL)
                .long(ARG_DEMO_EMAIL)
                .help("Seed a verified account with this email")
                .env("AIKTA_DEMO_EMAIL")
                .requires(ARG_DEMO_PASSWORD),
        )
        .arg(
            Arg::new(ARG_DEMO_PASSWORD)
                .long(ARG_DEMO_PASSWORD)
                .help("Password of the seeded account")
                .env("AIKTA_DEMO_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_RESTORE)
                .long(ARG_RESTORE)
                .help("Restore the seeded account's session at startup")
                .env("AIKTA_RESTORE")
                .action(ArgAction::SetTrue)
                .requires(ARG_DEMO_EMAIL),
        )
}
