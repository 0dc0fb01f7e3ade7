use crate::{
    auth::MemoryProvider,
    shell::{Command, CommandError, Outcome, Shell, ShellOptions},
    splash,
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub email_domain: String,
    pub reply_delay: Duration,
    pub splash: Duration,
    pub resolve_timeout: Option<Duration>,
    pub demo_email: Option<String>,
    pub demo_password: Option<SecretString>,
    pub restore: bool,
}

/// Execute the shell action: start the app core and read commands from stdin
/// until `quit` or end of input.
/// # Errors
/// Returns an error if the demo account is invalid or stdin cannot be read.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let provider = Arc::new(MemoryProvider::new());
    let restore = seed_demo_account(&provider, &args)?;

    let mut shell = Shell::start(
        provider.clone(),
        ShellOptions {
            email_domain: args.email_domain.clone(),
            reply_delay: args.reply_delay,
            resolve_timeout: args.resolve_timeout,
        },
    );

    println!("{}", splash::TITLE);
    let restored = splash::hold(
        async { provider.complete_initial_check(restore.as_deref()) },
        args.splash,
    )
    .await;
    if let Some(identity) = &restored {
        info!("restored session for {}", identity.email);
    }

    shell.settle(Some(restored.is_some())).await;
    let route = shell.navigation().current();
    println!("at {} ({}), type `help` for commands", route.path(), route.title());

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match shell.execute(command).await {
            Outcome::Continue(output) => {
                for line in output {
                    println!("{line}");
                }
            }
            Outcome::Quit => break,
        }
    }

    shell.shutdown().await;
    debug!("shell finished");

    Ok(())
}

fn seed_demo_account(provider: &MemoryProvider, args: &Args) -> Result<Option<String>> {
    let (Some(email), Some(password)) = (&args.demo_email, &args.demo_password) else {
        return Ok(None);
    };

    let identity = provider
        .add_account("Demo", email, password.expose_secret())
        .with_context(|| format!("invalid demo account {email}"))?;
    debug!("seeded demo account {}", identity.email);

    Ok(args.restore.then_some(identity.email))
}

fn log_startup_args(args: &Args) {
    debug!(
        email_domain = %args.email_domain,
        reply_delay = ?args.reply_delay,
        splash = ?args.splash,
        resolve_timeout = ?args.resolve_timeout,
        demo = args.demo_email.is_some(),
        restore = args.restore,
        "startup arguments"
    );
}
