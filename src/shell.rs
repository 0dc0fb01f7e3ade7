//! Headless app shell. It wires the auth service, navigation, session guard
//! and chat together and interprets line commands against them.

use crate::{
    auth::{
        validation::{validate_sign_up, FormErrors, DEFAULT_EMAIL_DOMAIN, LOGIN_FAILED},
        AuthService, IdentityProvider, Session, SignUpRequest,
    },
    chat::{ChatSession, DEFAULT_REPLY_DELAY},
    router::{reconcile, Decision, Navigation, Navigator, Route, SessionGuard, DRAWER},
};
use secrecy::SecretString;
use serde_json::json;
use std::{str::FromStr, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{task::JoinHandle, time::timeout};
use tracing::{debug, info, warn};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

pub const HELP: &str = "\
commands:
  login <email> <password>
  signup <name> <email> <password>
  logout
  go <path>
  back
  say <text>
  where
  drawer
  help
  quit";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    SignUp { name: String, email: String, password: String },
    Logout,
    Go(Route),
    Back,
    Say(String),
    Where,
    Drawer,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        match verb.to_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "login" => match args.as_slice() {
                [email, password] => Ok(Self::Login {
                    email: (*email).to_string(),
                    password: (*password).to_string(),
                }),
                _ => Err(CommandError::Usage("login <email> <password>")),
            },
            // Names may contain spaces: the last two words are email and password.
            "signup" => match args.as_slice() {
                [name @ .., email, password] if !name.is_empty() => Ok(Self::SignUp {
                    name: name.join(" "),
                    email: (*email).to_string(),
                    password: (*password).to_string(),
                }),
                _ => Err(CommandError::Usage("signup <name> <email> <password>")),
            },
            "logout" => Ok(Self::Logout),
            "go" => match args.as_slice() {
                [path] => Ok(Self::Go(Route::from_path(path))),
                _ => Err(CommandError::Usage("go <path>")),
            },
            "back" => Ok(Self::Back),
            "say" if !rest.is_empty() => Ok(Self::Say(rest.to_string())),
            "say" => Err(CommandError::Usage("say <text>")),
            "where" => Ok(Self::Where),
            "drawer" => Ok(Self::Drawer),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue(Vec<String>),
    Quit,
}

#[derive(Clone, Debug)]
pub struct ShellOptions {
    pub email_domain: String,
    pub reply_delay: Duration,
    pub resolve_timeout: Option<Duration>,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            reply_delay: DEFAULT_REPLY_DELAY,
            resolve_timeout: None,
        }
    }
}

pub struct Shell<P: IdentityProvider> {
    auth: AuthService<P>,
    navigation: Arc<Navigation>,
    chat: ChatSession,
    guard: Option<JoinHandle<usize>>,
    options: ShellOptions,
}

impl<P: IdentityProvider> Shell<P> {
    /// Subscribes to the provider and starts the session guard on the login
    /// screen. Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(provider: Arc<P>, options: ShellOptions) -> Self {
        let navigation = Arc::new(Navigation::new(Route::Login));
        let auth = AuthService::start(provider);
        let guard = SessionGuard::new()
            .with_resolve_timeout(options.resolve_timeout)
            .run(auth.subscribe(), navigation.clone());

        Self {
            chat: ChatSession::new(options.reply_delay),
            guard: Some(tokio::spawn(guard)),
            auth,
            navigation,
            options,
        }
    }

    #[must_use]
    pub fn navigation(&self) -> &Arc<Navigation> {
        &self.navigation
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.auth.session()
    }

    #[must_use]
    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Waits until the session reports `authenticated` (when given) and the
    /// guard has brought the visible region in line with it. Returns `false`
    /// if that did not happen within the settle timeout.
    pub async fn settle(&self, authenticated: Option<bool>) -> bool {
        let mut session_rx = self.auth.subscribe();
        let navigation = self.navigation.clone();

        let wait = async move {
            let session = match authenticated {
                Some(expected) => session_rx
                    .wait_for(|s| s.resolved && s.is_authenticated() == expected)
                    .await
                    .map(|session| Session::clone(&session)),
                None => Ok(session_rx.borrow().clone()),
            };

            let Ok(session) = session else {
                return false;
            };

            let mut location_rx = navigation.watch_location();
            let settled = location_rx
                .wait_for(|location| reconcile(&session, *location) == Decision::NoOp)
                .await
                .is_ok();
            settled
        };

        if let Ok(settled) = timeout(SETTLE_TIMEOUT, wait).await {
            settled
        } else {
            warn!("navigation did not settle within {:?}", SETTLE_TIMEOUT);
            false
        }
    }

    pub async fn execute(&mut self, command: Command) -> Outcome {
        debug!("execute {:?}", command_name(&command));

        let lines = match command {
            Command::Login { email, password } => self.login(&email, password).await,
            Command::SignUp {
                name,
                email,
                password,
            } => self.sign_up(name, email, password).await,
            Command::Logout => self.logout().await,
            Command::Go(route) => {
                self.navigation.push(route);
                self.settle(None).await;
                vec![self.describe_route()]
            }
            Command::Back => {
                if !self.navigation.back() {
                    return Outcome::Continue(vec!["already at the first screen".to_string()]);
                }
                self.settle(None).await;
                vec![self.describe_route()]
            }
            Command::Say(text) => self.say(&text).await,
            Command::Where => vec![self.where_json()],
            Command::Drawer => self.drawer(),
            Command::Help => vec![HELP.to_string()],
            Command::Quit => return Outcome::Quit,
        };

        Outcome::Continue(lines)
    }

    async fn login(&mut self, email: &str, password: String) -> Vec<String> {
        let password = SecretString::from(password);
        match self.auth.sign_in(email, &password).await {
            Ok(identity) => {
                self.settle(Some(true)).await;
                vec![
                    format!("signed in as {}", identity.email),
                    self.describe_route(),
                ]
            }
            Err(_) => vec![LOGIN_FAILED.to_string()],
        }
    }

    async fn sign_up(&mut self, name: String, email: String, password: String) -> Vec<String> {
        let errors = validate_sign_up(&name, &email, &password, &self.options.email_domain);
        if !errors.is_empty() {
            return vec![form_errors_json(&errors)];
        }

        let request = SignUpRequest {
            name,
            email: email.trim().to_string(),
            password: SecretString::from(password),
        };

        match self.auth.sign_up(&request).await {
            Ok(_) => {
                if self.settle(Some(true)).await {
                    self.navigation.replace(Route::About);
                }
                vec![
                    format!(
                        "Welcome {}! Please check your email to verify your account.",
                        request.name
                    ),
                    self.describe_route(),
                ]
            }
            Err(e) => vec![form_errors_json(&FormErrors::from_sign_up_error(&e))],
        }
    }

    async fn logout(&mut self) -> Vec<String> {
        match self.auth.sign_out().await {
            Ok(()) => {
                self.settle(Some(false)).await;
                vec!["signed out".to_string(), self.describe_route()]
            }
            Err(e) => vec![format!("sign out failed: {e}")],
        }
    }

    async fn say(&mut self, text: &str) -> Vec<String> {
        if !matches!(self.navigation.current(), Route::Home | Route::Index) {
            return vec!["chat is only available on the home screen".to_string()];
        }

        let Some(message) = self.chat.send(text) else {
            return Vec::new();
        };

        let mut lines = vec![format!("you: {}", message.text)];
        if let Some(reply) = self.chat.next_reply().await {
            lines.push(format!("ai: {}", reply.text));
        }
        lines
    }

    fn drawer(&self) -> Vec<String> {
        let current = self.navigation.current();
        let mut lines: Vec<String> = DRAWER
            .iter()
            .map(|route| {
                let marker = if *route == current { '*' } else { ' ' };
                format!("{marker} {:<14} {}", route.title(), route.path())
            })
            .collect();

        let user = self.session().identity.map_or_else(
            || "Guest".to_string(),
            |identity| identity.display_name.unwrap_or(identity.email),
        );
        lines.push(format!("  user: {user}"));
        lines
    }

    fn describe_route(&self) -> String {
        let route = self.navigation.current();
        format!("at {} ({})", route.path(), route.title())
    }

    fn where_json(&self) -> String {
        let route = self.navigation.current();
        json!({
            "route": route,
            "path": route.path(),
            "location": route.location().to_string(),
            "history": self.navigation.history(),
            "session": self.session(),
            "messages": self.chat.messages().len(),
            "aura": self.chat.aura(),
        })
        .to_string()
    }

    /// Stops the auth service and waits for the guard to finish.
    pub async fn shutdown(mut self) {
        let guard = self.guard.take();
        self.auth.shutdown().await;

        if let Some(guard) = guard {
            match guard.await {
                Ok(redirects) => info!("session guard issued {} redirect(s)", redirects),
                Err(e) => warn!("session guard task failed: {}", e),
            }
        }
    }
}

fn form_errors_json(errors: &FormErrors) -> String {
    serde_json::to_string(errors).unwrap_or_else(|_| "invalid form".to_string())
}

// Keeps credentials out of the debug log.
fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Login { .. } => "login",
        Command::SignUp { .. } => "signup",
        Command::Logout => "logout",
        Command::Go(_) => "go",
        Command::Back => "back",
        Command::Say(_) => "say",
        Command::Where => "where",
        Command::Drawer => "drawer",
        Command::Help => "help",
        Command::Quit => "quit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            "login ana@nitsri.ac.in secret1".parse::<Command>(),
            Ok(Command::Login {
                email: "ana@nitsri.ac.in".to_string(),
                password: "secret1".to_string(),
            })
        );
        assert_eq!(
            "signup Ana Maria ana@nitsri.ac.in secret1".parse::<Command>(),
            Ok(Command::SignUp {
                name: "Ana Maria".to_string(),
                email: "ana@nitsri.ac.in".to_string(),
                password: "secret1".to_string(),
            })
        );
        assert_eq!("go /login".parse::<Command>(), Ok(Command::Go(Route::Login)));
        assert_eq!(
            "say  hello world ".parse::<Command>(),
            Ok(Command::Say("hello world".to_string()))
        );
        assert_eq!("QUIT".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "login ana@nitsri.ac.in".parse::<Command>(),
            Err(CommandError::Usage("login <email> <password>"))
        );
        assert_eq!(
            "signup ana@nitsri.ac.in secret1".parse::<Command>(),
            Err(CommandError::Usage("signup <name> <email> <password>"))
        );
        assert_eq!("say".parse::<Command>(), Err(CommandError::Usage("say <text>")));
        assert_eq!(
            "dance".parse::<Command>(),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn command_name_hides_arguments() {
        let command = Command::Login {
            email: "ana@nitsri.ac.in".to_string(),
            password: "secret1".to_string(),
        };
        assert_eq!(command_name(&command), "login");
    }
}
