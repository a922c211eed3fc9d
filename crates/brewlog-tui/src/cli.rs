//! Non-interactive commands: `brewlog login`, `brewlog logout`, `brewlog status`.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};

use brewlog_core::config::{ENV_EMAIL, ENV_PASSWORD};
use brewlog_core::{Config, SessionError, SessionState, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the terminal UI
    Tui,
    Login,
    Logout,
    Status,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    /// Keep the token in memory only
    pub ephemeral: bool,
}

pub const USAGE: &str = "\
Usage: brewlog [--ephemeral] [COMMAND]

Commands:
  login     Log in and store the access token
  logout    Forget the stored access token
  status    Show whether a token is stored

Without a command the terminal UI starts.

Options:
  --ephemeral   Do not persist the access token
  -h, --help    Show this help";

/// Parse command line arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut command = None;
    let mut ephemeral = false;

    for arg in args {
        let next = match arg.as_str() {
            "--ephemeral" => {
                ephemeral = true;
                continue;
            }
            "-h" | "--help" | "help" => Command::Help,
            "login" => Command::Login,
            "logout" => Command::Logout,
            "status" => Command::Status,
            other => bail!("Unknown argument: {}\n\n{}", other, USAGE),
        };
        if command.replace(next).is_some() {
            bail!("Only one command may be given\n\n{}", USAGE);
        }
    }

    Ok(Args {
        command: command.unwrap_or(Command::Tui),
        ephemeral,
    })
}

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    match (input.is_empty(), default) {
        (true, Some(d)) => Ok(d.to_string()),
        _ => Ok(input.to_string()),
    }
}

/// Interactive login from the terminal
pub async fn login(session: &SessionStore, config: &mut Config) -> Result<()> {
    session.restore().await;

    let default_email = std::env::var(ENV_EMAIL).ok().or_else(|| config.last_email.clone());
    let email = prompt("Email", default_email.as_deref())?;
    let password = match std::env::var(ENV_PASSWORD) {
        Ok(p) if !p.is_empty() => p,
        _ => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    if email.is_empty() || password.is_empty() {
        bail!("Please fill in all fields");
    }

    println!("Logging in to {}...", config.api_url);
    match session.login(&email, &password).await {
        Ok(()) => {}
        Err(SessionError::Authentication(detail)) => bail!("{}", detail),
        Err(e) => return Err(e).context("Login failed"),
    }

    config.last_email = Some(email);
    config.save().context("Failed to save config")?;

    println!("Login successful");
    Ok(())
}

pub async fn logout(session: &SessionStore) -> Result<()> {
    session.restore().await;
    session.logout().await.context("Logout failed")?;
    println!("Logged out");
    Ok(())
}

pub async fn status(session: &SessionStore, config: &Config) -> Result<()> {
    match session.restore().await {
        SessionState::Authenticated(_) => {
            let who = config.last_email.as_deref().unwrap_or("unknown user");
            println!("Logged in as {} ({})", who, config.api_url);
        }
        _ => println!("Not logged in ({})", config.api_url),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_args_starts_tui() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.command, Command::Tui);
        assert!(!parsed.ephemeral);
    }

    #[test]
    fn test_commands() {
        assert_eq!(args(&["login"]).unwrap().command, Command::Login);
        assert_eq!(args(&["logout"]).unwrap().command, Command::Logout);
        assert_eq!(args(&["status"]).unwrap().command, Command::Status);
        assert_eq!(args(&["--help"]).unwrap().command, Command::Help);
    }

    #[test]
    fn test_ephemeral_flag_anywhere() {
        let parsed = args(&["status", "--ephemeral"]).unwrap();
        assert_eq!(parsed.command, Command::Status);
        assert!(parsed.ephemeral);
        assert!(args(&["--ephemeral"]).unwrap().ephemeral);
    }

    #[test]
    fn test_rejects_unknown_and_duplicate() {
        assert!(args(&["brew"]).is_err());
        assert!(args(&["login", "logout"]).is_err());
    }
}
