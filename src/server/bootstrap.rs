//! Command-line token minting for the Pokedex server.
//!
//! Routes such as `GET /user` require a bearer token signed with the
//! configured secret. The server binary can mint one without starting the
//! HTTP listener:
//!
//! ```text
//! pokedex_server token create --subject ash --ttl 3600
//! ```
//!
//! The token is printed to stdout and the process exits.

use tracing::info;

use crate::config::AuthConfig;
use crate::errors::PokedexResult;
use crate::server::auth::JwtValidator;

/// CLI command result for token operations.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenCommand {
    /// Mint a token
    Create {
        subject: String,
        ttl_secs: Option<u64>,
    },
    /// No command (run server normally)
    None,
}

/// Parse CLI arguments for token commands.
///
/// # Supported Commands
///
/// ```text
/// pokedex_server token create [--subject <name>] [--ttl <seconds>]
/// ```
pub fn parse_token_command(args: &[String]) -> TokenCommand {
    if args.len() < 3 || args[1] != "token" || args[2] != "create" {
        return TokenCommand::None;
    }

    let mut subject = String::from("admin");
    let mut ttl_secs = None;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--subject" | "-s" => {
                if let Some(value) = args.get(i + 1) {
                    subject = value.clone();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--ttl" | "-t" => {
                if let Some(value) = args.get(i + 1) {
                    ttl_secs = value.parse::<u64>().ok();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    TokenCommand::Create { subject, ttl_secs }
}

/// Mint the token described by `cmd`, if any.
pub fn mint_token(cmd: &TokenCommand, config: &AuthConfig) -> PokedexResult<Option<String>> {
    match cmd {
        TokenCommand::Create { subject, ttl_secs } => {
            let config = AuthConfig {
                token_expiration_secs: ttl_secs.unwrap_or(config.token_expiration_secs),
                ..config.clone()
            };
            let token = JwtValidator::from_config(&config)?.create_token(subject)?;
            info!(
                "Minted token for subject={subject}, valid for {}s",
                config.token_expiration_secs
            );
            Ok(Some(token))
        }
        TokenCommand::None => Ok(None),
    }
}

/// Execute a token command.
///
/// Returns `true` when a command ran and the process should exit.
pub fn execute_token_command(cmd: &TokenCommand, config: &AuthConfig) -> PokedexResult<bool> {
    match mint_token(cmd, config)? {
        Some(token) => {
            println!("{token}");
            Ok(true)
        }
        None => Ok(false),
    }
}
