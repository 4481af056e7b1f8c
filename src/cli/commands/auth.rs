use chrono::Utc;
use clap::Subcommand;
use reqwest::Method;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::config::CliContext;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::session::{Session, TokenStore};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Store an access token obtained from the login page")]
    Login {
        #[arg(long, help = "Access token (read from stdin if not provided)")]
        token: Option<String>,
        #[arg(long, help = "Check the token against the backend before saving")]
        verify: bool,
    },

    #[command(about = "Forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { token, verify } => {
            let token = match token {
                Some(token) => token,
                None => read_token().await?,
            };

            if verify {
                let session = Session::new(token.trim());
                let api = crate::api::ApiClient::with_session(&ctx.config, &session, ctx.store(), ctx.navigator())?;
                // Any authenticated endpoint will do; an invalid token comes back 401
                api.send(Method::GET, "/tags/", None).await?;
            }

            ctx.store.save(&token)?;
            tracing::info!("Saved session to {}", ctx.store.path().display());

            let username = Session::new(token.trim()).claims().and_then(|c| c.username);
            let message = match &username {
                Some(name) => format!("Logged in as {}", name),
                None => "Logged in".to_string(),
            };
            output_success(&output_format, &message, Some(json!({ "username": username })))
        }
        AuthCommands::Logout => {
            ctx.store.clear()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let Some(token) = ctx.store.load()? else {
                return output_success(&output_format, "Not logged in", Some(json!({ "logged_in": false })));
            };

            let claims = Session::new(token).claims();
            let expires_at = claims.as_ref().and_then(|c| c.expires_at());
            let expired = claims.as_ref().map(|c| c.is_expired_at(Utc::now())).unwrap_or(false);

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    if expired { "Token expired" } else { "Logged in" },
                    Some(json!({
                        "logged_in": !expired,
                        "username": claims.as_ref().and_then(|c| c.username.clone()),
                        "user_id": claims.as_ref().and_then(|c| c.user_id.clone()),
                        "expires_at": expires_at.map(|e| e.to_rfc3339()),
                    })),
                ),
                OutputFormat::Text => {
                    if expired {
                        println!("Token expired, log in again");
                    } else {
                        println!("Logged in");
                    }
                    if let Some(name) = claims.as_ref().and_then(|c| c.username.as_deref()) {
                        println!("User: {}", name);
                    }
                    if let Some(exp) = expires_at {
                        println!("Expires: {}", exp.format("%d/%m/%Y, %H:%M:%S"));
                    }
                    if claims.is_none() {
                        println!("Token is opaque; the backend decides whether it is still valid");
                    }
                    Ok(())
                }
            }
        }
    }
}

async fn read_token() -> anyhow::Result<String> {
    eprint!("Token: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let token = line.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("No token given");
    }
    Ok(token)
}
