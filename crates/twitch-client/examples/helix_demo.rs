//! Helix API Demo
//!
//! Resolves credentials from the environment (or a dotenv file), then calls
//! a Helix endpoint with an automatically validated and refreshed token.
//!
//! # Usage
//!
//! ```bash
//! # Credentials from ~/.twitch-secrets/.env or TWITCH_* variables
//! cargo run --example helix_demo
//!
//! # Look up specific users
//! cargo run --example helix_demo -- --endpoint users --param login=twitchdev --param login=twitch
//!
//! # Use an app token and a different env file
//! cargo run --example helix_demo -- --app --endpoint streams --env-file ./bot.env
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde_json::{Map, Value};

use twitch_client::{EnvCredentialSource, HelixClient, TokenManager, TokenState};

#[derive(Parser, Debug)]
#[command(author, version, about = "Twitch Helix API Demo")]
struct Args {
    /// Helix endpoint to call, relative to the base URL
    #[arg(long, default_value = "users")]
    endpoint: String,

    /// Query parameter as key=value; repeat a key to send several values
    #[arg(long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Dotenv file with TWITCH_* credentials (or set `TWITCH_ENV_FILE`)
    #[arg(long, env = "TWITCH_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Helix base URL
    #[arg(long, default_value = twitch_client::helix::HELIX_BASE_URL)]
    base_url: String,

    /// Authorize with an app token instead of the user token
    #[arg(long)]
    app: bool,
}

fn parse_params(raw: &[String]) -> Result<Value> {
    let mut params = Map::new();
    for pair in raw {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Parameter '{pair}' is not KEY=VALUE"))?;

        match params.get_mut(key) {
            Some(Value::Array(values)) => values.push(Value::from(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::from(value)]);
            }
            None => {
                params.insert(key.to_string(), Value::from(value));
            }
        }
    }

    Ok(Value::Object(params))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let params = parse_params(&args.params)?;

    let source = match args.env_file {
        Some(path) => EnvCredentialSource::new().with_env_file(path),
        None => EnvCredentialSource::new(),
    };

    let manager = TokenManager::from_source(&source)?.with_refresh_observer(
        |state: &TokenState| -> anyhow::Result<()> {
            info!(
                "Token refreshed, valid for {}s; store the new refresh token to keep it",
                state.seconds_until_expiry().unwrap_or_default()
            );
            Ok(())
        },
    );
    let client = HelixClient::with_token_manager(manager).with_base_url(args.base_url);

    info!("Calling {} as client {}", args.endpoint, client.client_id());

    let result = if args.app {
        client.get_app(&args.endpoint, &params).await
    } else {
        client.get(&args.endpoint, &params).await
    };
    client.close().await;

    match result {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) if e.is_rate_limit_error() => {
            eprintln!("Rate limited; bucket resets at {:?}", e.retry_after());
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
