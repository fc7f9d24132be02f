//! Operator CLI over `coe_portal_core`.
//!
//! # Responsibility
//! - Probe core linkage and print the role capability table.
//! - Smoke-test the remote action endpoint and the login flow from a config
//!   file.

use clap::{Parser, Subcommand};
use coe_portal_core::auth::token_cache::TokenStorage;
use coe_portal_core::{
    core_version, init_logging, permissions_for, ping, ActionClient, Capability,
    CredentialVerifier, DomainStore, FirebaseIdentityProvider, FixedPairVerifier,
    HttpActionTransport, LoginFlow, MemoryTokenStorage, PortalConfig, Role, SessionTokenCache,
    ShapeCheckVerifier, SqliteTokenStorage, StoreSeed,
};
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "coe_portal")]
#[command(about = "Centers of Excellence portal core utilities", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core ping and version
    Ping,
    /// Print the capability row of a role (GUEST, STUDENT, FACULTY, ADMIN)
    Permissions { role: String },
    /// Call `testConnection` on the configured endpoint
    TestConnection {
        #[arg(long, value_name = "FILE")]
        config: PathBuf,
    },
    /// Sign in and resolve the portal user from a seed file
    Login {
        #[arg(long, value_name = "FILE")]
        config: PathBuf,
        /// JSON document with `users` (and optionally other collections)
        #[arg(long, value_name = "FILE")]
        seed: PathBuf,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Ping => {
            println!("coe_portal_core ping={}", ping());
            println!("coe_portal_core version={}", core_version());
            Ok(())
        }
        Command::Permissions { role } => print_permissions(&role),
        Command::TestConnection { config } => {
            let config = load_config(&config)?;
            test_connection(&config)
        }
        Command::Login {
            config,
            seed,
            email,
            password,
        } => {
            let config = load_config(&config)?;
            let seed = load_seed(&seed)?;
            match &config.token_db_path {
                Some(path) => {
                    let storage = SqliteTokenStorage::open(path).map_err(|err| err.to_string())?;
                    login(storage, &config, seed, &email, &password)
                }
                None => login(MemoryTokenStorage::new(), &config, seed, &email, &password),
            }
        }
    }
}

fn print_permissions(raw_role: &str) -> Result<(), String> {
    let role = Role::parse(&raw_role.trim().to_ascii_uppercase())
        .ok_or_else(|| format!("unknown role `{raw_role}`"))?;
    let row = permissions_for(role);
    for capability in Capability::ALL {
        println!("{}={}", capability.as_str(), row.allows(capability));
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<PortalConfig, String> {
    let mut config = PortalConfig::load(path).map_err(|err| err.to_string())?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config.validate().map_err(|err| err.to_string())?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }
    Ok(config)
}

fn load_seed(path: &Path) -> Result<StoreSeed, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read seed `{}`: {err}", path.display()))?;
    StoreSeed::from_json_str(&text).map_err(|err| format!("invalid seed: {err}"))
}

fn http_client(config: &PortalConfig) -> Result<ActionClient<HttpActionTransport>, String> {
    let transport = HttpActionTransport::new(config.endpoint_url.clone(), config.request_timeout())
        .map_err(|err| err.to_string())?;
    Ok(ActionClient::new(transport))
}

fn test_connection(config: &PortalConfig) -> Result<(), String> {
    info!("event=cli_command module=cli status=start command=test_connection");
    let cached = match &config.token_db_path {
        Some(path) => SessionTokenCache::load(
            SqliteTokenStorage::open(path).map_err(|err| err.to_string())?,
        )
        .map_err(|err| err.to_string())?
        .get(),
        None => None,
    };
    let token = cached
        .or_else(|| config.fallback_token.clone())
        .unwrap_or_default();

    let reply = http_client(config)?
        .test_connection(&token)
        .map_err(|err| format!("Connection failed ({}): {}", err.code(), err.message()))?;
    let rendered = serde_json::to_string_pretty(&reply).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn login<S: TokenStorage>(
    storage: S,
    config: &PortalConfig,
    seed: StoreSeed,
    email: &str,
    password: &str,
) -> Result<(), String> {
    let api_key = config
        .identity
        .api_key
        .clone()
        .ok_or_else(|| "identity.api_key is not configured".to_string())?;
    let provider = FirebaseIdentityProvider::new(
        config.identity.sign_in_url.clone(),
        api_key,
        config.request_timeout(),
    )
    .map_err(|err| err.user_message())?;
    let verifier: Box<dyn CredentialVerifier> = match &config.login_gate {
        Some(gate) => Box::new(FixedPairVerifier::new(&gate.email, &gate.password)),
        None => Box::new(ShapeCheckVerifier),
    };

    let tokens = Arc::new(SessionTokenCache::load(storage).map_err(|err| err.to_string())?);
    let store = DomainStore::new(
        seed,
        http_client(config)?,
        Arc::clone(&tokens),
        config.store_options(),
    );

    let user = LoginFlow::new(verifier, provider)
        .login(email, password, &*tokens, &store)
        .map_err(|err| err.user_message())?;
    println!("Signed in as {} <{}> role={}", user.name, user.email, user.role);
    Ok(())
}
