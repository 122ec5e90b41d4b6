//! Host advanced settings CLI
//!
//! Reads, updates and imports advanced settings on virtualization hosts
//! through the management gateway's HTTP API.
//!
//! Usage:
//!   hostsettings --config hostsettings.toml get host-42 Syslog.global.logHost
//!   hostsettings set host-42 Misc.choice high
//!   hostsettings import host-42:Misc.choice
//!   hostsettings list host-42 --writable

mod config;

use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::CliConfig;
use hostsettings_sync::{
    apply_update, fetch, list_supported, resolve_identity, FetchedSetting, HttpSettingsClient,
    Session,
};
use hostsettings_types::HostId;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hostsettings")]
#[command(about = "Read and update advanced settings on virtualization hosts")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Management gateway base URL (overrides the config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Session token (overrides the config file)
    #[arg(long, env = "HOSTSETTINGS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Operation deadline in seconds (overrides the config file)
    #[arg(long)]
    timeout: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a setting's value and type
    Get { host_id: String, name: String },
    /// Validate and apply a new value
    Set {
        host_id: String,
        name: String,
        value: String,
    },
    /// Re-attach to a setting by its identity string
    Import { identity: String },
    /// List the host's supported settings
    List {
        host_id: String,
        /// Only show settings that accept updates
        #[arg(long)]
        writable: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut config = CliConfig::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url.clone() {
        config.api.base_url = base_url;
    }
    if let Some(token) = args.token.clone() {
        config.api.session_token = token;
    }
    if let Some(timeout) = args.timeout {
        config.operation_timeout_secs = timeout;
    }
    debug!("Using gateway {}", config.api.base_url);

    let client = HttpSettingsClient::new(config.api.clone()).context("building HTTP client")?;
    let session = Session::from_backend(Arc::new(client));
    let deadline = config.deadline_from(Instant::now())?;

    run(&session, &args, deadline).await
}

async fn run(session: &Session, args: &Args, deadline: Instant) -> Result<()> {
    match &args.command {
        Command::Get { host_id, name } => {
            let fetched = fetch(session, &HostId::new(host_id.as_str()), name, deadline)
                .await
                .with_context(|| format!("reading {name} on {host_id}"))?;
            print_setting(&fetched, args.json)
        }
        Command::Set {
            host_id,
            name,
            value,
        } => {
            let host = HostId::new(host_id.as_str());
            let applied = apply_update(session, &host, name, value, deadline)
                .await
                .with_context(|| format!("updating {name} on {host_id}"))?;
            if args.json {
                return print_json(&applied);
            }
            if applied.changed {
                println!(
                    "{}: {:?} -> {:?}",
                    applied.identity, applied.previous_value, applied.confirmed_value
                );
            } else {
                println!("{}: already {:?}", applied.identity, applied.confirmed_value);
            }
            Ok(())
        }
        Command::Import { identity } => {
            let fetched = resolve_identity(session, identity, deadline)
                .await
                .with_context(|| format!("importing {identity}"))?;
            print_setting(&fetched, args.json)
        }
        Command::List { host_id, writable } => {
            let descriptors =
                list_supported(session, &HostId::new(host_id.as_str()), *writable, deadline)
                    .await
                    .with_context(|| format!("listing settings on {host_id}"))?;
            if args.json {
                return print_json(&descriptors);
            }
            for d in descriptors {
                let flag = if d.read_only { " (read-only)" } else { "" };
                println!("{}\t{}{}", d.key, d.value_type, flag);
            }
            Ok(())
        }
    }
}

fn print_setting(setting: &FetchedSetting, json: bool) -> Result<()> {
    if json {
        return print_json(setting);
    }
    println!("identity:  {}", setting.identity);
    println!("value:     {}", setting.value);
    println!("type:      {}", setting.value_type);
    println!("read-only: {}", setting.read_only);
    if !setting.choices.is_empty() {
        println!("choices:   {}", setting.choices.join(", "));
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
