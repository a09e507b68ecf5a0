//! `securden` — command-line front end for the Securden client core.
//!
//! Reads the server URL and auth token once, builds a single immutable
//! client, runs one command, and prints the result as JSON on stdout.
//! Warnings and errors go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod policy;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use securden_core::config::{AUTH_TOKEN_ENV, SERVER_URL_ENV};
use securden_core::{AccountCriteria, AuthContext, DeleteOptions, SecurdenClient};
use serde::Serialize;
use tracing::info;

use crate::policy::Outcome;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";

// ── CLI structure ────────────────────────────────────────────────────

/// Securden — resolve privileged accounts from a Securden server.
#[derive(Parser)]
#[command(
    name = "securden",
    version,
    about = "Securden CLI — look up accounts, fetch passwords in bulk, delete accounts",
    long_about = None,
    after_help = "Environment variables:\n  \
         SECURDEN_SERVER_URL   Server base URL (e.g. https://securden.example.com:5454)\n  \
         SECURDEN_AUTHTOKEN    API auth token\n  \
         SECURDEN_LOG          Log filter (default: warn)\n\n\
         Examples:\n  \
         securden account --name root --reason \"nightly backup\"\n  \
         securden account-attributes --id 1001\n  \
         securden passwords 1001 1002\n  \
         securden delete-accounts 5 6 --reason decommissioned --permanent"
)]
struct Cli {
    /// Securden server base URL.
    #[arg(long, env = SERVER_URL_ENV, hide_env_values = true)]
    server_url: Option<String>,

    /// API auth token.
    #[arg(long, env = AUTH_TOKEN_ENV, hide_env_values = true)]
    authtoken: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one account with its typed secret attributes.
    Account(CriteriaArgs),
    /// Resolve one account as identity fields plus an attribute map.
    #[command(name = "account-attributes")]
    Attributes(CriteriaArgs),
    /// Fetch passwords for several accounts at once.
    Passwords {
        /// Account ids (decimal).
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete several accounts.
    #[command(name = "delete-accounts")]
    DeleteAccounts {
        /// Account ids to delete.
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Reason recorded with the deletion.
        #[arg(long)]
        reason: Option<String>,
        /// Delete permanently instead of moving to trash.
        #[arg(long, default_value = "false")]
        permanent: bool,
    },
}

#[derive(clap::Args)]
struct CriteriaArgs {
    /// Account id.
    #[arg(long)]
    id: Option<i64>,
    /// Account name.
    #[arg(long)]
    name: Option<String>,
    /// Account title.
    #[arg(long)]
    title: Option<String>,
    /// Account type.
    #[arg(long = "type")]
    account_type: Option<String>,
    /// Ticket id, for accounts behind an access-request workflow.
    #[arg(long)]
    ticket_id: Option<String>,
    /// Reason for fetching the account.
    #[arg(long)]
    reason: Option<String>,
    /// Return only this attribute's value.
    #[arg(long)]
    key_field: Option<String>,
}

impl From<CriteriaArgs> for AccountCriteria {
    fn from(args: CriteriaArgs) -> Self {
        Self {
            id: args.id,
            name: args.name,
            title: args.title,
            account_type: args.account_type,
            ticket_id: args.ticket_id,
            reason: args.reason,
            key_field: args.key_field,
        }
    }
}

// ── Entry point ──────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{RED}{BOLD}✗ Error:{RESET} {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_env("SECURDEN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let auth = AuthContext::new(
        cli.server_url.unwrap_or_default(),
        cli.authtoken.unwrap_or_default(),
    )?;
    info!(server = %auth.server_url(), "configuring securden client");
    let client = SecurdenClient::new(auth).context("failed to build securden client")?;

    match cli.command {
        Commands::Account(args) => cmd_account(&client, args.into()).await,
        Commands::Attributes(args) => cmd_attributes(&client, args.into()).await,
        Commands::Passwords { ids } => cmd_passwords(&client, &ids).await,
        Commands::DeleteAccounts {
            ids,
            reason,
            permanent,
        } => cmd_delete_accounts(&client, &ids, DeleteOptions { reason, permanent }).await,
    }
}

// ── Commands ─────────────────────────────────────────────────────────

async fn cmd_account(client: &SecurdenClient, criteria: AccountCriteria) -> Result<()> {
    criteria.ensure_identifiable()?;
    emit(policy::account(client.resolve_account(&criteria).await))
}

async fn cmd_attributes(client: &SecurdenClient, criteria: AccountCriteria) -> Result<()> {
    criteria.ensure_identifiable()?;
    emit(policy::account(client.resolve_account_attributes(&criteria).await))
}

async fn cmd_passwords(client: &SecurdenClient, ids: &[String]) -> Result<()> {
    let passwords = policy::passwords(client.resolve_passwords(ids).await)?;
    print_json(&passwords)
}

async fn cmd_delete_accounts(
    client: &SecurdenClient,
    ids: &[i64],
    options: DeleteOptions,
) -> Result<()> {
    emit(policy::deletion(client.delete_accounts(ids, &options).await))
}

// ── Output helpers ───────────────────────────────────────────────────

fn emit<T: Serialize>(outcome: Outcome<T>) -> Result<()> {
    match outcome {
        Outcome::Value(value) => print_json(&value),
        Outcome::Warning(msg) => {
            warning(&msg);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}

fn warning(msg: &str) {
    eprintln!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}
