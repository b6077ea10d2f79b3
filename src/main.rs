//  MAIN.rs
//
//  Description:
//!   Entrypoint to the `enact` receipt-operations binary: inspect, verify, and roll back
//!   receipts produced by a `Client` embedded in some other process.
//
//  A concrete Enact deployment links `enact` as a library and registers its own workflows and
//  connectors through `ClientBuilder`; this binary does not ship any of those (workflows and
//  concrete connector implementations are both out of scope for the core). What it does ship
//  is a reference `github` connector — the same in-memory test double the library's own test
//  suites use — wired in purely so `rollback` has something to dispatch inverse operations
//  against when a receipt in the store names `github` actions.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use enact::{Client, ClientBuilder, ClientError};
use enact_connector::{Connector, InMemoryConnector};
use error_trace::ErrorTrace as _;
use humanlog::{DebugMode, HumanLogger};
use log::{error, info};

/***** ARGUMENTS *****/
#[derive(Debug, Parser)]
#[clap(name = "enact", about = "Inspect, verify, and roll back Enact receipts.")]
struct Arguments {
    /// If given, enables additional INFO- and DEBUG-level statements.
    #[clap(long, global = true, help = "If given, enables additional INFO- and DEBUG-level statements.")]
    debug: bool,
    /// If given, enables additional TRACE-level statements (implies '--debug').
    #[clap(long, global = true, help = "If given, enables additional TRACE-level statements (implies '--debug').")]
    trace: bool,

    /// The directory receipts are read from and written to.
    #[clap(long, env = "ENACT_RECEIPTS_DIR", help = "The directory receipts are read from and written to. Defaults to ./receipts.")]
    receipts_dir: Option<PathBuf>,
    /// The HMAC signing secret. Falls back to `ENACT_SECRET`.
    #[clap(long, env = "ENACT_SECRET", hide_env_values = true, help = "The HMAC signing secret (minimum 32 characters). Falls back to ENACT_SECRET.")]
    secret: Option<String>,
    /// Waives the minimum secret length. Dev/test only.
    #[clap(long, help = "Waives the 32-character minimum secret length. Dev/test only; never use against receipts anyone relies on.")]
    allow_insecure_secret: bool,

    /// The toplevel subcommand to execute.
    #[clap(subcommand)]
    action: Subcommands,
}

/// The toplevel subcommands.
#[derive(Debug, Subcommand)]
enum Subcommands {
    #[clap(name = "list", about = "Lists every run ID with a persisted receipt.")]
    List,
    #[clap(name = "show", about = "Prints a receipt's full contents as JSON.")]
    Show(RunIdArguments),
    #[clap(name = "verify", about = "Verifies a receipt's signature under the configured secret.")]
    Verify(RunIdArguments),
    #[clap(name = "rollback", about = "Rolls back a completed run, reversing what it did.")]
    Rollback(RunIdArguments),
}

#[derive(Debug, Parser)]
struct RunIdArguments {
    /// The run ID to operate on.
    #[clap(name = "RUN_ID", help = "The run ID (a UUIDv4) to operate on.")]
    run_id: String,
}

/***** HELPER FUNCTIONS *****/
/// Builds the `Client` this binary operates with: every ambient knob resolved from `args`, one
/// reference `github` connector registered so rollback has something to call, and no
/// workflows — this binary only ever reads and reverses receipts, it never starts a run.
fn build_client(args: &Arguments) -> Result<Client, ClientError> {
    let github: Arc<dyn Connector> = Arc::new(InMemoryConnector::new("github", ["create_branch", "delete_branch", "create_pr", "close_pr"]));

    ClientBuilder::new()
        .secret_opt(args.secret.clone())
        .allow_insecure_secret(args.allow_insecure_secret)
        .receipts_dir_opt(args.receipts_dir.clone())
        .rollback_enabled(true)
        .system("github", github)
        .build()
}

fn list(client: &Client) -> Result<(), ClientError> {
    let mut ids = client.list_receipts()?;
    ids.sort();
    if ids.is_empty() {
        println!("(no receipts)");
    }
    for id in ids {
        println!("{id}");
    }
    Ok(())
}

fn show(client: &Client, run_id: &str) -> Result<(), ClientError> {
    let receipt = client.load_receipt(run_id)?;
    println!("{}", serde_json::to_string_pretty(&receipt).expect("Receipt is always serializable"));
    Ok(())
}

fn verify(client: &Client, run_id: &str) -> Result<(), ClientError> {
    let receipt = client.load_receipt(run_id)?;
    if client.verify_receipt(&receipt) {
        println!("ok: {run_id} verifies under the configured secret");
        Ok(())
    } else {
        println!("FAILED: {run_id} does not verify under the configured secret");
        std::process::exit(1);
    }
}

async fn rollback(client: &Client, run_id: &str) -> Result<(), ClientError> {
    let receipt = client.rollback(run_id).await?;
    println!("{}", serde_json::to_string_pretty(&receipt).expect("Receipt is always serializable"));
    Ok(())
}

/***** ENTRYPOINT *****/
#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Arguments::parse();

    if let Err(err) = HumanLogger::terminal(DebugMode::from_flags(args.trace, args.debug)).init() {
        eprintln!("WARNING: Failed to setup logger: {err} (no logging for this session)");
    }
    info!("{} - v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let client = match build_client(&args) {
        Ok(client) => client,
        Err(err) => {
            error!("{}", err.trace());
            std::process::exit(1);
        },
    };

    let outcome = match &args.action {
        Subcommands::List => list(&client),
        Subcommands::Show(a) => show(&client, &a.run_id),
        Subcommands::Verify(a) => verify(&client, &a.run_id),
        Subcommands::Rollback(a) => rollback(&client, &a.run_id).await,
    };

    if let Err(err) = outcome {
        error!("{}", err.trace());
        std::process::exit(1);
    }
}
