//  MAIN.rs
//
//  Description:
//!   Entrypoint for the `enact-keytool` binary: generates signing secrets for an Enact
//!   orchestrator, and checks whether an existing one meets the minimum length the receipt
//!   subsystem enforces.
//

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use error_trace::ErrorTrace as _;
use humanlog::{DebugMode, HumanLogger};
use log::{error, info};
use rand::RngCore;
use rand::rngs::OsRng;

/// The minimum secret length `enact-receipt::Secret` enforces absent `allow_insecure_secret`.
/// Kept in sync with that crate's own constant; a mismatch here would only ever make this
/// tool too conservative, never unsafe.
const MINIMUM_SECRET_LENGTH: usize = 32;
/// Default number of random bytes to generate. Hex-encoded, 32 bytes become a 64-character
/// secret — double the enforced minimum, leaving headroom without being unwieldy to pass
/// around as an environment variable.
const DEFAULT_SECRET_BYTES: usize = 32;

/***** ARGUMENTS *****/
#[derive(Debug, Parser)]
#[clap(name = "enact-keytool", about = "Generates and checks HMAC signing secrets for an Enact orchestrator.")]
struct Arguments {
    /// If given, enables additional INFO- and DEBUG-level statements.
    #[clap(long, global = true, help = "If given, enables additional INFO- and DEBUG-level statements.")]
    debug: bool,
    /// If given, enables additional TRACE-level statements (implies '--debug').
    #[clap(long, global = true, help = "If given, enables additional TRACE-level statements (implies '--debug').")]
    trace: bool,

    /// The toplevel subcommand to execute.
    #[clap(subcommand)]
    action: Subcommands,
}

/// The toplevel subcommands.
#[derive(Debug, Subcommand)]
enum Subcommands {
    #[clap(name = "generate", alias = "gen", about = "Generates a new random signing secret, suitable for ENACT_SECRET.")]
    Generate(GenerateArguments),
    #[clap(name = "check", about = "Checks whether a secret meets the minimum length the receipt subsystem enforces.")]
    Check(CheckArguments),
}

#[derive(Debug, Parser)]
struct GenerateArguments {
    /// Number of random bytes to generate before hex-encoding. The resulting secret is twice
    /// this many characters long.
    #[clap(short, long, default_value_t = DEFAULT_SECRET_BYTES, help = "Number of random bytes to generate before hex-encoding.")]
    bytes: usize,

    /// If given, writes the secret to this path instead of printing it to stdout.
    #[clap(short, long, name = "OUTPUT_PATH", help = "If given, writes the secret to this file instead of printing it to stdout.")]
    output: Option<PathBuf>,
    /// If given, fixes missing directories before attempting to create the output file.
    #[clap(long, help = "If given, fixes missing directories before attempting to create the output file.")]
    fix_dirs: bool,
}

#[derive(Debug, Parser)]
struct CheckArguments {
    /// The secret to check. Reads from stdin if omitted.
    #[clap(name = "SECRET", help = "The secret to check. If omitted, it is read from stdin instead (so it never ends up in your shell history).")]
    secret: Option<String>,
}

/***** ERRORS *****/
#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("fewer than {MINIMUM_SECRET_LENGTH} random bytes were requested ({0}); the resulting secret would not meet the minimum length")]
    TooFewBytes(usize),
    #[error("directory '{path}' for output file could not be created: {source}")]
    CreateDir { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to write secret to '{path}': {source}")]
    Write { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to read secret from stdin: {0}")]
    ReadStdin(std::io::Error),
}

/***** IMPLEMENTATION *****/
fn generate(args: GenerateArguments) -> Result<(), Error> {
    // A generated secret is hex, so each byte contributes two characters; refuse up front
    // rather than silently handing back something `enact-receipt::Secret` would then reject.
    if args.bytes * 2 < MINIMUM_SECRET_LENGTH {
        return Err(Error::TooFewBytes(args.bytes));
    }

    let mut raw = vec![0u8; args.bytes];
    OsRng.fill_bytes(&mut raw);
    let secret = hex::encode(raw);

    match args.output {
        Some(path) => {
            if args.fix_dirs {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|source| Error::CreateDir { path: parent.to_path_buf(), source })?;
                }
            }
            fs::write(&path, &secret).map_err(|source| Error::Write { path: path.clone(), source })?;
            info!("wrote a {}-character secret to '{}'", secret.len(), path.display());
        },
        None => println!("{secret}"),
    }
    Ok(())
}

fn check(args: CheckArguments) -> Result<bool, Error> {
    let secret = match args.secret {
        Some(secret) => secret,
        None => {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map_err(Error::ReadStdin)?;
            line.trim_end_matches(['\n', '\r']).to_string()
        },
    };

    let ok = secret.len() >= MINIMUM_SECRET_LENGTH;
    if ok {
        println!("ok: {} characters (minimum is {MINIMUM_SECRET_LENGTH})", secret.len());
    } else {
        println!("too short: {} characters (minimum is {MINIMUM_SECRET_LENGTH})", secret.len());
    }
    Ok(ok)
}

/***** ENTRYPOINT *****/
fn main() -> ExitCode {
    let args = Arguments::parse();

    if let Err(err) = HumanLogger::terminal(DebugMode::from_flags(args.trace, args.debug)).init() {
        eprintln!("WARNING: Failed to setup logger: {err} (no logging for this session)");
    }
    info!("{} - v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match args.action {
        Subcommands::Generate(generate_args) => {
            if let Err(err) = generate(generate_args) {
                error!("{}", err.trace());
                return ExitCode::FAILURE;
            }
        },
        Subcommands::Check(check_args) => match check(check_args) {
            Ok(true) => return ExitCode::SUCCESS,
            Ok(false) => return ExitCode::FAILURE,
            Err(err) => {
                error!("{}", err.trace());
                return ExitCode::FAILURE;
            },
        },
    }
    ExitCode::SUCCESS
}
