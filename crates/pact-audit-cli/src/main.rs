// pact-audit-cli/src/main.rs
// ============================================================================
// Module: Pact Audit CLI Entry Point
// Description: Single `verify` subcommand over pact-audit-core's pure verifier.
// Purpose: Read an archive from disk, run the offline verifier, print the
//          report, and map the outcome onto spec-defined process exit codes.
// Dependencies: clap, pact-audit-core, serde_json, thiserror.
// ============================================================================

//! ## Overview
//! This binary is intentionally thin: all verification logic lives in
//! `pact-audit-core`. The CLI owns only argument parsing, file I/O, output
//! encoding, and the exit-code mapping from spec section 6 (`0` iff
//! `ok == true`, `1` otherwise, `2` if arguments are malformed or an input
//! file cannot be read). There is no server, no daemon, no persisted state,
//! and no logging facade: the rendered report (or a single error line) is
//! the only output channel.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use pact_audit_core::Report;
use pact_audit_core::VerifyOptions;
use pact_audit_core::render_outcome_line;
use pact_audit_core::verify;
use thiserror::Error;

/// Compiled-in standard Constitution text, used when `--constitution` is not given.
const DEFAULT_CONSTITUTION_TEXT: &[u8] = include_bytes!("../assets/CONSTITUTION_v1.md");

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "pact-audit", disable_help_subcommand = true, arg_required_else_help = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify an auditor pack archive offline.
    Verify(VerifyCommand),
}

/// Arguments for the `verify` command.
#[derive(Args, Debug)]
struct VerifyCommand {
    /// Path to the auditor pack archive (a zip file).
    #[arg(value_name = "ARCHIVE")]
    archive: PathBuf,
    /// Accept a Constitution whose hash is off the standard accept list.
    #[arg(long)]
    allow_nonstandard: bool,
    /// Override path for the standard Constitution text (defaults to the
    /// compiled-in copy).
    #[arg(long, value_name = "PATH")]
    constitution: Option<PathBuf>,
    /// Output format for the verification result.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

/// Output formats for the `verify` command.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum OutputFormat {
    /// The canonical `Report` wire format (spec section 6).
    Json,
    /// The one-line human summary (spec section 7).
    Text,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper. Every variant maps to exit code 2 (malformed input).
#[derive(Debug, Error)]
enum CliError {
    /// The archive path could not be read.
    #[error("failed to read archive {path}: {source}")]
    ReadArchive {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The Constitution override path could not be read.
    #[error("failed to read constitution override {path}: {source}")]
    ReadConstitution {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The report could not be encoded as JSON.
    #[error("failed to encode report as JSON: {0}")]
    EncodeReport(#[source] serde_json::Error),
    /// Writing to stdout or stderr failed.
    #[error("failed to write to {stream}: {source}")]
    Output {
        /// `"stdout"` or `"stderr"`.
        stream: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Verify(command) => command_verify(&command),
    }
}

// ============================================================================
// SECTION: Verify Command
// ============================================================================

/// Executes the `verify` command.
fn command_verify(command: &VerifyCommand) -> CliResult<ExitCode> {
    let archive_bytes = fs::read(&command.archive)
        .map_err(|source| CliError::ReadArchive { path: command.archive.clone(), source })?;

    let standard_constitution_text = match &command.constitution {
        Some(path) => {
            fs::read(path).map_err(|source| CliError::ReadConstitution { path: path.clone(), source })?
        }
        None => DEFAULT_CONSTITUTION_TEXT.to_vec(),
    };

    let options = VerifyOptions::new(standard_constitution_text)
        .with_allow_nonstandard(command.allow_nonstandard);
    let outcome = verify(&archive_bytes, &options);

    let rendered = match command.format {
        OutputFormat::Json => render_report_json(&outcome.report)?,
        OutputFormat::Text => render_outcome_line(&outcome),
    };
    write_stdout_line(&rendered).map_err(|source| CliError::Output { stream: "stdout", source })?;

    Ok(exit_code_for(outcome.report.ok))
}

/// Renders a [`Report`] as a single line of canonical JSON.
fn render_report_json(report: &Report) -> CliResult<String> {
    serde_json::to_string(report).map_err(CliError::EncodeReport)
}

/// Maps a verification outcome onto the spec section 6 exit codes.
const fn exit_code_for(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    use std::io::Write;
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    use std::io::Write;
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns exit code 2 (malformed input).
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(2)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
