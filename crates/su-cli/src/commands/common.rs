//! Shared utilities for CLI commands

use anyhow::Result;
use std::fmt;
use std::io::{BufRead, Write};
use su_db::DbError;
use su_migrate::MigrateError;
use su_seed::SeedError;

/// Exit code for an operation aborted with Ctrl-C.
pub(crate) const CANCELLED_EXIT_CODE: u8 = 130;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and temp files are cleaned up.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command already reported the failure.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Whether any error in the chain reports a cancelled external command.
pub(crate) fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(e) = cause.downcast_ref::<DbError>() {
            e.is_cancelled()
        } else if let Some(e) = cause.downcast_ref::<MigrateError>() {
            e.is_cancelled()
        } else if let Some(e) = cause.downcast_ref::<SeedError>() {
            e.is_cancelled()
        } else {
            false
        }
    })
}

/// Map a command failure to the process exit code, reporting it on stderr.
pub(crate) fn exit_code_for(err: &anyhow::Error) -> u8 {
    if let Some(code) = err.downcast_ref::<ExitCode>() {
        return code.0;
    }
    if is_cancelled(err) {
        eprintln!("Cancelled");
        return CANCELLED_EXIT_CODE;
    }
    eprintln!("Error: {:#}", err);
    1
}

/// Ask a yes/no question on the terminal; anything but y/yes is a no.
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    let stdin = std::io::stdin();
    confirm_with(prompt, &mut stdin.lock(), &mut std::io::stdout())
}

fn confirm_with(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    write!(output, "{} [y/N]: ", prompt)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
