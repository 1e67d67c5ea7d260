use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

/// Run the `tally` binary with the given arguments from `cwd`.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_tally<I, S>(cwd: &Path, args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = tally_bin()?;
    Command::new(bin)
        .current_dir(cwd)
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("TALLY_LOG")
        .env("NO_COLOR", "1")
        .output()
        .map_err(|err| format!("run tally failed: {}", err))
}

/// Turn a failed run into a readable error.
///
/// # Errors
///
/// Returns the captured output when the process did not exit successfully.
pub fn expect_success(output: &Output) -> Result<(), String> {
    if output.status.success() {
        return Ok(());
    }
    Err(format!(
        "status: {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    ))
}

fn tally_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_tally").map_or_else(
        || Err("CARGO_BIN_EXE_tally missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
