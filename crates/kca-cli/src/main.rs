use kca_lib::cli::{parse_args, resolve_command, run_analyze};
use kca_lib::error::KcaError;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, KcaError> {
    color_eyre::install()?;

    let args = parse_args();
    let params = resolve_command(args.command)?;

    match run_analyze(params).await {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => match e.quiet_exit_status() {
            Some(status) => Ok(ExitCode::from(status)),
            None => Err(e),
        },
    }
}
