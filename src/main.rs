use std::process::ExitCode;

use clap::Parser;
use inferidor_lib::interfaces::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    inferidor_lib::init_tracing();

    let cli = Cli::parse();
    match inferidor_lib::run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
