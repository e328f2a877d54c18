//! Ask Claude for an overview of the SDK and stream the answer.

use std::io;
use std::process::ExitCode;

use claude_oauth_check::{hello, logging, ClaudeCli, Credentials};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init();

    let credentials = Credentials::from_env();
    match hello::run(&ClaudeCli, &credentials, &mut io::stdout()).await {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("💥 Fatal error: {}", err);
            ExitCode::FAILURE
        }
    }
}
