//! Verify that the configured Claude Code credential is accepted.

use std::io;
use std::process::ExitCode;

use claude_oauth_check::console::{log, Color};
use claude_oauth_check::{auth_check, logging, ClaudeCli, Credentials};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init();

    let credentials = Credentials::from_env();
    let mut stdout = io::stdout();

    tokio::select! {
        result = auth_check::run(&ClaudeCli, &credentials, &mut stdout) => match result {
            Ok(outcome) => outcome.into(),
            Err(err) => {
                let _ = log(&mut io::stderr(), Color::Red, &format!("\n💥 Unexpected error: {}", err));
                ExitCode::FAILURE
            }
        },
        notice = shutdown_signal() => {
            let _ = log(&mut io::stdout(), Color::Yellow, notice);
            ExitCode::SUCCESS
        }
    }
}

/// Resolve on Ctrl-C or SIGTERM with the message to print.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "\n\n👋 Test interrupted by user",
        _ = terminate => "\n\n👋 Test terminated",
    }
}
