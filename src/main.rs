use std::process::ExitCode;

use dotenvy::dotenv;
use marquee::logging::init_tracing;
use marquee::metrics::init_metrics;
use marquee::server;
use marquee::state::init_app_state;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = ?err, "server exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let handle = init_metrics()?;
    let state = init_app_state().await?.with_metrics(handle);
    server::serve(state).await
}
