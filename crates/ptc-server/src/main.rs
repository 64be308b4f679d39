use clap::Parser;
use ptc_server::PtcServer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

/// JSON logs on the hosting platform, text everywhere else.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if std::env::var_os("GAE_SERVICE").is_some() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .init();
    } else {
        tracing_subscriber::registry().with(env_filter).with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = cli::Cli::parse();
    let port = std::env::var("PORT").ok();
    let config = cli.server_config(port.as_deref())?;
    let emulator_host = std::env::var(ptc_server::config::EMULATOR_HOST_VAR).ok();

    let server = PtcServer::open(config, emulator_host).await?;
    server.serve().await?;
    Ok(())
}
