use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use chatgate::cli::Cli;
use chatgate::{ChatConfig, Container, ContainerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = apply_overrides(ChatConfig::from_env(), &cli);
    for name in config.placeholder_secrets() {
        warn!("{name} is not set; using a placeholder value");
    }

    let container = Container::new(ContainerConfig {
        chat: config,
        mock_gateway: cli.mock_gateway,
    })?;
    info!(
        "Chatting with {} via {}",
        container.config().model_name(),
        container.config().gateway_url()
    );

    let mut session = container.session();
    let mut stdout = tokio::io::stdout();
    session
        .run(BufReader::new(tokio::io::stdin()), &mut stdout)
        .await?;

    Ok(())
}

fn apply_overrides(mut config: ChatConfig, cli: &Cli) -> ChatConfig {
    if let Some(secs) = cli.timeout {
        config = config.with_request_timeout(Some(Duration::from_secs(secs)));
    }
    if cli.verify_tls {
        config = config.with_verify_tls(true);
    }
    if cli.no_trace {
        let trace = config.trace().clone().with_enabled(false);
        config = config.with_trace(trace);
    }
    config
}
