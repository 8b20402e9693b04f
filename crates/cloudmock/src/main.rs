use clap::Parser;
use cloudmock::{CloudMock, Fixtures, MockServer};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Stateful OpenStack compute/block-storage API emulator
#[derive(Parser, Debug)]
#[command(name = "cloudmock", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "CLOUDMOCK_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on (0 picks a free port)
    #[arg(short, long, env = "CLOUDMOCK_PORT", default_value = "8774")]
    port: u16,

    /// YAML/JSON file with flavors, ports, volume types and mock bundles
    #[arg(short, long, env = "CLOUDMOCK_FIXTURES")]
    fixtures: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let fixtures = match &args.fixtures {
        Some(path) => {
            info!("Loading fixtures from {}", path.display());
            Fixtures::from_file(path)?
        }
        None => Fixtures::default(),
    };

    let mock = Arc::new(CloudMock::from_fixtures(fixtures));
    let server = MockServer::bind(SocketAddr::new(args.host, args.port), mock).await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}
