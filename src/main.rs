//! Entry point: parses command-line arguments and runs the server.

use clap::Parser;
use guess_server::network::Server;
use log::error;

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Port to listen on
    #[clap(value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,
    /// Seed for the target number generator
    seed: u64,
    /// Maximum number of simultaneous players
    #[clap(value_parser = clap::value_parser!(u32).range(1..))]
    max_players: u32,
}

/// Resolves when the operator requests shutdown.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler the server can only be killed.
        std::future::pending::<()>().await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let address = format!("0.0.0.0:{}", args.port);
    let mut server = Server::new(&address, args.seed, args.max_players as usize).await?;

    server.run(shutdown_signal()).await?;

    Ok(())
}
