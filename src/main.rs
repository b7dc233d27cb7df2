use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{debug, info};
use psk_channel::{Protocol, ProtocolConfig, ProtocolError};

/// Loopback driver: runs both peers of a psk-channel session in one process.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Passphrase shared by both peers.
    #[arg(long)]
    passphrase: String,

    /// JSON file with protocol configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Choose a command to run.
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the handshake and print both wire messages in hex.
    Handshake,
    /// Establish a session and send each message from client to server.
    Send { messages: Vec<String> },
    /// Print the effective configuration.
    ShowConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_secs()
        .init();

    let config = match &cli.config {
        Some(path) => {
            debug!("loading config from {path:?}");
            ProtocolConfig::load(path)?
        }
        None => ProtocolConfig::default(),
    };

    match cli.command {
        Commands::Handshake => {
            let session = establish(&cli.passphrase, &config)?;
            println!(
                "initiation ({} bytes): {}",
                session.initiation.len(),
                hex::encode(&session.initiation)
            );
            println!(
                "response   ({} bytes): {}",
                session.response.len(),
                hex::encode(&session.response)
            );
            println!("session established");
        }
        Commands::Send { messages } => {
            let session = establish(&cli.passphrase, &config)?;
            for message in &messages {
                let wire = session.client.encrypt(message)?;
                let received = session.server.decrypt(&wire)?;
                println!("{} -> {received:?}", hex::encode(&wire));
            }
            info!("delivered {} message(s)", messages.len());
        }
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

struct Loopback {
    client: Protocol,
    server: Protocol,
    initiation: Vec<u8>,
    response: Vec<u8>,
}

fn establish(passphrase: &str, config: &ProtocolConfig) -> Result<Loopback, ProtocolError> {
    let mut client = Protocol::with_config(config.clone())?;
    let mut server = Protocol::with_config(config.clone())?;
    client.set_shared_secret(passphrase)?;
    server.set_shared_secret(passphrase)?;

    let initiation = client.create_initiation_message()?;
    let response = server
        .process_message(&initiation, false)?
        .ok_or(ProtocolError::Malformed("server produced no response"))?;
    client.process_message(&response, true)?;
    info!("handshake complete");

    Ok(Loopback {
        client,
        server,
        initiation,
        response,
    })
}
