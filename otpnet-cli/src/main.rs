#![deny(missing_docs)]
//! A command-line interface for generating keys and talking to otpnet daemons.

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use otpnet_core::client::Client;
use otpnet_core::{Direction, Error, input, keygen};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \n# Generate a 1024-symbol key\notpnet-cli keygen 1024 > mykey\n\n# Encode a file through the daemon on port 57171\notpnet-cli enc plaintext1 mykey 57171 > ciphertext1\n\n# Decode it again through the decode daemon on port 57172\notpnet-cli dec ciphertext1 mykey 57172"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a random key of LENGTH symbols drawn from A-Z and space
    Keygen {
        /// Number of symbols in the key
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        length: u32,
    },
    /// Encode a text file through an encode daemon
    Enc(Exchange),
    /// Decode a text file through a decode daemon
    Dec(Exchange),
}

#[derive(Args)]
struct Exchange {
    /// File whose first line is the text to send
    text: PathBuf,

    /// File whose first line is the key
    key: PathBuf,

    /// Port of the daemon
    port: u16,

    /// Host of the daemon
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

async fn run_exchange(direction: Direction, args: &Exchange) -> Result<Vec<u8>, Error> {
    let text = input::read_line(&args.text)?;
    let key = input::read_line(&args.key)?;

    let mut client = Client::new(args.host.clone(), args.port);
    if let Some(secs) = args.timeout {
        client = client.with_timeout(Duration::from_secs(secs));
    }
    info!(
        "Sending {} symbols to {direction} daemon at {}:{}",
        text.len(),
        args.host,
        args.port
    );
    client.exchange(direction, &text, &key).await
}

fn print_line(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.write_all(b"\n")?;
    stdout.flush()
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let output = match &cli.command {
        Commands::Keygen { length } => {
            keygen::generate_key(*length as usize).map(String::into_bytes)
        }
        Commands::Enc(args) => run_exchange(Direction::Encode, args).await,
        Commands::Dec(args) => run_exchange(Direction::Decode, args).await,
    };

    match output {
        Ok(bytes) => {
            if let Err(e) = print_line(&bytes) {
                error!("Failed to write output: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
