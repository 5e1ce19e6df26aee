//! checksend: a single-shot checksum payload server
//!
//! Pipeline per run:
//! - Generate a synthetic text payload of an exact configured size and
//!   persist it as the on-disk artifact
//! - Stream the artifact once through SHA-256 and MD5
//! - Serve `<sha256>\n<md5>\n<payload>` to exactly one TCP client, then exit
//!
//! Configuration via CLI arguments or TOML file.

mod config;
mod digest;
mod payload;
mod server;

use config::Config;
use server::Session;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        listen = %config.listen,
        size_kb = config.size_kb,
        output = %config.output.display(),
        "Starting checksend server"
    );

    let payload = payload::generate_to_file(&config.output, config.size_bytes())?;

    // The artifact file is the source of truth for the digests
    let digests = digest::digest_file(&config.output)?;
    info!(sha256 = %digests.sha256, md5 = %digests.md5, "Digests computed");

    let session = Session::bind(&config.listen)?;
    let bytes_sent = session.serve(&digests, &payload)?;
    info!(bytes_sent, "Transfer complete");

    Ok(())
}
