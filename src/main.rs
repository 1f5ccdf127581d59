//! `visca-send` - dispatch VISCA commands to a device over IP
//!
//! Creates one session, sends each command in order, prints the delivery
//! statistics and closes the session. Set `RUST_LOG` to control verbosity.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use visca_ip_core::{create_session, SessionConfig, UdpTransport};

/// Send VISCA-over-IP commands and wait for their completion.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Device address; the port defaults to 52381 (e.g. 192.168.0.100).
    #[arg(short, long, default_value_t = format!("127.0.0.1:{}", visca_ip_core::DEFAULT_PORT))]
    addr: String,

    /// Resends allowed per command.
    #[arg(short, long, default_value_t = visca_ip_core::DEFAULT_MAX_RETRIES)]
    retries: u32,

    /// Per-call deadline in milliseconds.
    #[arg(short, long, default_value_t = visca_ip_core::DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Log every ACK, completion and stale response.
    #[arg(short, long)]
    debug: bool,

    /// Command bodies in hex, without the `81 01` prefix and `FF` terminator
    /// (e.g. "06 04" for pan-tilt home).
    #[arg(required = true)]
    commands: Vec<String>,
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli) -> visca_ip_core::Result<()> {
    let config = SessionConfig::new()
        .with_max_retries(cli.retries)
        .with_timeout(Duration::from_millis(cli.timeout_ms))
        .with_debug(cli.debug);

    let transport = UdpTransport::connect_host(&cli.addr)?;
    let mut session = create_session(transport, config)?;

    for command in &cli.commands {
        session.dispatch_hex(command)?;
        info!(command = %command, seq = session.sequence_number(), "command completed");
    }

    println!("{}", session.stats());
    session.close()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
